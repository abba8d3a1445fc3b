use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::models::{Movie, Review};
use crate::rating::mean_rating;

/// How many entries `movies_by_review_count` keeps
pub const TOP_REVIEWED: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewCount {
    pub movie_id: u64,
    pub review_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_movies: usize,
    pub total_reviews: usize,
    pub average_rating_overall: Option<f64>,
    pub genre_distribution: BTreeMap<&'static str, usize>,
    pub movies_by_review_count: Vec<ReviewCount>,
}

pub fn compute(movies: &[Movie], reviews: &[Review]) -> CatalogStats {
    let mut genre_distribution = BTreeMap::new();
    for movie in movies {
        *genre_distribution.entry(movie.genre.as_str()).or_insert(0) += 1;
    }

    let mut counts: HashMap<u64, usize> = HashMap::new();
    for review in reviews {
        *counts.entry(review.movie_id).or_insert(0) += 1;
    }
    let mut movies_by_review_count: Vec<ReviewCount> = counts
        .into_iter()
        .map(|(movie_id, review_count)| ReviewCount { movie_id, review_count })
        .collect();
    // most reviewed first, ties by id so the answer is stable
    movies_by_review_count.sort_by(|a, b| {
        b.review_count
            .cmp(&a.review_count)
            .then(a.movie_id.cmp(&b.movie_id))
    });
    movies_by_review_count.truncate(TOP_REVIEWED);

    CatalogStats {
        total_movies: movies.len(),
        total_reviews: reviews.len(),
        average_rating_overall: mean_rating(reviews.iter().map(|r| r.rating)),
        genre_distribution,
        movies_by_review_count,
    }
}
