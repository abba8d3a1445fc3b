//! Derived movie ratings.
//!
//! A movie's rating is the mean of its current reviews, rounded to one
//! decimal, or `None` without reviews. Always recomputed from the reviews,
//! never stored, so it cannot drift after a review changes.

use workshop_kit::listing::round_to;

use crate::models::{Movie, MovieView, Review};

/// Mean of `ratings` rounded to one decimal, `None` when empty
pub fn mean_rating(ratings: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = ratings
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), r| (sum + r, count + 1));
    (count > 0).then(|| round_to(sum / count as f64, 1))
}

/// Rating and review count of `movie_id`
pub fn movie_rating(reviews: &[Review], movie_id: u64) -> (Option<f64>, usize) {
    let ratings: Vec<f64> = reviews
        .iter()
        .filter(|r| r.movie_id == movie_id)
        .map(|r| r.rating)
        .collect();
    (mean_rating(ratings.iter().copied()), ratings.len())
}

pub fn view(movie: Movie, reviews: &[Review]) -> MovieView {
    let (rating, review_count) = movie_rating(reviews, movie.id);
    MovieView {
        movie,
        rating,
        review_count,
    }
}
