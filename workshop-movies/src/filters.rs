//! Query strings of the movie and review list endpoints.

use serde::Deserialize;
use workshop_kit::listing::contains_ignore_case;
use workshop_kit::{ApiError, ApiResult, Page, PageParams, SortOrder};

use crate::models::{Genre, MovieView, Review};

fn check_rating_bound(field: &str, value: Option<f64>, min: f64) -> ApiResult<()> {
    match value {
        Some(v) if !(min..=10.0).contains(&v) => Err(ApiError::validation(
            field,
            format!("must be between {min} and 10"),
        )),
        _ => Ok(()),
    }
}

/// `GET /movies`
#[derive(Debug, Default, Deserialize)]
pub struct MovieListQuery {
    pub genre: Option<Genre>,
    pub release_year: Option<i32>,
    pub director: Option<String>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub min_duration: Option<u32>,
    pub max_duration: Option<u32>,
    pub sort_by: Option<String>,
    pub order: Option<SortOrder>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl MovieListQuery {
    pub fn apply(&self, movies: Vec<MovieView>) -> ApiResult<Page<MovieView>> {
        let page = PageParams::new(self.offset, self.limit)?;
        check_rating_bound("min_rating", self.min_rating, 0.0)?;
        check_rating_bound("max_rating", self.max_rating, 0.0)?;

        let mut movies: Vec<MovieView> = movies
            .into_iter()
            .filter(|m| self.genre.map_or(true, |g| m.movie.genre == g))
            .filter(|m| self.release_year.map_or(true, |y| m.movie.release_year == y))
            .filter(|m| {
                self.director
                    .as_deref()
                    .map_or(true, |d| contains_ignore_case(&m.movie.director, d))
            })
            // a rating bound drops unrated movies
            .filter(|m| self.min_rating.map_or(true, |min| m.rating.is_some_and(|r| r >= min)))
            .filter(|m| self.max_rating.map_or(true, |max| m.rating.is_some_and(|r| r <= max)))
            .filter(|m| self.min_duration.map_or(true, |d| m.movie.duration_minutes >= d))
            .filter(|m| self.max_duration.map_or(true, |d| m.movie.duration_minutes <= d))
            .collect();

        let order = self.order.unwrap_or(SortOrder::Asc);
        match self.sort_by.as_deref().unwrap_or("id") {
            "id" => order.sort(&mut movies, |a, b| a.movie.id.cmp(&b.movie.id)),
            "title" => order.sort(&mut movies, |a, b| a.movie.title.cmp(&b.movie.title)),
            "release_year" => order.sort(&mut movies, |a, b| a.movie.release_year.cmp(&b.movie.release_year)),
            "rating" => order.sort(&mut movies, |a, b| {
                a.rating.unwrap_or(0.0).total_cmp(&b.rating.unwrap_or(0.0))
            }),
            "duration_minutes" => order.sort(&mut movies, |a, b| {
                a.movie.duration_minutes.cmp(&b.movie.duration_minutes)
            }),
            _ => {}
        }

        Ok(page.apply(movies))
    }
}

/// `GET /reviews`
#[derive(Debug, Default, Deserialize)]
pub struct ReviewListQuery {
    pub movie_id: Option<u64>,
    pub reviewer_name: Option<String>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub sort_by: Option<String>,
    pub order: Option<SortOrder>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl ReviewListQuery {
    pub fn apply(&self, reviews: Vec<Review>) -> ApiResult<Page<Review>> {
        let page = PageParams::new(self.offset, self.limit)?;
        check_rating_bound("min_rating", self.min_rating, 1.0)?;
        check_rating_bound("max_rating", self.max_rating, 1.0)?;

        let mut reviews: Vec<Review> = reviews
            .into_iter()
            .filter(|r| self.movie_id.map_or(true, |id| r.movie_id == id))
            .filter(|r| {
                self.reviewer_name
                    .as_deref()
                    .map_or(true, |name| contains_ignore_case(&r.reviewer_name, name))
            })
            .filter(|r| self.min_rating.map_or(true, |min| r.rating >= min))
            .filter(|r| self.max_rating.map_or(true, |max| r.rating <= max))
            .collect();

        sort_reviews(
            &mut reviews,
            self.sort_by.as_deref().unwrap_or("created_at"),
            self.order.unwrap_or(SortOrder::Desc),
        );
        Ok(page.apply(reviews))
    }
}

/// `GET /movies/{id}/reviews`
#[derive(Debug, Default, Deserialize)]
pub struct MovieReviewsQuery {
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub sort_by: Option<String>,
    pub order: Option<SortOrder>,
}

impl MovieReviewsQuery {
    pub fn apply(&self, movie_id: u64, reviews: Vec<Review>) -> ApiResult<Vec<Review>> {
        check_rating_bound("min_rating", self.min_rating, 1.0)?;
        check_rating_bound("max_rating", self.max_rating, 1.0)?;

        let mut reviews: Vec<Review> = reviews
            .into_iter()
            .filter(|r| r.movie_id == movie_id)
            .filter(|r| self.min_rating.map_or(true, |min| r.rating >= min))
            .filter(|r| self.max_rating.map_or(true, |max| r.rating <= max))
            .collect();

        let sort_by = self.sort_by.as_deref().unwrap_or("created_at");
        if matches!(sort_by, "rating" | "created_at") {
            sort_reviews(&mut reviews, sort_by, self.order.unwrap_or(SortOrder::Desc));
        }
        Ok(reviews)
    }
}

fn sort_reviews(reviews: &mut [Review], sort_by: &str, order: SortOrder) {
    match sort_by {
        "id" => order.sort(reviews, |a, b| a.id.cmp(&b.id)),
        "movie_id" => order.sort(reviews, |a, b| a.movie_id.cmp(&b.movie_id)),
        "rating" => order.sort(reviews, |a, b| a.rating.total_cmp(&b.rating)),
        "created_at" => order.sort(reviews, |a, b| a.created_at.cmp(&b.created_at)),
        _ => {}
    }
}
