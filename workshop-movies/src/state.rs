/**
 * CATALOG STATE - movies and their reviews
 *
 * ROLE:
 * Owns both collections. Reviews must point at an existing movie, deleting
 * a movie deletes its reviews, and every movie leaving this module carries
 * a rating freshly derived from the reviews.
 *
 * LOCK ORDER: movies, then reviews.
 */

use std::path::Path;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::info;
use workshop_kit::store::{commit_both, next_id};
use workshop_kit::{ApiError, ApiResult, JsonCollection, StoreError};

use crate::models::{Movie, MovieInput, MovieView, Review, ReviewInput};
use crate::rating;
use crate::stats::{self, CatalogStats};

pub const MOVIES_FILE: &str = "movies.json";
pub const REVIEWS_FILE: &str = "reviews.json";

pub type SharedCatalog = Arc<CatalogState>;

#[derive(Debug)]
pub struct CatalogState {
    movies: JsonCollection<Movie>,
    reviews: JsonCollection<Review>,
}

fn movie_not_found(id: u64) -> ApiError {
    ApiError::not_found(format!("Movie with ID {id} not found"))
}

fn review_not_found(id: u64) -> ApiError {
    ApiError::not_found(format!("Review with ID {id} not found"))
}

fn ensure_released(input: &MovieInput, current_year: i32) -> ApiResult<()> {
    if input.release_year > current_year {
        return Err(ApiError::validation(
            "release_year",
            format!("must be <= {current_year}"),
        ));
    }
    Ok(())
}

impl CatalogState {
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            movies: JsonCollection::open(data_dir.join(MOVIES_FILE))?,
            reviews: JsonCollection::open(data_dir.join(REVIEWS_FILE))?,
        })
    }

    /// Every movie with its current rating
    pub fn movies(&self) -> Vec<MovieView> {
        self.movies.read(|movies| {
            self.reviews.read(|reviews| {
                movies
                    .iter()
                    .cloned()
                    .map(|m| rating::view(m, reviews))
                    .collect()
            })
        })
    }

    pub fn movie(&self, id: u64) -> ApiResult<MovieView> {
        let movie = self.movies.find(id).ok_or_else(|| movie_not_found(id))?;
        Ok(self.reviews.read(|reviews| rating::view(movie, reviews)))
    }

    pub fn reviews(&self) -> Vec<Review> {
        self.reviews.snapshot()
    }

    pub fn review(&self, id: u64) -> ApiResult<Review> {
        self.reviews.find(id).ok_or_else(|| review_not_found(id))
    }

    /// Reviews of one movie, 404 when the movie does not exist
    pub fn reviews_of(&self, movie_id: u64) -> ApiResult<Vec<Review>> {
        self.movies.read(|movies| -> ApiResult<Vec<Review>> {
            if !movies.iter().any(|m| m.id == movie_id) {
                return Err(movie_not_found(movie_id));
            }
            Ok(self
                .reviews
                .read(|reviews| reviews.iter().filter(|r| r.movie_id == movie_id).cloned().collect()))
        })
    }

    // ---- movies ----

    pub fn create_movie(&self, input: MovieInput, current_year: i32) -> ApiResult<MovieView> {
        ensure_released(&input, current_year)?;
        let movie = self.movies.transact(|movies| {
            let movie = Movie::from_input(next_id(movies), input);
            movies.push(movie.clone());
            Ok::<_, ApiError>(movie)
        })?;
        info!("[movies] created \"{}\" (#{})", movie.title, movie.id);
        Ok(MovieView {
            movie,
            rating: None,
            review_count: 0,
        })
    }

    pub fn update_movie(&self, id: u64, input: MovieInput, current_year: i32) -> ApiResult<MovieView> {
        ensure_released(&input, current_year)?;
        self.movies.transact(|movies| {
            let slot = movies
                .iter_mut()
                .find(|m| m.id == id)
                .ok_or_else(|| movie_not_found(id))?;
            *slot = Movie::from_input(id, input);
            let movie = slot.clone();
            Ok(self.reviews.read(|reviews| rating::view(movie, reviews)))
        })
    }

    /// Deletes the movie and all its reviews. Returns the movie as it was
    /// and the number of deleted reviews.
    pub fn delete_movie(&self, id: u64) -> ApiResult<(MovieView, usize)> {
        let mut movies = self.movies.draft();
        let pos = movies
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| movie_not_found(id))?;
        let movie = movies.remove(pos);

        let mut reviews = self.reviews.draft();
        let view = rating::view(movie, &reviews);
        let before = reviews.len();
        reviews.retain(|r| r.movie_id != id);
        let deleted = before - reviews.len();
        commit_both(movies, reviews)?;
        info!("[movies] deleted movie #{id} and {deleted} review(s)");
        Ok((view, deleted))
    }

    // ---- reviews ----

    pub fn create_review(&self, input: ReviewInput) -> ApiResult<Review> {
        let review = self.movies.read(|movies| -> ApiResult<Review> {
            if !movies.iter().any(|m| m.id == input.movie_id) {
                return Err(movie_not_found(input.movie_id));
            }
            self.reviews.transact(|reviews| {
                let review = Review {
                    id: next_id(reviews),
                    movie_id: input.movie_id,
                    reviewer_name: input.reviewer_name,
                    rating: input.rating,
                    comment: input.comment,
                    created_at: OffsetDateTime::now_utc(),
                };
                reviews.push(review.clone());
                Ok(review)
            })
        })?;
        info!("[reviews] review #{} on movie #{}", review.id, review.movie_id);
        Ok(review)
    }

    /// Full replace, id and creation time are kept. The review may move to
    /// another existing movie.
    pub fn update_review(&self, id: u64, input: ReviewInput) -> ApiResult<Review> {
        self.movies.read(|movies| -> ApiResult<Review> {
            if !movies.iter().any(|m| m.id == input.movie_id) {
                return Err(movie_not_found(input.movie_id));
            }
            self.reviews.transact(|reviews| {
                let slot = reviews
                    .iter_mut()
                    .find(|r| r.id == id)
                    .ok_or_else(|| review_not_found(id))?;
                slot.movie_id = input.movie_id;
                slot.reviewer_name = input.reviewer_name;
                slot.rating = input.rating;
                slot.comment = input.comment;
                Ok(slot.clone())
            })
        })
    }

    pub fn delete_review(&self, id: u64) -> ApiResult<Review> {
        let review = self.reviews.transact(|reviews| {
            let pos = reviews
                .iter()
                .position(|r| r.id == id)
                .ok_or_else(|| review_not_found(id))?;
            Ok::<_, ApiError>(reviews.remove(pos))
        })?;
        info!("[reviews] deleted review #{id}");
        Ok(review)
    }

    pub fn stats(&self) -> CatalogStats {
        self.movies
            .read(|movies| self.reviews.read(|reviews| stats::compute(movies, reviews)))
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.movies.flush()?;
        self.reviews.flush()
    }
}
