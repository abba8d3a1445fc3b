/**
 * MOVIE API - REST routes of the review catalog
 *
 * Routes:
 * - /movies, /movies/{id}, /movies/{id}/reviews
 * - /reviews, /reviews/{id}
 * - /stats
 */

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use time::OffsetDateTime;
use workshop_kit::{ApiResult, Id, QueryParams, Valid};

use crate::filters::{MovieListQuery, MovieReviewsQuery, ReviewListQuery};
use crate::models::{MovieInput, ReviewInput};
use crate::state::SharedCatalog;
use crate::stats::CatalogStats;

#[derive(Clone)]
pub struct CatalogApp {
    pub catalog: SharedCatalog,
    /// Latest accepted release year
    pub current_year: fn() -> i32,
}

fn utc_year() -> i32 {
    OffsetDateTime::now_utc().year()
}

impl CatalogApp {
    pub fn new(catalog: SharedCatalog) -> Self {
        Self {
            catalog,
            current_year: utc_year,
        }
    }
}

pub fn build_router(app: CatalogApp) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/{id}", get(get_movie).put(update_movie).delete(delete_movie))
        .route("/movies/{id}/reviews", get(movie_reviews))
        .route("/reviews", get(list_reviews).post(create_review))
        .route("/reviews/{id}", get(get_review).put(update_review).delete(delete_review))
        .route("/stats", get(stats))
        .with_state(app)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Movie Review API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "movies": "/movies",
            "reviews": "/reviews",
            "stats": "/stats",
            "health": "/health"
        }
    }))
}

// GET /movies
async fn list_movies(
    State(app): State<CatalogApp>,
    QueryParams(query): QueryParams<MovieListQuery>,
) -> ApiResult<Json<Value>> {
    let page = query.apply(app.catalog.movies())?;
    Ok(Json(page.into_json("movies")))
}

// POST /movies
async fn create_movie(
    State(app): State<CatalogApp>,
    Valid(input): Valid<MovieInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let movie = app.catalog.create_movie(input, (app.current_year)())?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Movie created", "movie": movie }))))
}

// GET /movies/{id}
async fn get_movie(State(app): State<CatalogApp>, Id(id): Id) -> ApiResult<Json<Value>> {
    let movie = app.catalog.movie(id)?;
    Ok(Json(json!({ "message": "Movie found", "movie": movie })))
}

// PUT /movies/{id}
async fn update_movie(
    State(app): State<CatalogApp>,
    Id(id): Id,
    Valid(input): Valid<MovieInput>,
) -> ApiResult<Json<Value>> {
    let movie = app.catalog.update_movie(id, input, (app.current_year)())?;
    Ok(Json(json!({ "message": "Movie updated", "movie": movie })))
}

// DELETE /movies/{id}
async fn delete_movie(State(app): State<CatalogApp>, Id(id): Id) -> ApiResult<Json<Value>> {
    let (movie, deleted) = app.catalog.delete_movie(id)?;
    Ok(Json(json!({
        "message": "Movie and associated reviews deleted",
        "movie": movie,
        "deleted_reviews_count": deleted,
    })))
}

// GET /movies/{id}/reviews
async fn movie_reviews(
    State(app): State<CatalogApp>,
    Id(id): Id,
    QueryParams(query): QueryParams<MovieReviewsQuery>,
) -> ApiResult<Json<Value>> {
    let reviews = query.apply(id, app.catalog.reviews_of(id)?)?;
    Ok(Json(json!({
        "movie_id": id,
        "total_reviews": reviews.len(),
        "reviews": reviews,
    })))
}

// GET /reviews
async fn list_reviews(
    State(app): State<CatalogApp>,
    QueryParams(query): QueryParams<ReviewListQuery>,
) -> ApiResult<Json<Value>> {
    let page = query.apply(app.catalog.reviews())?;
    Ok(Json(page.into_json("reviews")))
}

// POST /reviews
async fn create_review(
    State(app): State<CatalogApp>,
    Valid(input): Valid<ReviewInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let review = app.catalog.create_review(input)?;
    Ok((StatusCode::CREATED, Json(json!({ "message": "Review created", "review": review }))))
}

// GET /reviews/{id}
async fn get_review(State(app): State<CatalogApp>, Id(id): Id) -> ApiResult<Json<Value>> {
    let review = app.catalog.review(id)?;
    Ok(Json(json!({ "message": "Review found", "review": review })))
}

// PUT /reviews/{id}
async fn update_review(
    State(app): State<CatalogApp>,
    Id(id): Id,
    Valid(input): Valid<ReviewInput>,
) -> ApiResult<Json<Value>> {
    let review = app.catalog.update_review(id, input)?;
    Ok(Json(json!({ "message": "Review updated", "review": review })))
}

// DELETE /reviews/{id}
async fn delete_review(State(app): State<CatalogApp>, Id(id): Id) -> ApiResult<Json<Value>> {
    let review = app.catalog.delete_review(id)?;
    Ok(Json(json!({ "message": "Review deleted", "review": review })))
}

// GET /stats
async fn stats(State(app): State<CatalogApp>) -> Json<CatalogStats> {
    Json(app.catalog.stats())
}
