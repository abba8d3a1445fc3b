use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use validator::Validate;
use workshop_kit::{Normalize, Record};

/// First year a film was shot
pub const FIRST_FILM_YEAR: i32 = 1888;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    Action,
    Comedy,
    Drama,
    Horror,
    Romance,
    Thriller,
    Fantasy,
    ScienceFiction,
    Documentary,
    Animation,
}

impl Genre {
    pub fn as_str(self) -> &'static str {
        match self {
            Genre::Action => "action",
            Genre::Comedy => "comedy",
            Genre::Drama => "drama",
            Genre::Horror => "horror",
            Genre::Romance => "romance",
            Genre::Thriller => "thriller",
            Genre::Fantasy => "fantasy",
            Genre::ScienceFiction => "science_fiction",
            Genre::Documentary => "documentary",
            Genre::Animation => "animation",
        }
    }
}

/// Stored movie. The rating is not part of it: it is derived from the
/// reviews every time a movie is read (see `MovieView`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub genre: Genre,
    pub release_year: i32,
    pub director: String,
    pub duration_minutes: u32,
}

impl Record for Movie {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Movie {
    pub fn from_input(id: u64, input: MovieInput) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            genre: input.genre,
            release_year: input.release_year,
            director: input.director,
            duration_minutes: input.duration_minutes,
        }
    }
}

/// A movie as served by the API, with its derived rating
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieView {
    #[serde(flatten)]
    pub movie: Movie,
    pub rating: Option<f64>,
    pub review_count: usize,
}

/// Body of `POST /movies` and `PUT /movies/{id}`. The upper bound of
/// `release_year` (current year) is checked when the movie is stored.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MovieInput {
    #[validate(length(min = 3, max = 200))]
    pub title: String,
    #[validate(length(min = 10, max = 1000))]
    pub description: String,
    pub genre: Genre,
    #[validate(range(min = 1888))]
    pub release_year: i32,
    #[validate(length(min = 2, max = 100))]
    pub director: String,
    #[validate(range(min = 1, max = 600))]
    pub duration_minutes: u32,
}

impl Normalize for MovieInput {
    fn normalize(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.director = self.director.trim().to_string();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    pub movie_id: u64,
    pub reviewer_name: String,
    pub rating: f64,
    pub comment: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Record for Review {
    fn id(&self) -> u64 {
        self.id
    }
}

/// Body of `POST /reviews` and `PUT /reviews/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewInput {
    #[validate(range(min = 1))]
    pub movie_id: u64,
    #[validate(length(min = 2, max = 50))]
    pub reviewer_name: String,
    #[validate(range(min = 1.0, max = 10.0))]
    pub rating: f64,
    #[validate(length(min = 10, max = 500))]
    pub comment: String,
}

impl Normalize for ReviewInput {
    fn normalize(mut self) -> Self {
        self.reviewer_name = self.reviewer_name.trim().to_string();
        self.comment = self.comment.trim().to_string();
        self
    }
}
