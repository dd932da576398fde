use serde::{Deserialize, Serialize};

/// Identifier of a user in the ratings source
pub type UserId = u32;

/// Identifier of a movie, shared by ratings, catalog, links and tags
pub type MovieId = u32;

/// A single rating observation: `user_id` rated `movie_id` with `rating`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(rename = "movieId")]
    pub movie_id: MovieId,
    pub rating: f64,
}

impl Rating {
    pub fn new(user_id: UserId, movie_id: MovieId, rating: f64) -> Self {
        Self {
            user_id,
            movie_id,
            rating,
        }
    }
}

/// Movie catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    #[serde(rename = "movieId")]
    pub movie_id: MovieId,
    pub title: String,
    /// Pipe-separated genre list, e.g. `Adventure|Comedy`
    #[serde(default)]
    pub genres: String,
}

impl Movie {
    pub fn new(movie_id: MovieId, title: impl Into<String>) -> Self {
        Self {
            movie_id,
            title: title.into(),
            genres: String::new(),
        }
    }

    /// Genres as individual names, skipping the `(no genres listed)` marker
    pub fn genre_list(&self) -> Vec<&str> {
        self.genres
            .split('|')
            .map(str::trim)
            .filter(|g| !g.is_empty() && *g != "(no genres listed)")
            .collect()
    }
}

/// External identifiers for a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "movieId")]
    pub movie_id: MovieId,
    /// Kept as text so leading zeros survive (`0114709`)
    #[serde(rename = "imdbId")]
    pub imdb_id: String,
    #[serde(rename = "tmdbId", default)]
    pub tmdb_id: Option<u64>,
}

/// Free-text tag a user attached to a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(rename = "movieId")]
    pub movie_id: MovieId,
    pub tag: String,
}

/// One row of a ranked recommendation list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub movie_id: MovieId,
    pub predicted_rating: f64,
    pub title: String,
}

/// Everything a data source hands to the engine
///
/// Links and tags are optional and never enter the computation; they are
/// carried through so movie details can be served alongside recommendations.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub ratings: Vec<Rating>,
    pub movies: Vec<Movie>,
    pub links: Option<Vec<Link>>,
    pub tags: Option<Vec<Tag>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_list_splits_pipes() {
        let movie = Movie {
            movie_id: 1,
            title: "Toy Story (1995)".to_string(),
            genres: "Adventure|Animation|Children".to_string(),
        };
        assert_eq!(movie.genre_list(), vec!["Adventure", "Animation", "Children"]);
    }

    #[test]
    fn test_genre_list_skips_placeholder() {
        let movie = Movie {
            movie_id: 2,
            title: "Unknown".to_string(),
            genres: "(no genres listed)".to_string(),
        };
        assert!(movie.genre_list().is_empty());
    }

    #[test]
    fn test_recommendation_serialization() {
        let rec = Recommendation {
            movie_id: 30,
            predicted_rating: 5.0,
            title: "C".to_string(),
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["movie_id"], 30);
        assert_eq!(json["predicted_rating"], 5.0);
        assert_eq!(json["title"], "C");
    }

    #[test]
    fn test_rating_uses_movielens_headers() {
        let rating: Rating =
            serde_json::from_str(r#"{"userId":1,"movieId":10,"rating":4.5}"#).unwrap();
        assert_eq!(rating, Rating::new(1, 10, 4.5));
    }
}
