/// Rating data sources
///
/// A data source hands the engine one complete [`Dataset`]: ratings, the
/// movie catalog and, when available, the links and tags tables. Files use the
/// MovieLens CSV layout (`userId,movieId,rating,timestamp` and friends); extra
/// columns are ignored.
use std::io::Read;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::{config::Config, error::AppResult, models::Dataset};

pub mod local;
pub mod remote;

pub use local::LocalCsvSource;
pub use remote::RemoteCsvSource;

pub const RATINGS_FILE: &str = "ratings.csv";
pub const MOVIES_FILE: &str = "movies.csv";
pub const LINKS_FILE: &str = "links.csv";
pub const TAGS_FILE: &str = "tags.csv";

/// Trait for rating data sources
///
/// `load` returns a fresh copy of the data on every call so a rebuild can
/// pick up new ratings.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    /// Load ratings, movies and the optional auxiliary tables
    async fn load(&self) -> AppResult<Dataset>;

    /// Where the data comes from, for logging
    fn describe(&self) -> String;
}

/// Picks the remote source when `data_base_url` is set, local files otherwise
pub fn from_config(config: &Config) -> Arc<dyn DataSource> {
    match &config.data_base_url {
        Some(base_url) => Arc::new(RemoteCsvSource::new(base_url.clone())),
        None => Arc::new(LocalCsvSource::new(&config.data_dir)),
    }
}

/// Deserializes every record of a headed CSV document
pub fn parse_csv<T: DeserializeOwned, R: Read>(reader: R) -> AppResult<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Link, Movie, Rating, Tag};

    #[test]
    fn test_parse_ratings_ignores_timestamp() {
        let data = "userId,movieId,rating,timestamp\n1,1,4.0,964982703\n1,3,4.5,964981247\n";
        let ratings: Vec<Rating> = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(ratings, vec![Rating::new(1, 1, 4.0), Rating::new(1, 3, 4.5)]);
    }

    #[test]
    fn test_parse_movies_with_quoted_titles() {
        let data = "movieId,title,genres\n\
                    1,Toy Story (1995),Adventure|Animation\n\
                    11,\"American President, The (1995)\",Comedy|Drama|Romance\n";
        let movies: Vec<Movie> = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[1].title, "American President, The (1995)");
        assert_eq!(movies[1].genre_list(), vec!["Comedy", "Drama", "Romance"]);
    }

    #[test]
    fn test_parse_links_keeps_leading_zeros_and_empty_tmdb() {
        let data = "movieId,imdbId,tmdbId\n1,0114709,862\n791,0113610,\n";
        let links: Vec<Link> = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(links[0].imdb_id, "0114709");
        assert_eq!(links[0].tmdb_id, Some(862));
        assert_eq!(links[1].tmdb_id, None);
    }

    #[test]
    fn test_parse_tags() {
        let data = "userId,movieId,tag,timestamp\n2,60756,funny,1445714994\n";
        let tags: Vec<Tag> = parse_csv(data.as_bytes()).unwrap();
        assert_eq!(tags[0].tag, "funny");
        assert_eq!(tags[0].movie_id, 60756);
    }

    #[test]
    fn test_malformed_rating_is_an_error() {
        let data = "userId,movieId,rating\n1,1,not-a-number\n";
        let result: AppResult<Vec<Rating>> = parse_csv(data.as_bytes());
        assert!(matches!(result, Err(crate::error::AppError::Csv(_))));
    }

    #[test]
    fn test_from_config_selects_source() {
        let local = from_config(&Config::default());
        assert!(local.describe().contains("data"));

        let remote = from_config(&Config {
            data_base_url: Some("https://files.example.com/ml".to_string()),
            ..Config::default()
        });
        assert!(remote.describe().starts_with("https://files.example.com/ml"));
    }
}
