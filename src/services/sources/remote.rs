use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

use super::{parse_csv, DataSource, LINKS_FILE, MOVIES_FILE, RATINGS_FILE, TAGS_FILE};
use crate::{
    error::{AppError, AppResult},
    models::{Dataset, Link, Movie, Rating, Tag},
};

/// Fetches the CSV files over HTTP from `{base_url}/{file}`
#[derive(Debug, Clone)]
pub struct RemoteCsvSource {
    http_client: HttpClient,
    base_url: String,
}

impl RemoteCsvSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn file_url(&self, file: &str) -> String {
        format!("{}/{}", self.base_url, file)
    }

    /// Downloads a file as text; `Ok(None)` on a 404
    async fn fetch(&self, file: &str) -> AppResult<Option<String>> {
        let url = self.file_url(file);
        let response = self.http_client.get(&url).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "{} returned status {}: {}",
                url, status, body
            )));
        }

        Ok(Some(response.text().await?))
    }

    async fn fetch_required<T: DeserializeOwned>(&self, file: &str) -> AppResult<Vec<T>> {
        match self.fetch(file).await? {
            Some(body) => parse_csv(body.as_bytes()),
            None => Err(AppError::ExternalApi(format!(
                "{} returned status {}",
                self.file_url(file),
                StatusCode::NOT_FOUND
            ))),
        }
    }

    /// Failures on optional tables are logged and treated as absent
    async fn fetch_optional<T: DeserializeOwned>(&self, file: &str) -> Option<Vec<T>> {
        let body = match self.fetch(file).await {
            Ok(Some(body)) => body,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(file, error = %e, "Skipping unavailable optional table");
                return None;
            }
        };

        match parse_csv(body.as_bytes()) {
            Ok(records) => Some(records),
            Err(e) => {
                tracing::warn!(file, error = %e, "Skipping unparseable optional table");
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl DataSource for RemoteCsvSource {
    async fn load(&self) -> AppResult<Dataset> {
        let (ratings, movies, links, tags) = tokio::join!(
            self.fetch_required::<Rating>(RATINGS_FILE),
            self.fetch_required::<Movie>(MOVIES_FILE),
            self.fetch_optional::<Link>(LINKS_FILE),
            self.fetch_optional::<Tag>(TAGS_FILE),
        );
        let ratings = ratings?;
        let movies = movies?;

        tracing::info!(
            source = %self.base_url,
            ratings = ratings.len(),
            movies = movies.len(),
            links = links.as_ref().map(Vec::len),
            tags = tags.as_ref().map(Vec::len),
            "Fetched dataset"
        );

        Ok(Dataset {
            ratings,
            movies,
            links,
            tags,
        })
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
