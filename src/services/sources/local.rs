use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use super::{parse_csv, DataSource, LINKS_FILE, MOVIES_FILE, RATINGS_FILE, TAGS_FILE};
use crate::{
    error::{AppError, AppResult},
    models::{Dataset, Link, Movie, Rating, Tag},
};

/// Reads the CSV files from a directory on disk
#[derive(Debug, Clone)]
pub struct LocalCsvSource {
    dir: PathBuf,
}

impl LocalCsvSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    async fn read_required<T: DeserializeOwned>(&self, file: &str) -> AppResult<Vec<T>> {
        let path = self.dir.join(file);
        let bytes = tokio::fs::read(&path).await.map_err(|source| AppError::Io {
            path: path.display().to_string(),
            source,
        })?;
        parse_csv(bytes.as_slice())
    }

    /// `None` when the file does not exist
    async fn read_optional<T: DeserializeOwned>(&self, file: &str) -> AppResult<Option<Vec<T>>> {
        let path = self.dir.join(file);
        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|source| AppError::Io {
                path: path.display().to_string(),
                source,
            })?;
        if !exists {
            tracing::debug!(file, dir = %self.dir.display(), "Optional file not present");
            return Ok(None);
        }
        self.read_required(file).await.map(Some)
    }
}

#[async_trait::async_trait]
impl DataSource for LocalCsvSource {
    async fn load(&self) -> AppResult<Dataset> {
        let ratings = self.read_required::<Rating>(RATINGS_FILE).await?;
        let movies = self.read_required::<Movie>(MOVIES_FILE).await?;
        let links = self.read_optional::<Link>(LINKS_FILE).await?;
        let tags = self.read_optional::<Tag>(TAGS_FILE).await?;

        tracing::info!(
            source = %self.describe(),
            ratings = ratings.len(),
            movies = movies.len(),
            links = links.as_ref().map(Vec::len),
            tags = tags.as_ref().map(Vec::len),
            "Loaded dataset"
        );

        Ok(Dataset {
            ratings,
            movies,
            links,
            tags,
        })
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}
