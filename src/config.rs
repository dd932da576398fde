use serde::Deserialize;

use crate::engine::BuildLimits;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding ratings.csv, movies.csv and the optional
    /// links.csv / tags.csv
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// When set, the CSV files are fetched from `{data_base_url}/{file}`
    /// instead of `data_dir`
    #[serde(default)]
    pub data_base_url: Option<String>,

    /// Upper bound on users x movies and users x users accepted by a rebuild
    #[serde(default = "default_max_matrix_cells")]
    pub max_matrix_cells: usize,

    /// Number of recommendations returned when the request does not say
    #[serde(default = "default_recommendations")]
    pub default_recommendations: usize,

    /// Largest number of recommendations a single request may ask for
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_max_matrix_cells() -> usize {
    BuildLimits::default().max_matrix_cells
}

fn default_recommendations() -> usize {
    5
}

fn default_max_recommendations() -> usize {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            data_base_url: None,
            max_matrix_cells: default_max_matrix_cells(),
            default_recommendations: default_recommendations(),
            max_recommendations: default_max_recommendations(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.max_recommendations == 0 {
            anyhow::bail!("MAX_RECOMMENDATIONS must be at least 1");
        }
        if !(1..=self.max_recommendations).contains(&self.default_recommendations) {
            anyhow::bail!(
                "DEFAULT_RECOMMENDATIONS must be between 1 and {}",
                self.max_recommendations
            );
        }
        Ok(())
    }

    pub fn build_limits(&self) -> BuildLimits {
        BuildLimits {
            max_matrix_cells: self.max_matrix_cells,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_environment() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.data_dir, "data");
        assert_eq!(config.data_base_url, None);
        assert_eq!(config.default_recommendations, 5);
        assert_eq!(config.max_recommendations, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let vars = vec![
            ("PORT".to_string(), "8080".to_string()),
            (
                "DATA_BASE_URL".to_string(),
                "https://files.example.com/ml-latest-small".to_string(),
            ),
            ("MAX_MATRIX_CELLS".to_string(), "1000".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(
            config.data_base_url.as_deref(),
            Some("https://files.example.com/ml-latest-small")
        );
        assert_eq!(config.build_limits().max_matrix_cells, 1000);
    }

    #[test]
    fn test_default_must_fit_max() {
        let config = Config {
            default_recommendations: 30,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
