//! Catalog server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Catalog server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Maximum pooled PostgreSQL connections
    pub database_max_connections: u32,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Search index base URL (Elasticsearch-compatible)
    pub search_url: String,
    /// Index holding good documents
    pub search_index: String,
    /// Request timeout for the search index, seconds
    pub search_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, BoxError> {
        Ok(Self {
            database_url: var("DATABASE_URL")
                .filter(|s| !s.is_empty())
                .ok_or("DATABASE_URL must be set")?,
            database_max_connections: var("DATABASE_MAX_CONNECTIONS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            http_port: var("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            search_url: var("SEARCH_URL").unwrap_or_else(|| "http://localhost:9200".into()),
            search_index: var("SEARCH_INDEX").unwrap_or_else(|| "goods".into()),
            search_timeout_secs: var("SEARCH_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        })
    }
}
