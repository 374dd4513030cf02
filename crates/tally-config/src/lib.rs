//! Configuration management for tally
//!
//! This module handles loading, validation, and management of
//! tally configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Where records are retrieved from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the expense backend
    #[serde(default = "default_backend_url")]
    pub url: String,
    /// Path of the expense listing endpoint
    #[serde(default = "default_backend_path")]
    pub path: String,
    /// Query parameters forwarded on every retrieval, uninterpreted
    #[serde(default)]
    pub query: BTreeMap<String, String>,
    /// Request timeout enforced by the HTTP transport
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Read records from this JSON file instead of the backend
    #[serde(default)]
    pub fixture: Option<PathBuf>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            path: default_backend_path(),
            query: BTreeMap::new(),
            timeout_secs: None,
            fixture: None,
        }
    }
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_backend_path() -> String {
    "/api/expenses/".to_string()
}

impl BackendConfig {
    /// Full URL of the listing endpoint
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Records per table page
    #[serde(default = "default_records_per_page")]
    pub records_per_page: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            records_per_page: default_records_per_page(),
        }
    }
}

fn default_records_per_page() -> usize {
    50
}

/// Record field used as the table sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Id,
    Date,
    Category,
    SubCategory,
    Item,
    PaymentMethod,
    Amount,
    Memo,
}

impl Default for SortKey {
    fn default() -> Self {
        SortKey::Date
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" => Ok(SortKey::Id),
            "date" | "spent_at" => Ok(SortKey::Date),
            "category" => Ok(SortKey::Category),
            "sub_category" | "subcategory" => Ok(SortKey::SubCategory),
            "item" => Ok(SortKey::Item),
            "payment_method" | "payment" => Ok(SortKey::PaymentMethod),
            "amount" => Ok(SortKey::Amount),
            "memo" => Ok(SortKey::Memo),
            _ => Err(format!("Invalid sort key: {}", s)),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::Id => write!(f, "id"),
            SortKey::Date => write!(f, "date"),
            SortKey::Category => write!(f, "category"),
            SortKey::SubCategory => write!(f, "sub_category"),
            SortKey::Item => write!(f, "item"),
            SortKey::PaymentMethod => write!(f, "payment_method"),
            SortKey::Amount => write!(f, "amount"),
            SortKey::Memo => write!(f, "memo"),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Desc
    }
}

impl SortDirection {
    /// The opposite direction
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(format!("Invalid sort direction: {}", s)),
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// Table defaults applied at session start
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ViewConfig {
    #[serde(default)]
    pub default_sort_key: SortKey,
    #[serde(default)]
    pub default_sort_direction: SortDirection,
}

/// Chart and visualization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Colors assigned to categories by rank, wrapping around
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    /// Number of top categories listed under the category chart
    #[serde(default = "default_top_items")]
    pub top_items_count: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            top_items_count: default_top_items(),
        }
    }
}

fn default_palette() -> Vec<String> {
    [
        "#c9a96e", "#7eb8b0", "#b07eb8", "#7eb87e", "#b87e7e",
        "#7e9eb8", "#b8a47e", "#8ab87e", "#b87eb0", "#7eb8a4",
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

fn default_top_items() -> usize {
    5
}

impl ChartConfig {
    /// Palette color for the `index`-th series, wrapping around
    pub fn color(&self, index: usize) -> Option<&str> {
        if self.palette.is_empty() {
            return None;
        }
        Some(self.palette[index % self.palette.len()].as_str())
    }
}

/// Currency display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Currency symbol
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Currency symbol position ("before" or "after")
    #[serde(default)]
    pub symbol_position: SymbolPosition,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            symbol_position: SymbolPosition::default(),
        }
    }
}

fn default_symbol() -> String {
    "원".to_string()
}

/// Currency symbol position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    Before,
    After,
}

impl Default for SymbolPosition {
    fn default() -> Self {
        SymbolPosition::After
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Record retrieval settings
    #[serde(default)]
    pub backend: BackendConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Table defaults
    #[serde(default)]
    pub view: ViewConfig,
    /// Chart settings
    #[serde(default)]
    pub charts: ChartConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }
        let content = std::fs::read_to_string(&path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.pagination.records_per_page == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.records_per_page".to_string(),
                reason: "Page size must be greater than 0".to_string(),
            });
        }

        if self.charts.palette.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "charts.palette".to_string(),
                reason: "At least one color is required".to_string(),
            });
        }

        if self.backend.url.trim().is_empty() && self.backend.fixture.is_none() {
            return Err(ConfigError::MissingField {
                field: "backend.url".to_string(),
            });
        }

        Ok(())
    }

    /// Replace the backend URL, e.g. from `BACKEND_URL`
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend.url = url.into();
        self
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }
}

// ==================== Tests ====================
