//! Report server settings, read once at startup from a YAML file
//!
//! Every section is optional; missing keys fall back to the defaults in
//! `templates/default_config.yaml`.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

/// Where the report server listens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
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

/// Accounting backend connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL every endpoint path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token sent with every request
    #[serde(default)]
    pub auth_token: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_token: None,
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000/api/v1".to_string()
}

/// Report layout enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Every group and ledger
    Detailed,
    /// Group subtotals only
    Grouped,
    /// Top-level totals only
    Condensed,
}

impl Default for ReportFormat {
    fn default() -> Self {
        ReportFormat::Detailed
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "detailed" => Ok(ReportFormat::Detailed),
            "grouped" => Ok(ReportFormat::Grouped),
            "condensed" => Ok(ReportFormat::Condensed),
            _ => Err(format!("Invalid report format: {}", s)),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Detailed => write!(f, "detailed"),
            ReportFormat::Grouped => write!(f, "grouped"),
            ReportFormat::Condensed => write!(f, "condensed"),
        }
    }
}

/// Report display defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Layout used when the request does not name one
    #[serde(default)]
    pub default_format: ReportFormat,
    /// Show the previous-year comparison column
    #[serde(default = "default_true")]
    pub show_previous_year: bool,
    /// Show groups and ledgers whose balances are all zero
    #[serde(default = "default_false")]
    pub show_zero_balances: bool,
    /// Expand every group when a report is first rendered
    #[serde(default = "default_true")]
    pub expand_all: bool,
    /// Initial trial balance tree state
    #[serde(default = "default_true")]
    pub trial_balance_expanded: bool,
    /// Indent per tree level, in pixels
    #[serde(default = "default_indent_px")]
    pub indent_px: u32,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            default_format: ReportFormat::Detailed,
            show_previous_year: true,
            show_zero_balances: false,
            expand_all: true,
            trial_balance_expanded: true,
            indent_px: default_indent_px(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

fn default_indent_px() -> u32 {
    20
}

/// How money amounts are printed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// ISO currency code
    #[serde(default = "default_currency")]
    pub code: String,
    /// Symbol printed before money amounts (may be empty)
    #[serde(default)]
    pub symbol: String,
    /// Amounts are rounded half away from zero to this many places
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    /// Inserted every three integer digits
    #[serde(default = "default_thousands_sep")]
    pub thousands_separator: String,
    #[serde(default = "default_decimal_sep")]
    pub decimal_separator: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            code: default_currency(),
            symbol: String::new(),
            decimal_places: default_decimal_places(),
            thousands_separator: default_thousands_sep(),
            decimal_separator: default_decimal_sep(),
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

fn default_thousands_sep() -> String {
    ",".to_string()
}

fn default_decimal_sep() -> String {
    ".".to_string()
}

/// Date display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatesConfig {
    /// chrono format pattern for displayed dates
    #[serde(default = "default_display_format")]
    pub display_format: String,
}

impl Default for DatesConfig {
    fn default() -> Self {
        Self {
            display_format: default_display_format(),
        }
    }
}

fn default_display_format() -> String {
    "%d %b %Y".to_string()
}

/// Default `env_logger` filter; `RUST_LOG` wins when set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
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

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
    #[serde(default)]
    pub currency: CurrencyConfig,
    #[serde(default)]
    pub dates: DatesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Read, parse and validate `path`
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Unreadable {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        let config = Self::from_yaml(&content)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::InvalidYaml { message: e.to_string() })?;

        config.validate()?;

        Ok(config)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Use a non-zero port".to_string(),
            });
        }

        // The backend client speaks plain HTTP only
        if !self.backend.base_url.starts_with("http://") {
            return Err(ConfigError::UnsupportedBackend {
                url: self.backend.base_url.clone(),
            });
        }

        if self.reports.indent_px == 0 || self.reports.indent_px > 64 {
            return Err(ConfigError::InvalidValue {
                field: "reports.indent_px".to_string(),
                reason: "Indent must be between 1 and 64 pixels".to_string(),
            });
        }

        if self.currency.decimal_places > 6 {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 6".to_string(),
            });
        }

        if self.currency.decimal_separator.is_empty() {
            return Err(ConfigError::MissingField {
                field: "currency.decimal_separator".to_string(),
            });
        }

        if self.dates.display_format.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "dates.display_format".to_string(),
            });
        }

        Ok(())
    }

    /// Commented template printed by `--print-default-config`
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Base URL without a trailing slash
    pub fn backend_base(&self) -> &str {
        self.backend.base_url.trim_end_matches('/')
    }
}
