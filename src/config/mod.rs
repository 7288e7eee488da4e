use std::env;
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_ADDRESS: &str = "0x22633134dc34f6c9a3bff51a0926c9d209714e26";
const DEFAULT_DATA_API_URL: &str = "https://data-api.polymarket.com";
const DEFAULT_REPORT_PATH: &str = "polymarket_positions.html";
const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;

/// Variables shown by `check-env`, in display order.
pub const CONFIG_VARS: &[&str] = &[
    "POLYMARKET_ADDRESS",
    "DATA_API_URL",
    "REPORT_PATH",
    "SMTP_SERVER",
    "SMTP_PORT",
    "USE_TLS",
    "GMAIL_EMAIL",
    "GMAIL_APP_PASSWORD",
    "SENDER_NAME",
    "RAILWAY_ENVIRONMENT",
    "LOG_FORMAT",
    "RUST_LOG",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

// ---------------------------------------------------------------------------
// Application config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub polymarket_address: String,
    pub data_api_url: String,
    pub report_path: PathBuf,
    /// Set by Railway deployments, where outbound SMTP is usually blocked.
    pub railway_environment: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            polymarket_address: lookup("POLYMARKET_ADDRESS")
                .unwrap_or_else(|| DEFAULT_ADDRESS.into()),
            data_api_url: lookup("DATA_API_URL").unwrap_or_else(|| DEFAULT_DATA_API_URL.into()),
            report_path: lookup("REPORT_PATH")
                .unwrap_or_else(|| DEFAULT_REPORT_PATH.into())
                .into(),
            railway_environment: lookup("RAILWAY_ENVIRONMENT").filter(|v| !v.is_empty()),
        }
    }

    pub fn is_railway(&self) -> bool {
        self.railway_environment.is_some()
    }
}

// ---------------------------------------------------------------------------
// SMTP config
// ---------------------------------------------------------------------------

/// Sender settings for report delivery. Loaded only when an email is
/// actually requested, so a broken SMTP setup never blocks report output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_email: String,
    /// Gmail app password, not the account password.
    pub sender_password: String,
    pub sender_name: Option<String>,
    pub use_tls: bool,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            smtp_server: DEFAULT_SMTP_SERVER.into(),
            smtp_port: DEFAULT_SMTP_PORT,
            sender_email: String::new(),
            sender_password: String::new(),
            sender_name: None,
            use_tls: true,
        }
    }
}

impl SmtpConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let smtp_port = match lookup("SMTP_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "SMTP_PORT",
                value: raw,
            })?,
            None => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            smtp_server: lookup("SMTP_SERVER").unwrap_or_else(|| DEFAULT_SMTP_SERVER.into()),
            smtp_port,
            sender_email: lookup("GMAIL_EMAIL").unwrap_or_default(),
            sender_password: lookup("GMAIL_APP_PASSWORD").unwrap_or_default(),
            sender_name: lookup("SENDER_NAME").filter(|v| !v.is_empty()),
            use_tls: lookup("USE_TLS")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(true),
        })
    }

    /// Both credentials must be present before anything is sent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sender_email.is_empty() {
            return Err(ConfigError::Missing("GMAIL_EMAIL"));
        }
        if self.sender_password.is_empty() {
            return Err(ConfigError::Missing("GMAIL_APP_PASSWORD"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Masked environment report
// ---------------------------------------------------------------------------

/// One `NAME=value` line per known variable, with secrets hidden.
pub fn describe_env<F>(lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    CONFIG_VARS
        .iter()
        .map(|&name| match lookup(name) {
            Some(value) => format!("{name}={}", mask_value(name, &value)),
            None => format!("{name} is not set"),
        })
        .collect()
}

fn mask_value(name: &str, value: &str) -> String {
    let upper = name.to_uppercase();
    if upper.contains("PASSWORD") || upper.contains("SECRET") || upper.contains("KEY") {
        return "*".repeat(value.chars().count());
    }
    if name == "GMAIL_EMAIL" {
        if let Some((local, domain)) = value.split_once('@') {
            let head: String = local.chars().take(3).collect();
            return format!("{head}...@{domain}");
        }
        return value.to_string();
    }
    if value.chars().count() > 50 {
        let head: String = value.chars().take(50).collect();
        return format!("{head}...");
    }
    value.to_string()
}
