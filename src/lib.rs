pub mod config;
pub mod errors;
pub mod models;
pub mod polymarket;
pub mod report;
pub mod services;

pub use config::{AppConfig, SmtpConfig};
pub use errors::AppError;
pub use models::PositionRecord;
pub use report::{build_report, render_html, Report, ReportRow, ReportSummary};
