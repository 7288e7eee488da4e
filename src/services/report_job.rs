use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::config::{ConfigError, SmtpConfig};
use crate::errors::AppError;
use crate::models::PositionRecord;
use crate::polymarket::DataClient;
use crate::report::{build_report, render_html, Report};
use crate::services::mailer::{Mailer, OutgoingEmail};

pub const EMAIL_TEXT_FALLBACK: &str =
    "Please view this email in HTML format for the best experience.";

/// Result of a full run. The report file exists whatever `email_sent` says.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub path: PathBuf,
    pub report: Report,
    pub html: String,
    /// `None` when no delivery was requested.
    pub email_sent: Option<bool>,
}

/// Where the report should go besides disk.
#[derive(Debug, Clone)]
pub struct DeliveryRequest {
    pub recipients: Vec<String>,
    pub railway: bool,
}

pub fn email_subject(address: &str) -> String {
    let short: String = address.chars().take(8).collect();
    format!("Polymarket Positions Report - {short}...")
}

/// The report email: HTML body with a plain-text fallback, sent to every
/// requested recipient.
pub fn report_email(html: &str, address: &str, delivery: &DeliveryRequest) -> OutgoingEmail {
    OutgoingEmail {
        to: delivery.recipients.clone(),
        subject: email_subject(address),
        ..Default::default()
    }
    .with_html(html)
    .with_text(EMAIL_TEXT_FALLBACK)
}

/// Build, render and write the report for already-fetched records.
pub async fn write_report(
    records: &[PositionRecord],
    path: &Path,
    generated_at: NaiveDateTime,
) -> Result<(Report, String), AppError> {
    let report = build_report(records);

    let original = records.len();
    let kept = report.summary.count;
    if kept < original {
        tracing::info!(
            original,
            kept,
            removed = original - kept,
            "Filtering: {original} positions → {kept} positions (removed {} with zero value)",
            original - kept
        );
    }

    let html = render_html(&report, generated_at);
    tokio::fs::write(path, &html)
        .await
        .map_err(|e| AppError::write(path, e))?;

    tracing::info!(path = %path.display(), rows = kept, "HTML report saved");
    Ok((report, html))
}

/// Dump the row/summary model as JSON for external templating.
pub async fn write_report_json(report: &Report, path: &Path) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(report)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| AppError::write(path, e))?;
    tracing::info!(path = %path.display(), "Report model saved");
    Ok(())
}

/// Fetch positions for `address` and write the report to `path`.
pub async fn generate_report(
    client: &DataClient,
    address: &str,
    path: &Path,
) -> Result<(Report, String), AppError> {
    tracing::info!(address, "Generating report");
    let records = client.get_positions(address).await?;
    tracing::info!(count = records.len(), "Fetched positions");

    write_report(&records, path, Local::now().naive_local()).await
}

/// Email an already-rendered report. Never fails the run: configuration
/// and delivery problems come back as `false`.
pub async fn send_report(
    html: &str,
    address: &str,
    delivery: &DeliveryRequest,
    smtp: Result<SmtpConfig, ConfigError>,
) -> bool {
    let mailer = match smtp.and_then(|config| Mailer::new(config, delivery.railway)) {
        Ok(mailer) => mailer,
        Err(e) => {
            tracing::warn!(error = %e, "Email configuration error");
            tracing::warn!("HTML report was generated but email was not sent");
            return false;
        }
    };

    let email = report_email(html, address, delivery);

    let sent = mailer.deliver(&email).await;
    if sent {
        tracing::info!(recipients = %delivery.recipients.join(", "), "Report emailed");
    }
    sent
}

/// Fetch, render, write, then optionally email. Only fetch and write
/// failures are errors.
pub async fn create_and_send_report(
    client: &DataClient,
    address: &str,
    path: &Path,
    delivery: Option<&DeliveryRequest>,
) -> Result<ReportOutcome, AppError> {
    let (report, html) = generate_report(client, address, path).await?;

    let email_sent = match delivery {
        Some(delivery) => Some(send_report(&html, address, delivery, SmtpConfig::from_env()).await),
        None => None,
    };

    Ok(ReportOutcome {
        path: path.to_path_buf(),
        report,
        html,
        email_sent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_subject_truncates_address() {
        assert_eq!(
            email_subject("0x22633134dc34f6c9a3bff51a0926c9d209714e26"),
            "Polymarket Positions Report - 0x226331..."
        );
        assert_eq!(email_subject("0x1"), "Polymarket Positions Report - 0x1...");
    }

    #[tokio::test]
    async fn test_send_report_with_missing_credentials_returns_false() {
        let delivery = DeliveryRequest {
            recipients: vec!["you@example.com".into()],
            railway: false,
        };
        let sent = send_report("<html></html>", "0xabc", &delivery, Ok(SmtpConfig::default())).await;
        assert!(!sent);
    }

    #[tokio::test]
    async fn test_send_report_with_bad_config_returns_false() {
        let delivery = DeliveryRequest {
            recipients: vec!["you@example.com".into()],
            railway: true,
        };
        let smtp = Err(ConfigError::Invalid {
            name: "SMTP_PORT",
            value: "x".into(),
        });
        assert!(!send_report("<html></html>", "0xabc", &delivery, smtp).await);
    }

    #[test]
    fn test_report_email_goes_to_every_recipient() {
        let delivery = DeliveryRequest {
            recipients: vec!["a@example.com".into(), "b@example.com".into()],
            railway: false,
        };
        let email = report_email("<p>hi</p>", "0x22633134dc", &delivery);

        assert_eq!(email.all_recipients(), vec!["a@example.com", "b@example.com"]);
        assert_eq!(email.subject, "Polymarket Positions Report - 0x226331...");
        assert_eq!(email.html.as_deref(), Some("<p>hi</p>"));
        assert_eq!(email.text.as_deref(), Some(EMAIL_TEXT_FALLBACK));
    }
}
