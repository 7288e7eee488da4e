use reqwest::{Client, Url};
use serde_json::Value;
use thiserror::Error;

use crate::models::PositionRecord;

const DATA_API_BASE: &str = "https://data-api.polymarket.com";
const USER_AGENT: &str = "polymarket-scraper/1.0";

#[derive(Debug, Error)]
pub enum DataClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

#[derive(Debug, Clone)]
pub struct DataClient {
    http: Client,
    base_url: String,
}

impl DataClient {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, DATA_API_BASE)
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// HTTP client with the User-Agent the Data API expects from scrapers.
    pub fn default_http() -> Result<Client, DataClientError> {
        Ok(Client::builder().user_agent(USER_AGENT).build()?)
    }

    pub fn positions_url(&self, user: &str) -> Result<Url, DataClientError> {
        Url::parse_with_params(&format!("{}/positions", self.base_url), &[("user", user)])
            .map_err(|e| DataClientError::Unexpected(format!("bad Data API URL: {e}")))
    }

    /// Fetch current positions for a wallet address.
    pub async fn get_positions(&self, user: &str) -> Result<Vec<PositionRecord>, DataClientError> {
        let url = self.positions_url(user)?;
        let body: Value = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_positions(body)
    }
}

/// Turn a `/positions` body into records. The body must be an array;
/// entries that are not objects are skipped.
pub fn parse_positions(body: Value) -> Result<Vec<PositionRecord>, DataClientError> {
    let items = match body {
        Value::Array(items) => items,
        other => {
            return Err(DataClientError::Unexpected(format!(
                "expected a JSON array of positions, got {}",
                json_kind(&other)
            )))
        }
    };

    let total = items.len();
    let records: Vec<PositionRecord> = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(index = i, error = %e, "Skipping unreadable position entry");
                None
            }
        })
        .collect();

    tracing::debug!(total, parsed = records.len(), "Parsed positions payload");
    Ok(records)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn test_positions_url() {
        let client = DataClient::new(Client::new());
        let url = client.positions_url("0xABC").unwrap();
        assert_eq!(
            url.as_str(),
            "https://data-api.polymarket.com/positions?user=0xABC"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = DataClient::with_base_url(Client::new(), "http://localhost:9000/");
        let url = client.positions_url("0x1").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/positions?user=0x1");
    }

    #[test]
    fn test_parse_positions_array() {
        let body = json!([
            {"title": "A", "currentValue": 10, "avgPrice": 0.5},
            {"marketQuestion": "B", "currentValue": "0"}
        ]);
        let records = parse_positions(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].current_value, Some(Decimal::from(10)));
        assert_eq!(records[1].display_title(), "B");
    }

    #[test]
    fn test_parse_positions_skips_non_objects() {
        let body = json!([{"title": "A"}, 42, "junk"]);
        let records = parse_positions(body).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_positions_rejects_non_array() {
        let err = parse_positions(json!({"error": "rate limited"})).unwrap_err();
        assert!(matches!(err, DataClientError::Unexpected(msg) if msg.contains("an object")));
    }

    #[test]
    fn test_parse_positions_empty() {
        assert!(parse_positions(json!([])).unwrap().is_empty());
    }
}
