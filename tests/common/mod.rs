use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use polyreport::models::PositionRecord;
use polyreport::polymarket::data_client::parse_positions;

/// Fixed render time so documents compare byte for byte.
#[allow(dead_code)]
pub fn fixed_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 1, 15)
        .expect("valid date")
        .and_hms_opt(9, 30, 0)
        .expect("valid time")
}

/// Parse a Data API style payload into records.
#[allow(dead_code)]
pub fn records_from(body: Value) -> Vec<PositionRecord> {
    parse_positions(body).expect("payload should be an array")
}

/// A realistic `/positions` payload: mixed units, one closed position,
/// one entry with malformed numbers.
#[allow(dead_code)]
pub fn sample_payload() -> Value {
    serde_json::json!([
        {
            "title": "Will the Fed cut rates in March?",
            "marketSlug": "fed-cut-march",
            "icon": "https://polymarket-upload.s3.amazonaws.com/fed.png",
            "outcome": "Yes",
            "size": 1250.5,
            "avgPrice": 0.42,
            "curPrice": 0.55,
            "currentValue": 687.78,
            "cashPnl": 162.56,
            "percentPnl": 30.95
        },
        {
            "title": "Bitcoin above 120k on Friday?",
            "marketSlug": "btc-120k-friday",
            "outcome": "No",
            "size": "300",
            "avgPrice": "0.80",
            "curPrice": 0.91,
            "currentValue": "273",
            "cashPnl": 33,
            "percentPnl": 13.75
        },
        {
            "title": "Closed market",
            "outcome": "Yes",
            "size": 10,
            "avgPrice": 0.99,
            "curPrice": 0,
            "currentValue": 0,
            "cashPnl": -9.9,
            "percentPnl": -100
        },
        {
            "marketQuestion": "ETH up or down today?",
            "outcome": "Down",
            "size": "n/a",
            "avgPrice": null,
            "curPrice": "garbage",
            "currentValue": 12.5,
            "cashPnl": null,
            "percentPnl": -4
        }
    ])
}
