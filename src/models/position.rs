use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::report::normalizer::parse_decimal;

/// One row of the Data API `/positions` payload.
///
/// Every field is optional and parsed leniently: a value of the wrong
/// shape becomes `None` instead of failing the whole record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    /// Older payloads carry the question here instead of `title`.
    #[serde(default, deserialize_with = "lenient_text")]
    pub market_question: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub market_slug: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub outcome: Option<String>,

    #[serde(default, deserialize_with = "lenient_decimal")]
    pub size: Option<Decimal>,
    /// Either a 0–1 fraction or cents, decided per column.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub avg_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub cur_price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub current_value: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub cash_pnl: Option<Decimal>,
    /// Either 0–1 or 0–100, decided per column.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub percent_pnl: Option<Decimal>,
}

impl PositionRecord {
    /// `title`, falling back to `marketQuestion`, then to empty.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.market_question.as_deref())
            .unwrap_or("")
    }

    /// Market slug, if present and not blank.
    pub fn slug(&self) -> Option<&str> {
        non_blank(self.market_slug.as_deref())
    }

    pub fn icon_url(&self) -> Option<&str> {
        non_blank(self.icon.as_deref())
    }

    pub fn side(&self) -> Option<&str> {
        non_blank(self.outcome.as_deref())
    }

    /// True when the position still holds positive value.
    pub fn is_open(&self) -> bool {
        self.current_value.is_some_and(|v| v > Decimal::ZERO)
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(parse_decimal))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
