use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::PositionRecord;

use super::format::{format_cents, format_money, format_shares, pnl_line, PnlLine};
use super::normalizer::{normalize_cents, normalize_percent};

const MARKET_URL_BASE: &str = "https://polymarket.com/market";

/// A visual separator goes before every row at an index divisible by this.
pub const SEPARATOR_EVERY: usize = 5;

// ---------------------------------------------------------------------------
// Side chip
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChipKind {
    Yes,
    No,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideChip {
    /// Outcome text as it appeared in the payload.
    pub label: String,
    pub kind: ChipKind,
}

impl SideChip {
    pub fn from_outcome(outcome: &str) -> Self {
        let kind = match outcome.to_lowercase().as_str() {
            "yes" => ChipKind::Yes,
            "no" => ChipKind::No,
            _ => ChipKind::Neutral,
        };
        Self {
            label: outcome.to_string(),
            kind,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self.kind {
            ChipKind::Yes => "chip chip-yes",
            ChipKind::No => "chip chip-no",
            ChipKind::Neutral => "chip",
        }
    }
}

// ---------------------------------------------------------------------------
// Report model
// ---------------------------------------------------------------------------

/// Display-ready projection of one position. Plain text only; markup and
/// escaping belong to the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub title: String,
    pub market_url: Option<String>,
    pub icon: Option<String>,
    pub chip: Option<SideChip>,
    /// e.g. `120.5 shares at 63¢`
    pub position_line: Option<String>,
    pub avg: String,
    pub current: String,
    pub value: String,
    pub pnl: Option<PnlLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub count: usize,
    pub total_value: Decimal,
    pub total_pnl: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub summary: ReportSummary,
}

/// One line of the serialized table body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEntry<'a> {
    Separator,
    Row(&'a ReportRow),
}

pub fn needs_separator(index: usize) -> bool {
    index > 0 && index % SEPARATOR_EVERY == 0
}

impl Report {
    /// Rows in order, with a separator before every fifth one.
    pub fn table_entries(&self) -> Vec<TableEntry<'_>> {
        let mut entries = Vec::with_capacity(self.rows.len() + self.rows.len() / SEPARATOR_EVERY);
        for (i, row) in self.rows.iter().enumerate() {
            if needs_separator(i) {
                entries.push(TableEntry::Separator);
            }
            entries.push(TableEntry::Row(row));
        }
        entries
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Keep open positions, order them by value (largest first, ties in input
/// order), resolve price/percent units over the kept rows, and project.
pub fn build_report(records: &[PositionRecord]) -> Report {
    let mut kept: Vec<&PositionRecord> = records.iter().filter(|r| r.is_open()).collect();
    kept.sort_by(|a, b| b.current_value.cmp(&a.current_value));

    let avg_cents = normalize_cents(&column(&kept, |r| r.avg_price));
    let cur_cents = normalize_cents(&column(&kept, |r| r.cur_price));
    let pct01 = normalize_percent(&column(&kept, |r| r.percent_pnl));

    let rows = kept
        .iter()
        .enumerate()
        .map(|(i, record)| project_row(record, avg_cents[i], cur_cents[i], pct01[i]))
        .collect();

    let summary = ReportSummary {
        count: kept.len(),
        total_value: saturating_sum(kept.iter().filter_map(|r| r.current_value)),
        total_pnl: saturating_sum(kept.iter().filter_map(|r| r.cash_pnl)),
    };

    Report { rows, summary }
}

/// Totals clamp at the `Decimal` range instead of overflowing.
fn saturating_sum(values: impl Iterator<Item = Decimal>) -> Decimal {
    values.fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}

fn column<F>(records: &[&PositionRecord], field: F) -> Vec<Option<Decimal>>
where
    F: Fn(&PositionRecord) -> Option<Decimal>,
{
    records.iter().map(|&r| field(r)).collect()
}

fn project_row(
    record: &PositionRecord,
    avg_cents: Option<Decimal>,
    cur_cents: Option<Decimal>,
    pct01: Option<Decimal>,
) -> ReportRow {
    ReportRow {
        title: record.display_title().to_string(),
        market_url: record.slug().map(|slug| format!("{MARKET_URL_BASE}/{slug}")),
        icon: record.icon_url().map(str::to_string),
        chip: record.side().map(SideChip::from_outcome),
        position_line: position_line(record.size, avg_cents),
        avg: format_cents(avg_cents),
        current: format_cents(cur_cents),
        value: format_money(record.current_value),
        pnl: pnl_line(record.cash_pnl, pct01),
    }
}

fn position_line(size: Option<Decimal>, avg_cents: Option<Decimal>) -> Option<String> {
    let mut bits = Vec::with_capacity(2);
    if let Some(size) = size {
        bits.push(format_shares(size));
    }
    if avg_cents.is_some() {
        bits.push(format!("at {}", format_cents(avg_cents)));
    }

    if bits.is_empty() {
        None
    } else {
        Some(bits.join(" "))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
