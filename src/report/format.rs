use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Fixed-point text with `dp` decimals, rounding half to even.
fn fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(dp);
    rounded.to_string()
}

/// Like `fixed`, with a comma between every three integer digits.
fn grouped(value: Decimal, dp: u32) -> String {
    let text = fixed(value, dp);
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut out = String::with_capacity(text.len() + int_part.len() / 3);
    out.push_str(sign);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// `63¢`, or empty when absent.
pub fn format_cents(cents: Option<Decimal>) -> String {
    cents
        .map(|c| format!("{}¢", fixed(c, 0)))
        .unwrap_or_default()
}

/// `$1,234.50`, or empty when absent.
pub fn format_money(value: Option<Decimal>) -> String {
    value
        .map(|v| format!("${}", grouped(v, 2)))
        .unwrap_or_default()
}

pub fn format_shares(size: Decimal) -> String {
    format!("{} shares", grouped(size, 1))
}

/// Renders a 0–1 ratio as `20.00%`, or empty when the ratio is too large
/// to express in percent.
pub fn format_percent(ratio: Decimal) -> String {
    percent_text(ratio).unwrap_or_default()
}

fn percent_text(ratio: Decimal) -> Option<String> {
    ratio
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|pct| format!("{}%", fixed(pct, 2)))
}

/// Whole dollars, e.g. `$1,235`.
pub fn format_whole_money(value: Decimal) -> String {
    format!("${}", grouped(value, 0))
}

/// Whole dollars with an explicit sign, e.g. `+$50` / `-$5`.
pub fn format_signed_whole_money(value: Decimal) -> String {
    let sign = if value >= Decimal::ZERO { '+' } else { '-' };
    format!("{sign}${}", grouped(value.abs(), 0))
}

// ---------------------------------------------------------------------------
// P&L line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PnlSign {
    Pos,
    Neg,
}

impl PnlSign {
    pub fn css_class(self) -> &'static str {
        match self {
            PnlSign::Pos => "pos",
            PnlSign::Neg => "neg",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PnlLine {
    pub text: String,
    pub sign: PnlSign,
}

/// Combine cash P&L and a 0–1 percent into one signed line.
///
/// The sign follows `cash` when present, otherwise `pct01`.
pub fn pnl_line(cash: Option<Decimal>, pct01: Option<Decimal>) -> Option<PnlLine> {
    // A ratio that cannot be shown as a percent counts as absent.
    let pct_text = pct01.and_then(percent_text);
    let pct01 = pct01.filter(|_| pct_text.is_some());
    if cash.is_none() && pct01.is_none() {
        return None;
    }

    let positive = match (cash, pct01) {
        (Some(c), _) => c >= Decimal::ZERO,
        (None, Some(p)) => p >= Decimal::ZERO,
        (None, None) => false,
    };

    let mut parts = Vec::with_capacity(2);
    if cash.is_some() {
        parts.push(format_money(cash));
    }
    if let Some(text) = pct_text {
        parts.push(format!("({text})"));
    }

    Some(PnlLine {
        text: parts.join(" "),
        sign: if positive { PnlSign::Pos } else { PnlSign::Neg },
    })
}

impl PnlLine {
    /// Styled span. The text holds only formatted numbers, so it needs no escaping.
    pub fn to_html(&self) -> String {
        format!(r#"<span class="pnl {}">{}</span>"#, self.sign.css_class(), self.text)
    }
}

/// The P&L line as a styled span, or empty when both inputs are absent.
pub fn format_pnl_line(cash: Option<Decimal>, pct01: Option<Decimal>) -> String {
    pnl_line(cash, pct01)
        .map(|line| line.to_html())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Some(Decimal::new(12345, 1))), "$1,234.50");
        assert_eq!(format_money(Some(Decimal::from(300))), "$300.00");
        assert_eq!(format_money(Some(Decimal::from(1_234_567))), "$1,234,567.00");
        assert_eq!(format_money(Some(Decimal::new(-5, 0))), "$-5.00");
        assert_eq!(format_money(None), "");
    }

    #[test]
    fn test_format_cents_rounds_half_even() {
        assert_eq!(format_cents(Some(Decimal::from(63))), "63¢");
        assert_eq!(format_cents(Some(Decimal::new(6349, 2))), "63¢");
        assert_eq!(format_cents(Some(Decimal::new(625, 1))), "62¢");
        assert_eq!(format_cents(Some(Decimal::new(635, 1))), "64¢");
        assert_eq!(format_cents(None), "");
    }

    #[test]
    fn test_format_shares_and_percent() {
        assert_eq!(format_shares(Decimal::new(12345, 1)), "1,234.5 shares");
        assert_eq!(format_shares(Decimal::from(10)), "10.0 shares");
        assert_eq!(format_percent(Decimal::new(20, 2)), "20.00%");
        assert_eq!(format_percent(Decimal::new(-16667, 5)), "-16.67%");
    }

    #[test]
    fn test_whole_money_summaries() {
        assert_eq!(format_whole_money(Decimal::new(12345, 1)), "$1,234");
        assert_eq!(format_whole_money(Decimal::ZERO), "$0");
        assert_eq!(format_signed_whole_money(Decimal::from(50)), "+$50");
        assert_eq!(format_signed_whole_money(Decimal::from(-5)), "-$5");
        assert_eq!(format_signed_whole_money(Decimal::ZERO), "+$0");
        assert_eq!(format_signed_whole_money(Decimal::from(12_000)), "+$12,000");
    }

    #[test]
    fn test_pnl_line_both_parts() {
        let line = pnl_line(Some(Decimal::from(50)), Some(Decimal::new(20, 2))).unwrap();
        assert_eq!(line.text, "$50.00 (20.00%)");
        assert_eq!(line.sign, PnlSign::Pos);
    }

    #[test]
    fn test_pnl_sign_follows_cash_first() {
        // Cash wins over a contradicting percent.
        let line = pnl_line(Some(Decimal::from(-5)), Some(Decimal::new(1, 1))).unwrap();
        assert_eq!(line.sign, PnlSign::Neg);

        let line = pnl_line(Some(Decimal::ZERO), None).unwrap();
        assert_eq!(line.sign, PnlSign::Pos);
        assert_eq!(line.text, "$0.00");
    }

    #[test]
    fn test_pnl_sign_falls_back_to_percent() {
        let line = pnl_line(None, Some(Decimal::new(-25, 2))).unwrap();
        assert_eq!(line.sign, PnlSign::Neg);
        assert_eq!(line.text, "(-25.00%)");

        let line = pnl_line(None, Some(Decimal::ZERO)).unwrap();
        assert_eq!(line.sign, PnlSign::Pos);
    }

    #[test]
    fn test_format_pnl_line_markup() {
        assert_eq!(
            format_pnl_line(Some(Decimal::from(-5)), None),
            r#"<span class="pnl neg">$-5.00</span>"#
        );
        assert_eq!(format_pnl_line(None, None), "");
    }

    #[test]
    fn test_unrepresentable_percent_is_dropped() {
        let huge = Decimal::from_scientific("1e27").unwrap();
        assert_eq!(format_percent(huge), "");

        let line = pnl_line(Some(Decimal::from(3)), Some(huge)).unwrap();
        assert_eq!(line.text, "$3.00");
        assert_eq!(pnl_line(None, Some(huge)), None);
    }
}
