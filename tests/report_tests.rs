mod common;

use rust_decimal::Decimal;
use serde_json::json;

use polyreport::report::{build_report, render_html, ChipKind, PnlSign, TableEntry};
use polyreport::services::report_job::{write_report, write_report_json};

#[test]
fn test_sample_payload_end_to_end() {
    let records = common::records_from(common::sample_payload());
    assert_eq!(records.len(), 4);

    let report = build_report(&records);
    assert_eq!(report.summary.count, 3);
    assert_eq!(report.summary.total_value, Decimal::new(97328, 2)); // 687.78 + 273 + 12.5
    assert_eq!(report.summary.total_pnl, Decimal::new(19556, 2)); // 162.56 + 33, absent counts 0

    let titles: Vec<&str> = report.rows.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Will the Fed cut rates in March?",
            "Bitcoin above 120k on Friday?",
            "ETH up or down today?",
        ]
    );

    let fed = &report.rows[0];
    assert_eq!(fed.avg, "42¢");
    assert_eq!(fed.current, "55¢");
    assert_eq!(fed.value, "$687.78");
    assert_eq!(fed.position_line.as_deref(), Some("1,250.5 shares at 42¢"));
    let pnl = fed.pnl.as_ref().unwrap();
    assert_eq!(pnl.text, "$162.56 (30.95%)");
    assert_eq!(pnl.sign, PnlSign::Pos);

    let btc = &report.rows[1];
    assert_eq!(btc.chip.as_ref().map(|c| c.kind), Some(ChipKind::No));
    assert_eq!(btc.avg, "80¢");
    assert_eq!(btc.current, "91¢");

    // Malformed numbers render blank; percent-only P&L takes its sign.
    let eth = &report.rows[2];
    assert_eq!(eth.market_url, None);
    assert_eq!(eth.chip.as_ref().map(|c| c.kind), Some(ChipKind::Neutral));
    assert_eq!(eth.position_line, None);
    assert_eq!(eth.avg, "");
    assert_eq!(eth.current, "");
    let pnl = eth.pnl.as_ref().unwrap();
    assert_eq!(pnl.text, "(-4.00%)");
    assert_eq!(pnl.sign, PnlSign::Neg);
}

#[test]
fn test_two_record_scenario() {
    let records = common::records_from(json!([
        {"title": "Dropped", "currentValue": 0, "cashPnl": 5},
        {"title": "Kept", "currentValue": 300, "cashPnl": 50, "percentPnl": 0.20}
    ]));
    let report = build_report(&records);

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.summary.count, 1);
    assert_eq!(report.summary.total_value, Decimal::from(300));
    assert_eq!(report.summary.total_pnl, Decimal::from(50));
    assert_eq!(report.rows[0].pnl.as_ref().unwrap().text, "$50.00 (20.00%)");

    let html = render_html(&report, common::fixed_time());
    assert!(html.contains("<div class=\"stat-value\">1</div>"));
    assert!(html.contains("<div class=\"stat-value\">$300</div>"));
    assert!(html.contains("+$50"));
    assert!(!html.contains("Dropped"));
}

#[test]
fn test_cents_already_in_cents_pass_through() {
    let records = common::records_from(json!([
        {"title": "a", "currentValue": 3, "avgPrice": 63, "curPrice": 70},
        {"title": "b", "currentValue": 2, "avgPrice": 80, "curPrice": 81},
        {"title": "c", "currentValue": 1, "avgPrice": 45, "curPrice": 40}
    ]));
    let avgs: Vec<String> = build_report(&records).rows.into_iter().map(|r| r.avg).collect();
    assert_eq!(avgs, vec!["63¢", "80¢", "45¢"]);
}

#[test]
fn test_separators_for_twelve_rows() {
    let payload: Vec<_> = (0..12)
        .map(|i| json!({"title": format!("m{i}"), "currentValue": 1000 - i}))
        .collect();
    let report = build_report(&common::records_from(json!(payload)));

    let separator_slots: Vec<usize> = report
        .table_entries()
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e, TableEntry::Separator))
        .map(|(slot, _)| slot)
        .collect();
    // Slot 5 precedes row 5; slot 11 precedes row 10.
    assert_eq!(separator_slots, vec![5, 11]);

    let html = render_html(&report, common::fixed_time());
    assert_eq!(html.matches("separator-row").count(), 2 + 1); // two rows + the CSS rule
}

#[test]
fn test_empty_payload_still_renders() {
    let report = build_report(&common::records_from(json!([])));
    let html = render_html(&report, common::fixed_time());

    assert!(html.contains("<div class=\"stat-value\">0</div>"));
    assert!(html.contains("<div class=\"stat-value\">$0</div>"));
    assert!(html.contains("+$0"));
    assert!(html.contains("<tbody>\n            </tbody>"));
}

#[test]
fn test_rendering_twice_is_byte_identical() {
    let records = common::records_from(common::sample_payload());
    let first = render_html(&build_report(&records), common::fixed_time());
    let second = render_html(&build_report(&records), common::fixed_time());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_write_report_creates_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("positions.html");
    let records = common::records_from(common::sample_payload());

    let (report, html) = write_report(&records, &path, common::fixed_time())
        .await
        .expect("report should be written");

    let on_disk = tokio::fs::read_to_string(&path).await.unwrap();
    assert_eq!(on_disk, html);
    assert_eq!(report.summary.count, 3);
    assert!(on_disk.contains("Generated on January 15, 2026 at 09:30 AM"));
}

#[tokio::test]
async fn test_write_report_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("positions.html");

    let err = write_report(&[], &path, common::fixed_time()).await.unwrap_err();
    assert!(err.to_string().contains("positions.html"));
}

#[tokio::test]
async fn test_write_report_json_model() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    let report = build_report(&common::records_from(common::sample_payload()));

    write_report_json(&report, &path).await.unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
    assert_eq!(value["summary"]["count"], 3);
    assert_eq!(value["rows"][0]["avg"], "42¢");
    assert_eq!(value["rows"][0]["chip"]["kind"], "yes");
    assert_eq!(value["rows"][0]["pnl"]["sign"], "pos");
}
