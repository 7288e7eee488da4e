use std::fmt::Write;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use super::builder::{Report, ReportRow, ReportSummary, TableEntry};
use super::format::{format_signed_whole_money, format_whole_money};

const POSITIVE_COLOR: &str = "#10b981";
const NEGATIVE_COLOR: &str = "#ef4444";
const FOOTER_TIME_FORMAT: &str = "%B %d, %Y at %I:%M %p";

/// Escape text for use in element content or a double-quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render the full email-safe HTML document.
pub fn render_html(report: &Report, generated_at: NaiveDateTime) -> String {
    let mut html = String::with_capacity(16 * 1024 + report.rows.len() * 1024);

    html.push_str(DOCUMENT_HEAD);
    html.push_str("<body>\n    <div class=\"email-container\">\n");
    html.push_str(
        "        <div class=\"header\">\n            <h1>📊 Polymarket Positions Report</h1>\n        </div>\n\n",
    );
    html.push_str(&render_stats(&report.summary));

    html.push_str(TABLE_HEAD);
    html.push_str(&render_table_body(report));
    html.push_str("            </tbody>\n        </table>\n\n");

    // Writing into a String cannot fail.
    let _ = write!(
        html,
        r#"        <div class="footer">
            <p class="footer-text">
                Generated on {}
            </p>
            <p class="footer-text">
                View on <a href="https://polymarket.com" class="footer-link">Polymarket.com</a>
            </p>
        </div>
    </div>
</body>
</html>"#,
        generated_at.format(FOOTER_TIME_FORMAT)
    );

    html
}

fn render_stats(summary: &ReportSummary) -> String {
    let pnl_color = if summary.total_pnl >= Decimal::ZERO {
        POSITIVE_COLOR
    } else {
        NEGATIVE_COLOR
    };

    format!(
        r#"        <div class="stats-bar">
            <div class="stats-container">
                <div class="stat-item">
                    <div class="stat-value">{count}</div>
                    <div class="stat-label">Total Positions</div>
                </div>
                <div class="stat-item">
                    <div class="stat-value">{value}</div>
                    <div class="stat-label">Total Value</div>
                </div>
                <div class="stat-item">
                    <div class="stat-value" style="color: {pnl_color}">
                        {pnl}
                    </div>
                    <div class="stat-label">Total P&amp;L</div>
                </div>
            </div>
        </div>

"#,
        count = summary.count,
        value = format_whole_money(summary.total_value),
        pnl = format_signed_whole_money(summary.total_pnl),
    )
}

/// Table body rows, with a separator row before every fifth data row.
pub fn render_table_body(report: &Report) -> String {
    let mut body = String::new();
    for entry in report.table_entries() {
        match entry {
            TableEntry::Separator => {
                body.push_str("<tr class=\"separator-row\"><td colspan=\"4\"></td></tr>\n");
            }
            TableEntry::Row(row) => {
                let _ = writeln!(
                    body,
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    market_cell(row),
                    escape_html(&row.avg),
                    escape_html(&row.current),
                    value_cell(row),
                );
            }
        }
    }
    body
}

fn market_cell(row: &ReportRow) -> String {
    let title = escape_html(&row.title);
    let title_html = match &row.market_url {
        Some(url) => format!(
            r#"<a class="title-link" target="_blank" href="{}">{title}</a>"#,
            escape_html(url)
        ),
        None => format!(r#"<span class="title-text">{title}</span>"#),
    };

    let logo_html = row
        .icon
        .as_deref()
        .map(|src| format!(r#"<img class="logo" src="{}" alt="logo">"#, escape_html(src)))
        .unwrap_or_default();

    let chip_html = row
        .chip
        .as_ref()
        .map(|chip| {
            format!(
                r#"<span class="{}">{}</span>"#,
                chip.css_class(),
                escape_html(&chip.label)
            )
        })
        .unwrap_or_default();

    let position_html = row
        .position_line
        .as_deref()
        .map(|line| format!(r#"<div class="position-info">{}</div>"#, escape_html(line)))
        .unwrap_or_default();

    format!(
        r#"<div class="market-wrap">{logo_html}<div class="market-content"><div class="market-header"><div class="market-title">{title_html}</div><div class="market-chip">{chip_html}</div></div>{position_html}</div></div>"#
    )
}

fn value_cell(row: &ReportRow) -> String {
    let pnl = row
        .pnl
        .as_ref()
        .map(|line| format!(r#"<div class="sub">{}</div>"#, line.to_html()))
        .unwrap_or_default();
    format!(r#"<div class="val">{}</div>{pnl}"#, escape_html(&row.value))
}

const TABLE_HEAD: &str = r#"        <table class="positions-table">
            <thead>
                <tr>
                    <th>MARKET</th>
                    <th style="text-align: center;">AVG</th>
                    <th style="text-align: center;">CURRENT</th>
                    <th>VALUE</th>
                </tr>
            </thead>
            <tbody>
"#;

const DOCUMENT_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Polymarket Positions Report</title>
    <!--[if mso]>
    <noscript>
        <xml>
            <o:OfficeDocumentSettings>
                <o:PixelsPerInch>96</o:PixelsPerInch>
            </o:OfficeDocumentSettings>
        </xml>
    </noscript>
    <![endif]-->
    <style>
        body, table, td, a { -webkit-text-size-adjust: 100%; -ms-text-size-adjust: 100%; }
        table, td { mso-table-lspace: 0pt; mso-table-rspace: 0pt; }
        img { -ms-interpolation-mode: bicubic; border: 0; outline: none; text-decoration: none; }

        body {
            margin: 0 !important;
            padding: 0 !important;
            background-color: #f4f7fa !important;
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, Arial, sans-serif !important;
        }

        .email-container { max-width: 680px; margin: 0 auto; background-color: #ffffff; }

        .header {
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            padding: 30px 20px;
            text-align: center;
        }
        .header h1 {
            margin: 0;
            color: #ffffff;
            font-size: 28px;
            font-weight: 600;
            text-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }

        .stats-bar { background-color: #f8fafc; padding: 20px; border-bottom: 2px solid #e2e8f0; }
        .stats-container { display: table; width: 100%; table-layout: fixed; }
        .stat-item { display: table-cell; text-align: center; padding: 0 10px; }
        .stat-value { font-size: 24px; font-weight: bold; color: #4a5568; }
        .stat-label {
            font-size: 12px;
            color: #718096;
            margin-top: 4px;
            text-transform: uppercase;
            letter-spacing: 0.5px;
        }

        .positions-table {
            width: 100%;
            border-collapse: separate;
            border-spacing: 0;
            margin: 0;
            padding: 20px;
            background-color: #ffffff;
        }
        .positions-table th {
            background: linear-gradient(135deg, #f6f9fc 0%, #e9ecef 100%);
            color: #2d3748;
            font-weight: 600;
            font-size: 12px;
            text-transform: uppercase;
            letter-spacing: 0.5px;
            padding: 12px 15px;
            text-align: left;
            border-bottom: 2px solid #cbd5e0;
        }
        .positions-table td {
            padding: 15px;
            border-bottom: 1px solid #e2e8f0;
            color: #4a5568;
            font-size: 14px;
            vertical-align: middle;
            background-color: #ffffff;
        }
        .positions-table tr:nth-child(odd) td { background-color: #fafbfc; }
        .positions-table tr:hover td { background-color: #f0f4f8 !important; transition: background-color 0.2s ease; }

        .separator-row td {
            padding: 0 !important;
            height: 3px !important;
            background: linear-gradient(90deg, #667eea 0%, #764ba2 100%);
            border: none !important;
        }

        .market-wrap { display: flex; align-items: flex-start; width: 100%; }
        .logo {
            width: 32px;
            height: 32px;
            border-radius: 8px;
            margin-right: 12px;
            flex-shrink: 0;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }
        .market-content { flex: 1; min-width: 0; }
        .market-header {
            display: flex;
            justify-content: space-between;
            align-items: flex-start;
            gap: 10px;
            margin-bottom: 4px;
        }
        .market-title { flex: 1; min-width: 0; }
        .market-chip { flex-shrink: 0; }
        .title-link { color: #5b21b6; text-decoration: none; font-weight: 500; font-size: 14px; display: block; }
        .title-link:hover { color: #7c3aed; text-decoration: underline; }
        .title-text { color: #2d3748; font-weight: 500; font-size: 14px; display: block; }
        .position-info { color: #718096; font-size: 12px; margin-top: 2px; }

        .chip {
            display: inline-block;
            padding: 4px 12px;
            border-radius: 12px;
            font-size: 11px;
            font-weight: 700;
            color: #ffffff;
            text-transform: uppercase;
            letter-spacing: 0.5px;
            white-space: nowrap;
        }
        .chip-yes { background: linear-gradient(135deg, #10b981 0%, #059669 100%); }
        .chip-no { background: linear-gradient(135deg, #ef4444 0%, #dc2626 100%); }
        .chip:not(.chip-yes):not(.chip-no) { background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); }

        .val { font-weight: 600; font-size: 15px; color: #2d3748; }
        .pnl { font-weight: 500; font-size: 13px; }
        .pnl.pos { color: #10b981; }
        .pnl.neg { color: #ef4444; }

        .positions-table td:nth-child(2),
        .positions-table td:nth-child(3) { font-weight: 500; color: #4a5568; text-align: center; }

        .footer { background-color: #f8fafc; padding: 30px 20px; text-align: center; border-top: 2px solid #e2e8f0; }
        .footer-text { color: #718096; font-size: 12px; margin: 0; }
        .footer-link { color: #667eea; text-decoration: none; }

        @media only screen and (max-width: 600px) {
            .email-container { width: 100% !important; }
            .header h1 { font-size: 24px; }
            .positions-table { padding: 10px; }
            .positions-table th,
            .positions-table td { padding: 10px 8px; font-size: 12px; }
            .logo { width: 24px; height: 24px; }
            .stat-value { font-size: 20px; }
        }
    </style>
</head>
"#;
