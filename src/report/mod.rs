pub mod builder;
pub mod format;
pub mod html;
pub mod normalizer;

pub use builder::{build_report, ChipKind, Report, ReportRow, ReportSummary, SideChip, TableEntry};
pub use format::{format_cents, format_money, format_pnl_line, PnlLine, PnlSign};
pub use html::render_html;
pub use normalizer::{normalize_cents, normalize_percent, parse_decimal};
