pub mod mailer;
pub mod report_job;

pub use mailer::{DeliveryError, Mailer, OutgoingEmail};
pub use report_job::{create_and_send_report, generate_report, write_report, DeliveryRequest, ReportOutcome};
