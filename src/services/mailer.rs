use std::path::PathBuf;

use lettre::address::AddressError;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::{ConfigError, SmtpConfig};

const DEFAULT_SENDER_NAME: &str = "Polymarket Analysis";
const NO_CONTENT: &str = "(No content)";
const ATTACHMENT_CONTENT_TYPE: &str = "application/octet-stream";

/// errno for "Network is unreachable" on Linux.
const ENETUNREACH: i32 = 101;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("no recipients given")]
    NoRecipients,

    #[error("invalid address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: AddressError,
    },

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

impl From<lettre::error::Error> for DeliveryError {
    fn from(e: lettre::error::Error) -> Self {
        DeliveryError::Build(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Outgoing email
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct OutgoingEmail {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: Option<String>,
    pub html: Option<String>,
    pub attachments: Vec<PathBuf>,
}

impl OutgoingEmail {
    pub fn new(to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            to: vec![to.into()],
            subject: subject.into(),
            ..Default::default()
        }
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc.push(cc.into());
        self
    }

    pub fn with_bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc.push(bcc.into());
        self
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    pub fn with_attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachments.push(path.into());
        self
    }

    /// Everyone who receives a copy: to, then cc, then bcc.
    pub fn all_recipients(&self) -> Vec<&str> {
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .map(String::as_str)
            .collect()
    }
}

/// A file read from disk, ready to attach.
#[derive(Debug, Clone)]
pub struct LoadedAttachment {
    pub filename: String,
    pub content: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// SMTP sender for rendered reports. Delivery failures are logged and
/// reported to the caller, never raised past `deliver`.
#[derive(Debug, Clone)]
pub struct Mailer {
    config: SmtpConfig,
    railway: bool,
}

impl Mailer {
    pub fn new(config: SmtpConfig, railway: bool) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, railway })
    }

    pub fn sender_email(&self) -> &str {
        &self.config.sender_email
    }

    fn from_mailbox(&self) -> Result<Mailbox, DeliveryError> {
        let address: Address = parse_address(&self.config.sender_email)?;
        let name = self
            .config
            .sender_name
            .clone()
            .unwrap_or_else(|| DEFAULT_SENDER_NAME.into());
        Ok(Mailbox::new(Some(name), address))
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, DeliveryError> {
        let credentials = Credentials::new(
            self.config.sender_email.clone(),
            self.config.sender_password.clone(),
        );
        let builder = if self.config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_server)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.smtp_server)
        };
        Ok(builder
            .port(self.config.smtp_port)
            .credentials(credentials)
            .build())
    }

    /// Assemble the MIME message. Bodies form a multipart/alternative; with
    /// attachments the whole thing is wrapped in multipart/mixed.
    pub fn build_message(
        &self,
        email: &OutgoingEmail,
        attachments: Vec<LoadedAttachment>,
    ) -> Result<Message, DeliveryError> {
        if email.to.is_empty() {
            return Err(DeliveryError::NoRecipients);
        }

        let mut builder = Message::builder()
            .from(self.from_mailbox()?)
            .subject(email.subject.clone());
        for to in &email.to {
            builder = builder.to(parse_mailbox(to)?);
        }
        for cc in &email.cc {
            builder = builder.cc(parse_mailbox(cc)?);
        }
        for bcc in &email.bcc {
            builder = builder.bcc(parse_mailbox(bcc)?);
        }
        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(parse_mailbox(reply_to)?);
        }

        let mut parts = Vec::with_capacity(2);
        if let Some(text) = &email.text {
            parts.push(SinglePart::plain(text.clone()));
        }
        if let Some(html) = &email.html {
            parts.push(SinglePart::html(html.clone()));
        }
        let mut parts = parts.into_iter();
        let first = parts
            .next()
            .unwrap_or_else(|| SinglePart::plain(NO_CONTENT.to_string()));
        let body = parts.fold(MultiPart::alternative().singlepart(first), |mp, part| {
            mp.singlepart(part)
        });

        if attachments.is_empty() {
            return Ok(builder.multipart(body)?);
        }

        let content_type = ContentType::parse(ATTACHMENT_CONTENT_TYPE)
            .map_err(|e| DeliveryError::Build(e.to_string()))?;
        let mixed = attachments
            .into_iter()
            .fold(MultiPart::mixed().multipart(body), |mp, a| {
                mp.singlepart(Attachment::new(a.filename).body(a.content, content_type.clone()))
            });
        Ok(builder.multipart(mixed)?)
    }

    /// Send one email. Recipients in the envelope are to + cc + bcc.
    pub async fn send(&self, email: &OutgoingEmail) -> Result<(), DeliveryError> {
        if self.railway {
            tracing::warn!("Running in Railway environment - SMTP may be restricted");
            tracing::warn!("Railway's free tier blocks outbound SMTP connections (port 587/465)");
        }

        let attachments = load_attachments(&email.attachments).await;
        let message = self.build_message(email, attachments)?;

        self.transport()?.send(message).await?;

        tracing::info!(
            recipients = %email.all_recipients().join(", "),
            "Email sent successfully"
        );
        Ok(())
    }

    /// Like `send`, but logs a diagnostic and returns `false` on failure.
    pub async fn deliver(&self, email: &OutgoingEmail) -> bool {
        match self.send(email).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to send email");
                tracing::error!("{}", diagnose(&e));
                false
            }
        }
    }

    /// Connect and authenticate without sending anything.
    pub async fn test_connection(&self) -> bool {
        tracing::info!(
            server = %self.config.smtp_server,
            port = self.config.smtp_port,
            "Testing SMTP connection"
        );

        let result = match self.transport() {
            Ok(transport) => transport.test_connection().await.map_err(DeliveryError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(true) => {
                tracing::info!("SMTP connection test successful");
                true
            }
            Ok(false) => {
                tracing::error!("SMTP server did not accept the connection test");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "SMTP connection test failed");
                tracing::error!("{}", diagnose(&e));
                false
            }
        }
    }
}

fn parse_address(raw: &str) -> Result<Address, DeliveryError> {
    raw.trim()
        .parse()
        .map_err(|source| DeliveryError::Address {
            address: raw.to_string(),
            source,
        })
}

fn parse_mailbox(raw: &str) -> Result<Mailbox, DeliveryError> {
    raw.trim()
        .parse()
        .map_err(|source| DeliveryError::Address {
            address: raw.to_string(),
            source,
        })
}

/// Read attachment files. Missing or unreadable files are skipped.
pub async fn load_attachments(paths: &[PathBuf]) -> Vec<LoadedAttachment> {
    let mut loaded = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(filename) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            tracing::warn!(path = %path.display(), "Attachment path has no file name");
            continue;
        };

        match tokio::fs::read(path).await {
            Ok(content) => {
                tracing::info!(file = %filename, "Attached file");
                loaded.push(LoadedAttachment { filename, content });
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Attachment file not found");
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to attach file");
            }
        }
    }
    loaded
}

/// Human-readable hint for a delivery failure.
pub fn diagnose(err: &DeliveryError) -> String {
    match err {
        DeliveryError::NoRecipients => "No recipient address was given.".into(),
        DeliveryError::Address { address, .. } => {
            format!("'{address}' is not a valid email address.")
        }
        DeliveryError::Build(_) => "The email could not be assembled.".into(),
        DeliveryError::Smtp(e) if is_auth_failure(e) => {
            "SMTP authentication failed. Check GMAIL_EMAIL and use a Gmail app password \
             (https://myaccount.google.com/apppasswords), not the account password."
                .into()
        }
        DeliveryError::Smtp(e) if is_network_unreachable(e) => {
            "Network is unreachable - SMTP ports may be blocked. On Railway's free tier, \
             run locally or use an email API service instead."
                .into()
        }
        DeliveryError::Smtp(_) => "SMTP delivery failed; check SMTP_SERVER, SMTP_PORT and USE_TLS.".into(),
    }
}

fn is_auth_failure(err: &lettre::transport::smtp::Error) -> bool {
    // 530 auth required, 534 mechanism too weak, 535 credentials rejected.
    err.status()
        .map(|code| matches!(code.to_string().as_str(), "530" | "534" | "535"))
        .unwrap_or(false)
}

fn is_network_unreachable(err: &lettre::transport::smtp::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if io.raw_os_error() == Some(ENETUNREACH) {
                return true;
            }
        }
        source = e.source();
    }
    false
}
