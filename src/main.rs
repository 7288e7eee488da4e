use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use polyreport::config::{describe_env, AppConfig, SmtpConfig};
use polyreport::polymarket::DataClient;
use polyreport::services::mailer::Mailer;
use polyreport::services::report_job::{self, DeliveryRequest};

/// Render a Polymarket positions report and optionally email it.
#[derive(Debug, Parser)]
#[command(name = "polyreport", version, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    generate: GenerateArgs,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check SMTP connection and authentication without sending
    TestSmtp,
    /// Show which configuration variables are set (secrets masked)
    CheckEnv,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Wallet address (defaults to POLYMARKET_ADDRESS)
    address: Option<String>,

    /// Output HTML path (defaults to REPORT_PATH)
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Email the report to these addresses (repeat or comma-separate)
    #[arg(long = "send-email", short = 'e', value_name = "RECIPIENT", value_delimiter = ',')]
    send_email: Vec<String>,

    /// Also write the row/summary model as JSON
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match cli.command {
        Some(Command::CheckEnv) => {
            check_env(&config);
            Ok(())
        }
        Some(Command::TestSmtp) => test_smtp(&config).await,
        None => generate(cli.generate, &config).await,
    }
}

async fn generate(args: GenerateArgs, config: &AppConfig) -> anyhow::Result<()> {
    let address = args
        .address
        .unwrap_or_else(|| config.polymarket_address.clone());
    let path = args.output.unwrap_or_else(|| config.report_path.clone());

    let http = DataClient::default_http()?;
    let client = DataClient::with_base_url(http, config.data_api_url.clone());

    let delivery = (!args.send_email.is_empty()).then(|| DeliveryRequest {
        recipients: args.send_email,
        railway: config.is_railway(),
    });

    let outcome = report_job::create_and_send_report(&client, &address, &path, delivery.as_ref())
        .await
        .with_context(|| format!("report generation failed for {address}"))?;

    if let Some(json_path) = &args.json {
        report_job::write_report_json(&outcome.report, json_path).await?;
    }

    tracing::info!(
        path = %outcome.path.display(),
        positions = outcome.report.summary.count,
        total_value = %outcome.report.summary.total_value,
        total_pnl = %outcome.report.summary.total_pnl,
        "Report generated"
    );

    if outcome.email_sent == Some(false) {
        tracing::warn!(
            "Email was not sent. Check GMAIL_EMAIL, GMAIL_APP_PASSWORD and SMTP reachability; \
             the report file was kept"
        );
    }

    Ok(())
}

async fn test_smtp(config: &AppConfig) -> anyhow::Result<()> {
    let smtp = SmtpConfig::from_env()?;
    let mailer = Mailer::new(smtp, config.is_railway())
        .context("email configuration incomplete")?;

    if !mailer.test_connection().await {
        anyhow::bail!("SMTP connection test failed for {}", mailer.sender_email());
    }
    tracing::info!(sender = %mailer.sender_email(), "SMTP connection OK");
    Ok(())
}

fn check_env(config: &AppConfig) {
    match &config.railway_environment {
        Some(env) => println!("Running in Railway environment: {env}"),
        None => println!("Not running in Railway environment"),
    }
    for line in describe_env(|key| std::env::var(key).ok()) {
        println!("{line}");
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
