//! Binary entry point for `lore-bot`.
//!
//! Parses the command line, sets up logging (and optionally span export),
//! loads the `LORE_BOT_*` configuration, and runs the bot until the Slack
//! connection ends or its credentials are rejected.

use clap::Parser;
use lore_bot::base::{config::Config, types::Void};
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use tracing_subscriber::{Layer, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

/// Lore-bot – records a Slack team's memorable messages.
///
/// Configuration can come from `config.toml` or `LORE_BOT_*` environment variables.
/// React to a message with the trigger emoji to record it, and mention the bot
/// to query what has been recorded.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// TOML file with the bot's settings (Slack tokens, trigger reaction, database).
    ///
    /// Without it, `.hidden/config.toml` is used when present. `LORE_BOT_*`
    /// environment variables are read in either case, e.g. `LORE_BOT_SLACK_APP_TOKEN`.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Log more (-v for DEBUG, -vv for TRACE).
    ///
    /// DEBUG shows each command the bot runs and ignored events; TRACE also
    /// shows reactions that are not the trigger reaction.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Export spans to an OTLP collector over HTTP.
    ///
    /// The collector endpoint is taken from the standard `OTEL_EXPORTER_OTLP_*`
    /// environment variables.
    #[arg(long)]
    otlp: bool,
}

/// Runs the bot. Exits with an error if Slack rejects the credentials.
#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    // Construct the level filter.

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Prepare the log layer.

    let stdout = tracing_subscriber::fmt::layer()
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    // Prepare the otlp layer, if requested.

    let otel = if args.otlp {
        let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
        let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_simple_exporter(exporter).build().tracer("lore-bot");
        Some(tracing_opentelemetry::layer().with_tracer(tracer).boxed())
    } else {
        None
    };

    tracing_subscriber::registry().with(otel).with(level_filter).with(stdout).init();

    let config = Config::load(args.config.as_deref())?;

    lore_bot::start(config).await
}
