mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cvclient_lib::{ChainedClient, ClientConfig, SessionRegistry};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "cvclient")]
#[command(about = "Fetch alerts and chart data from a transaction-chained market data service")]
struct Cli {
    /// Output format: table, markdown, json or csv
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// YAML config file; CVCLIENT_* environment variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verify the server's TLS certificate
    #[arg(long, global = true)]
    verify_tls: bool,

    /// Log transaction IDs and cache decisions at info level
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the latest alerts
    Alerts(commands::alerts::AlertsArgs),
    /// Fetch chart data
    Chart(commands::chart::ChartArgs),
    /// Poll alerts until interrupted
    Watch(commands::watch::WatchArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cvclient=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        "markdown" | "md" => OutputFormat::Markdown,
        _ => OutputFormat::Table,
    };

    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if cli.verify_tls {
        config.verify_tls = true;
    }
    if cli.debug {
        config.debug = true;
    }

    let registry = SessionRegistry::new();
    let client = ChainedClient::connect(config, &registry)?;

    // Ctrl-C aborts whatever request or retry wait is in progress.
    let token = client.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    match &cli.command {
        Commands::Alerts(args) => commands::alerts::run(args, &client, &format).await?,
        Commands::Chart(args) => commands::chart::run(args, &client, &format).await?,
        Commands::Watch(args) => commands::watch::run(args, &client, &format).await?,
    }

    Ok(())
}
