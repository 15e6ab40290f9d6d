use std::time::Duration;

use anyhow::Result;
use clap::Args;
use cvclient_lib::types::AlertsResponse;
use cvclient_lib::{ChainedClient, CvClientError};

use crate::output::{print_alerts, OutputFormat};

#[derive(Args)]
pub struct WatchArgs {
    /// Request type (solver) to poll
    #[arg(long = "type", default_value = "aaa")]
    pub request_type: String,

    /// Seconds between polls
    #[arg(long, default_value = "60")]
    pub interval_secs: u64,
}

/// Polls alerts, printing only when the server reports a new data generation.
pub async fn run(args: &WatchArgs, client: &ChainedClient, format: &OutputFormat) -> Result<()> {
    let token = client.cancellation_token();
    let interval = Duration::from_secs(args.interval_secs.max(1));
    let mut last: Option<AlertsResponse> = None;

    loop {
        match client.fetch_alerts(&args.request_type).await {
            Ok(resp) => {
                if last.as_ref() != Some(&resp) {
                    eprintln!("{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
                    print_alerts(&resp, format)?;
                    last = Some(resp);
                } else {
                    tracing::debug!("No new alerts");
                }
            }
            Err(CvClientError::Cancelled) => break,
            Err(e) => return Err(e.into()),
        }

        tokio::select! {
            _ = token.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    tracing::info!("Stopped watching {}", args.request_type);
    Ok(())
}
