use anyhow::Result;
use clap::Args;
use cvclient_lib::ChainedClient;

use crate::output::{print_alerts, OutputFormat};

#[derive(Args)]
pub struct AlertsArgs {
    /// Request type (solver) to query
    #[arg(long = "type", default_value = "aaa")]
    pub request_type: String,
}

pub async fn run(args: &AlertsArgs, client: &ChainedClient, format: &OutputFormat) -> Result<()> {
    let resp = client.fetch_alerts(&args.request_type).await?;
    if let Some(msg) = &resp.msg {
        eprintln!("Server message: {}", msg);
    }
    print_alerts(&resp, format)?;
    Ok(())
}
