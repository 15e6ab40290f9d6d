use anyhow::Result;
use clap::Args;
use cvclient_lib::types::Timeframe;
use cvclient_lib::{ChainedClient, ChartParams, CvClientError};

use crate::output::{print_chart, OutputFormat};

#[derive(Args)]
pub struct ChartArgs {
    /// Request type (solver) to chart
    #[arg(long = "type", default_value = "aaa")]
    pub request_type: String,

    /// Number of bars
    #[arg(long, default_value = "20")]
    pub length: u32,

    /// Sample width: 15MINUTE, 30MINUTE, 1HOUR, 4HOUR, 1DAY
    #[arg(long, default_value = "15MINUTE")]
    pub timeframe: String,

    /// Target currency to sample
    #[arg(long, default_value = "")]
    pub focus: String,

    /// Exchange pair, only needed when price data is wanted
    #[arg(long, default_value = "")]
    pub pair: String,

    /// Include the latest alert values for this timeframe
    #[arg(long)]
    pub include_alerts: bool,

    /// Weight of the focus currency in the chart
    #[arg(long, default_value = "1")]
    pub multiplier: u32,
}

impl ChartArgs {
    pub fn to_params(&self) -> Result<ChartParams, CvClientError> {
        let timeframe: Timeframe = self
            .timeframe
            .parse()
            .map_err(CvClientError::InvalidInput)?;
        Ok(ChartParams::new(&self.request_type)
            .with_length(self.length)
            .with_timeframe(timeframe)
            .with_focus(&self.focus)
            .with_pair(&self.pair)
            .with_alerts(self.include_alerts)
            .with_multiplier(self.multiplier))
    }
}

pub async fn run(args: &ChartArgs, client: &ChainedClient, format: &OutputFormat) -> Result<()> {
    let params = args.to_params()?;
    let resp = client.fetch_chart(&params).await?;
    if let Some(stamp) = &resp.stamp {
        eprintln!("Data generation {}", stamp);
    }
    print_chart(&resp, format)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(timeframe: &str) -> ChartArgs {
        ChartArgs {
            request_type: "aaa".to_string(),
            length: 50,
            timeframe: timeframe.to_string(),
            focus: "btc".to_string(),
            pair: String::new(),
            include_alerts: true,
            multiplier: 2,
        }
    }

    #[test]
    fn args_map_to_params() {
        let params = args("1hour").to_params().unwrap();
        assert_eq!(params.timeframe, Timeframe::OneHour);
        assert_eq!(params.length, 50);
        assert_eq!(params.focus, "btc");
        assert!(params.include_alerts);
        assert_eq!(params.multiplier, 2);
    }

    #[test]
    fn unknown_timeframe_is_invalid_input() {
        let err = args("2HOUR").to_params().unwrap_err();
        assert!(matches!(err, CvClientError::InvalidInput(_)));
    }
}
