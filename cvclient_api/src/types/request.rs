//! Request bodies. The transaction field is attached by the caller at send time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

/// Body of a status check.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StatusRequest {
    pub status_type: String,
}

/// Body of an alerts fetch.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AlertsRequest {
    pub alert_type: String,
}

/// Body of a chart fetch. Field order is the order the service documents.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub chart_type: String,
    pub chart_length: u32,
    pub chart_time: Timeframe,
    pub chart_focus: String,
    pub chart_pair: String,
    /// Sent as the strings `"true"` / `"false"`.
    #[serde(serialize_with = "bool_as_str")]
    pub include_alerts: bool,
    pub multiplier: u32,
}

fn bool_as_str<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "true" } else { "false" })
}

/// Chart sample width accepted by the charts endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "15MINUTE")]
    FifteenMinutes,
    #[serde(rename = "30MINUTE")]
    ThirtyMinutes,
    #[serde(rename = "1HOUR")]
    OneHour,
    #[serde(rename = "4HOUR")]
    FourHours,
    #[serde(rename = "1DAY")]
    OneDay,
}

impl Timeframe {
    pub const ALL: [Timeframe; 5] = [
        Timeframe::FifteenMinutes,
        Timeframe::ThirtyMinutes,
        Timeframe::OneHour,
        Timeframe::FourHours,
        Timeframe::OneDay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::FifteenMinutes => "15MINUTE",
            Timeframe::ThirtyMinutes => "30MINUTE",
            Timeframe::OneHour => "1HOUR",
            Timeframe::FourHours => "4HOUR",
            Timeframe::OneDay => "1DAY",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str() == upper)
            .ok_or_else(|| {
                format!(
                    "unknown timeframe '{}', expected one of: {}",
                    s,
                    Timeframe::ALL.map(|tf| tf.as_str()).join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_request_wire_shape() {
        let req = ChartRequest {
            chart_type: "aaa_floating".to_string(),
            chart_length: 20,
            chart_time: Timeframe::FifteenMinutes,
            chart_focus: String::new(),
            chart_pair: String::new(),
            include_alerts: false,
            multiplier: 1,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "chart_type": "aaa_floating",
                "chart_length": 20,
                "chart_time": "15MINUTE",
                "chart_focus": "",
                "chart_pair": "",
                "include_alerts": "false",
                "multiplier": 1
            })
        );
    }

    #[test]
    fn timeframe_parses_case_insensitively() {
        assert_eq!("1hour".parse::<Timeframe>().unwrap(), Timeframe::OneHour);
        assert_eq!("1DAY".parse::<Timeframe>().unwrap(), Timeframe::OneDay);
    }

    #[test]
    fn timeframe_rejects_unknown() {
        let err = "5MINUTE".parse::<Timeframe>().unwrap_err();
        assert!(err.contains("15MINUTE"));
    }

    #[test]
    fn timeframe_display_matches_wire() {
        for tf in Timeframe::ALL {
            let wire = serde_json::to_value(tf).unwrap();
            assert_eq!(wire, serde_json::Value::String(tf.to_string()));
        }
    }
}
