//! Chart request parameters.

use cvclient_api::types::{ChartRequest, Timeframe};

use crate::error::CvClientError;

/// Everything that selects a chart. Each distinct combination is cached separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartParams {
    pub request_type: String,
    /// Number of bars.
    pub length: u32,
    pub timeframe: Timeframe,
    /// Target currency to sample; empty for the default.
    pub focus: String,
    /// Optional pairing, only used when exchange price data is wanted.
    pub pair: String,
    pub include_alerts: bool,
    /// Scales the focus currency's weight in the chart.
    pub multiplier: u32,
}

impl Default for ChartParams {
    fn default() -> Self {
        Self {
            request_type: "aaa".to_string(),
            length: 20,
            timeframe: Timeframe::FifteenMinutes,
            focus: String::new(),
            pair: String::new(),
            include_alerts: false,
            multiplier: 1,
        }
    }
}

impl ChartParams {
    pub fn new(request_type: impl Into<String>) -> Self {
        Self {
            request_type: request_type.into(),
            ..Self::default()
        }
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    pub fn with_timeframe(mut self, timeframe: Timeframe) -> Self {
        self.timeframe = timeframe;
        self
    }

    pub fn with_focus(mut self, focus: impl Into<String>) -> Self {
        self.focus = focus.into();
        self
    }

    pub fn with_pair(mut self, pair: impl Into<String>) -> Self {
        self.pair = pair.into();
        self
    }

    pub fn with_alerts(mut self, include_alerts: bool) -> Self {
        self.include_alerts = include_alerts;
        self
    }

    pub fn with_multiplier(mut self, multiplier: u32) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn validate(&self) -> Result<(), CvClientError> {
        if self.length == 0 {
            return Err(CvClientError::InvalidInput(
                "chart length must be at least 1".to_string(),
            ));
        }
        if self.multiplier == 0 {
            return Err(CvClientError::InvalidInput(
                "multiplier must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Cache key over all seven parameters in request order. Strings are
    /// quoted so that, e.g., focus `"ab"` + pair `""` and focus `"a"` + pair
    /// `"b"` stay distinct.
    pub fn cache_key(&self, solver: &str) -> String {
        format!(
            "{:?}:{}:{}:{:?}:{:?}:{}:{}",
            solver,
            self.length,
            self.timeframe,
            self.focus,
            self.pair,
            self.include_alerts,
            self.multiplier
        )
    }

    pub fn to_request(&self, solver: &str) -> ChartRequest {
        ChartRequest {
            chart_type: solver.to_string(),
            chart_length: self.length,
            chart_time: self.timeframe,
            chart_focus: self.focus.clone(),
            chart_pair: self.pair.clone(),
            include_alerts: self.include_alerts,
            multiplier: self.multiplier,
        }
    }
}
