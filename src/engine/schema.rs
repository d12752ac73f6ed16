//! Request and result schema of the compute boundary

use serde::{Deserialize, Serialize};

use crate::core::{
    AxisRange, AxisSpec, AxisVariable, GreekSet, HeatmapGrid, Metric, OptionParams, ScaleMode,
    TimeHorizon, ViewMode,
};
use crate::models::{IvResult, IvStatus};

/// Heatmap settings shared by all tickers of a request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapRequest {
    pub metric: Metric,
    pub x_var: AxisVariable,
    pub y_var: AxisVariable,
    pub x_range: AxisRange,
    pub y_range: AxisRange,
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default)]
    pub scale_mode: ScaleMode,
}

impl HeatmapRequest {
    pub fn x_axis(&self) -> AxisSpec {
        AxisSpec::from_range(self.x_var, self.x_range)
    }

    pub fn y_axis(&self) -> AxisSpec {
        AxisSpec::from_range(self.y_var, self.y_range)
    }
}

/// A batch pricing request: one parameter set per ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeRequest {
    pub tickers: Vec<String>,
    pub params: Vec<OptionParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heatmap: Option<HeatmapRequest>,
}

impl ComputeRequest {
    /// Three identical at-the-money calls and a spot/vol call-price heatmap
    pub fn lab_default(horizon: TimeHorizon) -> Self {
        let params = OptionParams::call(100.0, 100.0, 0.2, 0.05, horizon.to_years());
        Self {
            tickers: vec!["AAPL".into(), "MSFT".into(), "NVDA".into()],
            params: vec![params; 3],
            heatmap: Some(HeatmapRequest {
                metric: Metric::CallPrice,
                x_var: AxisVariable::Spot,
                y_var: AxisVariable::Volatility,
                x_range: AxisRange::new(80.0, 120.0, 20),
                y_range: AxisRange::new(0.1, 0.5, 20),
                view_mode: ViewMode::Three,
                scale_mode: ScaleMode::Shared,
            }),
        }
    }
}

/// Output card for one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerResult {
    pub ticker: String,
    pub call: f64,
    pub put: f64,
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
    pub rho: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iv: Option<f64>,
    pub iv_status: IvStatus,
}

impl TickerResult {
    pub fn new(
        ticker: impl Into<String>,
        call: f64,
        put: f64,
        greeks: &GreekSet,
        iv: &IvResult,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            call,
            put,
            delta: greeks.delta,
            gamma: greeks.gamma,
            vega: greeks.vega,
            theta: greeks.theta,
            rho: greeks.rho,
            iv: iv.value,
            iv_status: iv.status,
        }
    }
}

/// Result of a compute call.
///
/// When `error` is set the other fields are empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComputeResult {
    pub tickers: Vec<TickerResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heatmap: Option<Vec<HeatmapGrid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComputeResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            tickers: Vec::new(),
            heatmap: None,
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
