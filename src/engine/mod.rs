//! Compute Orchestration
//!
//! Validates a batch request, prices every ticker, builds the per-ticker
//! heatmaps and applies the view mode. The engine is stateless: every call
//! works on request-scoped values only, so one engine can serve concurrent
//! requests.
//!
//! All failures are reported through [`ComputeResult::error`]; nothing else
//! crosses the boundary.

mod schema;

pub use schema::*;

use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;

use crate::config::EngineConfig;
use crate::core::{HeatmapGrid, LabError, LabResult, OptionParams, OptionType};
use crate::heatmap::{apply_view_mode, SurfaceGenerator};
use crate::models::{price_and_greeks, price_params, ImpliedVolSolver};

/// Batch pricing engine
#[derive(Debug, Clone, Default)]
pub struct ComputeEngine {
    config: EngineConfig,
    solver: ImpliedVolSolver,
    generator: SurfaceGenerator,
}

impl ComputeEngine {
    pub fn new(config: EngineConfig) -> Self {
        let solver = ImpliedVolSolver::new(config.solver);
        let generator = SurfaceGenerator::new(solver, config.grid, config.units);
        Self {
            config,
            solver,
            generator,
        }
    }

    /// Run a request, converting any failure into a top-level error.
    ///
    /// Panics inside the engine are caught and reported the same way.
    pub fn compute(&self, request: &ComputeRequest) -> ComputeResult {
        match panic::catch_unwind(AssertUnwindSafe(|| self.try_compute(request))) {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::warn!("compute request rejected: {}", e);
                ComputeResult::failure(e.to_string())
            }
            Err(cause) => {
                let detail = cause
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| cause.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!("compute panicked: {}", detail);
                ComputeResult::failure(format!("Internal error: {}", detail))
            }
        }
    }

    /// Run a request, propagating the first failure
    pub fn try_compute(&self, request: &ComputeRequest) -> LabResult<ComputeResult> {
        let params = self.validate(request)?;
        let names = &request.tickers;

        let tickers: Vec<TickerResult> = if self.config.parallel {
            names
                .par_iter()
                .zip(params.par_iter())
                .map(|(name, p)| self.price_ticker(name, p))
                .collect::<LabResult<_>>()?
        } else {
            names
                .iter()
                .zip(params.iter())
                .map(|(name, p)| self.price_ticker(name, p))
                .collect::<LabResult<_>>()?
        };

        let heatmap = match &request.heatmap {
            Some(h) => Some(self.build_heatmaps(&params, h)?),
            None => None,
        };

        tracing::info!(
            tickers = tickers.len(),
            grids = heatmap.as_ref().map_or(0, |g| g.len()),
            "compute request complete"
        );

        Ok(ComputeResult {
            tickers,
            heatmap,
            error: None,
        })
    }

    /// Parse a JSON request and return the JSON result.
    ///
    /// Malformed JSON comes back as an `error` result.
    pub fn compute_json(&self, payload: &str) -> String {
        let result = match serde_json::from_str::<ComputeRequest>(payload) {
            Ok(request) => self.compute(&request),
            Err(e) => {
                tracing::warn!("malformed compute request: {}", e);
                ComputeResult::failure(LabError::from(e).to_string())
            }
        };

        serde_json::to_string(&result).unwrap_or_else(|e| {
            format!(
                r#"{{"tickers":[],"error":{}}}"#,
                serde_json::Value::String(format!("Serialization error: {}", e))
            )
        })
    }

    /// Shape and domain checks; returns the parameters with T clamped at zero
    fn validate(&self, request: &ComputeRequest) -> LabResult<Vec<OptionParams>> {
        let n = self.config.ticker_count;
        if request.tickers.len() != n {
            return Err(LabError::validation(format!(
                "expected {} tickers, got {}",
                n,
                request.tickers.len()
            )));
        }
        if request.params.len() != n {
            return Err(LabError::validation(format!(
                "expected {} parameter sets, got {}",
                n,
                request.params.len()
            )));
        }

        let params: Vec<OptionParams> = request.params.iter().map(|p| p.clamped()).collect();
        for (name, p) in request.tickers.iter().zip(params.iter()) {
            p.validate().map_err(|e| match e {
                LabError::Validation(msg) => LabError::validation(format!("{}: {}", name, msg)),
                other => other,
            })?;
        }

        if let Some(h) = &request.heatmap {
            h.x_var.check_range(&h.x_range)?;
            h.y_var.check_range(&h.y_range)?;
            self.generator
                .limits()
                .checked_resolve(h.x_range.steps, h.y_range.steps)?;
        }

        Ok(params)
    }

    fn price_ticker(&self, name: &str, params: &OptionParams) -> LabResult<TickerResult> {
        let greeks = price_and_greeks(params)?;
        let (call, put) = match params.option_type {
            OptionType::Call => (greeks.price, price_params(params, OptionType::Put)),
            OptionType::Put => (price_params(params, OptionType::Call), greeks.price),
        };
        let iv = self.solver.solve(params, params.market_price);

        tracing::debug!(
            ticker = name,
            call,
            put,
            iv_status = iv.status.as_str(),
            "priced ticker"
        );

        Ok(TickerResult::new(
            name,
            call,
            put,
            &greeks.in_units(self.config.units),
            &iv,
        ))
    }

    fn build_heatmaps(
        &self,
        params: &[OptionParams],
        request: &HeatmapRequest,
    ) -> LabResult<Vec<HeatmapGrid>> {
        let x_axis = request.x_axis();
        let y_axis = request.y_axis();
        let build = |p: &OptionParams| {
            self.generator
                .generate(p, request.metric, &x_axis, &y_axis)
        };

        let grids: Vec<HeatmapGrid> = if self.config.parallel {
            params.par_iter().map(build).collect::<LabResult<_>>()?
        } else {
            params.iter().map(build).collect::<LabResult<_>>()?
        };

        Ok(apply_view_mode(grids, request.view_mode))
    }
}

/// Run a JSON request through an engine with default settings
pub fn run_compute(payload: &str) -> String {
    ComputeEngine::default().compute_json(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AxisRange, AxisVariable, GreekUnits, Metric, ViewMode};
    use crate::models::IvStatus;

    fn atm_call() -> OptionParams {
        OptionParams::call(100.0, 100.0, 0.2, 0.05, 30.0 / 365.0)
    }

    fn request(params: Vec<OptionParams>, view_mode: ViewMode) -> ComputeRequest {
        ComputeRequest {
            tickers: vec!["AAPL".into(), "MSFT".into(), "NVDA".into()],
            params,
            heatmap: Some(HeatmapRequest {
                metric: Metric::CallPrice,
                x_var: AxisVariable::Spot,
                y_var: AxisVariable::Volatility,
                x_range: AxisRange::new(80.0, 120.0, 3),
                y_range: AxisRange::new(0.1, 0.5, 3),
                view_mode,
                scale_mode: Default::default(),
            }),
        }
    }

    #[test]
    fn test_identical_tickers() {
        let result = ComputeEngine::default().compute(&request(vec![atm_call(); 3], ViewMode::Three));
        assert!(!result.is_error());
        assert_eq!(result.tickers.len(), 3);
        assert_eq!(result.tickers[0].ticker, "AAPL");

        let first = &result.tickers[0];
        for t in &result.tickers[1..] {
            assert_eq!(t.call, first.call);
            assert_eq!(t.delta, first.delta);
            assert_eq!(t.iv_status, IvStatus::NoMarketPrice);
        }

        let grids = result.heatmap.unwrap();
        assert_eq!(grids.len(), 3);
        assert_eq!(grids[0], grids[1]);
        assert_eq!(grids[1], grids[2]);
        assert_eq!(grids[0].shape(), (3, 3));
    }

    #[test]
    fn test_compare_mode_diffs_against_first() {
        let mut params = vec![atm_call(); 3];
        params[1].spot = 105.0;
        params[2].volatility = 0.3;

        let engine = ComputeEngine::default();
        let raw = engine.compute(&request(params.clone(), ViewMode::Three)).heatmap.unwrap();
        let cmp = engine.compute(&request(params, ViewMode::Compare)).heatmap.unwrap();

        assert_eq!(cmp[0], raw[0]);
        for i in 1..3 {
            for yi in 0..3 {
                for xi in 0..3 {
                    assert_eq!(
                        cmp[i].z_matrix[yi][xi],
                        raw[i].z_matrix[yi][xi] - raw[0].z_matrix[yi][xi]
                    );
                }
            }
        }
    }

    #[test]
    fn test_market_price_runs_solver() {
        let mut params = vec![atm_call(); 3];
        params[0].market_price = Some(2.6);
        params[1].market_price = Some(0.0);
        params[2].market_price = Some(500.0);

        let result = ComputeEngine::default().compute(&request(params, ViewMode::Three));
        assert!(!result.is_error());
        assert_eq!(result.tickers[0].iv_status, IvStatus::Ok);
        assert!(result.tickers[0].iv.unwrap() > 0.2);
        assert_eq!(result.tickers[1].iv_status, IvStatus::NegativeOrZeroInput);
        assert_eq!(result.tickers[2].iv_status, IvStatus::NotBracketed);
        assert!(result.tickers[2].iv.is_none());
    }

    #[test]
    fn test_put_ticker_reports_both_prices() {
        let put = atm_call().with_type(OptionType::Put);
        let result = ComputeEngine::default().compute(&request(vec![put; 3], ViewMode::Three));
        let t = &result.tickers[0];
        assert!(t.delta < 0.0);
        let parity = 100.0 - 100.0 * (-0.05f64 * 30.0 / 365.0).exp();
        assert!((t.call - t.put - parity).abs() < 1e-10);
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let mut req = request(vec![atm_call(); 3], ViewMode::Three);
        req.tickers.pop();
        let result = ComputeEngine::default().compute(&req);
        assert!(result.error.as_deref().unwrap().contains("expected 3 tickers"));
        assert!(result.tickers.is_empty());
        assert!(result.heatmap.is_none());

        let req = request(vec![atm_call(); 2], ViewMode::Three);
        assert!(ComputeEngine::default().compute(&req).is_error());
    }

    #[test]
    fn test_invalid_params_abort_the_request() {
        let mut params = vec![atm_call(); 3];
        params[2].strike = 0.0;
        let result = ComputeEngine::default().compute(&request(params, ViewMode::Three));
        let msg = result.error.unwrap();
        assert!(msg.contains("NVDA"));
        assert!(result.tickers.is_empty());
    }

    #[test]
    fn test_invalid_axis_aborts_the_request() {
        let mut req = request(vec![atm_call(); 3], ViewMode::Three);
        if let Some(h) = req.heatmap.as_mut() {
            h.x_range = AxisRange::new(-5.0, 100.0, 3);
        }
        assert!(ComputeEngine::default().compute(&req).is_error());
    }

    #[test]
    fn test_negative_time_is_clamped() {
        let mut params = vec![atm_call(); 3];
        params[0].time = -1.0;
        params[0].spot = 110.0;
        let result = ComputeEngine::default().compute(&request(params, ViewMode::Three));
        assert!(!result.is_error());
        assert_eq!(result.tickers[0].call, 10.0);
        assert_eq!(result.tickers[0].delta, 1.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut params = vec![atm_call(); 3];
        params[1].dividend_yield = 0.02;
        params[2].option_type = OptionType::Put;
        let req = request(params, ViewMode::Compare);

        let sequential = ComputeEngine::default().compute(&req);
        let parallel = ComputeEngine::new(EngineConfig {
            parallel: true,
            ..Default::default()
        })
        .compute(&req);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_display_units() {
        let req = request(vec![atm_call(); 3], ViewMode::Three);
        let raw = ComputeEngine::default().compute(&req);
        let display = ComputeEngine::new(EngineConfig::display()).compute(&req);
        assert!((display.tickers[0].theta - raw.tickers[0].theta / 365.0).abs() < 1e-12);
        assert!((display.tickers[0].vega - raw.tickers[0].vega / 100.0).abs() < 1e-12);
        assert_eq!(display.tickers[0].call, raw.tickers[0].call);
        assert_eq!(EngineConfig::display().units, GreekUnits::Display);
    }

    #[test]
    fn test_oversized_grid_is_rejected_without_cap() {
        let mut req = request(vec![atm_call(); 3], ViewMode::Three);
        if let Some(h) = req.heatmap.as_mut() {
            h.x_range.steps = usize::MAX / 2;
        }

        let result = ComputeEngine::new(EngineConfig::strict()).compute(&req);
        assert!(result.error.as_deref().unwrap().contains("exceeds"));
        assert!(result.tickers.is_empty());
        assert!(result.heatmap.is_none());

        // the default cap shrinks the same request to a usable grid
        let capped = ComputeEngine::default().compute(&req);
        assert!(!capped.is_error());
        assert_eq!(capped.heatmap.unwrap()[0].shape(), (10, 10));
    }

    #[test]
    fn test_no_heatmap_requested() {
        let mut req = request(vec![atm_call(); 3], ViewMode::Three);
        req.heatmap = None;
        let result = ComputeEngine::default().compute(&req);
        assert!(!result.is_error());
        assert!(result.heatmap.is_none());
    }

    #[test]
    fn test_compute_json_malformed() {
        let out = run_compute("{not json");
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(v["error"].as_str().unwrap().starts_with("Serialization error"));
    }
}
