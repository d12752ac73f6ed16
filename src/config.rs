//! Engine configuration
//!
//! Aggregates the solver, grid and reporting settings. Every field has a
//! default, so a JSON override file only needs the values it changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{GreekUnits, LabError, LabResult};
use crate::heatmap::GridLimits;
use crate::models::SolverConfig;

/// Configuration for the compute engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Implied volatility solver
    pub solver: SolverConfig,
    /// Heatmap size limits
    pub grid: GridLimits,
    /// Units for vega, theta and rho in ticker records and Greek heatmaps
    pub units: GreekUnits,
    /// Number of tickers a request must carry
    /// Default: 3
    pub ticker_count: usize,
    /// Price tickers and build their grids on the rayon pool
    /// Default: false (sequential)
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            grid: GridLimits::default(),
            units: GreekUnits::Raw,
            ticker_count: 3,
            parallel: false,
        }
    }
}

impl EngineConfig {
    /// Trader units: vega and rho per 1%, theta per day
    pub fn display() -> Self {
        Self {
            units: GreekUnits::Display,
            ..Default::default()
        }
    }

    /// No grid cap
    pub fn strict() -> Self {
        Self {
            grid: GridLimits::unbounded(),
            ..Default::default()
        }
    }

    /// Load from a JSON file, filling missing fields with defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> LabResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&json)
            .map_err(|e| LabError::config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        tracing::info!("Loaded engine config from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> LabResult<()> {
        let s = &self.solver;
        if !(s.lower_vol > 0.0 && s.lower_vol < s.upper_vol && s.upper_vol.is_finite()) {
            return Err(LabError::config(format!(
                "solver bracket must satisfy 0 < lower < upper, got [{}, {}]",
                s.lower_vol, s.upper_vol
            )));
        }
        if !(s.tolerance > 0.0) {
            return Err(LabError::config("solver tolerance must be positive"));
        }
        if s.max_iterations == 0 {
            return Err(LabError::config("solver max_iterations must be at least 1"));
        }
        if self.ticker_count == 0 {
            return Err(LabError::config("ticker_count must be at least 1"));
        }
        if self.grid.max_cells == Some(0) {
            return Err(LabError::config("grid max_cells must be positive"));
        }
        Ok(())
    }
}
