//! # BS Lab - Black-Scholes Pricing and Metric Surfaces
//!
//! A pricing engine for European options on a small batch of underlyings.
//!
//! ## Overview
//!
//! For every ticker in a request the engine computes:
//! - **Prices**: Black-Scholes-Merton call and put values with continuous dividend yield
//! - **Greeks**: delta, gamma, vega, theta, rho in closed form
//! - **Implied volatility**: from an optional quoted market price
//! - **Heatmap**: a chosen metric over two swept inputs, optionally diffed
//!   against the first ticker
//!
//! ## Key Components
//!
//! - **Black-Scholes**: Closed-form price and Greeks ([`models::black_scholes`])
//! - **IV Solver**: Bracketed Newton-Raphson with bisection fallback ([`models::implied_vol`])
//! - **Surface Generator**: Two-axis metric grids ([`heatmap`])
//! - **Compute Engine**: Request validation and result assembly ([`engine`])
//!
//! ## Usage
//!
//! ```rust
//! use bs_lab::prelude::*;
//!
//! let request = ComputeRequest::lab_default(TimeHorizon::days(30.0));
//! let result = ComputeEngine::default().compute(&request);
//!
//! assert!(result.error.is_none());
//! assert_eq!(result.tickers.len(), 3);
//! ```
//!
//! ## What This Engine Does NOT Do
//!
//! - Price American exercise or discrete dividends
//! - Aggregate Greeks across positions
//! - Calibrate a volatility smile
//! - Fetch market data or read the system clock

pub mod config;
pub mod core;
pub mod engine;
pub mod heatmap;
pub mod models;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        value_ranges, AxisRange, AxisSpec, AxisVariable, GreekSet, GreekUnits, HeatmapGrid,
        LabError, LabResult, Metric, OptionParams, OptionType, ScaleMode, TimeHorizon, ViewMode,
    };

    // Models
    pub use crate::models::{
        greeks as bs_greeks, implied_volatility, norm_cdf, norm_pdf, price as bs_price,
        price_and_greeks, ImpliedVolSolver, IvResult, IvStatus, SolverConfig,
    };

    // Heatmaps
    pub use crate::heatmap::{apply_view_mode, diff_against, linspace, GridLimits, SurfaceGenerator};

    // Engine
    pub use crate::config::EngineConfig;
    pub use crate::engine::{
        run_compute, ComputeEngine, ComputeRequest, ComputeResult, HeatmapRequest, TickerResult,
    };
}

// Re-export main types at crate root
pub use crate::config::EngineConfig;
pub use crate::core::{LabError, LabResult};
pub use crate::engine::{run_compute, ComputeEngine, ComputeRequest, ComputeResult};
