//! Metric Surface Generation
//!
//! Sweeps two option inputs over evenly spaced ranges and evaluates a metric
//! (price, PnL, a Greek or implied volatility) at every grid point.
//!
//! Pipeline per request:
//! 1. **Grid sizing**: step counts resolved against [`GridLimits`]
//! 2. **Evaluation**: one pricing call per (x, y) cell
//! 3. **View mode**: optional diffing against the first ticker's grid

mod compare;
mod config;
mod generator;

pub use compare::*;
pub use config::*;
pub use generator::*;
