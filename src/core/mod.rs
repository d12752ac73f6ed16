//! Core data types for the Black-Scholes lab
//!
//! Defines fundamental types:
//! - OptionParams: Spot, strike, vol, rates, expiry, type (call/put)
//! - GreekSet: Price and sensitivities
//! - TimeHorizon: Expiry expressed as years, days or a date
//! - HeatmapGrid: Metric surface over two swept inputs

pub mod option;
pub mod greeks;
pub mod time;
pub mod surface;
pub mod error;

pub use option::*;
pub use greeks::*;
pub use time::*;
pub use surface::*;
pub use error::*;
