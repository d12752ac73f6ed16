//! Pricing Models
//!
//! Implements:
//! - Black-Scholes-Merton (closed-form price and Greeks)
//! - Implied volatility solver (bracketed Newton-Raphson with bisection fallback)

pub mod black_scholes;
pub mod implied_vol;

pub use black_scholes::*;
pub use implied_vol::*;
