//! Option Greeks
//!
//! Price plus first and second order sensitivities for a single option.

use serde::{Deserialize, Serialize};

/// Price and Greeks computed jointly from one parameter set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GreekSet {
    /// Option value
    pub price: f64,
    /// Delta: dV/dS
    pub delta: f64,
    /// Gamma: d²V/dS²
    pub gamma: f64,
    /// Vega: dV/dσ (per unit of vol)
    pub vega: f64,
    /// Theta: time decay per year
    pub theta: f64,
    /// Rho: dV/dr (per unit of rate)
    pub rho: f64,
}

impl GreekSet {
    pub fn new(price: f64, delta: f64, gamma: f64, vega: f64, theta: f64, rho: f64) -> Self {
        Self {
            price,
            delta,
            gamma,
            vega,
            theta,
            rho,
        }
    }

    /// Re-express vega, theta and rho in the given units
    pub fn in_units(&self, units: GreekUnits) -> Self {
        Self {
            vega: units.vega(self.vega),
            theta: units.theta(self.theta),
            rho: units.rho(self.rho),
            ..*self
        }
    }
}

/// Units used when reporting vega, theta and rho
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GreekUnits {
    /// Analytic derivatives: per unit vol, per year, per unit rate
    #[default]
    Raw,
    /// Trader units: per 1% vol, per calendar day, per 1% rate
    Display,
}

impl GreekUnits {
    pub fn vega(&self, raw: f64) -> f64 {
        match self {
            GreekUnits::Raw => raw,
            GreekUnits::Display => raw / 100.0,
        }
    }

    pub fn theta(&self, raw: f64) -> f64 {
        match self {
            GreekUnits::Raw => raw,
            GreekUnits::Display => raw / 365.0,
        }
    }

    pub fn rho(&self, raw: f64) -> f64 {
        match self {
            GreekUnits::Raw => raw,
            GreekUnits::Display => raw / 100.0,
        }
    }
}
