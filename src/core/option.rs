//! Option parameter definitions
//!
//! A single European option valuation input: spot, strike, volatility, rates,
//! time to expiry and the call/put flag, plus an optional quoted market price.

use serde::{Deserialize, Serialize};

use super::{LabError, LabResult};

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    #[default]
    Call,
    Put,
}

impl OptionType {
    /// Intrinsic value at given spot
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }
}

/// Inputs for one Black-Scholes-Merton valuation.
///
/// Field names on the wire follow the request schema (`S`, `K`, `sigma`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionParams {
    /// Spot price of the underlying
    #[serde(rename = "S")]
    pub spot: f64,
    /// Strike price
    #[serde(rename = "K")]
    pub strike: f64,
    /// Annualized volatility
    #[serde(rename = "sigma")]
    pub volatility: f64,
    /// Continuously compounded risk-free rate
    #[serde(rename = "r", default)]
    pub rate: f64,
    /// Continuous dividend yield
    #[serde(rename = "q", default)]
    pub dividend_yield: f64,
    /// Time to expiry in years
    #[serde(rename = "T")]
    pub time: f64,
    #[serde(default)]
    pub option_type: OptionType,
    /// Quoted option price, used for implied volatility
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_price: Option<f64>,
}

impl OptionParams {
    pub fn new(
        spot: f64,
        strike: f64,
        volatility: f64,
        rate: f64,
        dividend_yield: f64,
        time: f64,
        option_type: OptionType,
    ) -> Self {
        Self {
            spot,
            strike,
            volatility,
            rate,
            dividend_yield,
            time,
            option_type,
            market_price: None,
        }
    }

    /// Convenience constructor for a call with no dividend yield
    pub fn call(spot: f64, strike: f64, volatility: f64, rate: f64, time: f64) -> Self {
        Self::new(spot, strike, volatility, rate, 0.0, time, OptionType::Call)
    }

    /// Convenience constructor for a put with no dividend yield
    pub fn put(spot: f64, strike: f64, volatility: f64, rate: f64, time: f64) -> Self {
        Self::new(spot, strike, volatility, rate, 0.0, time, OptionType::Put)
    }

    pub fn with_market_price(mut self, market_price: f64) -> Self {
        self.market_price = Some(market_price);
        self
    }

    pub fn with_type(mut self, option_type: OptionType) -> Self {
        self.option_type = option_type;
        self
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    /// Copy with a non-negative time to expiry
    pub fn clamped(mut self) -> Self {
        self.time = self.time.max(0.0);
        self
    }

    /// Check the domain the pricing model accepts.
    ///
    /// Negative time is the caller's responsibility and is rejected here.
    pub fn validate(&self) -> LabResult<()> {
        let fields = [
            ("S", self.spot),
            ("K", self.strike),
            ("sigma", self.volatility),
            ("r", self.rate),
            ("q", self.dividend_yield),
            ("T", self.time),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(LabError::validation(format!(
                "{} must be a finite number, got {}",
                name, value
            )));
        }
        if self.spot <= 0.0 {
            return Err(LabError::validation(format!(
                "S must be positive, got {}",
                self.spot
            )));
        }
        if self.strike <= 0.0 {
            return Err(LabError::validation(format!(
                "K must be positive, got {}",
                self.strike
            )));
        }
        if self.volatility < 0.0 {
            return Err(LabError::validation(format!(
                "sigma must be non-negative, got {}",
                self.volatility
            )));
        }
        if self.time < 0.0 {
            return Err(LabError::validation(format!(
                "T must be non-negative, got {}",
                self.time
            )));
        }
        if let Some(p) = self.market_price {
            if p.is_nan() {
                return Err(LabError::validation("market_price must be a number"));
            }
        }
        Ok(())
    }
}
