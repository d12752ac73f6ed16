//! Implied Volatility Solver
//!
//! Inverts the Black-Scholes price for volatility with a safeguarded
//! Newton-Raphson iteration: the root is first bracketed in a fixed volatility
//! interval, then every step is either a Newton step (vega as derivative) that
//! lands strictly inside the current bracket, or a bisection of the bracket.
//!
//! A failed solve is a reportable outcome ([`IvStatus`]), not an error.

use serde::{Deserialize, Serialize};

use super::black_scholes::{price, vega};
use crate::core::{LabError, LabResult, OptionParams, OptionType};

/// Solver settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Lower end of the volatility bracket
    pub lower_vol: f64,
    /// Upper end of the volatility bracket
    pub upper_vol: f64,
    /// Convergence threshold on |model price - market price|
    pub tolerance: f64,
    /// Iteration cap
    pub max_iterations: usize,
    /// Below this vega a Newton step is not attempted
    pub min_vega: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            lower_vol: 1e-6,
            upper_vol: 5.0,
            tolerance: 1e-6,
            max_iterations: 100,
            min_vega: 1e-10,
        }
    }
}

/// Outcome of an implied volatility solve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IvStatus {
    Ok,
    NoMarketPrice,
    NotBracketed,
    MaxIterationsExceeded,
    NegativeOrZeroInput,
}

impl IvStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IvStatus::Ok => "ok",
            IvStatus::NoMarketPrice => "no_market_price",
            IvStatus::NotBracketed => "not_bracketed",
            IvStatus::MaxIterationsExceeded => "max_iterations_exceeded",
            IvStatus::NegativeOrZeroInput => "negative_or_zero_input",
        }
    }
}

/// Implied volatility value (present only when `status == Ok`) and status
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IvResult {
    pub value: Option<f64>,
    pub status: IvStatus,
    /// Iterations spent after bracketing
    #[serde(skip)]
    pub iterations: usize,
}

impl IvResult {
    fn solved(value: f64, iterations: usize) -> Self {
        Self {
            value: Some(value),
            status: IvStatus::Ok,
            iterations,
        }
    }

    fn unresolved(status: IvStatus, iterations: usize) -> Self {
        Self {
            value: None,
            status,
            iterations,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == IvStatus::Ok
    }
}

/// Implied volatility solver
#[derive(Debug, Clone, Copy, Default)]
pub struct ImpliedVolSolver {
    config: SolverConfig,
}

impl ImpliedVolSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Solve for the volatility that reprices `market_price`.
    ///
    /// `params.volatility` is ignored.
    pub fn solve(&self, params: &OptionParams, market_price: Option<f64>) -> IvResult {
        let Some(target) = market_price else {
            return IvResult::unresolved(IvStatus::NoMarketPrice, 0);
        };

        // written so that NaN inputs also fail
        if !(params.spot > 0.0 && params.strike > 0.0 && params.time > 0.0 && target > 0.0) {
            return IvResult::unresolved(IvStatus::NegativeOrZeroInput, 0);
        }

        let cfg = &self.config;
        let model = |vol: f64| {
            price(
                params.spot,
                params.strike,
                params.rate,
                params.dividend_yield,
                vol,
                params.time,
                params.option_type,
            )
        };

        let mut lo = cfg.lower_vol;
        let mut hi = cfg.upper_vol;
        let p_lo = model(lo);
        let p_hi = model(hi);

        if (p_lo - target).abs() < cfg.tolerance {
            return IvResult::solved(lo, 0);
        }
        if (p_hi - target).abs() < cfg.tolerance {
            return IvResult::solved(hi, 0);
        }
        if p_lo > target || p_hi < target {
            tracing::debug!(
                target_price = target,
                p_lo,
                p_hi,
                "market price outside the volatility bracket"
            );
            return IvResult::unresolved(IvStatus::NotBracketed, 0);
        }

        let mut vol = initial_guess(params, target);
        if !(vol > lo && vol < hi) {
            vol = 0.5 * (lo + hi);
        }

        for iteration in 1..=cfg.max_iterations {
            let diff = model(vol) - target;
            if diff.abs() < cfg.tolerance {
                return IvResult::solved(vol, iteration);
            }

            // price is increasing in vol, so the residual sign tells which side the root is on
            if diff > 0.0 {
                hi = vol;
            } else {
                lo = vol;
            }

            let v = vega(
                params.spot,
                params.strike,
                params.rate,
                params.dividend_yield,
                vol,
                params.time,
            );
            let newton = if v > cfg.min_vega {
                Some(vol - diff / v)
            } else {
                None
            };

            vol = match newton {
                Some(next) if next > lo && next < hi => next,
                _ => {
                    tracing::trace!(iteration, vol, vega = v, "bisection step");
                    0.5 * (lo + hi)
                }
            };
        }

        IvResult::unresolved(IvStatus::MaxIterationsExceeded, cfg.max_iterations)
    }
}

/// Brenner-Subrahmanyam at-the-money approximation
fn initial_guess(params: &OptionParams, target: f64) -> f64 {
    target / (0.4 * params.spot * params.time.sqrt())
}

/// Implied volatility with default solver settings, as a `Result`
pub fn implied_volatility(
    market_price: f64,
    spot: f64,
    strike: f64,
    rate: f64,
    div: f64,
    time: f64,
    option_type: OptionType,
) -> LabResult<f64> {
    let params = OptionParams::new(spot, strike, 0.0, rate, div, time, option_type);
    let result = ImpliedVolSolver::default().solve(&params, Some(market_price));
    result.value.ok_or_else(|| {
        LabError::numerical(format!(
            "implied volatility unresolved: {}",
            result.status.as_str()
        ))
    })
}
