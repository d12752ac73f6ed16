//! Black-Scholes-Merton Model
//!
//! Provides:
//! - European option pricing with continuous dividend yield
//! - Analytic Greeks
//!
//! Degenerate inputs are handled without dividing by zero:
//! - T = 0: the option is worth its intrinsic value. Delta is the exercise
//!   indicator (1 for a call with S > K, -1 for a put with S < K, 0 otherwise,
//!   including S == K); every other Greek is 0.
//! - σ = 0, T > 0: the payoff is deterministic and priced as the discounted
//!   forward intrinsic value. Greeks are the σ → 0 limits of the closed forms,
//!   with the forward-at-the-money case treated as out of the money.

use std::f64::consts::{PI, SQRT_2};

use statrs::function::erf::erfc;

use crate::core::{GreekSet, LabResult, OptionParams, OptionType};

/// Standard normal CDF
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / SQRT_2)
}

/// Standard normal PDF
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Black-Scholes d1 parameter
pub fn d1(spot: f64, strike: f64, rate: f64, div: f64, vol: f64, time: f64) -> f64 {
    ((spot / strike).ln() + (rate - div + 0.5 * vol * vol) * time) / (vol * time.sqrt())
}

/// Black-Scholes d2 parameter
pub fn d2(spot: f64, strike: f64, rate: f64, div: f64, vol: f64, time: f64) -> f64 {
    d1(spot, strike, rate, div, vol, time) - vol * time.sqrt()
}

/// Black-Scholes European option price
pub fn price(
    spot: f64,
    strike: f64,
    rate: f64,
    div: f64,
    vol: f64,
    time: f64,
    option_type: OptionType,
) -> f64 {
    if time <= 0.0 {
        return option_type.intrinsic(spot, strike);
    }

    let df = (-rate * time).exp();
    let div_factor = (-div * time).exp();

    if vol <= 0.0 {
        return option_type.intrinsic(spot * div_factor, strike * df);
    }

    let d1 = d1(spot, strike, rate, div, vol, time);
    let d2 = d2(spot, strike, rate, div, vol, time);

    match option_type {
        OptionType::Call => spot * div_factor * norm_cdf(d1) - strike * df * norm_cdf(d2),
        OptionType::Put => strike * df * norm_cdf(-d2) - spot * div_factor * norm_cdf(-d1),
    }
}

/// Vega: dV/dσ, identical for calls and puts
pub fn vega(spot: f64, strike: f64, rate: f64, div: f64, vol: f64, time: f64) -> f64 {
    if time <= 0.0 || vol <= 0.0 {
        return 0.0;
    }
    let d1 = d1(spot, strike, rate, div, vol, time);
    spot * (-div * time).exp() * norm_pdf(d1) * time.sqrt()
}

/// Black-Scholes price and Greeks.
///
/// Vega is per unit of vol, theta per year, rho per unit of rate.
pub fn greeks(
    spot: f64,
    strike: f64,
    rate: f64,
    div: f64,
    vol: f64,
    time: f64,
    option_type: OptionType,
) -> GreekSet {
    if time <= 0.0 {
        let delta = match option_type {
            OptionType::Call => if spot > strike { 1.0 } else { 0.0 },
            OptionType::Put => if spot < strike { -1.0 } else { 0.0 },
        };
        let value = option_type.intrinsic(spot, strike);
        return GreekSet::new(value, delta, 0.0, 0.0, 0.0, 0.0);
    }

    let df = (-rate * time).exp();
    let div_factor = (-div * time).exp();

    if vol <= 0.0 {
        return deterministic_greeks(spot, strike, rate, div, time, df, div_factor, option_type);
    }

    let d1 = d1(spot, strike, rate, div, vol, time);
    let d2 = d2(spot, strike, rate, div, vol, time);
    let sqrt_t = time.sqrt();
    let pdf_d1 = norm_pdf(d1);

    let value = match option_type {
        OptionType::Call => spot * div_factor * norm_cdf(d1) - strike * df * norm_cdf(d2),
        OptionType::Put => strike * df * norm_cdf(-d2) - spot * div_factor * norm_cdf(-d1),
    };

    // Delta
    let delta = match option_type {
        OptionType::Call => div_factor * norm_cdf(d1),
        OptionType::Put => div_factor * (norm_cdf(d1) - 1.0),
    };

    // Gamma and vega (same for call and put)
    let gamma = div_factor * pdf_d1 / (spot * vol * sqrt_t);
    let vega = spot * div_factor * pdf_d1 * sqrt_t;

    // Theta (per year)
    let term1 = -spot * div_factor * pdf_d1 * vol / (2.0 * sqrt_t);
    let theta = match option_type {
        OptionType::Call => {
            term1 - rate * strike * df * norm_cdf(d2) + div * spot * div_factor * norm_cdf(d1)
        }
        OptionType::Put => {
            term1 + rate * strike * df * norm_cdf(-d2) - div * spot * div_factor * norm_cdf(-d1)
        }
    };

    // Rho
    let rho = match option_type {
        OptionType::Call => strike * time * df * norm_cdf(d2),
        OptionType::Put => -strike * time * df * norm_cdf(-d2),
    };

    GreekSet::new(value, delta, gamma, vega, theta, rho)
}

/// σ → 0 limit: Φ(d1), Φ(d2) collapse to the forward moneyness indicator
#[allow(clippy::too_many_arguments)]
fn deterministic_greeks(
    spot: f64,
    strike: f64,
    rate: f64,
    div: f64,
    time: f64,
    df: f64,
    div_factor: f64,
    option_type: OptionType,
) -> GreekSet {
    let fwd_spot = spot * div_factor;
    let fwd_strike = strike * df;

    match option_type {
        OptionType::Call if fwd_spot > fwd_strike => GreekSet::new(
            fwd_spot - fwd_strike,
            div_factor,
            0.0,
            0.0,
            -rate * fwd_strike + div * fwd_spot,
            strike * time * df,
        ),
        OptionType::Put if fwd_strike > fwd_spot => GreekSet::new(
            fwd_strike - fwd_spot,
            -div_factor,
            0.0,
            0.0,
            rate * fwd_strike - div * fwd_spot,
            -strike * time * df,
        ),
        _ => GreekSet::default(),
    }
}

/// Validate `params` and compute price and Greeks for its option type
pub fn price_and_greeks(params: &OptionParams) -> LabResult<GreekSet> {
    params.validate()?;
    Ok(greeks(
        params.spot,
        params.strike,
        params.rate,
        params.dividend_yield,
        params.volatility,
        params.time,
        params.option_type,
    ))
}

/// Price of `params` for an explicit option type, without validation
pub fn price_params(params: &OptionParams, option_type: OptionType) -> f64 {
    price(
        params.spot,
        params.strike,
        params.rate,
        params.dividend_yield,
        params.volatility,
        params.time,
        option_type,
    )
}
