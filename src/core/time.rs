//! Time to expiry resolution
//!
//! Converts the ways a user can express an expiry into the year fraction `T`
//! the pricing model consumes. The reference time is always supplied by the
//! caller, so resolution is deterministic.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

const DAYS_PER_YEAR: f64 = 365.0;
const MILLIS_PER_YEAR: f64 = 1000.0 * 3600.0 * 24.0 * DAYS_PER_YEAR;

/// A time horizon expressed in one of the supported modes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TimeHorizon {
    /// Year fraction given directly
    Years { years: f64 },
    /// Calendar days, ACT/365
    Days { days: f64 },
    /// Expiry timestamp measured from `now`, ACT/365
    Date {
        now: NaiveDateTime,
        expiry: NaiveDateTime,
    },
}

impl TimeHorizon {
    pub fn years(years: f64) -> Self {
        TimeHorizon::Years { years }
    }

    pub fn days(days: f64) -> Self {
        TimeHorizon::Days { days }
    }

    pub fn until(now: NaiveDateTime, expiry: NaiveDateTime) -> Self {
        TimeHorizon::Date { now, expiry }
    }

    /// Year fraction, clamped at zero for expiries in the past
    pub fn to_years(&self) -> f64 {
        let t = match *self {
            TimeHorizon::Years { years } => years,
            TimeHorizon::Days { days } => days / DAYS_PER_YEAR,
            TimeHorizon::Date { now, expiry } => {
                (expiry - now).num_milliseconds() as f64 / MILLIS_PER_YEAR
            }
        };
        if t.is_nan() {
            0.0
        } else {
            t.max(0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_days_and_years() {
        assert!((TimeHorizon::days(30.0).to_years() - 30.0 / 365.0).abs() < 1e-15);
        assert_eq!(TimeHorizon::years(0.5).to_years(), 0.5);
    }

    #[test]
    fn test_date_mode() {
        let now = at(2025, 1, 1, 16);
        let expiry = at(2026, 1, 1, 16);
        assert!((TimeHorizon::until(now, expiry).to_years() - 1.0).abs() < 1e-12);

        let half_day = TimeHorizon::until(at(2025, 1, 1, 4), at(2025, 1, 1, 16));
        assert!((half_day.to_years() - 0.5 / 365.0).abs() < 1e-12);
    }

    #[test]
    fn test_past_expiry_clamps_to_zero() {
        let now = at(2025, 6, 1, 0);
        let expiry = at(2025, 5, 1, 0);
        assert_eq!(TimeHorizon::until(now, expiry).to_years(), 0.0);
        assert_eq!(TimeHorizon::days(-3.0).to_years(), 0.0);
    }

    #[test]
    fn test_serde_tagged() {
        let h: TimeHorizon = serde_json::from_str(r#"{"mode":"days","days":30}"#).unwrap();
        assert_eq!(h, TimeHorizon::days(30.0));
    }
}
