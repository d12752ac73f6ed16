//! SurfaceGenerator - evaluates a metric over a two-axis parameter sweep

use ndarray::Array2;

use super::GridLimits;
use crate::core::{
    AxisSpec, GreekUnits, HeatmapGrid, LabResult, Metric, OptionParams, OptionType,
};
use crate::models::{greeks, price_params, ImpliedVolSolver};

/// `steps` evenly spaced values from `min` to `max` inclusive.
///
/// `steps <= 1` yields `[min]`.
pub fn linspace(min: f64, max: f64, steps: usize) -> Vec<f64> {
    if steps <= 1 {
        return vec![min];
    }
    let step = (max - min) / (steps - 1) as f64;
    (0..steps).map(|i| min + i as f64 * step).collect()
}

/// Builds metric grids by re-pricing at every (x, y) point
#[derive(Debug, Clone, Default)]
pub struct SurfaceGenerator {
    solver: ImpliedVolSolver,
    limits: GridLimits,
    units: GreekUnits,
}

impl SurfaceGenerator {
    pub fn new(solver: ImpliedVolSolver, limits: GridLimits, units: GreekUnits) -> Self {
        Self {
            solver,
            limits,
            units,
        }
    }

    pub fn limits(&self) -> &GridLimits {
        &self.limits
    }

    /// Generate a grid of `metric` over the two axes.
    ///
    /// PnL is measured against the model price of `base` itself.
    pub fn generate(
        &self,
        base: &OptionParams,
        metric: Metric,
        x_axis: &AxisSpec,
        y_axis: &AxisSpec,
    ) -> LabResult<HeatmapGrid> {
        let reference = price_params(base, base.option_type);
        self.generate_with_reference(base, metric, x_axis, y_axis, reference)
    }

    /// Generate a grid, using `reference_premium` as the PnL entry price.
    ///
    /// Every other field of `base` stays fixed. When both axes sweep the same
    /// variable the x value wins, so all rows are identical.
    pub fn generate_with_reference(
        &self,
        base: &OptionParams,
        metric: Metric,
        x_axis: &AxisSpec,
        y_axis: &AxisSpec,
        reference_premium: f64,
    ) -> LabResult<HeatmapGrid> {
        base.validate()?;
        x_axis.variable.check_range(&x_axis.range())?;
        y_axis.variable.check_range(&y_axis.range())?;

        let (x_steps, y_steps) = self.limits.checked_resolve(x_axis.steps, y_axis.steps)?;
        if (x_steps, y_steps) != (x_axis.steps.max(1), y_axis.steps.max(1)) {
            tracing::warn!(
                requested_x = x_axis.steps,
                requested_y = y_axis.steps,
                x_steps,
                y_steps,
                "heatmap grid capped"
            );
        }
        if x_axis.variable == y_axis.variable {
            tracing::debug!(
                variable = x_axis.variable.label(),
                "both axes sweep the same variable, y axis has no effect"
            );
        }

        let x_values = linspace(x_axis.min, x_axis.max, x_steps);
        let y_values = linspace(y_axis.min, y_axis.max, y_steps);

        let z = Array2::from_shape_fn((y_values.len(), x_values.len()), |(yi, xi)| {
            let point = y_axis.variable.apply(base, y_values[yi]);
            let point = x_axis.variable.apply(&point, x_values[xi]);
            self.evaluate(metric, &point, base.market_price, reference_premium)
        });

        tracing::debug!(
            metric = metric.label(),
            rows = y_values.len(),
            cols = x_values.len(),
            "heatmap generated"
        );

        Ok(HeatmapGrid::from_array(x_values, y_values, &z))
    }

    /// Metric value at one grid point
    fn evaluate(
        &self,
        metric: Metric,
        point: &OptionParams,
        market_price: Option<f64>,
        reference_premium: f64,
    ) -> f64 {
        match metric {
            Metric::CallPrice => price_params(point, OptionType::Call),
            Metric::PutPrice => price_params(point, OptionType::Put),
            Metric::Pnl => price_params(point, point.option_type) - reference_premium,
            Metric::ImpliedVol => match market_price {
                Some(_) => self
                    .solver
                    .solve(point, market_price)
                    .value
                    .unwrap_or(f64::NAN),
                None => point.volatility,
            },
            Metric::Delta | Metric::Gamma | Metric::Vega | Metric::Theta | Metric::Rho => {
                let g = greeks(
                    point.spot,
                    point.strike,
                    point.rate,
                    point.dividend_yield,
                    point.volatility,
                    point.time,
                    point.option_type,
                )
                .in_units(self.units);
                match metric {
                    Metric::Delta => g.delta,
                    Metric::Gamma => g.gamma,
                    Metric::Vega => g.vega,
                    Metric::Theta => g.theta,
                    _ => g.rho,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AxisVariable;
    use crate::models::{price, price_and_greeks};
    use approx::assert_relative_eq;

    fn base() -> OptionParams {
        OptionParams::new(100.0, 100.0, 0.2, 0.05, 0.0, 30.0 / 365.0, OptionType::Call)
    }

    fn spot_axis(steps: usize) -> AxisSpec {
        AxisSpec::new(AxisVariable::Spot, 80.0, 120.0, steps)
    }

    fn vol_axis(steps: usize) -> AxisSpec {
        AxisSpec::new(AxisVariable::Volatility, 0.1, 0.5, steps)
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(80.0, 120.0, 3), vec![80.0, 100.0, 120.0]);
        assert_eq!(linspace(5.0, 9.0, 1), vec![5.0]);
        assert_eq!(linspace(5.0, 9.0, 0), vec![5.0]);
        assert_eq!(linspace(2.0, 2.0, 3), vec![2.0, 2.0, 2.0]);
        assert_eq!(linspace(1.0, 0.0, 3), vec![1.0, 0.5, 0.0]);

        let v = linspace(0.1, 0.5, 5);
        assert_eq!(v.len(), 5);
        assert_relative_eq!(v[4], 0.5, epsilon = 1e-15);
    }

    #[test]
    fn test_grid_shape_and_values() {
        let grid = SurfaceGenerator::default()
            .generate(&base(), Metric::CallPrice, &spot_axis(3), &vol_axis(4))
            .unwrap();

        assert_eq!(grid.x_values, vec![80.0, 100.0, 120.0]);
        assert_eq!(grid.y_values.len(), 4);
        assert_eq!(grid.z_matrix.len(), 4);
        assert!(grid.z_matrix.iter().all(|row| row.len() == 3));

        // row = y (sigma), column = x (spot)
        let p = base();
        for (yi, &sigma) in grid.y_values.iter().enumerate() {
            for (xi, &spot) in grid.x_values.iter().enumerate() {
                let expected = price(spot, p.strike, p.rate, p.dividend_yield, sigma, p.time, OptionType::Call);
                assert_eq!(grid.z_matrix[yi][xi], expected);
            }
        }
    }

    #[test]
    fn test_single_cell_matches_model() {
        let grid = SurfaceGenerator::default()
            .generate(&base(), Metric::Delta, &spot_axis(1), &vol_axis(1))
            .unwrap();

        assert_eq!(grid.shape(), (1, 1));
        let mut at_min = base();
        at_min.spot = 80.0;
        at_min.volatility = 0.1;
        let expected = price_and_greeks(&at_min).unwrap().delta;
        assert_eq!(grid.z_matrix[0][0], expected);
    }

    #[test]
    fn test_put_price_and_pnl() {
        let gen = SurfaceGenerator::default();
        let put = gen
            .generate(&base(), Metric::PutPrice, &spot_axis(3), &vol_axis(3))
            .unwrap();
        let call = gen
            .generate(&base(), Metric::CallPrice, &spot_axis(3), &vol_axis(3))
            .unwrap();
        // puts fall and calls rise with spot
        assert!(put.z_matrix[0][0] > put.z_matrix[0][2]);
        assert!(call.z_matrix[0][0] < call.z_matrix[0][2]);

        // PnL is zero where the grid point equals the base parameters
        let pnl = gen
            .generate(
                &base(),
                Metric::Pnl,
                &spot_axis(3),
                &AxisSpec::new(AxisVariable::Volatility, 0.2, 0.4, 2),
            )
            .unwrap();
        assert!(pnl.z_matrix[0][1].abs() < 1e-12);
        assert!(pnl.z_matrix[0][0] < 0.0);
        assert!(pnl.z_matrix[1][1] > 0.0);

        let fixed = gen
            .generate_with_reference(&base(), Metric::Pnl, &spot_axis(1), &vol_axis(1), 1.0)
            .unwrap();
        let mut at_min = base();
        at_min.spot = 80.0;
        at_min.volatility = 0.1;
        assert_eq!(fixed.z_matrix[0][0], price_params(&at_min, OptionType::Call) - 1.0);
    }

    #[test]
    fn test_greek_units() {
        let raw = SurfaceGenerator::default()
            .generate(&base(), Metric::Theta, &spot_axis(2), &vol_axis(2))
            .unwrap();
        let display = SurfaceGenerator::new(
            ImpliedVolSolver::default(),
            GridLimits::default(),
            GreekUnits::Display,
        )
        .generate(&base(), Metric::Theta, &spot_axis(2), &vol_axis(2))
        .unwrap();
        assert_relative_eq!(display.z_matrix[1][1], raw.z_matrix[1][1] / 365.0, epsilon = 1e-15);
    }

    #[test]
    fn test_same_variable_on_both_axes() {
        let grid = SurfaceGenerator::default()
            .generate(
                &base(),
                Metric::CallPrice,
                &spot_axis(3),
                &AxisSpec::new(AxisVariable::Spot, 50.0, 150.0, 4),
            )
            .unwrap();

        assert_eq!(grid.shape(), (4, 3));
        for row in &grid.z_matrix {
            assert_eq!(row, &grid.z_matrix[0]);
        }
    }

    #[test]
    fn test_time_axis_through_expiry() {
        let grid = SurfaceGenerator::default()
            .generate(
                &base(),
                Metric::CallPrice,
                &spot_axis(3),
                &AxisSpec::new(AxisVariable::Time, -0.5, 0.5, 3),
            )
            .unwrap();
        // negative and zero time both collapse to intrinsic value
        assert_eq!(grid.z_matrix[0], vec![0.0, 0.0, 20.0]);
        assert_eq!(grid.z_matrix[1], vec![0.0, 0.0, 20.0]);
        assert!(grid.z_matrix[2][1] > 0.0);
    }

    #[test]
    fn test_iv_metric() {
        let gen = SurfaceGenerator::default();

        // without a market price the cell reports its own vol input
        let grid = gen
            .generate(&base(), Metric::ImpliedVol, &spot_axis(2), &vol_axis(3))
            .unwrap();
        for (yi, &sigma) in grid.y_values.iter().enumerate() {
            assert!(grid.z_matrix[yi].iter().all(|&z| z == sigma));
        }

        // with a market price the strike axis traces the implied vol of that price
        let quoted = base().with_market_price(2.5);
        let grid = gen
            .generate(
                &quoted,
                Metric::ImpliedVol,
                &AxisSpec::new(AxisVariable::Strike, 100.0, 106.0, 3),
                &vol_axis(1),
            )
            .unwrap();
        let row = &grid.z_matrix[0];
        assert!(row.iter().all(|z| z.is_finite()));
        assert!(row[0] < row[1] && row[1] < row[2]);

        // price below intrinsic at a deep ITM point is unresolvable
        let grid = gen
            .generate(
                &quoted,
                Metric::ImpliedVol,
                &AxisSpec::new(AxisVariable::Spot, 150.0, 150.0, 1),
                &vol_axis(1),
            )
            .unwrap();
        assert!(grid.z_matrix[0][0].is_nan());
    }

    #[test]
    fn test_invalid_axis_range() {
        let gen = SurfaceGenerator::default();
        let bad = AxisSpec::new(AxisVariable::Strike, -10.0, 100.0, 3);
        assert!(gen.generate(&base(), Metric::CallPrice, &bad, &vol_axis(3)).is_err());

        let bad_vol = AxisSpec::new(AxisVariable::Volatility, -0.1, 0.5, 3);
        assert!(gen.generate(&base(), Metric::CallPrice, &spot_axis(3), &bad_vol).is_err());
    }

    #[test]
    fn test_capped_grid() {
        let grid = SurfaceGenerator::default()
            .generate(&base(), Metric::Gamma, &spot_axis(200), &vol_axis(100))
            .unwrap();
        assert_eq!(grid.shape(), (56, 112));
        assert_eq!(grid.x_values[0], 80.0);
        assert_relative_eq!(grid.x_values[111], 120.0, epsilon = 1e-12);
    }
}
