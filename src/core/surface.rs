//! Metric surfaces
//!
//! Types describing a heatmap request (axes, metric, view options) and the
//! resulting grid of metric values.
//! Grids are stored row-major: `z_matrix[row = y][col = x]`.

use std::io;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::{LabError, LabResult, OptionParams};

/// Input variable that can be swept along a heatmap axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisVariable {
    #[serde(rename = "S")]
    Spot,
    #[serde(rename = "K")]
    Strike,
    #[serde(rename = "T")]
    Time,
    #[serde(rename = "sigma")]
    Volatility,
    #[serde(rename = "r")]
    Rate,
    #[serde(rename = "q")]
    DividendYield,
}

impl AxisVariable {
    pub fn label(&self) -> &'static str {
        match self {
            AxisVariable::Spot => "S",
            AxisVariable::Strike => "K",
            AxisVariable::Time => "T",
            AxisVariable::Volatility => "sigma",
            AxisVariable::Rate => "r",
            AxisVariable::DividendYield => "q",
        }
    }

    /// Copy of `params` with this variable overridden.
    ///
    /// Time is clamped at zero.
    pub fn apply(&self, params: &OptionParams, value: f64) -> OptionParams {
        let mut p = *params;
        match self {
            AxisVariable::Spot => p.spot = value,
            AxisVariable::Strike => p.strike = value,
            AxisVariable::Time => p.time = value.max(0.0),
            AxisVariable::Volatility => p.volatility = value,
            AxisVariable::Rate => p.rate = value,
            AxisVariable::DividendYield => p.dividend_yield = value,
        }
        p
    }

    /// Check that every value in `[min, max]` is a legal input for this variable
    pub fn check_range(&self, range: &AxisRange) -> LabResult<()> {
        if !range.min.is_finite() || !range.max.is_finite() {
            return Err(LabError::validation(format!(
                "{} axis range must be finite, got [{}, {}]",
                self.label(),
                range.min,
                range.max
            )));
        }
        let lowest = range.min.min(range.max);
        let ok = match self {
            AxisVariable::Spot | AxisVariable::Strike => lowest > 0.0,
            AxisVariable::Volatility => lowest >= 0.0,
            AxisVariable::Time | AxisVariable::Rate | AxisVariable::DividendYield => true,
        };
        if ok {
            Ok(())
        } else {
            Err(LabError::validation(format!(
                "{} axis range [{}, {}] leaves the valid domain",
                self.label(),
                range.min,
                range.max
            )))
        }
    }
}

/// Inclusive sweep range for one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
    pub steps: usize,
}

impl AxisRange {
    pub fn new(min: f64, max: f64, steps: usize) -> Self {
        Self { min, max, steps }
    }
}

/// A swept variable together with its range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    pub variable: AxisVariable,
    pub min: f64,
    pub max: f64,
    pub steps: usize,
}

impl AxisSpec {
    pub fn new(variable: AxisVariable, min: f64, max: f64, steps: usize) -> Self {
        Self {
            variable,
            min,
            max,
            steps,
        }
    }

    pub fn from_range(variable: AxisVariable, range: AxisRange) -> Self {
        Self::new(variable, range.min, range.max, range.steps)
    }

    pub fn range(&self) -> AxisRange {
        AxisRange::new(self.min, self.max, self.steps)
    }
}

/// Output quantity plotted on a heatmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "Call Price")]
    CallPrice,
    #[serde(rename = "Put Price")]
    PutPrice,
    /// Option value minus a reference premium
    #[serde(rename = "PnL")]
    Pnl,
    Delta,
    Gamma,
    Vega,
    Theta,
    Rho,
    /// Implied volatility of the ticker's market price
    #[serde(rename = "IV")]
    ImpliedVol,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::CallPrice => "Call Price",
            Metric::PutPrice => "Put Price",
            Metric::Pnl => "PnL",
            Metric::Delta => "Delta",
            Metric::Gamma => "Gamma",
            Metric::Vega => "Vega",
            Metric::Theta => "Theta",
            Metric::Rho => "Rho",
            Metric::ImpliedVol => "IV",
        }
    }
}

/// How the three grids are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Each ticker's raw grid
    #[default]
    Three,
    /// Grids after the first are differences against the first
    Compare,
}

/// Colour scale policy across grids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleMode {
    #[default]
    Independent,
    Shared,
}

/// Two-dimensional grid of a metric
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeatmapGrid {
    #[serde(rename = "xValues")]
    pub x_values: Vec<f64>,
    #[serde(rename = "yValues")]
    pub y_values: Vec<f64>,
    /// Indexed `[y][x]`
    #[serde(rename = "zMatrix")]
    pub z_matrix: Vec<Vec<f64>>,
}

impl HeatmapGrid {
    pub fn from_array(x_values: Vec<f64>, y_values: Vec<f64>, z: &Array2<f64>) -> Self {
        let z_matrix = z.outer_iter().map(|row| row.to_vec()).collect();
        Self {
            x_values,
            y_values,
            z_matrix,
        }
    }

    /// Matrix as an `(n_y, n_x)` array, or `None` if the rows are ragged
    pub fn to_array(&self) -> Option<Array2<f64>> {
        if !self.is_consistent() {
            return None;
        }
        let flat: Vec<f64> = self.z_matrix.iter().flatten().copied().collect();
        Array2::from_shape_vec((self.y_values.len(), self.x_values.len()), flat).ok()
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.y_values.len(), self.x_values.len())
    }

    /// Row count matches y values and every row matches x values
    pub fn is_consistent(&self) -> bool {
        self.z_matrix.len() == self.y_values.len()
            && self.z_matrix.iter().all(|row| row.len() == self.x_values.len())
    }

    /// Finite (min, max) over the matrix
    pub fn z_range(&self) -> Option<(f64, f64)> {
        self.z_matrix
            .iter()
            .flatten()
            .filter(|z| z.is_finite())
            .fold(None, |acc, &z| match acc {
                None => Some((z, z)),
                Some((lo, hi)) => Some((lo.min(z), hi.max(z))),
            })
    }

    /// Write the grid as CSV: a `Y / X` header row of x values, then one
    /// row per y value. Non-finite cells are left empty.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> LabResult<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        let field = |v: &f64| if v.is_finite() { v.to_string() } else { String::new() };

        let header = std::iter::once("Y / X".to_string()).chain(self.x_values.iter().map(field));
        wtr.write_record(header)?;
        for (y, row) in self.y_values.iter().zip(self.z_matrix.iter()) {
            wtr.write_record(std::iter::once(field(y)).chain(row.iter().map(field)))?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// [`write_csv`](Self::write_csv) into a string
    pub fn to_csv(&self) -> LabResult<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        String::from_utf8(buf).map_err(|e| LabError::serialization(e.to_string()))
    }
}

/// Colour range per grid.
///
/// In compare mode the diff grids (index > 0) get ranges centred on zero.
pub fn value_ranges(
    grids: &[HeatmapGrid],
    view_mode: ViewMode,
    scale_mode: ScaleMode,
) -> Vec<Option<(f64, f64)>> {
    let own: Vec<Option<(f64, f64)>> = grids.iter().map(|g| g.z_range()).collect();
    let symmetric = |r: Option<(f64, f64)>| r.map(|(lo, hi)| {
        let m = lo.abs().max(hi.abs());
        (-m, m)
    });
    let merge = |ranges: &[Option<(f64, f64)>]| {
        ranges.iter().flatten().fold(None, |acc: Option<(f64, f64)>, &(lo, hi)| match acc {
            None => Some((lo, hi)),
            Some((a, b)) => Some((a.min(lo), b.max(hi))),
        })
    };

    match (view_mode, scale_mode) {
        (ViewMode::Three, ScaleMode::Independent) => own,
        (ViewMode::Three, ScaleMode::Shared) => {
            let shared = merge(&own[..]);
            own.iter().map(|_| shared).collect()
        }
        (ViewMode::Compare, ScaleMode::Independent) => own
            .iter()
            .enumerate()
            .map(|(i, r)| if i == 0 { *r } else { symmetric(*r) })
            .collect(),
        (ViewMode::Compare, ScaleMode::Shared) => {
            let diffs = symmetric(merge(own.get(1..).unwrap_or(&[])));
            own.iter()
                .enumerate()
                .map(|(i, r)| if i == 0 { *r } else { diffs })
                .collect()
        }
    }
}
