//! Compare mode: grids expressed as differences against the first ticker

use crate::core::{HeatmapGrid, ViewMode};

/// `grid - base` elementwise, or `None` when the two grids differ in shape
pub fn diff_against(base: &HeatmapGrid, grid: &HeatmapGrid) -> Option<HeatmapGrid> {
    if base.shape() != grid.shape() {
        return None;
    }
    let base_z = base.to_array()?;
    let z = grid.to_array()? - &base_z;
    Some(HeatmapGrid::from_array(
        grid.x_values.clone(),
        grid.y_values.clone(),
        &z,
    ))
}

/// Apply the view mode to per-ticker grids.
///
/// In compare mode the first grid is the baseline and is returned unchanged;
/// every later grid is replaced by its difference against the baseline. A grid
/// whose shape does not match the baseline is passed through raw.
pub fn apply_view_mode(grids: Vec<HeatmapGrid>, view_mode: ViewMode) -> Vec<HeatmapGrid> {
    if view_mode == ViewMode::Three || grids.len() < 2 {
        return grids;
    }

    let mut iter = grids.into_iter();
    let Some(base) = iter.next() else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(iter.len() + 1);
    let diffs: Vec<HeatmapGrid> = iter
        .enumerate()
        .map(|(i, grid)| match diff_against(&base, &grid) {
            Some(diff) => diff,
            None => {
                tracing::warn!(
                    index = i + 1,
                    base_shape = ?base.shape(),
                    shape = ?grid.shape(),
                    "grid shape differs from baseline, diff skipped"
                );
                grid
            }
        })
        .collect();
    out.push(base);
    out.extend(diffs);
    out
}
