//! Post-processing of reconstructed images and synthesized sinograms

use crate::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Rescale {
    /// Leave values untouched
    #[default]
    None,
    /// Clip below `min_cutoff`, then map the remaining span onto `[0, factor]`
    Range { min_cutoff: f64, factor: f64 },
}

impl Rescale {

    pub fn range(min_cutoff: f64, factor: f64) -> Self {
        assert!(min_cutoff < factor, "Rescale: min_cutoff ({min_cutoff}) must be smaller than factor ({factor})");
        Rescale::Range { min_cutoff, factor }
    }

    pub fn apply(self, grid: Grid) -> Grid {
        match self {
            Rescale::None                          => non_rescale(grid),
            Rescale::Range { min_cutoff, factor } => rescale(grid, min_cutoff, factor),
        }
    }
}

pub fn non_rescale(grid: Grid) -> Grid { grid }

/// Clip values below `min_cutoff` and linearly map `[min, max]` onto `[0, factor]`.
///
/// A grid whose values are all equal (after clipping) is returned clipped but
/// otherwise unscaled.
pub fn rescale(mut grid: Grid, min_cutoff: f64, factor: f64) -> Grid {
    if grid.is_empty() { return grid }
    grid.mapv_inplace(|v| v.max(min_cutoff));
    let (min, max) = grid.iter().fold((f64::INFINITY, f64::NEG_INFINITY),
                                      |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let span = max - min;
    if span == 0.0 {
        log::warn!("Cannot rescale: all {} values are {min}", grid.len());
        return grid;
    }
    grid.mapv_inplace(|v| (v - min) * factor / span);
    grid
}
