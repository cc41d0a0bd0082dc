//! Bounds-checked, optionally transposed access to grids, and the
//! interpolation policies used when sampling them at fractional positions.

use serde::Deserialize;

use crate::Grid;

/// Read-only view of a `Grid` in which reads outside its extents yield 0.
///
/// When `transposed`, `get(i, j)` reads element `(j, i)`.
#[derive(Clone, Copy)]
pub struct MatrixGetter<'g> {
    grid: &'g Grid,
    transposed: bool,
}

impl<'g> MatrixGetter<'g> {

    pub fn new       (grid: &'g Grid) -> Self { Self { grid, transposed: false } }
    pub fn transposed(grid: &'g Grid) -> Self { Self { grid, transposed: true  } }

    pub fn get(&self, i: i64, j: i64) -> f64 {
        let (i, j) = if self.transposed { (j, i) } else { (i, j) };
        if i < 0 || j < 0 { return 0.0 }
        self.grid.get((i as usize, j as usize)).copied().unwrap_or(0.0)
    }
}

/// How to sample a grid row at a fractional column position
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Interpolation {
    NearestNeighbour,
    #[default]
    Linear,
}

impl Interpolation {
    pub fn sample(self, grid: MatrixGetter, i: i64, y: f64) -> f64 {
        match self {
            Interpolation::NearestNeighbour => grid.get(i, y.round() as i64),
            Interpolation::Linear => {
                let j = y.floor();
                let w = y - j;
                let j = j as i64;
                (1.0 - w) * grid.get(i, j) + w * grid.get(i, j + 1)
            }
        }
    }
}
