//! Forward projection: synthesize a sinogram from an emission map.
//!
//! In the resulting sinograms rows index the radial (scan) position and
//! columns index the projection angle.

use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::ops::Range;

use ndarray::Axis;
use rayon::prelude::*;

use crate::grid::{Interpolation, MatrixGetter};
use crate::rescale::Rescale;
use crate::utils::set_to_zero_if_small;
use crate::Grid;

/// Projection angles (degrees) covering half a turn
pub const HALF_TURN: Range<f64> = 0.0..180.0;

const EPSILON: f64 = 1e-7;

/// Sinogram of `n_scans` rows by `n_views` columns, with each line integral
/// computed by walking the image along the ray and interpolating between
/// neighbouring pixels.
///
/// Views are spread evenly over `angles_deg`, the end angle excluded. The
/// integral for scan `s` is stored in row `n_scans - 1 - s`.
pub fn sinogram_with_single_interpolation(
    emission     : &Grid,
    n_views      : usize,
    n_scans      : usize,
    angles_deg   : Range<f64>,
    interpolation: Interpolation,
    rescale      : Rescale,
) -> Grid {
    let size = square_size(emission);
    assert!(n_views > 0, "Forward projection needs at least one view");
    assert!(n_scans > 0, "Forward projection needs at least one scan");
    assert!(angles_deg.start < angles_deg.end,
            "Empty angle range: {} .. {}", angles_deg.start, angles_deg.end);

    let direct     = MatrixGetter::new       (emission);
    let transposed = MatrixGetter::transposed(emission);
    let step = (angles_deg.end - angles_deg.start) / n_views as f64;

    let mut sinogram = Grid::zeros((n_scans, n_views));
    sinogram.axis_iter_mut(Axis(1))
        .into_par_iter()
        .enumerate()
        .for_each(|(view, mut column)| {
            let phi = angles_deg.start + view as f64 * step;
            for scan in 0..n_scans {
                column[n_scans - 1 - scan] = line_integral(
                    direct, transposed, interpolation, phi, scan, n_scans, size
                );
            }
        });
    log::debug!("Single-interpolation sinogram: {n_scans} scans x {n_views} views");
    rescale.apply(sinogram)
}

fn line_integral(
    direct       : MatrixGetter,
    transposed   : MatrixGetter,
    interpolation: Interpolation,
    phi_deg      : f64,
    scan         : usize,
    n_scans      : usize,
    size         : usize,
) -> f64 {
    let scale = size as f64 / n_scans as f64;
    let n = scan as f64 - (n_scans / 2) as f64;
    let angle = (phi_deg - 90.0).to_radians();
    let sin = set_to_zero_if_small(angle.sin(), EPSILON);
    let cos = set_to_zero_if_small(angle.cos(), EPSILON);

    // Steep rays advance one row per step, shallow ones one column per step
    let (a, b, getter, norm) = if sin.abs() > FRAC_1_SQRT_2 {
        (-cos / sin, scale * (n - cos - sin) / sin, direct, sin.abs())
    } else {
        (-sin / cos, scale * (n - cos - sin) / cos, transposed, cos.abs())
    };

    let c = (size / 2) as i64;
    let sum: f64 = (-c..c)
        .map(|i| interpolation.sample(getter, i + c, a * i as f64 + b + c as f64))
        .sum();
    sum / norm
}

/// Sinogram of `size` rows by `n_angles` columns (angles spread evenly over
/// half a turn), each line integral summing the nearest pixels along the chord
/// of the circle inscribed in the image.
///
/// The last row is never filled and remains 0.
pub fn sinogram_with_double_interpolation(emission: &Grid, n_angles: usize, rescale: Rescale) -> Grid {
    let size = square_size(emission);
    assert!(n_angles > 0, "Forward projection needs at least one angle");

    let getter = MatrixGetter::new(emission);
    let center = (size as f64 - 1.0) / 2.0;
    let center_squared = center * center;
    let step = PI / n_angles as f64;

    let mut sinogram = Grid::zeros((size, n_angles));
    sinogram.axis_iter_mut(Axis(1))
        .into_par_iter()
        .enumerate()
        .for_each(|(angle, mut column)| {
            let (sin, cos) = (angle as f64 * step).sin_cos();
            for scan in 0..size - 1 {
                let s = scan as f64 - center;
                let x_start = center + s * cos;
                let y_start = center - s * sin;
                let n_min = if scan == 0 || scan == size - 1 { 0 }
                            else { (center - (center_squared - s * s).sqrt()).floor() as usize };
                let mut p = 0.0;
                for n in n_min..size.saturating_sub(n_min) {
                    let m = n as f64 - center;
                    let x = (x_start - m * sin + 0.5).floor() as i64;
                    let y = (y_start - m * cos + 0.5).floor() as i64;
                    p += getter.get(y, x);
                }
                column[scan] = p;
            }
        });
    log::debug!("Double-interpolation sinogram: {size} scans x {n_angles} angles");
    rescale.apply(sinogram)
}

fn square_size(emission: &Grid) -> usize {
    let (rows, cols) = emission.dim();
    assert!(rows > 0, "Cannot project an empty emission map");
    assert_eq!(rows, cols, "Emission map must be square, got {rows} x {cols}");
    rows
}
