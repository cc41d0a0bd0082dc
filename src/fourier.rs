//! Frequency-domain filtering of sinograms.
//!
//! Every column (projection at one angle) is convolved with a ramp filter
//! shaped by a `FilterKernel`, which is what turns plain back-projection into
//! *filtered* back-projection.

pub mod radix2;

use std::str::FromStr;
use std::sync::Arc;

use ndarray::{Array2, Axis, Zip};
use rustfft::{num_complex::Complex64, Fft, FftPlanner};
use serde::Deserialize;

use crate::filter::FilterKernel;
use crate::utils::next_power_of_2;
use crate::{Grid, TofSinogram};

use radix2::DecimationInTime;

/// Which Fourier-transform path is used to filter a sinogram
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    /// Each column separately, through `rustfft`
    #[default]
    Fft1D,
    /// The whole sinogram at once, with a radially symmetric response
    Fft2D,
    /// Each column separately, through the in-crate radix-2 FFT
    Slow,
}

impl FromStr for Transform {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fft1d" | "1d" => Ok(Transform::Fft1D),
            "fft2d" | "2d" => Ok(Transform::Fft2D),
            "slow"         => Ok(Transform::Slow),
            _ => Err(format!("Unknown transform `{s}`: expected one of fft1d, fft2d, slow")),
        }
    }
}

/// In-place complex DFT of a fixed length, both directions unnormalized
pub trait Dft: Sync {
    fn forward(&self, buffer: &mut [Complex64]);
    fn inverse(&self, buffer: &mut [Complex64]);
}

/// `Dft` backed by `rustfft` plans
pub struct Planned {
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl Planned {
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            forward: planner.plan_fft_forward(len),
            inverse: planner.plan_fft_inverse(len),
        }
    }
}

impl Dft for Planned {
    fn forward(&self, buffer: &mut [Complex64]) { self.forward.process(buffer) }
    fn inverse(&self, buffer: &mut [Complex64]) { self.inverse.process(buffer) }
}

pub fn filter_sinogram(transform: Transform, filter: &FilterKernel, sinogram: &Grid) -> Grid {
    let (rows, cols) = sinogram.dim();
    assert!(rows > 1, "Cannot filter a sinogram with {rows} rows");
    log::debug!("Filtering {rows} x {cols} sinogram with {transform:?} and {filter:?}");
    match transform {
        Transform::Fft1D => filter_columns(&Planned::new(padded_len(rows)), filter, sinogram),
        Transform::Slow  => filter_columns(&DecimationInTime::new(padded_len(rows)), filter, sinogram),
        Transform::Fft2D => filter_whole(filter, sinogram),
    }
}

/// Filter every TOF bin's sinogram independently
pub fn filter_sinograms(transform: Transform, filter: &FilterKernel, sinograms: &TofSinogram) -> TofSinogram {
    sinograms.iter()
        .map(|(&bin, sinogram)| (bin, filter_sinogram(transform, filter, sinogram)))
        .collect()
}

fn padded_len(rows: usize) -> usize { next_power_of_2(2 * rows) }

/// Per-bin multipliers for a zero-padded column of length `len`: the
/// spectrum of the discrete ramp kernel, shaped by `filter`.
fn ramp_gains(dft: &impl Dft, len: usize, filter: &FilterKernel) -> Vec<f64> {
    let half = len / 2;
    let mut kernel = vec![Complex64::new(0.0, 0.0); len];
    kernel[0].re = 0.25;
    for i in (1..=half).step_by(2) {
        let value = -1.0 / (std::f64::consts::PI * i as f64).powi(2);
        kernel[i].re = value;
        kernel[len - i].re = value;
    }
    dft.forward(&mut kernel);
    let ramp: Vec<f64> = kernel.iter().map(|k| k.re).collect();

    let mut gains = vec![1.0; len];
    gains[0] = 2.0 * ramp[0];
    for y in 0..=half {
        let gain = 2.0 * ramp[y] * filter.at((y + 1) as f64 / len as f64);
        gains[y] *= gain;
        if y != 0 && y != half { gains[len - y] *= gain; }
    }
    gains
}

fn filter_columns(dft: &impl Dft, filter: &FilterKernel, sinogram: &Grid) -> Grid {
    let rows = sinogram.nrows();
    let len = padded_len(rows);
    let gains = ramp_gains(dft, len, filter);
    let zero = Complex64::new(0.0, 0.0);

    let mut filtered = Grid::zeros(sinogram.dim());
    Zip::from(filtered.columns_mut())
        .and(sinogram.columns())
        .par_for_each(|mut out, column| {
            let mut buffer: Vec<Complex64> = column.iter()
                .map(|&v| Complex64::new(v, 0.0))
                .chain(std::iter::repeat(zero))
                .take(len)
                .collect();
            dft.forward(&mut buffer);
            for (b, &gain) in buffer.iter_mut().zip(&gains) { *b *= gain; }
            dft.inverse(&mut buffer);
            for (o, b) in out.iter_mut().zip(&buffer) { *o = b.re / rows as f64; }
        });
    filtered
}

/// Filter the sinogram as a single 2-D signal, attenuating each frequency
/// according to its distance from the centre of the half-spectrum.
fn filter_whole(filter: &FilterKernel, sinogram: &Grid) -> Grid {
    let (rows, cols) = sinogram.dim();
    let mut planner = FftPlanner::new();
    let (row_forward, row_inverse) = (planner.plan_fft_forward(cols), planner.plan_fft_inverse(cols));
    let (col_forward, col_inverse) = (planner.plan_fft_forward(rows), planner.plan_fft_inverse(rows));

    let mut spectrum: Array2<Complex64> = sinogram.mapv(|v| Complex64::new(v, 0.0));
    transform_lanes(&mut spectrum, Axis(1), &row_forward);
    transform_lanes(&mut spectrum, Axis(0), &col_forward);

    let half_len = cols / 2 + 1;
    let half_x = half_len as f64 / 2.0;
    let half_y = rows     as f64 / 2.0;
    let max_r = (half_x * half_x + half_y * half_y).sqrt();
    let gain = |y: usize, x: usize| {
        let xn = x as f64 - half_x;
        let yn = y as f64 - half_y;
        let r = (xn * xn + yn * yn).sqrt() / max_r;
        filter.at(1.0 - r).abs()
    };
    for ((y, x), value) in spectrum.indexed_iter_mut() {
        // Bins beyond the half-spectrum mirror their conjugate partner
        *value *= if x < half_len { gain(y, x) }
                  else            { gain((rows - y) % rows, cols - x) };
    }

    transform_lanes(&mut spectrum, Axis(0), &col_inverse);
    transform_lanes(&mut spectrum, Axis(1), &row_inverse);
    let size = (rows * cols) as f64;
    spectrum.mapv(|c| c.re / size)
}

fn transform_lanes(data: &mut Array2<Complex64>, axis: Axis, fft: &Arc<dyn Fft<f64>>) {
    let mut buffer = Vec::with_capacity(data.len_of(axis));
    for mut lane in data.lanes_mut(axis) {
        buffer.clear();
        buffer.extend(lane.iter().copied());
        fft.process(&mut buffer);
        lane.iter_mut().zip(&buffer).for_each(|(l, b)| *l = *b);
    }
}
