//! Back-projection of (filtered) sinograms into square images.
//!
//! The image has as many rows and columns as the sinogram has radial bins.
//! Only pixels strictly inside the inscribed circle (the field of view) are
//! ever written; everything else stays exactly zero.

use std::f64::consts::PI;

use rayon::prelude::*;
use serde::Deserialize;

use crate::gauss::{gaussian_weight, normal_pdf};
use crate::rescale::Rescale;
use crate::types::{C_1E8_M_S, C_MM_PS};
use crate::{Grid, TofEventList, TofSinogram};

/// Reconstruct an image from a single sinogram, using its first `n_angles`
/// columns as projections spread evenly over half a turn.
pub fn back_project(sinogram: &Grid, n_angles: usize, rescale: Rescale) -> Grid {
    if sinogram.is_empty() { return Grid::zeros((0, 0)) }
    assert!(n_angles > 0, "Back-projection needs at least one angle");
    assert!(n_angles <= sinogram.ncols(),
            "Requested {n_angles} angles from a sinogram with {} columns", sinogram.ncols());
    let fov = Fov::new(sinogram.nrows(), n_angles);

    let mut image = fov.accumulate(|image, angle| {
        fov.for_each_ray(angle, |ray| image[[ray.y, ray.x]] += sinogram[[ray.n, angle]]);
    });
    image *= fov.angle_step;
    rescale.apply(image)
}

/// Weight given to a TOF bin's contribution, as a function of the distance
/// between the pixel and the most likely annihilation point on the LOR.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TofWeight {
    /// Ignore the TOF information
    #[default]
    Uniform,
    /// Gaussian around the TOF centre of the bin, with unit peak
    Gaussian,
}

impl TofWeight {
    pub fn weight(self, lor_tof_center: f64, lor_position: f64, sigma: f64) -> f64 {
        match self {
            TofWeight::Uniform  => 1.0,
            TofWeight::Gaussian => gaussian_weight(lor_position, lor_tof_center, sigma),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TofParameters {
    /// Radial bin width of the sinograms, in cm
    pub sinogram_accuracy: f64,
    /// Width of one TOF bin, in ps
    pub tof_window: f64,
    /// TOF resolution, in ps
    pub tof_sigma: f64,
}

/// Reconstruct an image from a set of TOF-binned sinograms.
///
/// Pixels further than 3 sigma (in reconstruction space) from the centre of
/// the ray through them receive nothing from that ray.
pub fn back_project_tof(
    sinograms : &TofSinogram,
    parameters: TofParameters,
    weight    : TofWeight,
    rescale   : Rescale,
) -> Grid {
    let Some(first) = sinograms.values().next() else { return Grid::zeros((0, 0)) };
    let dim = first.dim();
    for (bin, sinogram) in sinograms {
        assert_eq!(sinogram.dim(), dim, "Sinogram of TOF bin {bin} differs in size from the others");
    }
    if first.is_empty() { return Grid::zeros((0, 0)) }

    let TofParameters { sinogram_accuracy, tof_window, tof_sigma } = parameters;
    // Speed of light in reconstruction space
    let speed_of_light = C_1E8_M_S * sinogram_accuracy;
    let max_distance = 3.0 * tof_sigma * speed_of_light;
    let fov = Fov::new(dim.0, dim.1);

    let mut image = fov.accumulate(|image, angle| {
        for (&bin, sinogram) in sinograms {
            let lor_tof_center = bin as f64 * tof_window * speed_of_light;
            fov.for_each_ray(angle, |ray| {
                let distance = ray.distance_to_center();
                if distance > max_distance { return }
                let distance = if (ray.x as f64) < ray.center_x { -distance } else { distance };
                image[[ray.y, ray.x]] +=
                    sinogram[[ray.n, angle]] * weight.weight(lor_tof_center, distance, tof_sigma);
            });
        }
    });
    image *= PI / 360.0;
    rescale.apply(image)
}

/// Reconstruct an image by placing, for every recorded event, a normal kernel
/// (sigma 150) at the event's TOF position along its LOR.
///
/// `sinogram` supplies the image size and, in debug builds, a consistency check
/// on the number of events in each bin.
pub fn back_project_kde(
    sinogram  : &Grid,
    tof_events: &TofEventList,
    n_angles  : usize,
    rescale   : Rescale,
) -> Grid {
    if sinogram.is_empty() { return Grid::zeros((0, 0)) }
    assert!(n_angles > 0, "Back-projection needs at least one angle");
    let fov = Fov::new(sinogram.nrows(), n_angles);

    let mut image = fov.accumulate(|image, angle| {
        fov.for_each_ray(angle, |ray| {
            let Some(offsets) = tof_events.get(&(ray.n, angle)) else { return };
            debug_assert_eq!(sinogram.get((ray.n, angle)).copied().unwrap_or(0.0), offsets.len() as f64);
            let distance = ray.distance_to_center();
            image[[ray.y, ray.x]] += offsets.iter()
                .map(|&offset| {
                    let delta = offset as f64 * C_MM_PS;
                    normal_pdf(distance, delta, 150.0) * 1000.0
                })
                .sum::<f64>();
        });
    });
    image *= fov.angle_step;
    rescale.apply(image)
}

// ----- Geometry shared by all back-projectors ---------------------------------------
#[derive(Debug, Clone, Copy)]
struct Fov {
    size: usize,
    n_angles: usize,
    center: f64,
    angle_step: f64,
}

/// The ray through pixel `(x, y)` at a given angle
struct Ray {
    x: usize,
    y: usize,
    /// Radial bin of the ray
    n: usize,
    center_x: f64,
    center_y: f64,
}

impl Ray {
    fn distance_to_center(&self) -> f64 {
        (self.center_x - self.x as f64).hypot(self.center_y - self.y as f64)
    }
}

impl Fov {

    fn new(size: usize, n_angles: usize) -> Self {
        Self {
            size,
            n_angles,
            center: (size as f64 - 1.0) / 2.0,
            angle_step: PI / n_angles as f64,
        }
    }

    fn contains(&self, x: usize, y: usize) -> bool {
        let dx = x as f64 - self.center;
        let dy = y as f64 - self.center;
        dx * dx + dy * dy < self.center * self.center
    }

    fn for_each_ray(&self, angle: usize, mut visit: impl FnMut(Ray)) {
        let (sin, cos) = (angle as f64 * self.angle_step).sin_cos();
        let c = self.center;
        for x in 0..self.size {
            let t_x = (x as f64 - c) * cos + c;
            for y in (0..self.size).filter(|&y| self.contains(x, y)) {
                let t = t_x - (y as f64 - c) * sin;
                let n = (t + 0.5).floor() as usize;
                let along = n as f64 - c;
                visit(Ray { x, y, n, center_x: c + cos * along, center_y: c + sin * along });
            }
        }
    }

    /// Sum, over all angles, the images produced by `project_one_angle`.
    /// Angles are distributed over rayon's threads, each of which fills its
    /// own image; these are added up at the end.
    fn accumulate<F>(&self, project_one_angle: F) -> Grid
    where
        F: Fn(&mut Grid, usize) + Sync + Send,
    {
        let empty = || Grid::zeros((self.size, self.size));
        (0..self.n_angles)
            .into_par_iter()
            .fold(empty, |mut image, angle| {
                project_one_angle(&mut image, angle);
                image
            })
            .reduce(empty, |a, b| a + b)
    }
}
