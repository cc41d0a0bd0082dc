//! Configuration file parser for FBP reconstruction

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, de};
use thiserror::Error;

use units::{cm_, ps_, Length, Time};

use crate::backprojection::{TofParameters, TofWeight};
use crate::filter::{FilterKernel, FilterKind};
use crate::fourier::Transform;
use crate::grid::Interpolation;
use crate::lor::Binning;
use crate::rescale::Rescale;

fn deserialize_uom<'d, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'d>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    <&str>::deserialize(deserializer)?
        .parse::<T>()
        .map_err(de::Error::custom)
}

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {

    #[serde(default)]
    pub filter: Filter,

    /// Fourier transform used when filtering sinograms
    #[serde(default)]
    pub transform: Transform,

    /// Number of sinogram columns used in back-projection. All, if absent.
    pub n_angles: Option<usize>,

    /// Rescale reconstructed images onto `[0, factor]`. No rescaling, if absent.
    pub rescale: Option<RescaleRange>,

    /// Reconstruct LOR data with TOF-weighted back-projection
    pub tof: Option<Tof>,

    /// Reconstruct LOR data with KDE back-projection (takes precedence over `tof`)
    #[serde(default)]
    pub kde: bool,

    /// How LOR data are binned into sinograms
    pub lor: Option<Lor>,

    /// How emission maps are forward-projected
    pub emission: Option<Emission>,
}

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Filter {
    #[serde(default)]
    pub kind: FilterKind,
    pub cutoff: Option<f64>,
    pub alpha: Option<f64>,
}

impl Filter {
    pub fn kernel(&self) -> FilterKernel {
        let kernel = FilterKernel::new(self.kind);
        let kernel = self.cutoff.map_or(kernel, |c| kernel.with_cutoff(c));
        self.alpha.map_or(kernel, |a| kernel.with_alpha(a))
    }
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RescaleRange {
    pub min_cutoff: f64,
    pub factor: f64,
}

impl Config {
    pub fn rescale(&self) -> Rescale {
        self.rescale.as_ref().map_or(Rescale::None, |r| Rescale::range(r.min_cutoff, r.factor))
    }
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Tof {
    /// TOF resolution
    #[serde(deserialize_with = "deserialize_uom")]
    pub sigma: Time,
    /// Width of a TOF bin
    #[serde(deserialize_with = "deserialize_uom")]
    pub window: Time,
    /// Radial bin width of the sinograms, in cm
    pub sinogram_accuracy: f64,
    #[serde(default = "gaussian")]
    pub weight: TofWeight,
}

fn gaussian() -> TofWeight { TofWeight::Gaussian }

impl Tof {
    pub fn parameters(&self) -> TofParameters {
        TofParameters {
            sinogram_accuracy: self.sinogram_accuracy,
            tof_window: ps_(self.window) as f64,
            tof_sigma : ps_(self.sigma ) as f64,
        }
    }
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Lor {
    /// Radius of the reconstructed region
    #[serde(deserialize_with = "deserialize_uom")]
    pub max_radius: Length,
    /// Width of a radial sinogram bin
    #[serde(deserialize_with = "deserialize_uom")]
    pub accuracy: Length,
    /// Number of slices along the scanner axis
    #[serde(default = "one")]
    pub slices: usize,
    #[serde(deserialize_with = "deserialize_uom")]
    pub scintillator_length: Length,
    /// Width of a TOF bin
    #[serde(deserialize_with = "deserialize_uom")]
    pub tof_slice: Time,
}

fn one() -> usize { 1 }

impl Lor {
    pub fn binning(&self) -> Binning {
        Binning::new(cm_(self.max_radius), cm_(self.accuracy), ps_(self.tof_slice),
                     cm_(self.scintillator_length), self.slices)
    }
}

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Emission {
    /// Walk inscribed-circle chords instead of interpolating along rays
    #[serde(default)]
    pub double_interpolation: bool,
    /// Number of projection angles
    #[serde(default = "default_views")]
    pub views: usize,
    /// Number of radial bins. Same as image size, if absent.
    pub scans: Option<usize>,
    #[serde(default)]
    pub interpolation: Interpolation,
}

fn default_views() -> usize { 180 }

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("couldn't read config file `{path}`: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

pub fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let config: String = fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
    Ok(toml::from_str(&config)?)
}
