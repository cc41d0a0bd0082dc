use std::collections::{BTreeMap, HashMap};

/// Dense 2-D grid of reals. In a sinogram rows are radial bins and columns
/// are angles; in an image rows are `y` and columns are `x`.
pub type Grid = ndarray::Array2<f64>;

/// TOF bin id -> sinogram. All sinograms in one set share their extents.
pub type TofSinogram = BTreeMap<i32, Grid>;

/// (radial bin, angle) -> TOF offsets (ps) of the events recorded in that bin
pub type TofEventList = HashMap<(usize, usize), Vec<f32>>;

pub use units::{Lengthf32, Timef32};

/// Speed of light in units of 10^8 m/s (equivalently cm/ns / 10)
#[allow(clippy::excessive_precision)] // Stick to official definition of c
pub const C_1E8_M_S: f64 = 2.997_924_58;

/// Speed of light in mm/ps
#[allow(clippy::excessive_precision)]
pub const C_MM_PS: f64 = 0.299_792_458;
