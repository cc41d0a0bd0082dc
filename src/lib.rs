pub mod types;
pub use types::{Grid, TofSinogram, TofEventList};

pub mod utils;
pub mod gauss;
pub mod filter;
pub mod grid;
pub mod rescale;
pub mod projection;
pub mod fourier;
pub mod backprojection;
pub mod lor;
pub mod io;
pub mod config;
