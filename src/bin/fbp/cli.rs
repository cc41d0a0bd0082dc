use std::path::PathBuf;

use fbpet::filter::FilterKind;
use fbpet::fourier::Transform;

/// Command line interface for `fbp` executable
#[derive(clap::Parser, Debug, Clone)]
#[clap(name = "fbp", about = "Filtered back-projection image reconstruction")]
pub (super) struct Cli {
    /// Sinogram (PGM), emission map (PGM, with `--emission`) or LOR list (with `--lors`)
    pub input: PathBuf,

    /// TOML file with reconstruction parameters
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    /// Output image. Derived from the input file name, if absent.
    #[clap(short, long)]
    pub out: Option<PathBuf>,

    /// Filter applied to sinograms: none, ramlak, shepplogan, cosine, hamming
    #[clap(short, long)]
    pub filter: Option<FilterKind>,

    /// Filter cutoff frequency, as a fraction of Nyquist
    #[clap(short = 'k', long)]
    pub cutoff: Option<f64>,

    /// Fourier transform: fft1d, fft2d or slow
    #[clap(short, long)]
    pub transform: Option<Transform>,

    /// Input is an emission map: forward-project it before reconstructing
    #[clap(long, conflicts_with = "lors")]
    pub emission: bool,

    /// Input is a list of LORs: `x1 y1 z1 t1 x2 y2 z2 t2` per line, in cm and ps
    #[clap(long)]
    pub lors: bool,

    /// Write images as raw binary rather than PGM
    #[clap(long)]
    pub raw: bool,

    /// Maximum number of rayon threads
    #[clap(short = 'j', long, default_value = "4")]
    pub threads: usize,

    /// Log level, or a `RUST_LOG`-style filter
    #[clap(short, long, default_value = "info")]
    pub log_level: String,
}
