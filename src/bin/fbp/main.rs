// ----------------------------------- CLI -----------------------------------
mod cli;
use cli::Cli;

// --------------------------------------------------------------------------------

use std::error::Error;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use fbpet::Grid;
use fbpet::backprojection::{back_project, back_project_kde, back_project_tof};
use fbpet::config::{read_config_file, Config, Emission, Filter};
use fbpet::filter::FilterKernel;
use fbpet::fourier::{filter_sinogram, filter_sinograms, Transform};
use fbpet::grid::Interpolation;
use fbpet::io::{lors, pgm, raw};
use fbpet::lor::{SinogramBuilder, SINOGRAM_ANGLES};
use fbpet::projection::{sinogram_with_double_interpolation, sinogram_with_single_interpolation, HALF_TURN};
use fbpet::rescale::Rescale;
use fbpet::utils::{group_digits, timing::Progress};

/// Number of LORs binned between updates of the progress bar
const BAR_STEP: usize = 10_000;

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();
    let _logger = flexi_logger::Logger::try_with_env_or_str(&args.log_level)?.start()?;

    let config = match &args.config {
        Some(path) => read_config_file(path)?,
        None       => Config::default(),
    };
    log::debug!("{config:?}");

    // Command line overrides config file
    let Filter { kind, cutoff, alpha } = &config.filter;
    let filter = Filter {
        kind  : args.filter.unwrap_or(*kind),
        cutoff: args.cutoff.or(*cutoff),
        alpha : *alpha,
    };
    let settings = Settings {
        kernel   : filter.kernel(),
        transform: args.transform.unwrap_or(config.transform),
        n_angles : config.n_angles,
        rescale  : config.rescale(),
    };

    // Before starting the computation, make sure that the output directory exists
    let out = args.out.clone().unwrap_or_else(|| default_output(&args.input));
    if let Some(dir) = out.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }

    match rayon::ThreadPoolBuilder::new().num_threads(args.threads).build_global() {
        Err(e) => log::warn!("{e}"),
        Ok(_)  => log::info!("Using up to {} threads.", args.threads),
    }

    let mut progress = Progress::new();
    if args.lors {
        reconstruct_lors(&args, &config, &settings, &out, &mut progress)?;
    } else {
        progress.start("Reading input");
        let input = pgm::read(&args.input)?;
        progress.done_with_message(&format!("Read {} x {} image", input.nrows(), input.ncols()));

        let sinogram = if args.emission {
            progress.start("Forward projection");
            let sinogram = forward_project(&input, config.emission.as_ref());
            progress.done();
            let path = with_suffix(&out, "sinogram");
            write_image(&sinogram, &path, args.raw)?;
            log::info!("Wrote sinogram to {}", path.display());
            sinogram
        } else {
            input
        };

        progress.start("Filtered back-projection");
        let image = settings.reconstruct(&sinogram);
        progress.done();
        write_image(&image, &out, args.raw)?;
        log::info!("Wrote image to {}", out.display());
    }
    Ok(())
}

/// Reconstruction parameters common to all input kinds
struct Settings {
    kernel   : FilterKernel,
    transform: Transform,
    n_angles : Option<usize>,
    rescale  : Rescale,
}

impl Settings {
    fn n_angles(&self, sinogram: &Grid) -> usize { self.n_angles.unwrap_or(sinogram.ncols()) }

    fn reconstruct(&self, sinogram: &Grid) -> Grid {
        let filtered = filter_sinogram(self.transform, &self.kernel, sinogram);
        back_project(&filtered, self.n_angles(&filtered), self.rescale)
    }
}

fn forward_project(emission: &Grid, settings: Option<&Emission>) -> Grid {
    let size = emission.nrows();
    match settings {
        Some(&Emission { double_interpolation: true, views, .. }) =>
            sinogram_with_double_interpolation(emission, views, Rescale::None),
        Some(&Emission { views, scans, interpolation, .. }) =>
            sinogram_with_single_interpolation(emission, views, scans.unwrap_or(size), HALF_TURN, interpolation, Rescale::None),
        None =>
            sinogram_with_single_interpolation(emission, SINOGRAM_ANGLES, size, HALF_TURN, Interpolation::default(), Rescale::None),
    }
}

fn reconstruct_lors(
    args    : &Cli,
    config  : &Config,
    settings: &Settings,
    out     : &Path,
    progress: &mut Progress,
) -> Result<(), Box<dyn Error>> {
    let binning = config.lor.as_ref()
        .ok_or("Reconstructing LORs requires a [lor] section in the config file")?
        .binning();

    progress.start("Reading LORs");
    let lors = lors::read(&args.input)?;
    progress.done_with_message(&format!("Read {} LORs", group_digits(lors.len())));

    let bar = ProgressBar::new(lors.len() as u64);
    bar.set_style(ProgressStyle::default_bar()
                  .template("Binning LORs\n[{elapsed_precise}] {wide_bar} {pos}/{len} ({eta_precise})")?);
    let mut builder = SinogramBuilder::new(binning);
    for chunk in lors.chunks(BAR_STEP) {
        builder.extend(chunk);
        bar.inc(chunk.len() as u64);
    }
    bar.finish();
    if builder.rejected() > 0 {
        log::warn!("Ignored {} of {} LORs", group_digits(builder.rejected()), group_digits(lors.len()));
    }

    let slices = builder.finish();
    let n_slices = slices.len();
    for (n, slice) in slices.into_iter().enumerate() {
        progress.start(&format!("Reconstructing slice {n}"));
        let image = if config.kde {
            let n_angles = settings.n_angles(&slice.sinogram);
            back_project_kde(&slice.sinogram, &slice.tof_events, n_angles, settings.rescale)
        } else if let Some(tof) = &config.tof {
            let filtered = filter_sinograms(settings.transform, &settings.kernel, &slice.tof_sinograms);
            back_project_tof(&filtered, tof.parameters(), tof.weight, settings.rescale)
        } else {
            settings.reconstruct(&slice.sinogram)
        };
        progress.done();

        let path = if n_slices == 1 { out.to_path_buf() } else { with_suffix(out, &format!("slice_{n}")) };
        write_image(&image, &path, args.raw)?;
        log::info!("Wrote slice {n} to {}", path.display());
    }
    Ok(())
}

fn write_image(image: &Grid, path: &Path, raw: bool) -> Result<(), Box<dyn Error>> {
    if raw { raw::write(image, path)? }
    else   { pgm::write(image, path)? }
    Ok(())
}

/// `dir/name.ext` -> `dir/name_fbp.pgm`
fn default_output(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or(OsStr::new("image")).to_string_lossy();
    input.with_file_name(format!("{stem}_fbp.pgm"))
}

/// `dir/name.ext` -> `dir/name_{suffix}.ext`
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().unwrap_or(OsStr::new("image")).to_string_lossy();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{suffix}.{}", ext.to_string_lossy()),
        None      => format!("{stem}_{suffix}"),
    };
    path.with_file_name(name)
}
