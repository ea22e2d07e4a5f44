//! Command line tool for writing slice stacks of a synthetic phantom
//!
//! Useful for checking printer settings before committing real data. The
//! phantom is a gaussian blob centred in the volume.

// volstack modules
use volstack::slicer::{Dither, Sequential, SlicePool, StackConfig, Volume, WorkerPool};

// standard library
use std::path::PathBuf;

// external crates
use clap::{ArgAction, Parser, ValueEnum};
use log::{error, info};

/// Write a printable 1-bit slice stack for a gaussian phantom
#[derive(Parser, Debug)]
#[command(name = "volstack", version, about, long_about = None)]
struct Cli {
    /// Number of voxels along x, y, and z
    #[arg(long, num_args = 3, value_names = ["NX", "NY", "NZ"], default_values_t = [64, 64, 64])]
    shape: Vec<usize>,

    /// Width of the gaussian as a fraction of each axis
    #[arg(long, default_value_t = 0.2)]
    sigma: f64,

    /// Physical height of the print [cm]
    #[arg(long, default_value_t = 10.0)]
    height: f64,

    /// Resolution along x [dpi]
    #[arg(long, default_value_t = 600.0)]
    dpi_x: f64,

    /// Resolution along y [dpi]
    #[arg(long, default_value_t = 600.0)]
    dpi_y: f64,

    /// Layer resolution along z [dpi]
    #[arg(long, default_value_t = 1200.0)]
    dpi_z: f64,

    /// Directory receiving the slice images
    #[arg(short, long, default_value = "slices")]
    output: PathBuf,

    /// Normalisation, 'log' or 'lin'
    #[arg(short, long)]
    norm: Option<String>,

    /// Density mapped to white
    #[arg(long)]
    vmin: Option<f64>,

    /// Density mapped to black
    #[arg(long)]
    vmax: Option<f64>,

    /// Only write these slice indices
    #[arg(short, long = "slice", value_name = "INDEX")]
    slices: Vec<usize>,

    /// Grayscale to black and white reduction
    #[arg(long, value_enum, default_value_t = DitherArg::FloydSteinberg)]
    dither: DitherArg,

    /// Number of worker threads, runs sequentially if omitted
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Silence all output
    #[arg(short, long)]
    quiet: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum DitherArg {
    /// Error diffusion
    FloydSteinberg,
    /// Hard cut at mid-gray
    Threshold,
}

impl From<DitherArg> for Dither {
    fn from(dither: DitherArg) -> Self {
        match dither {
            DitherArg::FloydSteinberg => Dither::FloydSteinberg,
            DitherArg::Threshold => Dither::Threshold,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("Unable to initialise logging: {e}");
    }

    if let Err(e) = run(cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> volstack::slicer::Result<()> {
    let volume = phantom([cli.shape[0], cli.shape[1], cli.shape[2]], cli.sigma)?;

    let mut builder = StackConfig::builder()
        .height(cli.height)
        .dpi(cli.dpi_x, cli.dpi_y, cli.dpi_z)
        .output_dir(cli.output)
        .norm(cli.norm.as_deref())
        .dither(cli.dither.into())
        .disable_progress(cli.quiet);

    if let Some(vmin) = cli.vmin {
        builder = builder.vmin(vmin);
    }

    if let Some(vmax) = cli.vmax {
        builder = builder.vmax(vmax);
    }

    if !cli.slices.is_empty() {
        builder = builder.slices(cli.slices);
    }

    let pool: Box<dyn SlicePool> = match cli.threads {
        Some(threads) => Box::new(WorkerPool::new(threads)?),
        None => Box::new(Sequential),
    };

    let summary = builder.build().process(&volume, pool.as_ref())?;
    info!(
        "Wrote {} files to {}",
        summary.files_written(),
        summary.output_dir.display()
    );

    Ok(())
}

/// Gaussian blob centred in a volume of the given shape
fn phantom(shape: [usize; 3], sigma: f64) -> volstack::slicer::Result<Volume> {
    let [c_x, c_y, c_z] = shape.map(|n| n.saturating_sub(1) as f64 / 2.0);
    let [s_x, s_y, s_z] = shape.map(|n| (sigma * n as f64).max(f64::MIN_POSITIVE));

    Volume::from_fn(shape, |x, y, z| {
        let r2 = ((x as f64 - c_x) / s_x).powi(2)
            + ((y as f64 - c_y) / s_y).powi(2)
            + ((z as f64 - c_z) / s_z).powi(2);
        (-0.5 * r2).exp()
    })
}

fn init_logging(cli: &Cli) -> Result<(), log::SetLoggerError> {
    // show info by default, the stack summary is the main output
    stderrlog::new()
        .module(module_path!())
        .module("volstack_slicer")
        .quiet(cli.quiet)
        .verbosity(cli.verbose as usize + 2)
        .show_level(false)
        .init()
}
