//! Module for the end-to-end volume to slice stack pipeline

// crate modules
use crate::config::StackConfig;
use crate::error::{Error, Result};
use crate::grid::{Dpi, Grid, SliceSelection};
use crate::norm::NormSpec;
use crate::pool::{Sequential, SlicePool};
use crate::render::{SliceMesh, SliceRenderer, SLICE_PREFIX};
use crate::volume::{Interpolant, Volume};

// volstack modules
use volstack_utils::f;

// standard library
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

// external crates
use kdam::{Bar, BarBuilder, BarExt};
use log::{debug, info, warn};

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct StackSummary {
    /// Planned target grid
    pub grid: Grid,
    /// Description of the normalisation that was used
    pub norm: String,
    /// Slice indices that were written
    pub slices: Vec<usize>,
    /// Directory holding the images
    pub output_dir: PathBuf,
}

impl StackSummary {
    /// Number of image files written, two per slice
    pub fn files_written(&self) -> usize {
        2 * self.slices.len()
    }
}

impl StackConfig {
    /// Resample, normalise, and write the slice stack for a volume
    ///
    /// Everything that can be checked without touching the disk is checked
    /// first: parameters, the normalisation, and the requested slices. Only
    /// then is the output directory prepared and the work handed to `pool`.
    ///
    /// The first failing slice aborts the run and its error is returned.
    pub fn process<P: SlicePool + ?Sized>(&self, volume: &Volume, pool: &P) -> Result<StackSummary> {
        self.validate()?;
        let norm = self.norm.resolve(volume, self.vmin, self.vmax)?;

        let interpolant = Interpolant::new(volume);
        let grid = Grid::plan(volume.shape(), self.height, self.dpi);
        let slices = grid.select(&self.slices)?;

        if !slices.is_empty() && (grid.n_x == 0 || grid.n_y == 0) {
            return Err(Error::EmptyRaster {
                n_x: grid.n_x,
                n_y: grid.n_y,
            });
        }

        let [n_x, n_y, n_z] = volume.shape();
        info!("   Original data: {n_x} x {n_y} x {n_z}");
        info!("Interpolation to: {grid}");
        info!("Saving into {}", self.output_dir.display());

        prepare_output_dir(&self.output_dir)?;

        if slices.is_empty() {
            warn!("No slices to produce for a height of {} cm", self.height);
        }

        let mesh = SliceMesh::new(&grid);
        let renderer = SliceRenderer {
            grid: &grid,
            interpolant,
            mesh: &mesh,
            norm: norm.as_ref(),
            dither: self.dither,
            output_dir: &self.output_dir,
        };

        let progress = Progress::new(slices.len(), self.disable_progress)?;
        let job = |index: usize| -> Result<()> {
            renderer.render_slice(index)?;
            progress.tick();
            Ok(())
        };

        // finish the bar whatever the outcome so the terminal stays tidy
        let outcome = pool.run(&slices, &job);
        progress.finish();
        outcome?;

        debug!("Wrote {} slices", slices.len());

        Ok(StackSummary {
            grid,
            norm: f!("{norm:?}"),
            slices,
            output_dir: self.output_dir.clone(),
        })
    }
}

/// Produce the image stack for 3D printing a volume
///
/// Convenience over [StackConfig] with every parameter spelled out. Passing
/// `None` for the pool runs sequentially.
///
/// ```rust, no_run
/// # use volstack_slicer::{process, Volume, WorkerPool};
/// # let volume = Volume::from_fn([8, 8, 8], |x, y, z| (x + y + z) as f64).unwrap();
/// let pool = WorkerPool::new(4).unwrap();
///
/// // 10cm tall print, logarithmic norm, only the first slice
/// process(
///     &volume, 10.0, 600.0, 600.0, 1200.0, "slices",
///     "log", Some(&pool), None, None, 0_usize,
/// )
/// .unwrap();
/// ```
#[allow(clippy::too_many_arguments)]
pub fn process(
    volume: &Volume,
    height: f64,
    dpi_x: f64,
    dpi_y: f64,
    dpi_z: f64,
    output_dir: impl AsRef<Path>,
    norm: impl Into<NormSpec>,
    pool: Option<&dyn SlicePool>,
    vmin: Option<f64>,
    vmax: Option<f64>,
    slices: impl Into<SliceSelection>,
) -> Result<StackSummary> {
    let config = StackConfig {
        height,
        dpi: Dpi::new(dpi_x, dpi_y, dpi_z),
        output_dir: output_dir.as_ref().to_path_buf(),
        norm: norm.into(),
        vmin,
        vmax,
        slices: slices.into(),
        ..Default::default()
    };

    match pool {
        Some(pool) => config.process(volume, pool),
        None => config.process(volume, &Sequential),
    }
}

/// Make sure the output directory exists and holds no stale slices
///
/// Creates the directory (and parents) if missing, otherwise deletes every
/// `slice*.png` file in it. Anything else in the directory is left alone.
/// Returns the number of files deleted.
pub fn prepare_output_dir(path: &Path) -> Result<usize> {
    if !path.is_dir() {
        fs::create_dir_all(path)?;
        return Ok(0);
    }

    let mut stale = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if entry.file_type()?.is_file() && is_slice_file(&entry.file_name().to_string_lossy()) {
            stale.push(entry.path());
        }
    }

    if !stale.is_empty() {
        info!("Directory exists, deleting {} old files", stale.len());
    }

    for file in &stale {
        fs::remove_file(file)?;
    }

    Ok(stale.len())
}

fn is_slice_file(name: &str) -> bool {
    name.starts_with(SLICE_PREFIX) && name.ends_with(".png")
}

/// Shared kdam bar ticked by every worker
struct Progress {
    bar: Mutex<Bar>,
    disabled: bool,
}

impl Progress {
    fn new(total: usize, disabled: bool) -> Result<Self> {
        let mut bar = BarBuilder::default()
            .total(total)
            .desc("Slicing")
            .unit(" slices")
            .disable(disabled)
            .build()
            .map_err(Error::Progress)?;

        if !disabled {
            bar.refresh()?;
        }

        Ok(Self {
            bar: Mutex::new(bar),
            disabled,
        })
    }

    /// Advance by one slice, a failed terminal write only costs the display
    fn tick(&self) {
        if self.disabled {
            return;
        }

        // a poisoned bar only means another worker panicked mid-update
        let mut bar = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = bar.update(1) {
            warn!("Unable to update progress bar: {e}");
        }
    }

    fn finish(&self) {
        // need an extra line for clean spacing if the progress bar is printed
        if !self.disabled {
            eprintln!();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn slice_file_names() {
        assert!(is_slice_file("slice_0001.png"));
        assert!(is_slice_file("slice_transp_0001.png"));
        assert!(is_slice_file("slices.png"));
        assert!(!is_slice_file("slice_0001.jpg"));
        assert!(!is_slice_file("my_slice_0001.png"));
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn ticking_never_fails(#[case] disabled: bool) {
        // going past the total is only cosmetic
        let progress = Progress::new(3, disabled).unwrap();
        (0..5).for_each(|_| progress.tick());
        progress.finish();
    }

    #[test]
    fn summary_counts_pairs() {
        let summary = StackSummary {
            grid: Grid::plan([2, 2, 2], 1.0, Dpi::default()),
            norm: "Linear".to_string(),
            slices: vec![1, 4, 9],
            output_dir: PathBuf::from("slices"),
        };
        assert_eq!(summary.files_written(), 6);
    }
}
