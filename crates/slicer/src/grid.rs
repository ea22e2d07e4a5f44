//! Module for planning the printer-resolution target grid

// crate modules
use crate::error::{Error, Result};

// volstack modules
use volstack_utils::{linspace, round_up_even};

// external crates
use itertools::Itertools;

/// Centimetres per inch, for converting physical height to dots
pub const CM_PER_INCH: f64 = 2.54;

/// Printer resolution along each axis in dots per inch
///
/// The defaults correspond to a typical binder-jet printer with 600 dpi in
/// the build plane and 1200 layers per inch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dpi {
    /// Resolution along x
    pub x: f64,
    /// Resolution along y
    pub y: f64,
    /// Layer resolution along z
    pub z: f64,
}

impl Dpi {
    /// Resolution from explicit per-axis values
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl Default for Dpi {
    fn default() -> Self {
        Self {
            x: 600.0,
            y: 600.0,
            z: 1200.0,
        }
    }
}

/// Target voxel grid mapped back into source index space
///
/// `x2`, `y2`, and `z2` hold the source-space coordinate of every output
/// pixel column, pixel row, and slice respectively.
///
/// ```rust
/// # use volstack_slicer::{Dpi, Grid};
/// let grid = Grid::plan([10, 10, 10], 1.0, Dpi::new(100.0, 100.0, 200.0));
///
/// assert_eq!((grid.n_x, grid.n_y, grid.n_z), (40, 40, 78));
/// assert_eq!(grid.z2[0], 0.0);
/// assert_eq!(grid.z2[77], 9.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Number of pixel columns, always even
    pub n_x: usize,
    /// Number of pixel rows, always even
    pub n_y: usize,
    /// Number of slices
    pub n_z: usize,
    /// Source x coordinate of each pixel column
    pub x2: Vec<f64>,
    /// Source y coordinate of each pixel row
    pub y2: Vec<f64>,
    /// Source z coordinate of each slice
    pub z2: Vec<f64>,
}

impl Grid {
    /// Plan the target grid for a physical print height
    ///
    /// The number of slices follows from the height and the z resolution. The
    /// in-plane pixel counts keep the aspect given by the per-axis dpi and are
    /// bumped up to the next even number.
    ///
    /// Inputs are assumed positive and finite, see
    /// [StackConfig](crate::StackConfig) for validation.
    pub fn plan(shape: [usize; 3], height_cm: f64, dpi: Dpi) -> Self {
        let n_z = (height_cm * dpi.z / CM_PER_INCH).floor() as usize;
        let n_x = round_up_even((n_z as f64 / dpi.z * dpi.x).floor() as usize);
        let n_y = round_up_even((n_z as f64 / dpi.z * dpi.y).floor() as usize);

        let [s_x, s_y, s_z] = shape.map(|n| n.saturating_sub(1) as f64);

        Self {
            n_x,
            n_y,
            n_z,
            x2: linspace(0.0, s_x, n_x),
            y2: linspace(0.0, s_y, n_y),
            z2: linspace(0.0, s_z, n_z),
        }
    }

    /// Source z coordinate of a slice
    pub fn z(&self, index: usize) -> Result<f64> {
        self.z2
            .get(index)
            .copied()
            .ok_or(Error::SliceOutOfRange {
                index,
                n_z: self.n_z,
            })
    }

    /// Slice indices to produce for a selection
    ///
    /// Explicit indices are kept as given, in the given order, and must all
    /// exist in the full grid. Repeated indices are only kept the first time
    /// they appear so that no slice is rendered twice.
    pub fn select(&self, selection: &SliceSelection) -> Result<Vec<usize>> {
        match selection {
            SliceSelection::All => Ok((0..self.n_z).collect()),
            SliceSelection::Only(indices) => indices
                .iter()
                .unique()
                .map(|&index| self.z(index).map(|_| index))
                .collect(),
        }
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} x {} x {}", self.n_x, self.n_y, self.n_z)
    }
}

/// Which slices of the planned grid should be produced
///
/// Converts from a single index or a list of indices for convenience.
///
/// ```rust
/// # use volstack_slicer::SliceSelection;
/// assert_eq!(SliceSelection::from(5_usize), SliceSelection::Only(vec![5]));
/// assert_eq!(SliceSelection::from(vec![1_usize, 2]), SliceSelection::Only(vec![1, 2]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SliceSelection {
    /// Every slice of the grid
    #[default]
    All,
    /// Only these slice indices
    Only(Vec<usize>),
}

impl From<usize> for SliceSelection {
    fn from(index: usize) -> Self {
        Self::Only(vec![index])
    }
}

impl From<Vec<usize>> for SliceSelection {
    fn from(indices: Vec<usize>) -> Self {
        Self::Only(indices)
    }
}

impl From<&[usize]> for SliceSelection {
    fn from(indices: &[usize]) -> Self {
        Self::Only(indices.to_vec())
    }
}

impl From<Option<usize>> for SliceSelection {
    fn from(index: Option<usize>) -> Self {
        index.map_or(Self::All, Self::from)
    }
}
