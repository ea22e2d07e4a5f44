//! Result and Error types for volstack-slicer

/// Type alias for `Result<T, slicer::Error>`
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `volstack-slicer` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Underlying file I/O error
    #[error("failure in file I/O")]
    Io(#[from] std::io::Error),

    /// Failure while writing a 1-bit png
    #[error("failed to encode png image")]
    Encoding(#[from] png::EncodingError),

    /// Failure to set up the rayon worker pool
    #[error("failed to build worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Numeric helper failure, e.g. undefined values in the volume
    #[error("invalid numeric data: {0}")]
    Numeric(#[from] volstack_utils::Error),

    /// Normalisation keyword is not recognised
    #[error("\"{0}\" is not a valid normalisation, expected lin, linear, log, or logarithmic")]
    InvalidNorm(String),

    /// Normalisation bounds can not describe a monotonic mapping
    #[error("invalid normalisation bounds (vmin = {vmin}, vmax = {vmax})")]
    InvalidBounds { vmin: f64, vmax: f64 },

    /// Default bounds are derived from the data maximum, which must be positive
    #[error("unable to derive normalisation bounds from maximum density {max}")]
    UndefinedBounds { max: f64 },

    /// Physical height or printer resolution is not positive and finite
    #[error("{name} must be positive and finite, found {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// Number of values does not match the volume shape
    #[error("volume shape {shape:?} needs {expected} values, found {found}")]
    ShapeMismatch {
        shape: [usize; 3],
        expected: usize,
        found: usize,
    },

    /// Every axis of the volume needs at least one sample
    #[error("volume shape {0:?} has an empty dimension")]
    EmptyDimension([usize; 3]),

    /// Requested slice index beyond the planned grid
    #[error("slice {index} is out of range for {n_z} slices")]
    SliceOutOfRange { index: usize, n_z: usize },

    /// Interpolation query outside of the source grid
    #[error("point ({x}, {y}, {z}) is outside of the volume grid")]
    OutOfBounds { x: f64, y: f64, z: f64 },

    /// Planned raster has no pixels along one axis
    #[error("slice raster of {n_x} x {n_y} pixels is empty, increase height or dpi")]
    EmptyRaster { n_x: usize, n_y: usize },

    /// Progress bar could not be initialised
    #[error("progress bar failure: {0}")]
    Progress(String),
}
