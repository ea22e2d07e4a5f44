//! Resample density volumes into stacks of 1-bit printable slices
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod config;
mod error;
mod grid;
mod norm;
mod pipeline;
mod pool;
mod raster;
mod render;
mod volume;

// inline the main entry points for a nice public API
#[doc(inline)]
pub use pipeline::{prepare_output_dir, process, StackSummary};

#[doc(inline)]
pub use config::{StackConfig, StackConfigBuilder};

#[doc(inline)]
pub use volume::{Interpolant, Volume};

#[doc(inline)]
pub use grid::{Dpi, Grid, SliceSelection, CM_PER_INCH};

#[doc(inline)]
pub use norm::{Norm, NormKind, NormSpec, Normalize};

#[doc(inline)]
pub use pool::{Sequential, SliceJob, SlicePool, WorkerPool, DEFAULT_BATCH_SIZE};

#[doc(inline)]
pub use raster::{Bitmap, Dither};

#[doc(inline)]
pub use render::{
    slice_file_name, transparency_file_name, SliceMesh, SliceRenderer, SLICE_PREFIX,
};

#[doc(inline)]
pub use error::{Error, Result};
