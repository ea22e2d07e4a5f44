//! `volstack` turns volumetric density data into stacks of 1-bit slice
//! images for full-colour 3D printing
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]

// Re-exports of workspace crates.
#[doc(inline)]
pub use volstack_slicer as slicer;

#[doc(inline)]
pub use volstack_utils as utils;
