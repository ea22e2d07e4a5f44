//! Common utility for extended `std` types
//!
//! These are left public for convenience.
//!
//! For example, finding the maximum of a float slice or using prettier
//! formatting for scientific numbers are useful everywhere.
#![doc = include_str!("../readme.md")]

// Alias for the format! macro
pub use std::format as f;

// Modules
mod error;
mod float_ext;
mod slice_ext;
mod space;

// Flatten
pub use error::{Error, Result};
pub use float_ext::FloatExt;
pub use slice_ext::SliceExt;
pub use space::{linspace, round_up_even};
