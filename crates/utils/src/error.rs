//! Result and Error types for the utils module

/// Type alias for `Result<T, utils::Error>`
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, PartialEq)]
/// The error type for `volstack_utils`
pub enum Error {
    /// An empty slice of floats for SliceExt
    SliceContainsNoValues,

    /// The slice of float values contains things like NAN or INFINITY
    SliceContainsUndefinedValues,

    /// Logarithmic operations need a strictly positive, finite value
    NonPositiveValue { value: f64 },
}

// error boilerplate
impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        match self {
            Self::SliceContainsNoValues => write!(fmt, "slice contains no values"),
            Self::SliceContainsUndefinedValues => {
                write!(fmt, "slice contains NaN or infinite values")
            }
            Self::NonPositiveValue { value } => {
                write!(fmt, "expected a positive finite value, found {value}")
            }
        }
    }
}

// implement standard error trait to use with ? operator
impl std::error::Error for Error {}
