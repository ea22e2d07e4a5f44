use crate::error::{Error, Result};

/// Extends functionality for slices of float arrays
pub trait SliceExt<T> {
    /// Find the minimum value in float arrays
    ///
    /// Only provides the minimum value from a collection of valid numbers. Any
    /// NAN values, infinite values, or empty slices will return an error.
    ///
    /// ```rust
    /// # use volstack_utils::SliceExt;
    /// # use volstack_utils::Error;
    /// assert_eq!([1.1_f64, 0.5, 2.2].try_min(), Ok(0.5));
    /// assert_eq!([1.1_f32, f32::NAN, 2.2].try_min(), Err(Error::SliceContainsUndefinedValues));
    /// assert_eq!(Vec::<f64>::new().try_min(), Err(Error::SliceContainsNoValues));
    /// ```
    ///
    /// Floats do not implement `Ord`, so `total_cmp` is used to get an ordering
    /// once undefined values have been ruled out.
    fn try_min(&self) -> Result<T>;

    /// Find the maximum value in float arrays
    ///
    /// Only provides the maximum value from a collection of valid numbers. Any
    /// NAN values, infinite values, or empty slices will return an error.
    ///
    /// ```rust
    /// # use volstack_utils::SliceExt;
    /// # use volstack_utils::Error;
    /// assert_eq!([1.1_f64, 0.5, 2.2].try_max(), Ok(2.2));
    /// assert_eq!([1.1_f64, f64::INFINITY].try_max(), Err(Error::SliceContainsUndefinedValues));
    /// assert_eq!(Vec::<f32>::new().try_max(), Err(Error::SliceContainsNoValues));
    /// ```
    fn try_max(&self) -> Result<T>;

    /// Find both the minimum and maximum in a single pass
    ///
    /// ```rust
    /// # use volstack_utils::SliceExt;
    /// assert_eq!([3.0_f64, -1.0, 7.5].try_range(), Ok((-1.0, 7.5)));
    /// ```
    fn try_range(&self) -> Result<(T, T)>;
}

macro_rules! impl_slice_ext {
    ($float:ty) => {
        impl SliceExt<$float> for [$float] {
            fn try_min(&self) -> Result<$float> {
                self.try_range().map(|(min, _)| min)
            }

            fn try_max(&self) -> Result<$float> {
                self.try_range().map(|(_, max)| max)
            }

            fn try_range(&self) -> Result<($float, $float)> {
                let (first, rest) = self.split_first().ok_or(Error::SliceContainsNoValues)?;

                if !first.is_finite() {
                    return Err(Error::SliceContainsUndefinedValues);
                }

                rest.iter().try_fold((*first, *first), |(min, max), v| {
                    if !v.is_finite() {
                        return Err(Error::SliceContainsUndefinedValues);
                    }
                    let min = if v.total_cmp(&min).is_lt() { *v } else { min };
                    let max = if v.total_cmp(&max).is_gt() { *v } else { max };
                    Ok((min, max))
                })
            }
        }
    };
}

impl_slice_ext!(f64);
impl_slice_ext!(f32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_value_range() {
        assert_eq!([4.0_f64].try_range(), Ok((4.0, 4.0)));
    }

    #[test]
    fn undefined_values_anywhere() {
        assert!([f64::NAN, 1.0].try_max().is_err());
        assert!([1.0, f64::NEG_INFINITY].try_min().is_err());
    }

    #[test]
    fn extremes_are_valid() {
        assert_eq!([1.1, f64::MAX, 2.2].try_max(), Ok(f64::MAX));
        assert_eq!([1.1, f64::MIN, 2.2].try_min(), Ok(f64::MIN));
    }
}
