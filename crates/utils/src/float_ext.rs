use crate::error::{Error, Result};
use crate::f;

/// Extends `f64` with rounding and formatting helpers
pub trait FloatExt {
    /// Smallest power of ten greater than or equal to the value
    ///
    /// Only defined for strictly positive, finite values.
    ///
    /// ```rust
    /// # use volstack_utils::FloatExt;
    /// assert_eq!(3.2_f64.ceil_pow10(), Ok(10.0));
    /// assert_eq!(100.0_f64.ceil_pow10(), Ok(100.0));
    /// assert_eq!(0.02_f64.ceil_pow10(), Ok(0.1));
    /// assert!(0.0_f64.ceil_pow10().is_err());
    /// ```
    fn ceil_pow10(&self) -> Result<f64>;

    /// Better scientific number formatting
    ///
    /// The default is not very consistent for scientific in particular, so this
    /// allows the precision and exponent padding to be fixed.
    ///
    /// ```rust
    /// # use volstack_utils::FloatExt;
    /// assert_eq!((-1.0_f64).sci(5, 2), "-1.00000e+00".to_string());
    /// assert_eq!(0.01_f64.sci(2, 2), "1.00e-02".to_string());
    /// ```
    fn sci(&self, precision: usize, exp_pad: usize) -> String;
}

impl FloatExt for f64 {
    fn ceil_pow10(&self) -> Result<f64> {
        if !self.is_finite() || *self <= 0.0 {
            return Err(Error::NonPositiveValue { value: *self });
        }
        Ok(10f64.powi(self.log10().ceil() as i32))
    }

    fn sci(&self, precision: usize, exp_pad: usize) -> String {
        let formatted = f!("{:.precision$e}", self, precision = precision);
        // `{:e}` always contains the exponent marker
        let Some((mantissa, exp)) = formatted.split_once('e') else {
            return formatted;
        };
        let (sign, digits) = match exp.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exp),
        };
        f!("{mantissa}e{sign}{digits:0>exp_pad$}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1.0, 1.0)]
    #[case(1.5, 10.0)]
    #[case(9.99, 10.0)]
    #[case(1234.0, 10000.0)]
    #[case(0.5, 1.0)]
    fn decade_rounding(#[case] value: f64, #[case] expected: f64) {
        let rounded = value.ceil_pow10().unwrap();
        assert!((rounded - expected).abs() < 1e-9 * expected);
    }

    #[test]
    fn decade_rounding_rejects_undefined() {
        assert_eq!(
            (-2.0_f64).ceil_pow10(),
            Err(Error::NonPositiveValue { value: -2.0 })
        );
        assert!(f64::NAN.ceil_pow10().is_err());
    }

    #[test]
    fn wide_exponent_padding() {
        assert_eq!(12345.0_f64.sci(1, 3), "1.2e+004");
    }
}
