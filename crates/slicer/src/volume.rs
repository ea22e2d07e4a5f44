//! Module for the source density volume and its interpolant

// crate modules
use crate::error::{Error, Result};

// volstack modules
use volstack_utils::SliceExt;

// external crates
use nalgebra::Point3;

/// Regular 3D grid of density values
///
/// Values are stored row-major with the z index varying fastest, i.e. the
/// value at `(x, y, z)` lives at `(x * n_y + y) * n_z + z`. This matches the
/// memory layout of a C-ordered `[n_x][n_y][n_z]` array.
///
/// Densities are expected to be non-negative but only finiteness is enforced.
/// Anything outside of the normalisation bounds is clipped anyway.
///
/// ```rust
/// # use volstack_slicer::Volume;
/// // 2 x 2 x 2 volume where the density is just the z index
/// let volume = Volume::from_fn([2, 2, 2], |_, _, z| z as f64).unwrap();
///
/// assert_eq!(volume.get(1, 0, 1), Some(1.0));
/// assert_eq!(volume.maximum(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    /// Number of samples along (x, y, z)
    shape: [usize; 3],
    /// Flattened density values
    values: Vec<f64>,
    /// Smallest and largest density
    range: (f64, f64),
}

impl Volume {
    /// Build a volume from flattened values
    ///
    /// Fails if the number of values does not match the shape, if any axis is
    /// empty, or if there are NaN/infinite values.
    pub fn new(shape: [usize; 3], values: Vec<f64>) -> Result<Self> {
        if shape.iter().any(|n| *n == 0) {
            return Err(Error::EmptyDimension(shape));
        }

        let expected = shape.iter().product();
        if values.len() != expected {
            return Err(Error::ShapeMismatch {
                shape,
                expected,
                found: values.len(),
            });
        }

        let range = values.try_range()?;

        Ok(Self {
            shape,
            values,
            range,
        })
    }

    /// Build a volume by evaluating `f(x, y, z)` at every grid index
    pub fn from_fn<F>(shape: [usize; 3], f: F) -> Result<Self>
    where
        F: Fn(usize, usize, usize) -> f64,
    {
        let [n_x, n_y, n_z] = shape;
        let mut values = Vec::with_capacity(n_x * n_y * n_z);
        for x in 0..n_x {
            for y in 0..n_y {
                for z in 0..n_z {
                    values.push(f(x, y, z));
                }
            }
        }
        Self::new(shape, values)
    }

    /// Number of samples along (x, y, z)
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Flattened density values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Largest density in the volume
    pub fn maximum(&self) -> f64 {
        self.range.1
    }

    /// Smallest density in the volume
    pub fn minimum(&self) -> f64 {
        self.range.0
    }

    /// Density at an integer grid index, if it exists
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<f64> {
        let [n_x, n_y, n_z] = self.shape;
        if x >= n_x || y >= n_y || z >= n_z {
            return None;
        }
        Some(self.values[self.index(x, y, z)])
    }

    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.shape[1] + y) * self.shape[2] + z
    }
}

/// Trilinear interpolation over the integer-indexed grid of a [Volume]
///
/// Coordinates are in source index space, so each axis spans
/// `0.0..=(n - 1) as f64`. Queries outside of that box are an error rather
/// than being extrapolated.
///
/// ```rust
/// # use volstack_slicer::{Interpolant, Volume};
/// # use nalgebra::Point3;
/// let volume = Volume::new([2, 1, 1], vec![0.0, 10.0]).unwrap();
/// let interpolant = Interpolant::new(&volume);
///
/// assert_eq!(interpolant.at(&Point3::new(0.25, 0.0, 0.0)).unwrap(), 2.5);
/// assert!(interpolant.at(&Point3::new(1.5, 0.0, 0.0)).is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Interpolant<'a> {
    volume: &'a Volume,
}

impl<'a> Interpolant<'a> {
    /// Interpolant over the native grid of `volume`
    pub fn new(volume: &'a Volume) -> Self {
        Self { volume }
    }

    /// The volume being interpolated
    pub fn volume(&self) -> &'a Volume {
        self.volume
    }

    /// Interpolated density at a point in source index space
    pub fn at(&self, point: &Point3<f64>) -> Result<f64> {
        let [n_x, n_y, n_z] = self.volume.shape;

        let out_of_bounds = || Error::OutOfBounds {
            x: point.x,
            y: point.y,
            z: point.z,
        };

        let (x0, x1, fx) = cell(point.x, n_x).ok_or_else(out_of_bounds)?;
        let (y0, y1, fy) = cell(point.y, n_y).ok_or_else(out_of_bounds)?;
        let (z0, z1, fz) = cell(point.z, n_z).ok_or_else(out_of_bounds)?;

        let v = |x, y, z| self.volume.values[self.volume.index(x, y, z)];

        // collapse along z, then y, then x
        let v00 = lerp(v(x0, y0, z0), v(x0, y0, z1), fz);
        let v01 = lerp(v(x0, y1, z0), v(x0, y1, z1), fz);
        let v10 = lerp(v(x1, y0, z0), v(x1, y0, z1), fz);
        let v11 = lerp(v(x1, y1, z0), v(x1, y1, z1), fz);

        let v0 = lerp(v00, v01, fy);
        let v1 = lerp(v10, v11, fy);

        Ok(lerp(v0, v1, fx))
    }
}

/// Lower index, upper index, and fraction of the cell containing `t`
fn cell(t: f64, n: usize) -> Option<(usize, usize, f64)> {
    let upper = (n - 1) as f64;

    // NaN fails the range check as well
    if !(0.0..=upper).contains(&t) {
        return None;
    }

    let i0 = (t.floor() as usize).min(n - 1);
    let i1 = (i0 + 1).min(n - 1);
    Some((i0, i1, t - i0 as f64))
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    if t == 0.0 {
        a
    } else {
        a + t * (b - a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Volume {
        // f = x + 10y + 100z is reproduced exactly by trilinear interpolation
        Volume::from_fn([3, 4, 5], |x, y, z| (x + 10 * y + 100 * z) as f64).unwrap()
    }

    #[test]
    fn shape_mismatch() {
        let result = Volume::new([2, 2, 2], vec![1.0; 7]);
        assert!(matches!(
            result,
            Err(Error::ShapeMismatch {
                expected: 8,
                found: 7,
                ..
            })
        ));
    }

    #[test]
    fn empty_dimension() {
        assert!(matches!(
            Volume::new([2, 0, 2], Vec::new()),
            Err(Error::EmptyDimension(_))
        ));
    }

    #[test]
    fn undefined_values() {
        let mut values = vec![1.0; 8];
        values[3] = f64::NAN;
        assert!(matches!(
            Volume::new([2, 2, 2], values),
            Err(Error::Numeric(_))
        ));
    }

    #[test]
    fn layout_is_z_fastest() {
        let volume = ramp();
        assert_eq!(volume.values()[1], 100.0);
        assert_eq!(volume.values()[5], 10.0);
        assert_eq!(volume.get(2, 3, 4), Some(432.0));
        assert_eq!(volume.get(3, 0, 0), None);
        assert_eq!(volume.minimum(), 0.0);
        assert_eq!(volume.maximum(), 432.0);
    }

    #[test]
    fn exact_on_nodes() {
        let volume = ramp();
        let interpolant = Interpolant::new(&volume);
        for (x, y, z) in [(0, 0, 0), (2, 3, 4), (1, 2, 3)] {
            let p = Point3::new(x as f64, y as f64, z as f64);
            assert_eq!(interpolant.at(&p).unwrap(), volume.get(x, y, z).unwrap());
        }
    }

    #[test]
    fn linear_between_nodes() {
        let volume = ramp();
        let interpolant = Interpolant::new(&volume);
        let value = interpolant.at(&Point3::new(0.5, 1.25, 3.75)).unwrap();
        assert!((value - (0.5 + 12.5 + 375.0)).abs() < 1e-9);
    }

    #[test]
    fn single_sample_axis() {
        let volume = Volume::from_fn([2, 1, 2], |x, _, z| (x + z) as f64).unwrap();
        let interpolant = Interpolant::new(&volume);
        let value = interpolant.at(&Point3::new(0.5, 0.0, 0.5)).unwrap();
        assert!((value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn outside_of_grid() {
        let volume = ramp();
        let interpolant = Interpolant::new(&volume);
        assert!(interpolant.at(&Point3::new(-0.1, 0.0, 0.0)).is_err());
        assert!(interpolant.at(&Point3::new(0.0, 3.01, 0.0)).is_err());
        assert!(interpolant.at(&Point3::new(0.0, 0.0, f64::NAN)).is_err());
    }
}
