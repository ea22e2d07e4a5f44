//! Module for rendering individual slices to disk

// crate modules
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::norm::Normalize;
use crate::raster::{Bitmap, Dither};
use crate::volume::Interpolant;

// volstack modules
use volstack_utils::f;

// standard library
use std::path::Path;

// external crates
use image::GrayImage;
use itertools::iproduct;
use log::trace;
use nalgebra::Point3;

/// File name prefix shared by every slice image, used to purge old runs
pub const SLICE_PREFIX: &str = "slice";

/// File name of the printable slice image
///
/// ```rust
/// # use volstack_slicer::slice_file_name;
/// assert_eq!(slice_file_name(7), "slice_0007.png");
/// ```
pub fn slice_file_name(index: usize) -> String {
    f!("{SLICE_PREFIX}_{index:04}.png")
}

/// File name of the inverted transparency mask
///
/// ```rust
/// # use volstack_slicer::transparency_file_name;
/// assert_eq!(transparency_file_name(7), "slice_transp_0007.png");
/// ```
pub fn transparency_file_name(index: usize) -> String {
    f!("{SLICE_PREFIX}_transp_{index:04}.png")
}

/// In-plane sample positions of a slice in image order
///
/// Points run along the x coordinates for every y coordinate in turn, so
/// rows of the output image are y and columns are x. The mesh is computed once
/// per run and never modified; every slice pairs it with its own z.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceMesh {
    width: u32,
    height: u32,
    points: Vec<(f64, f64)>,
}

impl SliceMesh {
    /// Mesh of every (x, y) pair of the target grid
    pub fn new(grid: &Grid) -> Self {
        Self {
            width: grid.n_x as u32,
            height: grid.n_y as u32,
            points: iproduct!(&grid.y2, &grid.x2)
                .map(|(y, x)| (*x, *y))
                .collect(),
        }
    }

    /// Width of the slice image in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height of the slice image in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Full 3D query points for a slice at source coordinate `z`
    ///
    /// Allocates a new buffer on every call so concurrent slices never share
    /// mutable state.
    pub fn points_at(&self, z: f64) -> Vec<Point3<f64>> {
        self.points
            .iter()
            .map(|&(x, y)| Point3::new(x, y, z))
            .collect()
    }
}

/// Everything needed to turn a slice index into its pair of images
///
/// All members are borrowed immutably, so a single renderer is shared by every
/// worker of a [SlicePool](crate::SlicePool).
#[derive(Debug, Clone, Copy)]
pub struct SliceRenderer<'a> {
    /// Planned target grid
    pub grid: &'a Grid,
    /// Interpolant over the source volume
    pub interpolant: Interpolant<'a>,
    /// Shared in-plane sample positions
    pub mesh: &'a SliceMesh,
    /// Density to unit interval mapping
    pub norm: &'a dyn Normalize,
    /// Grayscale to 1-bit reduction
    pub dither: Dither,
    /// Directory receiving the images
    pub output_dir: &'a Path,
}

impl SliceRenderer<'_> {
    /// Render one slice and write both of its images
    ///
    /// Writes `slice_{index:04}.png` and its tonal inverse
    /// `slice_transp_{index:04}.png` into the output directory. Failures are
    /// returned immediately, there is no retry.
    pub fn render_slice(&self, index: usize) -> Result<()> {
        let bitmap = self.bitmap(index)?;

        bitmap.write_png(self.output_dir.join(slice_file_name(index)))?;
        bitmap
            .inverted()
            .write_png(self.output_dir.join(transparency_file_name(index)))?;

        trace!("Wrote slice {index}");
        Ok(())
    }

    /// Black and white raster of a slice, before anything is written
    pub fn bitmap(&self, index: usize) -> Result<Bitmap> {
        Ok(Bitmap::from_gray(&self.grayscale(index)?, self.dither))
    }

    /// 8-bit raster of a slice where denser is darker
    pub fn grayscale(&self, index: usize) -> Result<GrayImage> {
        let z = self.grid.z(index)?;

        let levels = self
            .mesh
            .points_at(z)
            .iter()
            .map(|p| -> Result<u8> {
                let density = self.interpolant.at(p)?;
                Ok(gray_level(self.norm.normalize(density)))
            })
            .collect::<Result<Vec<u8>>>()?;

        let (width, height) = (self.mesh.width(), self.mesh.height());
        GrayImage::from_raw(width, height, levels).ok_or(Error::EmptyRaster {
            n_x: width as usize,
            n_y: height as usize,
        })
    }
}

/// Gray level for a normalised density, full density is black
fn gray_level(normalized: f64) -> u8 {
    // float to int casts truncate and saturate
    (255.0 - normalized * 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Dpi;
    use crate::norm::Norm;
    use crate::volume::Volume;
    use image::Luma;

    fn gray_at(image: &GrayImage, x: u32, y: u32) -> Option<u8> {
        image.get_pixel_checked(x, y).map(|Luma([level])| *level)
    }

    #[test]
    fn gray_levels() {
        assert_eq!(gray_level(0.0), 255);
        assert_eq!(gray_level(1.0), 0);
        assert_eq!(gray_level(0.5), 127);
    }

    #[test]
    fn mesh_is_row_major_in_y() {
        let grid = Grid {
            n_x: 2,
            n_y: 3,
            n_z: 1,
            x2: vec![0.0, 1.0],
            y2: vec![0.0, 0.5, 1.0],
            z2: vec![0.0],
        };
        let mesh = SliceMesh::new(&grid);
        let points = mesh.points_at(0.25);

        assert_eq!((mesh.width(), mesh.height()), (2, 3));
        assert_eq!(points.len(), 6);
        assert_eq!(points[1], Point3::new(1.0, 0.0, 0.25));
        assert_eq!(points[2], Point3::new(0.0, 0.5, 0.25));
    }

    #[test]
    fn density_gradient_along_x() {
        // density rises with x, so columns get darker left to right
        let volume = Volume::from_fn([4, 4, 4], |x, _, _| x as f64).unwrap();
        let grid = Grid::plan(volume.shape(), 1.0, Dpi::new(10.0, 20.0, 20.0));
        let mesh = SliceMesh::new(&grid);
        let norm = Norm::linear(0.0, 3.0).unwrap();

        let renderer = SliceRenderer {
            grid: &grid,
            interpolant: Interpolant::new(&volume),
            mesh: &mesh,
            norm: &norm,
            dither: Dither::Threshold,
            output_dir: Path::new("."),
        };

        let image = renderer.grayscale(0).unwrap();
        assert_eq!(image.dimensions(), (grid.n_x as u32, grid.n_y as u32));

        let last = grid.n_x as u32 - 1;
        assert_eq!(gray_at(&image, 0, 0), Some(255));
        assert_eq!(gray_at(&image, last, 0), Some(0));
        assert_eq!(gray_at(&image, last + 1, 0), None);

        // identical along y
        for y in 0..grid.n_y as u32 {
            assert_eq!(gray_at(&image, 1, y), gray_at(&image, 1, 0));
        }
    }

    #[test]
    fn slice_out_of_range() {
        let volume = Volume::from_fn([2, 2, 2], |_, _, _| 1.0).unwrap();
        let grid = Grid::plan(volume.shape(), 1.0, Dpi::new(20.0, 20.0, 20.0));
        let mesh = SliceMesh::new(&grid);
        let norm = Norm::linear(0.0, 1.0).unwrap();

        let renderer = SliceRenderer {
            grid: &grid,
            interpolant: Interpolant::new(&volume),
            mesh: &mesh,
            norm: &norm,
            dither: Dither::default(),
            output_dir: Path::new("."),
        };

        assert!(matches!(
            renderer.render_slice(grid.n_z),
            Err(Error::SliceOutOfRange { .. })
        ));
    }
}
