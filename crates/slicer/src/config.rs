// crate modules
use crate::error::{Error, Result};
use crate::grid::{Dpi, SliceSelection};
use crate::norm::NormSpec;
use crate::raster::Dither;

// standard library
use std::path::PathBuf;

/// Parameters for turning a volume into a slice stack
///
/// Fields are public for direct use, but [StackConfig::builder()] is usually
/// more readable. Validation is deferred to
/// [process()](StackConfig::process) so that nothing here can fail.
///
/// ```rust, no_run
/// # use volstack_slicer::{Sequential, StackConfig, Volume};
/// # let volume = Volume::from_fn([8, 8, 8], |x, y, z| (x + y + z) as f64).unwrap();
/// let config = StackConfig::builder()
///     .height(5.0)
///     .dpi(600.0, 600.0, 1200.0)
///     .output_dir("./print/slices")
///     .norm("linear")
///     .vmax(30.0)
///     .build();
///
/// let summary = config.process(&volume, &Sequential).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct StackConfig {
    /// Physical height of the printed volume [cm]
    pub height: f64,
    /// Printer resolution
    pub dpi: Dpi,
    /// Directory receiving the slice images
    pub output_dir: PathBuf,
    /// How to choose the normalisation
    pub norm: NormSpec,
    /// Density mapped to 0, derived from the data if unset
    pub vmin: Option<f64>,
    /// Density mapped to 1, derived from the data if unset
    pub vmax: Option<f64>,
    /// Which slices to produce
    pub slices: SliceSelection,
    /// Grayscale to 1-bit reduction
    pub dither: Dither,
    /// Do not print the kdam progress bar
    pub disable_progress: bool,
}

impl StackConfig {
    /// Start a [StackConfigBuilder] with default parameters
    pub fn builder() -> StackConfigBuilder {
        StackConfigBuilder::default()
    }

    /// Check that the physical parameters are usable
    pub fn validate(&self) -> Result<()> {
        let parameters = [
            ("height", self.height),
            ("dpi_x", self.dpi.x),
            ("dpi_y", self.dpi.y),
            ("dpi_z", self.dpi.z),
        ];

        for (name, value) in parameters {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidParameter { name, value });
            }
        }

        Ok(())
    }
}

impl Default for StackConfig {
    fn default() -> Self {
        StackConfigBuilder::default().build()
    }
}

/// Builder implementation for [StackConfig]
///
/// Any number of parameters can be set with chained calls before
/// [build()](StackConfigBuilder::build).
///
/// | Parameter   | Default                     |
/// | ----------- | --------------------------- |
/// | height      | 10 cm                       |
/// | dpi         | 600 x 600 x 1200            |
/// | output_dir  | `slices`                    |
/// | norm        | logarithmic, data bounds    |
/// | slices      | all                         |
/// | dither      | Floyd-Steinberg             |
/// | progress    | enabled                     |
#[derive(Debug, Clone)]
pub struct StackConfigBuilder {
    height: f64,
    dpi: Dpi,
    output_dir: PathBuf,
    norm: NormSpec,
    vmin: Option<f64>,
    vmax: Option<f64>,
    slices: SliceSelection,
    dither: Dither,
    disable_progress: bool,
}

impl StackConfigBuilder {
    /// Create a new instance of the builder with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the [StackConfig] type
    pub fn build(self) -> StackConfig {
        StackConfig {
            height: self.height,
            dpi: self.dpi,
            output_dir: self.output_dir,
            norm: self.norm,
            vmin: self.vmin,
            vmax: self.vmax,
            slices: self.slices,
            dither: self.dither,
            disable_progress: self.disable_progress,
        }
    }

    /// Physical height of the printed volume [cm]
    pub fn height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    /// Printer resolution for all three axes [dpi]
    pub fn dpi(mut self, x: f64, y: f64, z: f64) -> Self {
        self.dpi = Dpi::new(x, y, z);
        self
    }

    /// In-plane resolution along x [dpi]
    pub fn dpi_x(mut self, dpi: f64) -> Self {
        self.dpi.x = dpi;
        self
    }

    /// In-plane resolution along y [dpi]
    pub fn dpi_y(mut self, dpi: f64) -> Self {
        self.dpi.y = dpi;
        self
    }

    /// Layer resolution along z [dpi]
    pub fn dpi_z(mut self, dpi: f64) -> Self {
        self.dpi.z = dpi;
        self
    }

    /// Directory receiving the slice images
    ///
    /// Created if missing. Any existing `slice*.png` files in it are deleted
    /// at the start of a run.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }

    /// Normalisation keyword, kind, or prebuilt mapping
    pub fn norm(mut self, norm: impl Into<NormSpec>) -> Self {
        self.norm = norm.into();
        self
    }

    /// Density mapped to 0
    pub fn vmin(mut self, vmin: f64) -> Self {
        self.vmin = Some(vmin);
        self
    }

    /// Density mapped to 1
    pub fn vmax(mut self, vmax: f64) -> Self {
        self.vmax = Some(vmax);
        self
    }

    /// Only produce a subset of slices
    ///
    /// Accepts a single index or a list of indices into the full stack.
    pub fn slices(mut self, slices: impl Into<SliceSelection>) -> Self {
        self.slices = slices.into();
        self
    }

    /// Grayscale to 1-bit reduction
    pub fn dither(mut self, dither: Dither) -> Self {
        self.dither = dither;
        self
    }

    /// Do not print the kdam progress bar
    pub fn disable_progress(mut self, disable: bool) -> Self {
        self.disable_progress = disable;
        self
    }
}

impl Default for StackConfigBuilder {
    fn default() -> Self {
        Self {
            height: 10.0,
            dpi: Dpi::default(),
            output_dir: PathBuf::from("slices"),
            norm: NormSpec::Auto,
            vmin: None,
            vmax: None,
            slices: SliceSelection::All,
            dither: Dither::FloydSteinberg,
            disable_progress: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn builder_defaults() {
        let config = StackConfig::default();
        assert_eq!(config.height, 10.0);
        assert_eq!(config.dpi, Dpi::new(600.0, 600.0, 1200.0));
        assert_eq!(config.output_dir, PathBuf::from("slices"));
        assert!(matches!(config.norm, NormSpec::Auto));
        assert_eq!(config.slices, SliceSelection::All);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder_setters() {
        let config = StackConfig::builder()
            .dpi(1.0, 2.0, 3.0)
            .dpi_y(4.0)
            .slices(5_usize)
            .vmin(0.0)
            .norm("lin")
            .build();
        assert_eq!(config.dpi, Dpi::new(1.0, 4.0, 3.0));
        assert_eq!(config.slices, SliceSelection::Only(vec![5]));
        assert_eq!(config.vmin, Some(0.0));
        assert!(matches!(config.norm, NormSpec::Keyword(ref k) if k == "lin"));
    }

    #[rstest]
    #[case(StackConfig::builder().height(0.0), "height")]
    #[case(StackConfig::builder().height(f64::NAN), "height")]
    #[case(StackConfig::builder().dpi_x(-600.0), "dpi_x")]
    #[case(StackConfig::builder().dpi_y(f64::INFINITY), "dpi_y")]
    #[case(StackConfig::builder().dpi_z(0.0), "dpi_z")]
    fn invalid_parameters(#[case] builder: StackConfigBuilder, #[case] expected: &str) {
        let result = builder.build().validate();
        assert!(matches!(result, Err(Error::InvalidParameter { name, .. }) if name == expected));
    }
}
