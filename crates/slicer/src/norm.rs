//! Module for mapping densities onto the unit interval

// crate modules
use crate::error::{Error, Result};
use crate::volume::Volume;

// volstack modules
use volstack_utils::FloatExt;

// standard library
use std::fmt::Debug;
use std::str::FromStr;
use std::sync::Arc;

// external crates
use log::{debug, info};

/// Monotonic mapping from density to `[0, 1]`
///
/// Implemented by [Norm] for the built-in linear and logarithmic scales, but
/// any mapping can be handed to the pipeline through [NormSpec::prebuilt()].
/// Implementations are shared between worker threads, hence `Send + Sync`.
pub trait Normalize: Debug + Send + Sync {
    /// Map a density onto the unit interval
    fn normalize(&self, value: f64) -> f64;
}

/// Scale used between the normalisation bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormKind {
    /// Linear interpolation between `vmin` and `vmax`
    Linear,
    /// Linear in `ln(value)` between `vmin` and `vmax`
    #[default]
    Logarithmic,
}

impl FromStr for NormKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lin" | "linear" => Ok(Self::Linear),
            "log" | "logarithmic" => Ok(Self::Logarithmic),
            _ => Err(Error::InvalidNorm(s.to_string())),
        }
    }
}

impl std::fmt::Display for NormKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Logarithmic => write!(f, "logarithmic"),
        }
    }
}

/// Linear or logarithmic normalisation with clipping
///
/// Values are clipped into `[vmin, vmax]` before scaling, so anything below
/// `vmin` maps to 0 and anything above `vmax` maps to 1.
///
/// ```rust
/// # use volstack_slicer::{Norm, Normalize};
/// let norm = Norm::logarithmic(1.0, 100.0).unwrap();
///
/// assert!((norm.normalize(10.0) - 0.5).abs() < 1e-12);
/// assert_eq!(norm.normalize(0.0), 0.0);
/// assert_eq!(norm.normalize(1e6), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Norm {
    kind: NormKind,
    vmin: f64,
    vmax: f64,
}

impl Norm {
    /// Normalisation of the given kind between two bounds
    ///
    /// Bounds must be finite with `vmin <= vmax`, and logarithmic scales also
    /// need `vmin > 0`.
    pub fn new(kind: NormKind, vmin: f64, vmax: f64) -> Result<Self> {
        let is_valid = vmin.is_finite()
            && vmax.is_finite()
            && vmin <= vmax
            && (kind == NormKind::Linear || vmin > 0.0);

        if !is_valid {
            return Err(Error::InvalidBounds { vmin, vmax });
        }

        Ok(Self { kind, vmin, vmax })
    }

    /// Linear normalisation between two bounds
    pub fn linear(vmin: f64, vmax: f64) -> Result<Self> {
        Self::new(NormKind::Linear, vmin, vmax)
    }

    /// Logarithmic normalisation between two bounds
    pub fn logarithmic(vmin: f64, vmax: f64) -> Result<Self> {
        Self::new(NormKind::Logarithmic, vmin, vmax)
    }

    /// Scale used between the bounds
    pub fn kind(&self) -> NormKind {
        self.kind
    }

    /// Lower bound, mapped to 0
    pub fn vmin(&self) -> f64 {
        self.vmin
    }

    /// Upper bound, mapped to 1
    pub fn vmax(&self) -> f64 {
        self.vmax
    }
}

impl Normalize for Norm {
    fn normalize(&self, value: f64) -> f64 {
        if value.is_nan() || self.vmin == self.vmax {
            return 0.0;
        }

        let value = value.clamp(self.vmin, self.vmax);

        let scaled = match self.kind {
            NormKind::Linear => (value - self.vmin) / (self.vmax - self.vmin),
            NormKind::Logarithmic => {
                (value.ln() - self.vmin.ln()) / (self.vmax.ln() - self.vmin.ln())
            }
        };

        scaled.clamp(0.0, 1.0)
    }
}

/// How the pipeline should choose its normalisation
///
/// Keywords are only interpreted when the normalisation is resolved, so an
/// invalid keyword surfaces as [Error::InvalidNorm] at the start of a run.
///
/// ```rust
/// # use volstack_slicer::{Norm, NormSpec};
/// let auto = NormSpec::default();
/// let keyword = NormSpec::from("linear");
/// let fixed = NormSpec::prebuilt(Norm::linear(0.0, 5.0).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub enum NormSpec {
    /// Logarithmic scale with bounds derived from the data where unset
    #[default]
    Auto,
    /// Explicit scale with bounds derived from the data where unset
    Kind(NormKind),
    /// Keyword naming the scale, one of `lin`, `linear`, `log`, `logarithmic`
    Keyword(String),
    /// Ready-made normalisation, used as-is
    Prebuilt(Arc<dyn Normalize>),
}

impl NormSpec {
    /// Wrap any normalisation to be used without further resolution
    pub fn prebuilt<N: Normalize + 'static>(norm: N) -> Self {
        Self::Prebuilt(Arc::new(norm))
    }

    /// Resolve into a concrete normalisation for a volume
    ///
    /// Unset bounds default to `vmax = 10^ceil(log10(max))` and
    /// `vmin = vmax / 100`. Explicit bounds, including `0.0`, are used as
    /// given. Prebuilt normalisations ignore the bounds entirely.
    pub fn resolve(
        &self,
        volume: &Volume,
        vmin: Option<f64>,
        vmax: Option<f64>,
    ) -> Result<Arc<dyn Normalize>> {
        let kind = match self {
            Self::Prebuilt(norm) => {
                debug!("Using prebuilt normalisation {norm:?}");
                return Ok(Arc::clone(norm));
            }
            Self::Auto => {
                info!("No norm given, using logarithmic norm");
                NormKind::Logarithmic
            }
            Self::Kind(kind) => *kind,
            Self::Keyword(keyword) => keyword.parse()?,
        };

        let vmax = match vmax {
            Some(v) => v,
            None => default_vmax(volume)?,
        };
        let vmin = vmin.unwrap_or(vmax * 1e-2);

        info!(
            "Using {kind} norm from {} to {}",
            vmin.sci(2, 2),
            vmax.sci(2, 2)
        );

        Ok(Arc::new(Norm::new(kind, vmin, vmax)?))
    }
}

impl From<&str> for NormSpec {
    fn from(keyword: &str) -> Self {
        Self::Keyword(keyword.to_string())
    }
}

impl From<String> for NormSpec {
    fn from(keyword: String) -> Self {
        Self::Keyword(keyword)
    }
}

impl From<NormKind> for NormSpec {
    fn from(kind: NormKind) -> Self {
        Self::Kind(kind)
    }
}

impl From<Option<&str>> for NormSpec {
    fn from(keyword: Option<&str>) -> Self {
        keyword.map_or(Self::Auto, Self::from)
    }
}

/// Smallest power of ten at or above the largest density
fn default_vmax(volume: &Volume) -> Result<f64> {
    let max = volume.maximum();
    max.ceil_pow10()
        .map_err(|_| Error::UndefinedBounds { max })
}
