//! Regions of interest on the sphere.
//!
//! A region is described by four angular bounds plus an optional mask name.
//! The bounds left at their defaults (`0`, `pi`, `0`, `2 pi`) count as unset,
//! and the combination that is set decides the region type.

pub mod mask;

pub use mask::{MaskStore, MeshBox};

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlepianError};

pub const THETA_MIN_DEFAULT: f64 = 0.0;
pub const THETA_MAX_DEFAULT: f64 = PI;
pub const PHI_MIN_DEFAULT: f64 = 0.0;
pub const PHI_MAX_DEFAULT: f64 = 2.0 * PI;

/// Raw region parameters as they appear in a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionSpec {
    pub theta_min: f64,
    pub theta_max: f64,
    pub phi_min: f64,
    pub phi_max: f64,
    /// Mirror a polar cap onto the south pole.
    pub gap: bool,
    pub mask_name: Option<String>,
}

impl Default for RegionSpec {
    fn default() -> Self {
        Self {
            theta_min: THETA_MIN_DEFAULT,
            theta_max: THETA_MAX_DEFAULT,
            phi_min: PHI_MIN_DEFAULT,
            phi_max: PHI_MAX_DEFAULT,
            gap: false,
            mask_name: None,
        }
    }
}

/// Discriminant of [`Region`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    PolarCap,
    LimitedLatLon,
    Arbitrary,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegionKind::PolarCap => "polar",
            RegionKind::LimitedLatLon => "lim_lat_lon",
            RegionKind::Arbitrary => "arbitrary",
        };
        f.write_str(name)
    }
}

/// Classified, validated region. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    PolarCap {
        theta_max: f64,
        gap: bool,
    },
    LimitedLatLon {
        theta_min: f64,
        theta_max: f64,
        phi_min: f64,
        phi_max: f64,
    },
    Arbitrary {
        mask_name: String,
    },
}

fn check_range(parameter: &'static str, value: f64, lo: f64, hi: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(SlepianError::config(parameter, "must be finite"));
    }
    if value < lo {
        return Err(SlepianError::config(parameter, "cannot be negative"));
    }
    if value > hi {
        return Err(SlepianError::config(
            parameter,
            format!("cannot be greater than {hi:.6}"),
        ));
    }
    Ok(())
}

/// `phi` bounds untouched, `theta_min` at the north pole, `theta_max` set.
pub fn is_polar_cap(theta_min: f64, theta_max: f64, phi_min: f64, phi_max: f64) -> bool {
    phi_min == PHI_MIN_DEFAULT
        && phi_max == PHI_MAX_DEFAULT
        && theta_min == THETA_MIN_DEFAULT
        && theta_max != THETA_MAX_DEFAULT
}

/// Any bound differs from its default and the bounds are not a polar cap.
pub fn is_limited_lat_lon(theta_min: f64, theta_max: f64, phi_min: f64, phi_max: f64) -> bool {
    let any_set = theta_min != THETA_MIN_DEFAULT
        || theta_max != THETA_MAX_DEFAULT
        || phi_min != PHI_MIN_DEFAULT
        || phi_max != PHI_MAX_DEFAULT;
    any_set && !is_polar_cap(theta_min, theta_max, phi_min, phi_max)
}

/// Whole degrees, rounded.
pub fn angle_as_degree(radians: f64) -> i64 {
    radians.to_degrees().round() as i64
}

impl Region {
    pub fn from_spec(spec: &RegionSpec) -> Result<Self> {
        check_range("theta_min", spec.theta_min, THETA_MIN_DEFAULT, THETA_MAX_DEFAULT)?;
        check_range("theta_max", spec.theta_max, THETA_MIN_DEFAULT, THETA_MAX_DEFAULT)?;
        check_range("phi_min", spec.phi_min, PHI_MIN_DEFAULT, PHI_MAX_DEFAULT)?;
        check_range("phi_max", spec.phi_max, PHI_MIN_DEFAULT, PHI_MAX_DEFAULT)?;

        let RegionSpec {
            theta_min,
            theta_max,
            phi_min,
            phi_max,
            gap,
            ..
        } = *spec;

        if is_polar_cap(theta_min, theta_max, phi_min, phi_max) {
            return Ok(Region::PolarCap { theta_max, gap });
        }
        if gap {
            return Err(SlepianError::config(
                "gap",
                "a polar gap only applies to polar cap regions",
            ));
        }
        if is_limited_lat_lon(theta_min, theta_max, phi_min, phi_max) {
            if theta_min > theta_max {
                return Err(SlepianError::config(
                    "theta_min",
                    "must not exceed theta_max",
                ));
            }
            if phi_min > phi_max {
                return Err(SlepianError::config("phi_min", "must not exceed phi_max"));
            }
            return Ok(Region::LimitedLatLon {
                theta_min,
                theta_max,
                phi_min,
                phi_max,
            });
        }
        match spec.mask_name.as_deref() {
            Some(name) if !name.is_empty() => Ok(Region::Arbitrary {
                mask_name: name.to_string(),
            }),
            _ => Err(SlepianError::config(
                "region",
                "need to specify either a polar cap, a limited latitude longitude region, or a file with a mask",
            )),
        }
    }

    pub fn polar_cap(theta_max: f64, gap: bool) -> Result<Self> {
        Self::from_spec(&RegionSpec {
            theta_max,
            gap,
            ..RegionSpec::default()
        })
    }

    pub fn lat_lon(theta_min: f64, theta_max: f64, phi_min: f64, phi_max: f64) -> Result<Self> {
        Self::from_spec(&RegionSpec {
            theta_min,
            theta_max,
            phi_min,
            phi_max,
            ..RegionSpec::default()
        })
    }

    pub fn arbitrary(mask_name: impl Into<String>) -> Result<Self> {
        Self::from_spec(&RegionSpec {
            mask_name: Some(mask_name.into()),
            ..RegionSpec::default()
        })
    }

    pub fn kind(&self) -> RegionKind {
        match self {
            Region::PolarCap { .. } => RegionKind::PolarCap,
            Region::LimitedLatLon { .. } => RegionKind::LimitedLatLon,
            Region::Arbitrary { .. } => RegionKind::Arbitrary,
        }
    }

    /// Canonical name used in cache keys.
    pub fn name_suffix(&self) -> String {
        match self {
            Region::PolarCap { theta_max, gap } => format!(
                "polar{}{}",
                if *gap { "_gap" } else { "" },
                angle_as_degree(*theta_max)
            ),
            Region::LimitedLatLon {
                theta_min,
                theta_max,
                phi_min,
                phi_max,
            } => format!(
                "theta{}-{}_phi{}-{}",
                angle_as_degree(*theta_min),
                angle_as_degree(*theta_max),
                angle_as_degree(*phi_min),
                angle_as_degree(*phi_max)
            ),
            Region::Arbitrary { mask_name } => mask_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theta_max_alone_is_polar() {
        let region = Region::polar_cap(40f64.to_radians(), false).unwrap();
        assert_eq!(region.kind(), RegionKind::PolarCap);
        assert_eq!(region.name_suffix(), "polar40");
        let gap = Region::polar_cap(40f64.to_radians(), true).unwrap();
        assert_eq!(gap.name_suffix(), "polar_gap40");
    }

    #[test]
    fn any_other_bound_is_lat_lon() {
        let region = Region::lat_lon(
            0.0,
            60f64.to_radians(),
            10f64.to_radians(),
            PHI_MAX_DEFAULT,
        )
        .unwrap();
        assert_eq!(region.kind(), RegionKind::LimitedLatLon);
        assert_eq!(region.name_suffix(), "theta0-60_phi10-360");

        let band = Region::lat_lon(0.5, PI, 0.0, PHI_MAX_DEFAULT).unwrap();
        assert_eq!(band.kind(), RegionKind::LimitedLatLon);
    }

    #[test]
    fn defaults_with_mask_are_arbitrary() {
        let region = Region::arbitrary("africa").unwrap();
        assert_eq!(region.kind(), RegionKind::Arbitrary);
        assert_eq!(region.name_suffix(), "africa");
        assert_eq!(region.kind().to_string(), "arbitrary");
    }

    #[test]
    fn nothing_set_is_an_error() {
        let err = Region::from_spec(&RegionSpec::default()).unwrap_err();
        assert!(matches!(
            err,
            SlepianError::Configuration {
                parameter: "region",
                ..
            }
        ));
    }

    #[test]
    fn out_of_range_angles_rejected() {
        let err = Region::polar_cap(-0.1, false).unwrap_err();
        assert!(err.to_string().contains("theta_max"));
        let err = Region::lat_lon(0.0, 1.0, 0.0, 7.0).unwrap_err();
        assert!(err.to_string().contains("phi_max"));
        assert!(Region::lat_lon(1.0, 0.5, 0.0, 1.0).is_err());
    }

    #[test]
    fn gap_needs_a_polar_cap() {
        let spec = RegionSpec {
            theta_min: 0.2,
            theta_max: 1.0,
            gap: true,
            ..RegionSpec::default()
        };
        assert!(Region::from_spec(&spec).is_err());
    }

    #[test]
    fn spec_parses_from_toml() {
        let spec: RegionSpec = toml::from_str("theta_max = 0.5\ngap = true").unwrap();
        let region = Region::from_spec(&spec).unwrap();
        assert_eq!(
            region,
            Region::PolarCap {
                theta_max: 0.5,
                gap: true
            }
        );
    }
}
