//! Safety envelope checks.
//!
//! The monitor only reports; acting on a violation (for example a failsafe
//! landing) is up to the supervisor.

use crate::pose::Pose;
use crate::wind::WindEstimate;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use num_traits::Float;

/// Message reported when every check passes.
pub const NOMINAL: &str = "nominal";

const AXES: [&str; 3] = ["roll", "pitch", "yaw"];

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SafetyLimits {
    /// Maximum wind magnitude in m/s.
    pub max_wind: f64,
    /// Maximum absolute roll, pitch or yaw in radians.
    pub max_tilt: f64,
    /// Minimum altitude in meters.
    pub min_altitude: f64,
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self {
            max_wind: 25.,
            max_tilt: 45f64.to_radians(),
            min_altitude: 2.,
        }
    }
}

impl SafetyLimits {
    pub fn check(&self, wind: &WindEstimate, pose: &Pose) -> SafetyVerdict {
        check(wind, pose, self.max_wind, self.max_tilt, self.min_altitude)
    }

    pub(crate) fn invalid_limit(&self) -> Option<&'static str> {
        if !(self.max_wind.is_finite() && self.max_wind >= 0.) {
            Some("max wind")
        } else if !(self.max_tilt.is_finite() && self.max_tilt >= 0.) {
            Some("max tilt")
        } else if !self.min_altitude.is_finite() {
            Some("min altitude")
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Violation {
    Wind { measured: f64, limit: f64 },
    Tilt { axis: &'static str, degrees: f64 },
    Altitude { altitude: f64 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Wind { measured, limit } => {
                write!(f, "wind too strong: {measured:.1} m/s > {limit:.1} m/s")
            }
            Violation::Tilt { axis, degrees } => {
                write!(f, "{axis} angle too large: {degrees:.1}°")
            }
            Violation::Altitude { altitude } => write!(f, "altitude too low: {altitude:.1} m"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SafetyVerdict {
    pub is_safe: bool,
    /// Violations joined by `"; "`, or [`NOMINAL`].
    pub message: String,
    pub violations: Vec<Violation>,
}

impl SafetyVerdict {
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        let message = if violations.is_empty() {
            NOMINAL.to_string()
        } else {
            violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        };

        Self {
            is_safe: violations.is_empty(),
            message,
            violations,
        }
    }
}

/// Check the wind, attitude and altitude against their limits.
///
/// Every check runs so simultaneous violations are all reported.
pub fn check(
    wind: &WindEstimate,
    pose: &Pose,
    max_wind: f64,
    max_tilt: f64,
    min_altitude: f64,
) -> SafetyVerdict {
    let mut violations = Vec::new();

    if wind.magnitude > max_wind {
        violations.push(Violation::Wind {
            measured: wind.magnitude,
            limit: max_wind,
        });
    }

    for (&axis, angle) in AXES.iter().zip(pose.attitude.iter()) {
        if angle.abs() > max_tilt {
            violations.push(Violation::Tilt {
                axis,
                degrees: angle.to_degrees(),
            });
        }
    }

    if pose.position.z < min_altitude {
        violations.push(Violation::Altitude {
            altitude: pose.position.z,
        });
    }

    SafetyVerdict::from_violations(violations)
}
