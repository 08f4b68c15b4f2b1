//! Wind disturbance estimation.
//!
//! The disturbance is the part of the measured acceleration that the previous
//! command does not explain. Only the horizontal components contribute to the
//! magnitude: the vertical channel follows the altimeter, which is too noisy to
//! tell gusts apart from sensor error. The vertical component is still kept in
//! the disturbance vector and fed forward by the control law.

use crate::pose::Pose;
use core::fmt;
use nalgebra::{Vector3, Vector4};
use num_traits::Float;

/// Number of history entries needed for full confidence.
pub const FULL_CONFIDENCE_LEN: usize = 10;

/// Wind severity, ordered from calm to severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SeverityTier {
    /// Below 5 m/s.
    Calm,
    /// 5 to 10 m/s.
    Light,
    /// 10 to 15 m/s.
    Moderate,
    /// 15 to 20 m/s.
    Strong,
    /// 20 m/s and above.
    Severe,
}

impl SeverityTier {
    pub const ALL: [SeverityTier; 5] = [
        SeverityTier::Calm,
        SeverityTier::Light,
        SeverityTier::Moderate,
        SeverityTier::Strong,
        SeverityTier::Severe,
    ];

    /// Classify a wind magnitude in m/s.
    ///
    /// ```
    /// use wind_stability::SeverityTier;
    ///
    /// assert_eq!(SeverityTier::from_magnitude(4.9), SeverityTier::Calm);
    /// assert_eq!(SeverityTier::from_magnitude(15.0), SeverityTier::Strong);
    /// assert_eq!(SeverityTier::from_magnitude(22.4), SeverityTier::Severe);
    /// ```
    pub fn from_magnitude(magnitude: f64) -> Self {
        if magnitude < 5. {
            SeverityTier::Calm
        } else if magnitude < 10. {
            SeverityTier::Light
        } else if magnitude < 15. {
            SeverityTier::Moderate
        } else if magnitude < 20. {
            SeverityTier::Strong
        } else {
            SeverityTier::Severe
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeverityTier::Calm => "calm",
            SeverityTier::Light => "light",
            SeverityTier::Moderate => "moderate",
            SeverityTier::Strong => "strong",
            SeverityTier::Severe => "severe",
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estimated wind disturbance for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindEstimate {
    /// Disturbance vector in m/s.
    pub velocity: Vector3<f64>,
    /// Horizontal magnitude in m/s.
    pub magnitude: f64,
    /// Horizontal direction in radians.
    pub direction: f64,
    pub tier: SeverityTier,
    /// Confidence in [0, 1].
    pub confidence: f64,
}

impl WindEstimate {
    /// The zero-disturbance estimate used when there is nothing to compare against.
    pub fn calm() -> Self {
        Self {
            velocity: Vector3::zeros(),
            magnitude: 0.,
            direction: 0.,
            tier: SeverityTier::Calm,
            confidence: 0.,
        }
    }
}

impl Default for WindEstimate {
    fn default() -> Self {
        Self::calm()
    }
}

/// Confidence grows linearly with the history length and saturates at 1.
pub fn confidence(history_len: usize) -> f64 {
    (history_len as f64 / FULL_CONFIDENCE_LEN as f64).min(1.)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindEstimator {
    /// Acceleration in m/s² expected per unit of the previous command.
    pub command_coefficient: f64,
}

impl Default for WindEstimator {
    fn default() -> Self {
        Self {
            command_coefficient: 0.1,
        }
    }
}

impl WindEstimator {
    pub fn new(command_coefficient: f64) -> Self {
        Self {
            command_coefficient,
        }
    }

    /// Estimate the wind from the change in velocity between `previous` and `current`.
    ///
    /// Returns [`WindEstimate::calm`] if there is no previous pose or time did not advance.
    pub fn estimate(
        &self,
        current: &Pose,
        previous: Option<&Pose>,
        last_command: &Vector4<f64>,
        history_len: usize,
    ) -> WindEstimate {
        let previous = match previous {
            Some(previous) => previous,
            None => return WindEstimate::calm(),
        };

        let dt = current.timestamp - previous.timestamp;
        if dt <= 0. {
            return WindEstimate::calm();
        }

        let actual_acceleration = (current.velocity - previous.velocity) / dt;
        let expected_acceleration = last_command.xyz() * self.command_coefficient;
        let disturbance = actual_acceleration - expected_acceleration;

        let magnitude = disturbance.x.hypot(disturbance.y);
        let direction = disturbance.y.atan2(disturbance.x);

        WindEstimate {
            velocity: disturbance,
            magnitude,
            direction,
            tier: SeverityTier::from_magnitude(magnitude),
            confidence: confidence(history_len),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{confidence, SeverityTier, WindEstimate, WindEstimator};
    use crate::Pose;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::{Vector3, Vector4};
    use num_traits::Float;

    fn pose(velocity: Vector3<f64>, timestamp: f64) -> Pose {
        Pose::at(Vector3::new(0., 0., 10.), timestamp).with_velocity(velocity)
    }

    #[test]
    fn no_previous_pose_is_calm() {
        let estimator = WindEstimator::default();
        let current = pose(Vector3::new(3., 0., 0.), 1.);

        let wind = estimator.estimate(&current, None, &Vector4::zeros(), 20);
        assert_eq!(wind, WindEstimate::calm());
    }

    #[test]
    fn non_positive_dt_is_calm() {
        let estimator = WindEstimator::default();
        let previous = pose(Vector3::zeros(), 1.);

        let same_time = pose(Vector3::new(5., 5., 0.), 1.);
        let wind = estimator.estimate(&same_time, Some(&previous), &Vector4::zeros(), 5);
        assert_eq!(wind, WindEstimate::calm());

        let earlier = pose(Vector3::new(5., 5., 0.), 0.5);
        let wind = estimator.estimate(&earlier, Some(&previous), &Vector4::zeros(), 5);
        assert_eq!(wind, WindEstimate::calm());
    }

    #[test]
    fn severe_gust() {
        let estimator = WindEstimator::default();
        let previous = pose(Vector3::zeros(), 0.);
        let current = pose(Vector3::new(2., 1., 0.), 0.1);

        let wind = estimator.estimate(&current, Some(&previous), &Vector4::zeros(), 1);

        assert_relative_eq!(wind.velocity, Vector3::new(20., 10., 0.), epsilon = 1e-9);
        assert_relative_eq!(wind.magnitude, 500f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(wind.direction, 10f64.atan2(20.), epsilon = 1e-12);
        assert_eq!(wind.tier, SeverityTier::Severe);
        assert_abs_diff_eq!(wind.confidence, 0.1);
    }

    #[test]
    fn command_explains_acceleration() {
        let estimator = WindEstimator::default();
        let previous = pose(Vector3::zeros(), 0.);
        // 1 m/s² forward over one second, fully explained by a command of 10.
        let current = pose(Vector3::new(1., 0., 0.), 1.);

        let wind = estimator.estimate(
            &current,
            Some(&previous),
            &Vector4::new(10., 0., 0., 0.7),
            3,
        );
        assert_abs_diff_eq!(wind.magnitude, 0., epsilon = 1e-12);
        assert_eq!(wind.tier, SeverityTier::Calm);
    }

    #[test]
    fn vertical_disturbance_excluded_from_magnitude() {
        let estimator = WindEstimator::default();
        let previous = pose(Vector3::zeros(), 0.);
        let current = pose(Vector3::new(0., 0., 3.), 0.1);

        let wind = estimator.estimate(&current, Some(&previous), &Vector4::zeros(), 10);
        assert_relative_eq!(wind.velocity.z, 30., epsilon = 1e-9);
        assert_abs_diff_eq!(wind.magnitude, 0.);
        assert_eq!(wind.tier, SeverityTier::Calm);
        assert_abs_diff_eq!(wind.confidence, 1.);
    }

    #[test]
    fn tier_thresholds() {
        let cases = [
            (0., SeverityTier::Calm),
            (4.99, SeverityTier::Calm),
            (5., SeverityTier::Light),
            (9.99, SeverityTier::Light),
            (10., SeverityTier::Moderate),
            (14.99, SeverityTier::Moderate),
            (15., SeverityTier::Strong),
            (19.99, SeverityTier::Strong),
            (20., SeverityTier::Severe),
            (100., SeverityTier::Severe),
        ];
        for (magnitude, tier) in cases {
            assert_eq!(SeverityTier::from_magnitude(magnitude), tier, "{magnitude}");
        }
    }

    #[test]
    fn tier_is_monotone_in_magnitude() {
        let mut last = SeverityTier::Calm;
        for i in 0..=300 {
            let tier = SeverityTier::from_magnitude(i as f64 * 0.1);
            assert!(tier >= last);
            last = tier;
        }
        assert_eq!(last, SeverityTier::Severe);
    }

    #[test]
    fn confidence_saturates() {
        let mut last = 0.;
        for len in 0..=50 {
            let c = confidence(len);
            assert!(c >= last);
            assert!((0. ..=1.).contains(&c));
            if len >= 10 {
                assert_eq!(c, 1.);
            }
            last = c;
        }
        assert_abs_diff_eq!(confidence(4), 0.4);
    }

    #[test]
    fn labels() {
        let labels: [&str; 5] = SeverityTier::ALL.map(SeverityTier::as_str);
        assert_eq!(labels, ["calm", "light", "moderate", "strong", "severe"]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserialize_tier() {
        use serde::de::{value, Deserialize, IntoDeserializer};

        let name: value::StrDeserializer<value::Error> = "Severe".into_deserializer();
        assert_eq!(SeverityTier::deserialize(name).unwrap(), SeverityTier::Severe);

        let name: value::StrDeserializer<value::Error> = "Hurricane".into_deserializer();
        assert!(SeverityTier::deserialize(name).is_err());
    }
}
