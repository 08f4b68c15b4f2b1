//! Wind-adaptive gain scheduling.

use crate::wind::SeverityTier;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GainSet {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl GainSet {
    pub const fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    /// Scale by a schedule factor.
    ///
    /// The proportional gain scales with the factor, the integral gain by 30% of
    /// the increase, and the derivative gain by the factor plus a 20% boost.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            kp: self.kp * factor,
            ki: self.ki * (1. + 0.3 * (factor - 1.)),
            kd: self.kd * factor * 1.2,
        }
    }

    pub fn is_valid(&self) -> bool {
        [self.kp, self.ki, self.kd]
            .iter()
            .all(|k| k.is_finite() && *k > 0.)
    }
}

/// Gains for each control loop.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GainSets {
    pub position: GainSet,
    pub attitude: GainSet,
    pub velocity: GainSet,
}

impl Default for GainSets {
    fn default() -> Self {
        Self {
            position: GainSet::new(1.2, 0.1, 0.8),
            attitude: GainSet::new(2.5, 0.2, 1.5),
            velocity: GainSet::new(0.8, 0.05, 0.6),
        }
    }
}

impl GainSets {
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            position: self.position.scaled(factor),
            attitude: self.attitude.scaled(factor),
            velocity: self.velocity.scaled(factor),
        }
    }

    pub(crate) fn invalid_group(&self) -> Option<&'static str> {
        [
            ("position", &self.position),
            ("attitude", &self.attitude),
            ("velocity", &self.velocity),
        ]
        .into_iter()
        .find(|(_, gains)| !gains.is_valid())
        .map(|(group, _)| group)
    }
}

/// Gain factor per wind tier.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GainSchedule {
    pub calm: f64,
    pub light: f64,
    pub moderate: f64,
    pub strong: f64,
    pub severe: f64,
}

impl Default for GainSchedule {
    fn default() -> Self {
        Self {
            calm: 1.,
            light: 1.2,
            moderate: 1.5,
            strong: 2.,
            severe: 2.8,
        }
    }
}

impl GainSchedule {
    pub fn factor(&self, tier: SeverityTier) -> f64 {
        match tier {
            SeverityTier::Calm => self.calm,
            SeverityTier::Light => self.light,
            SeverityTier::Moderate => self.moderate,
            SeverityTier::Strong => self.strong,
            SeverityTier::Severe => self.severe,
        }
    }

    /// Returns true if the factors increase with severity.
    pub fn is_monotone(&self) -> bool {
        SeverityTier::ALL
            .windows(2)
            .all(|pair| self.factor(pair[0]) < self.factor(pair[1]))
    }

    /// Scale the `base` gains for a wind tier.
    ///
    /// ```
    /// use wind_stability::{GainSchedule, GainSets, SeverityTier};
    ///
    /// let base = GainSets::default();
    /// let gains = GainSchedule::default().adapt(SeverityTier::Calm, &base);
    /// assert_eq!(gains.position.kp, base.position.kp);
    /// assert_eq!(gains.position.ki, base.position.ki);
    ///
    /// let gains = GainSchedule::default().adapt(SeverityTier::Strong, &base);
    /// assert!(gains.position.kp > base.position.kp);
    /// ```
    pub fn adapt(&self, tier: SeverityTier, base: &GainSets) -> GainSets {
        base.scaled(self.factor(tier))
    }

    pub(crate) fn is_valid(&self) -> bool {
        SeverityTier::ALL.iter().all(|tier| {
            let factor = self.factor(*tier);
            factor.is_finite() && factor > 0.
        })
    }
}
