use super::{TimeStep, WindStabilityController};
use crate::control::ControlLaw;
use crate::error::Error;
use crate::gains::{GainSchedule, GainSets};
use crate::history::{HistoryBuffer, DEFAULT_CAPACITY};
use crate::safety::SafetyLimits;
use crate::wind::WindEstimator;

pub struct ControllerBuilder {
    base_gains: GainSets,
    schedule: GainSchedule,
    command_coefficient: f64,
    feedforward_coefficient: f64,
    integral_limit: Option<f64>,
    limits: SafetyLimits,
    history_capacity: usize,
    time_step: TimeStep,
}

impl Default for ControllerBuilder {
    fn default() -> Self {
        Self {
            base_gains: GainSets::default(),
            schedule: GainSchedule::default(),
            command_coefficient: WindEstimator::default().command_coefficient,
            feedforward_coefficient: ControlLaw::default().feedforward_coefficient,
            integral_limit: None,
            limits: SafetyLimits::default(),
            history_capacity: DEFAULT_CAPACITY,
            time_step: TimeStep::default(),
        }
    }
}

impl ControllerBuilder {
    pub fn base_gains(mut self, gains: GainSets) -> Self {
        self.base_gains = gains;
        self
    }

    pub fn gain_schedule(mut self, schedule: GainSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Expected acceleration per unit of the previous command.
    pub fn command_coefficient(mut self, coefficient: f64) -> Self {
        self.command_coefficient = coefficient;
        self
    }

    pub fn feedforward_coefficient(mut self, coefficient: f64) -> Self {
        self.feedforward_coefficient = coefficient;
        self
    }

    /// Clamp each integrator axis to `[-limit, limit]`.
    pub fn integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = Some(limit);
        self
    }

    pub fn safety_limits(mut self, limits: SafetyLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn max_wind(mut self, max_wind: f64) -> Self {
        self.limits.max_wind = max_wind;
        self
    }

    pub fn max_tilt(mut self, max_tilt: f64) -> Self {
        self.limits.max_tilt = max_tilt;
        self
    }

    pub fn min_altitude(mut self, min_altitude: f64) -> Self {
        self.limits.min_altitude = min_altitude;
        self
    }

    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    pub fn time_step(mut self, time_step: TimeStep) -> Self {
        self.time_step = time_step;
        self
    }

    pub fn build(self) -> Result<WindStabilityController, Error> {
        if let Some(group) = self.base_gains.invalid_group() {
            return Err(Error::InvalidGain { group });
        }
        if !self.schedule.is_valid() {
            return Err(Error::InvalidScheduleFactor);
        }
        if !self.command_coefficient.is_finite() {
            return Err(Error::InvalidLimit {
                name: "command coefficient",
            });
        }
        if !self.feedforward_coefficient.is_finite() {
            return Err(Error::InvalidLimit {
                name: "feedforward coefficient",
            });
        }
        if let Some(limit) = self.integral_limit {
            if !(limit.is_finite() && limit > 0.) {
                return Err(Error::InvalidLimit {
                    name: "integral limit",
                });
            }
        }
        if let Some(name) = self.limits.invalid_limit() {
            return Err(Error::InvalidLimit { name });
        }
        if self.history_capacity == 0 {
            return Err(Error::ZeroHistoryCapacity);
        }
        let dt = self.time_step.step();
        if !(dt.is_finite() && dt > 0.) {
            return Err(Error::InvalidTimeStepConfig { dt });
        }

        Ok(WindStabilityController::new(
            WindEstimator::new(self.command_coefficient),
            self.schedule,
            self.base_gains,
            ControlLaw {
                feedforward_coefficient: self.feedforward_coefficient,
                integral_limit: self.integral_limit,
            },
            self.limits,
            self.time_step,
            HistoryBuffer::new(self.history_capacity),
        ))
    }
}
