//! Position and attitude control with wind feedforward.

use crate::gains::GainSets;
use crate::pose::{CommandOutput, Pose};
use crate::wind::WindEstimate;
use core::f64::consts::PI;
use nalgebra::Vector3;
use num_traits::Float;

pub mod pid;
pub use pid::{PidState, Terms};

/// Integrators and previous errors of the position and attitude loops.
///
/// Each vehicle owns exactly one state and passes it mutably into every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControllerState {
    pub position: PidState,
    pub attitude: PidState,
}

impl ControllerState {
    pub fn reset(&mut self) {
        self.position.reset();
        self.attitude.reset();
    }
}

/// Raw (unclamped) control effort of one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlEffort {
    pub position_error: Vector3<f64>,
    /// Attitude error wrapped to (-PI, PI].
    pub attitude_error: Vector3<f64>,
    pub feedforward: Vector3<f64>,
    /// Position PID output plus the feedforward.
    pub position: Vector3<f64>,
    pub attitude: Vector3<f64>,
}

impl ControlEffort {
    /// Clamp the effort into the actuator ranges.
    pub fn command(&self) -> CommandOutput {
        CommandOutput {
            thrust: constrain(
                0.5 + self.position.z,
                CommandOutput::MIN_THRUST,
                CommandOutput::MAX_THRUST,
            ),
            roll: constrain(
                self.attitude.x,
                -CommandOutput::MAX_TILT,
                CommandOutput::MAX_TILT,
            ),
            pitch: constrain(
                self.attitude.y,
                -CommandOutput::MAX_TILT,
                CommandOutput::MAX_TILT,
            ),
            yaw: constrain(
                self.attitude.z,
                -CommandOutput::MAX_YAW,
                CommandOutput::MAX_YAW,
            ),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlLaw {
    /// Fraction of the estimated wind added to the position control.
    pub feedforward_coefficient: f64,

    /// Per-axis bound on the integrators, unbounded if `None`.
    pub integral_limit: Option<f64>,
}

impl Default for ControlLaw {
    fn default() -> Self {
        Self {
            feedforward_coefficient: 0.5,
            integral_limit: None,
        }
    }
}

impl ControlLaw {
    /// Calculate the bounded command to move from `pose` towards the targets.
    /// `dt` must be positive.
    #[allow(clippy::too_many_arguments)]
    pub fn compute(
        &self,
        pose: &Pose,
        target_position: &Vector3<f64>,
        target_attitude: &Vector3<f64>,
        wind: &WindEstimate,
        gains: &GainSets,
        state: &mut ControllerState,
        dt: f64,
    ) -> CommandOutput {
        self.effort(pose, target_position, target_attitude, wind, gains, state, dt)
            .command()
    }

    /// Calculate the raw control effort, updating `state`.
    #[allow(clippy::too_many_arguments)]
    pub fn effort(
        &self,
        pose: &Pose,
        target_position: &Vector3<f64>,
        target_attitude: &Vector3<f64>,
        wind: &WindEstimate,
        gains: &GainSets,
        state: &mut ControllerState,
        dt: f64,
    ) -> ControlEffort {
        // 1. Position loop, compensating for the estimated wind
        let position_error = target_position - pose.position;
        let feedforward = wind.velocity * self.feedforward_coefficient;
        let position = state
            .position
            .update(&gains.position, position_error, dt, self.integral_limit)
            .sum()
            + feedforward;

        // 2. Attitude loop on the shortest angular error, without feedforward
        let attitude_error = (target_attitude - pose.attitude).map(wrap_pi);
        let attitude = state
            .attitude
            .update(&gains.attitude, attitude_error, dt, self.integral_limit)
            .sum();

        ControlEffort {
            position_error,
            attitude_error,
            feedforward,
            position,
            attitude,
        }
    }
}

/// Wrap an angle in radians to (-PI, PI].
///
/// ```
/// use wind_stability::control::wrap_pi;
/// use core::f64::consts::PI;
///
/// assert!((wrap_pi(3. * PI / 2.) + PI / 2.).abs() < 1e-12);
/// assert!(wrap_pi(-PI) > -PI);
/// ```
pub fn wrap_pi(radian: f64) -> f64 {
    let wrapped = radian.sin().atan2(radian.cos());
    if wrapped <= -PI {
        PI
    } else {
        wrapped
    }
}

/// Clamp `amt` to `[low, high]`, using the midpoint for NaN.
fn constrain(amt: f64, low: f64, high: f64) -> f64 {
    if amt.is_nan() {
        return (low + high) / 2.;
    }
    amt.max(low).min(high)
}
