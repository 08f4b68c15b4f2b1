use crate::control::{ControlLaw, ControllerState};
use crate::error::{Error, Input};
use crate::gains::{GainSchedule, GainSets};
use crate::history::HistoryBuffer;
use crate::pose::{is_finite, CommandOutput, Pose};
use crate::safety::{SafetyLimits, SafetyVerdict};
use crate::wind::{SeverityTier, WindEstimator};
use nalgebra::{Vector3, Vector4};

mod builder;
pub use builder::ControllerBuilder;

/// How the control law's time step is chosen each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeStep {
    /// Elapsed time since the previous pose, or `nominal` on the first tick.
    Measured { nominal: f64 },
    /// A constant step regardless of the pose timestamps.
    Fixed(f64),
}

impl Default for TimeStep {
    fn default() -> Self {
        TimeStep::Measured { nominal: 0.01 }
    }
}

impl TimeStep {
    fn resolve(&self, pose: &Pose, previous: Option<&Pose>) -> Result<f64, Error> {
        match *self {
            TimeStep::Measured { nominal } => match previous {
                Some(previous) => {
                    let dt = pose.timestamp - previous.timestamp;
                    if dt > 0. {
                        Ok(dt)
                    } else if dt == 0. {
                        log::warn!(
                            "repeated timestamp t={}, using nominal step {}",
                            pose.timestamp,
                            nominal
                        );
                        Ok(nominal)
                    } else {
                        Err(Error::InvalidTimeStep { dt })
                    }
                }
                None => Ok(nominal),
            },
            TimeStep::Fixed(dt) => Ok(dt),
        }
    }

    fn step(&self) -> f64 {
        match *self {
            TimeStep::Measured { nominal } => nominal,
            TimeStep::Fixed(dt) => dt,
        }
    }
}

/// Wind status reported to telemetry after each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatusSnapshot {
    pub tier: SeverityTier,
    pub magnitude: f64,
    pub confidence: f64,
    pub history_len: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControllerStatus {
    /// No tick has been recorded yet.
    Initializing,
    Running(StatusSnapshot),
}

/// Output of a single tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub command: CommandOutput,
    pub verdict: SafetyVerdict,
    pub status: StatusSnapshot,
}

/// Wind-adaptive stability controller for a single vehicle.
///
/// Ticks must be run sequentially; use one controller per vehicle.
#[derive(Clone, Debug)]
pub struct WindStabilityController {
    pub estimator: WindEstimator,
    pub schedule: GainSchedule,
    pub base_gains: GainSets,
    pub law: ControlLaw,
    pub limits: SafetyLimits,
    pub time_step: TimeStep,
    state: ControllerState,
    history: HistoryBuffer,
}

impl Default for WindStabilityController {
    fn default() -> Self {
        Self::new(
            WindEstimator::default(),
            GainSchedule::default(),
            GainSets::default(),
            ControlLaw::default(),
            SafetyLimits::default(),
            TimeStep::default(),
            HistoryBuffer::default(),
        )
    }
}

impl WindStabilityController {
    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::default()
    }

    pub(crate) fn new(
        estimator: WindEstimator,
        schedule: GainSchedule,
        base_gains: GainSets,
        law: ControlLaw,
        limits: SafetyLimits,
        time_step: TimeStep,
        history: HistoryBuffer,
    ) -> Self {
        Self {
            estimator,
            schedule,
            base_gains,
            law,
            limits,
            time_step,
            state: ControllerState::default(),
            history,
        }
    }

    /// Run one control tick.
    ///
    /// Estimates the wind against the previous recorded pose, adapts the gains,
    /// computes the command and checks the safety envelope.
    /// An unsafe verdict is reported, it does not stop the loop.
    ///
    /// Rejected ticks (non-finite input or a pose older than the previous one)
    /// leave the controller unchanged. A repeated timestamp runs with the
    /// nominal step.
    pub fn tick(
        &mut self,
        pose: Pose,
        target_position: Vector3<f64>,
        target_attitude: Vector3<f64>,
        last_command: &Vector4<f64>,
    ) -> Result<Tick, Error> {
        let result = self.try_tick(pose, target_position, target_attitude, last_command);
        if let Err(error) = &result {
            log::warn!("rejected tick at t={}: {}", pose.timestamp, error);
        }
        result
    }

    fn try_tick(
        &mut self,
        pose: Pose,
        target_position: Vector3<f64>,
        target_attitude: Vector3<f64>,
        last_command: &Vector4<f64>,
    ) -> Result<Tick, Error> {
        validate(&pose, &target_position, &target_attitude, last_command)?;

        let latest = self.history.latest();
        let previous = latest.map(|entry| &entry.pose);
        let last_tier = latest.map(|entry| entry.wind.tier);
        let dt = self.time_step.resolve(&pose, previous)?;

        // 1. Estimate the wind against the last recorded pose
        let wind = self
            .estimator
            .estimate(&pose, previous, last_command, self.history.len());

        // 2. Scale the gains for the wind severity
        let gains = self.schedule.adapt(wind.tier, &self.base_gains);

        // 3. Compute the bounded command
        let command = self.law.compute(
            &pose,
            &target_position,
            &target_attitude,
            &wind,
            &gains,
            &mut self.state,
            dt,
        );

        // 4. Check the safety envelope
        let verdict = self.limits.check(&wind, &pose);

        log::debug!(
            "tick t={} dt={} wind={:.2} m/s ({})",
            pose.timestamp,
            dt,
            wind.magnitude,
            wind.tier
        );
        if last_tier.is_some_and(|tier| tier != wind.tier) {
            log::info!("wind severity changed to {}", wind.tier);
        }
        if !verdict.is_safe {
            log::warn!("safety violation: {}", verdict.message);
        }

        if let Some(evicted) = self.history.push(pose, wind) {
            log::trace!("evicted history entry at t={}", evicted.pose.timestamp);
        }

        Ok(Tick {
            command,
            verdict,
            status: StatusSnapshot {
                tier: wind.tier,
                magnitude: wind.magnitude,
                confidence: wind.confidence,
                history_len: self.history.len(),
            },
        })
    }

    /// Status of the most recent tick.
    pub fn status(&self) -> ControllerStatus {
        match self.history.latest() {
            Some(entry) => ControllerStatus::Running(StatusSnapshot {
                tier: entry.wind.tier,
                magnitude: entry.wind.magnitude,
                confidence: entry.wind.confidence,
                history_len: self.history.len(),
            }),
            None => ControllerStatus::Initializing,
        }
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Clear the integrators and history, e.g. after a failsafe landing.
    pub fn reset(&mut self) {
        self.state.reset();
        self.history.clear();
    }
}

fn validate(
    pose: &Pose,
    target_position: &Vector3<f64>,
    target_attitude: &Vector3<f64>,
    last_command: &Vector4<f64>,
) -> Result<(), Error> {
    if !pose.is_finite() {
        Err(Error::NonFiniteInput(Input::Pose))
    } else if !is_finite(target_position) {
        Err(Error::NonFiniteInput(Input::TargetPosition))
    } else if !is_finite(target_attitude) {
        Err(Error::NonFiniteInput(Input::TargetAttitude))
    } else if !is_finite(last_command) {
        Err(Error::NonFiniteInput(Input::LastCommand))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ControllerStatus, TimeStep, WindStabilityController};
    use crate::{Error, Input, Pose, SeverityTier, NOMINAL};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::{Vector3, Vector4};
    use num_traits::Float;

    fn hover(timestamp: f64) -> Pose {
        Pose::at(Vector3::new(0., 0., 10.), timestamp)
    }

    #[test]
    fn first_tick() {
        let mut controller = WindStabilityController::default();
        assert_eq!(controller.status(), ControllerStatus::Initializing);

        let tick = controller
            .tick(
                hover(0.),
                Vector3::new(5., 5., 10.),
                Vector3::zeros(),
                &Vector4::zeros(),
            )
            .unwrap();

        assert_eq!(tick.status.tier, SeverityTier::Calm);
        assert_eq!(tick.status.magnitude, 0.);
        assert_eq!(tick.status.confidence, 0.);
        assert_eq!(tick.status.history_len, 1);
        assert!(tick.verdict.is_safe);
        assert_eq!(tick.verdict.message, NOMINAL);

        // No altitude or attitude error
        assert_eq!(tick.command.thrust, 0.5);
        assert_eq!(tick.command.roll, 0.);
        assert_eq!(tick.command.pitch, 0.);
        assert_eq!(tick.command.yaw, 0.);

        assert_eq!(controller.status(), ControllerStatus::Running(tick.status));
    }

    #[test]
    fn measured_time_step() {
        let mut controller = WindStabilityController::default();
        let target = Vector3::new(0., 0., 11.);

        controller
            .tick(hover(0.), target, Vector3::zeros(), &Vector4::zeros())
            .unwrap();
        assert_relative_eq!(controller.state().position.integrator.z, 0.01, epsilon = 1e-12);

        controller
            .tick(hover(0.5), target, Vector3::zeros(), &Vector4::zeros())
            .unwrap();
        assert_relative_eq!(controller.state().position.integrator.z, 0.51, epsilon = 1e-12);
    }

    #[test]
    fn fixed_time_step() {
        let mut controller = WindStabilityController {
            time_step: TimeStep::Fixed(0.01),
            ..WindStabilityController::default()
        };
        let target = Vector3::new(0., 0., 11.);

        for t in [0., 0.5, 0.5] {
            controller
                .tick(hover(t), target, Vector3::zeros(), &Vector4::zeros())
                .unwrap();
        }
        assert_relative_eq!(controller.state().position.integrator.z, 0.03, epsilon = 1e-12);
        assert_eq!(controller.history().len(), 3);
    }

    #[test]
    fn repeated_timestamp_uses_nominal_step() {
        let mut controller = WindStabilityController::default();
        let target = Vector3::new(0., 0., 11.);

        controller
            .tick(hover(1.), target, Vector3::zeros(), &Vector4::zeros())
            .unwrap();
        let second = controller
            .tick(hover(1.), target, Vector3::zeros(), &Vector4::zeros())
            .unwrap();

        assert_eq!(second.status.tier, SeverityTier::Calm);
        assert_eq!(second.status.magnitude, 0.);
        assert_eq!(second.status.history_len, 2);
        assert!(second.verdict.is_safe);
        assert!((0.1..=1.).contains(&second.command.thrust));
        assert_relative_eq!(controller.state().position.integrator.z, 0.02, epsilon = 1e-12);
    }

    #[test]
    fn rejects_backwards_timestamp() {
        let mut controller = WindStabilityController::default();
        controller
            .tick(hover(1.), Vector3::zeros(), Vector3::zeros(), &Vector4::zeros())
            .unwrap();
        let state = *controller.state();

        let result = controller.tick(hover(0.5), Vector3::zeros(), Vector3::zeros(), &Vector4::zeros());
        assert_eq!(result, Err(Error::InvalidTimeStep { dt: -0.5 }));

        assert_eq!(*controller.state(), state);
        assert_eq!(controller.history().len(), 1);
    }

    #[test]
    fn rejects_non_finite_input() {
        let mut controller = WindStabilityController::default();

        let pose = hover(0.).with_attitude(Vector3::new(f64::NAN, 0., 0.));
        let result = controller.tick(pose, Vector3::zeros(), Vector3::zeros(), &Vector4::zeros());
        assert_eq!(result, Err(Error::NonFiniteInput(Input::Pose)));

        let result = controller.tick(
            hover(0.),
            Vector3::new(0., f64::INFINITY, 0.),
            Vector3::zeros(),
            &Vector4::zeros(),
        );
        assert_eq!(result, Err(Error::NonFiniteInput(Input::TargetPosition)));

        let result = controller.tick(
            hover(0.),
            Vector3::zeros(),
            Vector3::new(0., 0., f64::NEG_INFINITY),
            &Vector4::zeros(),
        );
        assert_eq!(result, Err(Error::NonFiniteInput(Input::TargetAttitude)));

        let result = controller.tick(
            hover(0.),
            Vector3::zeros(),
            Vector3::zeros(),
            &Vector4::new(f64::NAN, 0., 0., 0.),
        );
        assert_eq!(result, Err(Error::NonFiniteInput(Input::LastCommand)));

        assert_eq!(controller.status(), ControllerStatus::Initializing);
        assert_eq!(*controller.state(), Default::default());
    }

    #[test]
    fn unsafe_tick_keeps_running() {
        let mut controller = WindStabilityController::default();
        let low = Pose::at(Vector3::new(0., 0., 1.), 0.);

        for i in 0..3 {
            let pose = Pose { timestamp: i as f64 * 0.01, ..low };
            let tick = controller
                .tick(pose, Vector3::new(0., 0., 5.), Vector3::zeros(), &Vector4::zeros())
                .unwrap();
            assert!(!tick.verdict.is_safe);
            assert_eq!(tick.verdict.message, "altitude too low: 1.0 m");
            assert_eq!(tick.status.history_len, i + 1);
        }
    }

    #[test]
    fn adapts_to_gust() {
        let mut controller = WindStabilityController::default();
        let target = Vector3::new(0., 0., 10.);

        controller
            .tick(hover(0.), target, Vector3::zeros(), &Vector4::zeros())
            .unwrap();
        let gust = hover(0.1).with_velocity(Vector3::new(2., 1., 0.));
        let tick = controller
            .tick(gust, target, Vector3::zeros(), &Vector4::zeros())
            .unwrap();

        assert_eq!(tick.status.tier, SeverityTier::Severe);
        assert_relative_eq!(tick.status.magnitude, 500f64.sqrt(), epsilon = 1e-9);
        assert_abs_diff_eq!(tick.status.confidence, 0.1);
        assert_eq!(tick.status.history_len, 2);
        assert!(tick.verdict.is_safe);

        // Vertical feedforward is zero and the vehicle is at the target altitude.
        assert_eq!(tick.command.thrust, 0.5);
    }

    #[test]
    fn reset() {
        let mut controller = WindStabilityController::default();
        for i in 0..5 {
            controller
                .tick(
                    hover(i as f64),
                    Vector3::new(1., 0., 10.),
                    Vector3::zeros(),
                    &Vector4::zeros(),
                )
                .unwrap();
        }
        controller.reset();

        assert_eq!(controller.status(), ControllerStatus::Initializing);
        assert_eq!(*controller.state(), Default::default());
        assert!(controller.history().is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_is_serde() {
        use crate::{GainSchedule, GainSets, SafetyLimits};
        use serde::{de::DeserializeOwned, Serialize};

        fn config<T: Serialize + DeserializeOwned>() {}
        config::<TimeStep>();
        config::<GainSets>();
        config::<GainSchedule>();
        config::<SafetyLimits>();
        config::<SeverityTier>();
    }
}
