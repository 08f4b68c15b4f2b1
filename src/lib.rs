//! # wind-stability
//! A `#![no_std]` wind-adaptive stability controller for multi-copters.
//!
//! # Components
//! [`WindEstimator`] infers the wind disturbance from the change in velocity
//! between poses that the previous command does not explain.
//!
//! [`GainSchedule`] scales the PID [`GainSets`] with the wind [`SeverityTier`].
//!
//! [`ControlLaw`](control::ControlLaw) computes the bounded [`CommandOutput`]
//! from the position and attitude errors, with wind feedforward on the position loop.
//!
//! [`safety`] checks the wind, attitude and altitude envelope and reports a [`SafetyVerdict`].
//!
//! [`WindStabilityController`] runs all of the above once per tick and keeps the
//! [`HistoryBuffer`] of recent poses.
//!
//! # Example
//! ```
//! use wind_stability::{SeverityTier, WindStabilityController, Pose};
//! use nalgebra::{Vector3, Vector4};
//!
//! let mut controller = WindStabilityController::builder()
//!     .max_wind(20.)
//!     .integral_limit(5.)
//!     .build()?;
//!
//! let target_position = Vector3::new(5., 5., 10.);
//! let target_attitude = Vector3::zeros();
//! let mut last_command = Vector4::zeros();
//!
//! for i in 0..100 {
//!     let pose = Pose::at(Vector3::new(0., 0., 10.), i as f64 * 0.01);
//!     let tick = controller.tick(pose, target_position, target_attitude, &last_command)?;
//!
//!     assert!(tick.verdict.is_safe);
//!     assert_eq!(tick.status.tier, SeverityTier::Calm);
//!     last_command = tick.command.as_vector();
//! }
//! # Ok::<(), wind_stability::Error>(())
//! ```

#![no_std]

extern crate alloc;

pub mod control;
pub use control::{ControlLaw, ControllerState};

pub mod controller;
pub use controller::{
    ControllerBuilder, ControllerStatus, StatusSnapshot, Tick, TimeStep, WindStabilityController,
};

mod error;
pub use error::{Error, Input};

pub mod gains;
pub use gains::{GainSchedule, GainSet, GainSets};

pub mod history;
pub use history::{HistoryBuffer, HistoryEntry};

mod pose;
pub use pose::{CommandOutput, Pose};

pub mod safety;
pub use safety::{SafetyLimits, SafetyVerdict, Violation, NOMINAL};

pub mod wind;
pub use wind::{SeverityTier, WindEstimate, WindEstimator};
