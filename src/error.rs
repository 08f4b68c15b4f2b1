use core::fmt;

/// A tick input that was rejected for containing NaN or infinite values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Input {
    Pose,
    TargetPosition,
    TargetAttitude,
    LastCommand,
}

impl Input {
    pub fn as_str(self) -> &'static str {
        match self {
            Input::Pose => "pose",
            Input::TargetPosition => "target position",
            Input::TargetAttitude => "target attitude",
            Input::LastCommand => "last command",
        }
    }
}

/// A controller error caused by a rejected tick or invalid configuration
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// The tick input contained a non-finite value.
    NonFiniteInput(Input),

    /// The pose timestamp is earlier than the previous pose.
    InvalidTimeStep { dt: f64 },

    /// A base gain was not a strictly positive finite number.
    InvalidGain { group: &'static str },

    /// A gain schedule factor was not a strictly positive finite number.
    InvalidScheduleFactor,

    ZeroHistoryCapacity,

    /// A configured fixed or nominal time step was not positive.
    InvalidTimeStepConfig { dt: f64 },

    /// A safety limit or coefficient was out of range.
    InvalidLimit { name: &'static str },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NonFiniteInput(input) => {
                write!(f, "{} contains a non-finite value", input.as_str())
            }
            Error::InvalidTimeStep { dt } => {
                write!(f, "timestamp went backwards by {} s", -dt)
            }
            Error::InvalidGain { group } => {
                write!(f, "{group} gains must be positive and finite")
            }
            Error::InvalidScheduleFactor => {
                f.write_str("gain schedule factors must be positive and finite")
            }
            Error::ZeroHistoryCapacity => f.write_str("history capacity must be at least 1"),
            Error::InvalidTimeStepConfig { dt } => {
                write!(f, "configured time step must be positive (got {dt} s)")
            }
            Error::InvalidLimit { name } => write!(f, "invalid {name}"),
        }
    }
}

impl core::error::Error for Error {}
