use nalgebra::{Vector3, Vector4};

/// Vehicle state sampled by the pose provider for a single tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// Local position in meters.
    pub position: Vector3<f64>,

    /// Local velocity in m/s.
    pub velocity: Vector3<f64>,

    /// Roll, pitch and yaw in radians.
    pub attitude: Vector3<f64>,

    /// Body rates in rad/s.
    pub angular_velocity: Vector3<f64>,

    /// Sample time in seconds, non-decreasing between ticks.
    pub timestamp: f64,
}

impl Pose {
    pub fn new(
        position: Vector3<f64>,
        velocity: Vector3<f64>,
        attitude: Vector3<f64>,
        angular_velocity: Vector3<f64>,
        timestamp: f64,
    ) -> Self {
        Self {
            position,
            velocity,
            attitude,
            angular_velocity,
            timestamp,
        }
    }

    /// A level, motionless pose at `position`.
    pub fn at(position: Vector3<f64>, timestamp: f64) -> Self {
        Self::new(
            position,
            Vector3::zeros(),
            Vector3::zeros(),
            Vector3::zeros(),
            timestamp,
        )
    }

    pub fn with_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_attitude(mut self, attitude: Vector3<f64>) -> Self {
        self.attitude = attitude;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: Vector3<f64>) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    pub fn is_finite(&self) -> bool {
        self.timestamp.is_finite()
            && is_finite(&self.position)
            && is_finite(&self.velocity)
            && is_finite(&self.attitude)
            && is_finite(&self.angular_velocity)
    }
}

pub(crate) fn is_finite<const D: usize>(v: &nalgebra::SVector<f64, D>) -> bool {
    v.iter().all(|n| n.is_finite())
}

/// Bounded command for the actuator mixer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CommandOutput {
    /// Collective thrust in [0.1, 1].
    pub thrust: f64,
    /// Roll command in [-0.5, 0.5].
    pub roll: f64,
    /// Pitch command in [-0.5, 0.5].
    pub pitch: f64,
    /// Yaw command in [-1, 1].
    pub yaw: f64,
}

impl CommandOutput {
    pub const MIN_THRUST: f64 = 0.1;
    pub const MAX_THRUST: f64 = 1.0;
    pub const MAX_TILT: f64 = 0.5;
    pub const MAX_YAW: f64 = 1.0;

    /// The command as `[thrust, roll, pitch, yaw]`, the layout expected for
    /// the next tick's `last_command`.
    pub fn as_vector(&self) -> Vector4<f64> {
        Vector4::new(self.thrust, self.roll, self.pitch, self.yaw)
    }
}
