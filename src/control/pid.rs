use crate::gains::GainSet;
use nalgebra::Vector3;

/// Proportional, integral and derivative outputs of one update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Terms {
    pub p: Vector3<f64>,
    pub i: Vector3<f64>,
    pub d: Vector3<f64>,
}

impl Terms {
    pub fn sum(&self) -> Vector3<f64> {
        self.p + self.i + self.d
    }
}

/// Integrator and previous error of a three-axis PID loop.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PidState {
    pub integrator: Vector3<f64>,
    pub last_error: Vector3<f64>,
}

impl PidState {
    /// Update the loop with a new error and calculate its terms.
    /// `dt` must be positive.
    pub fn update(
        &mut self,
        gains: &GainSet,
        error: Vector3<f64>,
        dt: f64,
        integral_limit: Option<f64>,
    ) -> Terms {
        self.update_integral(error, dt, integral_limit);

        let terms = Terms {
            p: error * gains.kp,
            i: self.integrator * gains.ki,
            d: (error - self.last_error) / dt * gains.kd,
        };
        self.last_error = error;

        terms
    }

    /// Accumulate the error, clamping each axis to `limit` if one is set.
    pub fn update_integral(&mut self, error: Vector3<f64>, dt: f64, limit: Option<f64>) {
        self.integrator += error * dt;
        if let Some(limit) = limit {
            self.integrator = self.integrator.map(|n| n.max(-limit).min(limit));
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
