use std::time::Duration;

use derive_more::Display;

/// Which way the tone-arm is jogged. Left moves toward home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum JogDirection {
    #[display(fmt = "left")]
    Left,
    #[display(fmt = "right")]
    Right,
}

impl JogDirection {
    /// Apply the direction's sign to a step count.
    pub fn signed(self, magnitude: u32) -> i64 {
        match self {
            JogDirection::Left => -i64::from(magnitude),
            JogDirection::Right => i64::from(magnitude),
        }
    }
}

/// Shape of the hold-to-jog acceleration. Steps grow and delays shrink
/// linearly over `ramp_duration`, then stay at their fast values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampProfile {
    pub ramp_duration: Duration,
    pub base_step: u32,
    pub step_range: u32,
    pub base_delay: Duration,
    pub min_delay: Duration,
}

impl Default for RampProfile {
    fn default() -> Self {
        Self {
            ramp_duration: Duration::from_millis(2000),
            base_step: 4,
            step_range: 20,
            base_delay: Duration::from_millis(220),
            min_delay: Duration::from_millis(40),
        }
    }
}

impl RampProfile {
    /// Progress through the ramp, 0.0 at the start of a hold and 1.0 from
    /// `ramp_duration` onwards.
    pub fn fraction(&self, elapsed: Duration) -> f64 {
        if self.ramp_duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.ramp_duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    /// Unsigned step count for ramp progress `t`.
    pub fn step_magnitude(&self, t: f64) -> u32 {
        self.base_step + (t.clamp(0.0, 1.0) * f64::from(self.step_range)).round() as u32
    }

    /// Delay before the next step for ramp progress `t`.
    pub fn step_delay(&self, t: f64) -> Duration {
        let base = self.base_delay.as_secs_f64() * 1000.0;
        let min = self.min_delay.as_secs_f64() * 1000.0;
        let millis = base - t.clamp(0.0, 1.0) * (base - min);
        Duration::from_micros((millis * 1000.0).round() as u64)
    }
}
