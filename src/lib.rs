//! Encore - a band-switching rhythm game core
//!
//! Core modules:
//! - `sim`: Deterministic note simulation (timeline, judgment, lane switching, pooling)
//! - `arcade`: Circle physics and broad-phase collision for the arcade field
//! - `settings`: Data-driven game balance and calibration

pub mod arcade;
pub mod settings;
pub mod sim;

pub use settings::{Difficulty, Settings};

/// Game configuration constants
pub mod consts {
    /// Audio sample rate the timeline is authored against
    pub const SAMPLE_RATE: u32 = 44_100;
    /// Interleaved channel count of the clock position
    pub const CHANNELS: u32 = 2;

    /// Video frames per second driving `tick`
    pub const FRAME_RATE: u32 = 60;
    /// Fixed frame timestep for the arcade field
    pub const FRAME_DT: f32 = 1.0 / FRAME_RATE as f32;

    /// Upper bound on band members
    pub const MAX_LANES: usize = 4;
    /// Upper bound on lines per band member
    pub const MAX_LINES: usize = 4;

    /// Default timing windows (samples from target)
    pub const OUTER_RADIUS: i64 = 25_000;
    pub const INNER_RADIUS: i64 = 18_000;
    /// ~68ms either side of the beat at 44.1kHz stereo
    pub const BEAT_RADIUS: i64 = 6_000;

    /// Samples before its target at which a note becomes visible (3s stereo)
    pub const SPAWN_LEAD: i64 = 264_600;

    /// Frames spent animating a lane switch
    pub const SWITCH_PHASE_FRAMES: u32 = 20;

    /// Competency meter
    pub const MAX_COMPETENCY: i32 = 100;
    pub const START_COMPETENCY: i32 = 60;

    /// Maximum live particles
    pub const MAX_PARTICLES: usize = 512;
}

/// Convert a duration in milliseconds to interleaved clock samples
#[inline]
pub fn ms_to_samples(ms: f64, sample_rate: u32, channels: u32) -> i64 {
    (ms * sample_rate as f64 * channels as f64 / 1000.0).round() as i64
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ms_to_samples() {
        assert_eq!(ms_to_samples(1000.0, 44_100, 1), 44_100);
        assert_eq!(ms_to_samples(1000.0, 44_100, 2), 88_200);
        assert_eq!(ms_to_samples(68.0, 44_100, 2), 5_998);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(10.0, 20.0, 0.0), 10.0);
        assert_eq!(lerp(10.0, 20.0, 1.0), 20.0);
        assert!((lerp(10.0, 20.0, 0.25) - 12.5).abs() < 1e-6);
    }
}
