//! Music position providers
//!
//! The audio subsystem owns playback; the simulation only reads its position.

use crate::consts::{CHANNELS, FRAME_RATE, SAMPLE_RATE};

/// Read-only playback position in interleaved samples
pub trait SampleClock {
    /// Monotonic non-decreasing while the music plays
    fn current_sample_position(&self) -> i64;
}

impl<C: SampleClock + ?Sized> SampleClock for &C {
    fn current_sample_position(&self) -> i64 {
        (**self).current_sample_position()
    }
}

/// Clock set explicitly by the caller (tests, external audio callbacks)
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    position: i64,
}

impl ManualClock {
    pub fn new(position: i64) -> Self {
        Self { position }
    }

    pub fn set(&mut self, position: i64) {
        self.position = position;
    }

    pub fn advance(&mut self, samples: i64) {
        self.position += samples;
    }
}

impl SampleClock for ManualClock {
    fn current_sample_position(&self) -> i64 {
        self.position
    }
}

/// Clock advancing a fixed number of samples per video frame (headless runs)
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    position: i64,
    samples_per_frame: i64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(SAMPLE_RATE, CHANNELS, FRAME_RATE)
    }
}

impl FrameClock {
    pub fn new(sample_rate: u32, channels: u32, frame_rate: u32) -> Self {
        let per_second = sample_rate as i64 * channels as i64;
        Self {
            position: 0,
            samples_per_frame: per_second / frame_rate.max(1) as i64,
        }
    }

    pub fn samples_per_frame(&self) -> i64 {
        self.samples_per_frame
    }

    /// Advance by one video frame
    pub fn step(&mut self) {
        self.position += self.samples_per_frame;
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }
}

impl SampleClock for FrameClock {
    fn current_sample_position(&self) -> i64 {
        self.position
    }
}
