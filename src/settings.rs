//! Game balance, calibration and layout settings
//!
//! Loaded from a JSON file next to the level; every field has a default so
//! partial files stay valid.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::judge::{Rewards, TimingWindows};

/// Errors raised while reading a settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Scale applied to every timing window radius
    pub fn window_scale(&self) -> f64 {
        match self {
            Difficulty::Easy => 1.25,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.75,
        }
    }

    /// Competency lost per missed note
    pub fn miss_penalty(&self) -> i32 {
        match self {
            Difficulty::Easy => -2,
            Difficulty::Normal => -4,
            Difficulty::Hard => -6,
        }
    }
}

/// Screen layout of the band
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Bottom-left corner of the leftmost lane
    pub origin_x: f32,
    pub origin_y: f32,
    /// Lane height (all lanes share it)
    pub lane_height: f32,
    /// Width of the active lane
    pub active_width: f32,
    /// Width of every inactive lane
    pub inactive_width: f32,
    /// Horizontal gap between lanes
    pub gap: f32,
    /// Hit bar height above the lane bottom, as a fraction of lane height
    pub hit_bar_fraction: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            origin_x: 40.0,
            origin_y: 0.0,
            lane_height: 720.0,
            active_width: 400.0,
            inactive_width: 160.0,
            gap: 16.0,
            hit_bar_fraction: 0.2,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,

    // === Timing ===
    pub windows: TimingWindows,
    pub rewards: Rewards,
    /// Samples before its target at which a note spawns
    pub spawn_lead: i64,
    /// Calibration offset in samples, subtracted from the clock position
    pub calibration_offset: i64,

    // === Band ===
    /// Frames a lane switch takes to animate
    pub transition_frames: u32,
    pub max_competency: i32,
    pub start_competency: i32,
    /// Competency applied when a note scrolls past unjudged
    pub miss_penalty: i32,
    /// Lane active when a session starts
    pub initial_lane: usize,
    /// Lines per lane
    pub lines: usize,

    pub layout: LayoutConfig,

    // === Effects ===
    pub particles: bool,
    pub max_particles: usize,
    /// Particles emitted per point of reward
    pub particles_per_point: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,

            windows: TimingWindows::default(),
            rewards: Rewards::default(),
            spawn_lead: SPAWN_LEAD,
            calibration_offset: 0,

            transition_frames: SWITCH_PHASE_FRAMES,
            max_competency: MAX_COMPETENCY,
            start_competency: START_COMPETENCY,
            miss_penalty: Difficulty::Normal.miss_penalty(),
            initial_lane: 0,
            lines: MAX_LINES,

            layout: LayoutConfig::default(),

            particles: true,
            max_particles: MAX_PARTICLES,
            particles_per_point: 4,
        }
    }
}

impl Settings {
    /// Create settings from a difficulty preset
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let mut settings = Self::default();
        settings.apply_difficulty(difficulty);
        settings
    }

    /// Apply a difficulty preset (rescales windows from the defaults)
    pub fn apply_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.windows = TimingWindows::default().scaled(difficulty.window_scale());
        self.miss_penalty = difficulty.miss_penalty();
    }

    /// Effective particle cap
    pub fn max_particles(&self) -> usize {
        if self.particles { self.max_particles } else { 0 }
    }

    /// Check invariants that the simulation relies on
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.windows.is_ordered() {
            return Err(SettingsError::Invalid(format!(
                "timing windows must satisfy beat < inner < outer, got {:?}",
                self.windows
            )));
        }
        if self.transition_frames == 0 {
            return Err(SettingsError::Invalid("transition_frames must be positive".into()));
        }
        if self.max_competency <= 0 {
            return Err(SettingsError::Invalid("max_competency must be positive".into()));
        }
        if self.lines == 0 || self.lines > MAX_LINES {
            return Err(SettingsError::Invalid(format!(
                "lines must be within 1..={MAX_LINES}, got {}",
                self.lines
            )));
        }
        if self.spawn_lead <= self.windows.outer {
            return Err(SettingsError::Invalid(
                "spawn_lead must exceed the outer timing window".into(),
            ));
        }
        let frac = self.layout.hit_bar_fraction;
        if !(0.0..1.0).contains(&frac) {
            return Err(SettingsError::Invalid(format!(
                "hit_bar_fraction must be within [0, 1), got {frac}"
            )));
        }
        Ok(())
    }

    /// Read and validate settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let settings: Settings = serde_json::from_str(&text)?;
        settings.validate()?;
        log::info!(
            "Loaded settings from {} ({})",
            path.as_ref().display(),
            settings.difficulty.as_str()
        );
        Ok(settings)
    }

    /// Like `load`, but falls back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Using default settings: {e}");
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}
