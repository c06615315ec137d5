//! Per-frame input contract
//!
//! The simulation never polls devices. It consumes edge-triggered arrays that
//! the input layer computes once per frame.

use crate::consts::{MAX_LANES, MAX_LINES};

/// Debounced input for a single frame (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Trigger went down this frame, per line
    pub trigger_pressed: [bool; MAX_LINES],
    /// Trigger went up this frame, per line
    pub trigger_released: [bool; MAX_LINES],
    /// Trigger currently down, per line
    pub trigger_held: [bool; MAX_LINES],
    /// Switch button went down this frame, per lane
    pub switch_pressed: [bool; MAX_LANES],
    /// Switch button currently down, per lane
    pub switch_held: [bool; MAX_LANES],
}

impl FrameInput {
    /// Input pressing the given lines this frame
    pub fn press(lines: &[usize]) -> Self {
        let mut input = Self::default();
        for &line in lines {
            input.trigger_pressed[line] = true;
            input.trigger_held[line] = true;
        }
        input
    }

    /// Input releasing the given lines this frame
    pub fn release(lines: &[usize]) -> Self {
        let mut input = Self::default();
        for &line in lines {
            input.trigger_released[line] = true;
        }
        input
    }

    /// Input pressing the switch button of `lane` this frame
    pub fn switch_to(lane: usize) -> Self {
        let mut input = Self::default();
        input.switch_pressed[lane] = true;
        input.switch_held[lane] = true;
        input
    }

    /// First lane other than `active` whose switch button went down this frame
    pub fn switch_edge(&self, active: usize) -> Option<usize> {
        self.switch_pressed
            .iter()
            .enumerate()
            .position(|(lane, &pressed)| pressed && lane != active)
    }

    pub fn any_trigger_edge(&self) -> bool {
        self.trigger_pressed.iter().chain(&self.trigger_released).any(|&e| e)
    }
}

/// Raw button levels sampled from a device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    pub triggers: [bool; MAX_LINES],
    pub switches: [bool; MAX_LANES],
}

/// Turns successive raw samples into edges
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetector {
    previous: ButtonState,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare against the previous sample and remember this one
    pub fn update(&mut self, raw: ButtonState) -> FrameInput {
        let mut input = FrameInput {
            trigger_held: raw.triggers,
            switch_held: raw.switches,
            ..Default::default()
        };

        for line in 0..MAX_LINES {
            let (was, now) = (self.previous.triggers[line], raw.triggers[line]);
            input.trigger_pressed[line] = now && !was;
            input.trigger_released[line] = was && !now;
        }
        for lane in 0..MAX_LANES {
            input.switch_pressed[lane] = raw.switches[lane] && !self.previous.switches[lane];
        }

        self.previous = raw;
        input
    }

    /// Forget held state (e.g. after the window loses focus)
    pub fn reset(&mut self) {
        self.previous = ButtonState::default();
    }
}
