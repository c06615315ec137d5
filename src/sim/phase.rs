//! Lane switch state machine
//!
//! `Notes` has one fixed active band member. A switch edge for another lane
//! starts a `Transition` that runs for a fixed number of frames, after which
//! the goal lane becomes active.

use serde::{Deserialize, Serialize};

/// Current switch phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Active lane fixed, judged against trigger input
    Notes,
    /// Animating toward `goal`; `progress` counts frames up to the phase length
    Transition { goal: usize, progress: u32 },
}

/// Which lane is active and how far a switch has progressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMachine {
    pub phase: Phase,
    active: usize,
    /// Transition length in frames
    frames: u32,
}

impl PhaseMachine {
    pub fn new(active: usize, frames: u32) -> Self {
        Self {
            phase: Phase::Notes,
            active,
            frames: frames.max(1),
        }
    }

    #[inline]
    pub fn active(&self) -> usize {
        self.active
    }

    #[inline]
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Frames into the current transition (0 in `Notes`)
    pub fn progress(&self) -> u32 {
        match self.phase {
            Phase::Notes => 0,
            Phase::Transition { progress, .. } => progress,
        }
    }

    pub fn goal(&self) -> Option<usize> {
        match self.phase {
            Phase::Notes => None,
            Phase::Transition { goal, .. } => Some(goal),
        }
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, Phase::Transition { .. })
    }

    /// Lane whose hit notes receive trigger input this frame.
    ///
    /// During a transition input already goes to the goal lane.
    pub fn judged_lane(&self) -> usize {
        self.goal().unwrap_or(self.active)
    }

    /// Start a switch to `lane`. Ignored mid-transition or for the active lane.
    pub fn request_switch(&mut self, lane: usize) -> bool {
        if self.is_transitioning() || lane == self.active {
            return false;
        }
        self.phase = Phase::Transition {
            goal: lane,
            progress: 0,
        };
        true
    }

    /// Advance one frame. Returns the new active lane when a transition completes.
    pub fn advance(&mut self) -> Option<usize> {
        let Phase::Transition { goal, progress } = self.phase else {
            return None;
        };
        let progress = progress + 1;
        if progress >= self.frames {
            self.active = goal;
            self.phase = Phase::Notes;
            Some(goal)
        } else {
            self.phase = Phase::Transition { goal, progress };
            None
        }
    }

    /// Transition completion as 0-1
    pub fn fraction(&self) -> f32 {
        self.progress() as f32 / self.frames as f32
    }

    /// How much of the "active" layout `lane` gets, 0-1
    pub fn weight(&self, lane: usize) -> f32 {
        match self.phase {
            Phase::Notes => {
                if lane == self.active {
                    1.0
                } else {
                    0.0
                }
            }
            Phase::Transition { goal, .. } => {
                let t = self.fraction();
                if lane == goal {
                    t
                } else if lane == self.active {
                    1.0 - t
                } else {
                    0.0
                }
            }
        }
    }

    /// Back to `Notes` on `active`
    pub fn reset(&mut self, active: usize) {
        self.phase = Phase::Notes;
        self.active = active;
    }
}
