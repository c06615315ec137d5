//! Demo player
//!
//! Produces raw button levels from the visible notes and feeds them through an
//! `EdgeDetector`, exactly like a device-backed input layer would.

use super::input::{ButtonState, EdgeDetector, FrameInput};
use super::state::GameState;
use crate::consts::MAX_LINES;

/// Plays the judged lane with a fixed timing error
#[derive(Debug, Clone, Default)]
pub struct Autoplay {
    /// Samples added to every target (positive = late)
    pub offset: i64,
    edges: EdgeDetector,
    last: ButtonState,
    /// Release target of the hold kept down on each line
    holding: [Option<i64>; MAX_LINES],
}

impl Autoplay {
    pub fn new(offset: i64) -> Self {
        Self {
            offset,
            ..Default::default()
        }
    }

    /// Input for the frame about to be ticked at the calibrated `position`
    pub fn input(&mut self, state: &GameState, position: i64) -> FrameInput {
        let mut raw = ButtonState::default();

        for (line, hold) in self.holding.iter_mut().enumerate() {
            if let Some(release) = *hold {
                if position >= release {
                    *hold = None;
                } else {
                    raw.triggers[line] = true;
                }
            }
        }

        if let Some(lane) = state.lanes.get(state.judged_lane()) {
            for note in lane.hit_notes.iter() {
                if note.destroyed || note.head_resolved {
                    continue;
                }
                let Some(line) = note.line else {
                    continue;
                };
                // A press needs the button up on the previous frame
                if raw.triggers[line] || self.last.triggers[line] {
                    continue;
                }
                if position >= note.hit_sample + self.offset {
                    raw.triggers[line] = true;
                    if note.is_hold() {
                        self.holding[line] = Some(note.tail_sample() + self.offset);
                    }
                }
            }
        }

        if !state.phase.is_transitioning() {
            let active = state.phase.active();
            let due = state.lanes.iter().position(|lane| {
                lane.index != active
                    && lane
                        .switch_notes
                        .iter()
                        .any(|n| !n.destroyed && position >= n.hit_sample + self.offset)
            });
            if let Some(lane) = due {
                raw.switches[lane] = true;
            }
        }

        self.last = raw;
        self.edges.update(raw)
    }

    pub fn reset(&mut self) {
        self.edges.reset();
        self.last = ButtonState::default();
        self.holding = [None; MAX_LINES];
    }
}
