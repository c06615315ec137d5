//! Scheduled notes
//!
//! A note is created when a level is loaded, sits in its lane's timeline until
//! the scroll position reaches its spawn threshold, then lives in one of the
//! lane's active pools until it is judged, missed or discarded.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::pool::Reclaim;

/// What the player has to do for a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteKind {
    /// Press once on the note's line
    Single,
    /// Press at the head, keep holding, release at the tail
    Hold { duration: i64 },
    /// Switch the active band member to the note's lane
    Switch,
}

impl NoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteKind::Single => "single",
            NoteKind::Hold { .. } => "hold",
            NoteKind::Switch => "switch",
        }
    }
}

/// A scheduled note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: u32,
    /// Line within the lane; `None` for switch notes
    pub line: Option<usize>,
    pub kind: NoteKind,
    /// Target sample position of the head
    pub hit_sample: i64,
    /// Reward or penalty of the (head) judgment, 0 while unresolved
    pub hit_status: i32,
    /// Reward or penalty of the release judgment (holds only)
    pub tail_status: i32,
    /// Head received a resolving judgment
    pub head_resolved: bool,
    /// Hold head resolved and the line has not been released since
    pub holding: bool,
    pub destroyed: bool,
    /// Screen position of the head (derived every frame)
    pub pos: Vec2,
    /// Screen y of the tail; equals `pos.y` for non-holds
    pub tail_y: f32,
}

impl Note {
    pub fn new(id: u32, line: Option<usize>, kind: NoteKind, hit_sample: i64) -> Self {
        debug_assert_eq!(line.is_none(), kind == NoteKind::Switch);
        Self {
            id,
            line,
            kind,
            hit_sample,
            hit_status: 0,
            tail_status: 0,
            head_resolved: false,
            holding: false,
            destroyed: false,
            pos: Vec2::ZERO,
            tail_y: 0.0,
        }
    }

    pub fn single(id: u32, line: usize, hit_sample: i64) -> Self {
        Self::new(id, Some(line), NoteKind::Single, hit_sample)
    }

    pub fn hold(id: u32, line: usize, hit_sample: i64, duration: i64) -> Self {
        Self::new(id, Some(line), NoteKind::Hold { duration }, hit_sample)
    }

    pub fn switch(id: u32, hit_sample: i64) -> Self {
        Self::new(id, None, NoteKind::Switch, hit_sample)
    }

    #[inline]
    pub fn is_hold(&self) -> bool {
        matches!(self.kind, NoteKind::Hold { .. })
    }

    #[inline]
    pub fn is_switch(&self) -> bool {
        self.kind == NoteKind::Switch
    }

    /// Hold length in samples (0 for non-holds)
    #[inline]
    pub fn hold_samples(&self) -> i64 {
        match self.kind {
            NoteKind::Hold { duration } => duration,
            _ => 0,
        }
    }

    /// Sample position of the tail
    #[inline]
    pub fn tail_sample(&self) -> i64 {
        self.hit_sample + self.hold_samples()
    }

    /// Sample position at which the note leaves the timeline
    #[inline]
    pub fn spawn_sample(&self, spawn_lead: i64) -> i64 {
        self.hit_sample - spawn_lead
    }

    /// Mark for reclamation without a reward
    pub fn discard(&mut self) {
        self.holding = false;
        self.destroyed = true;
    }

    /// Restore the load-time state (session restart)
    pub fn rewind(&mut self) {
        self.hit_status = 0;
        self.tail_status = 0;
        self.head_resolved = false;
        self.holding = false;
        self.destroyed = false;
        self.pos = Vec2::ZERO;
        self.tail_y = 0.0;
    }
}

impl Reclaim for Note {
    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
