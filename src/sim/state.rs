//! Session state
//!
//! One `GameState` per played level. Everything the frame step touches lives
//! here and is passed around by `&mut`; there are no globals.

use crate::arcade::ArcadeWorld;
use crate::lerp;
use crate::settings::Settings;

use super::effects::Effects;
use super::judge::{Judge, Verdict};
use super::lane::{BandMember, LaneRect, LineLatch};
use super::level::Level;
use super::phase::PhaseMachine;

/// How the session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    Playing,
    /// A band member's competency ran out
    Lost { lane: usize },
    /// Every note spawned and resolved
    Cleared,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Playing => "playing",
            Outcome::Lost { .. } => "lost",
            Outcome::Cleared => "cleared",
        }
    }

    pub fn is_over(&self) -> bool {
        !matches!(self, Outcome::Playing)
    }
}

/// Combo tracking across all lanes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub combo: u32,
    pub max_combo: u32,
    pub hits: u32,
    pub misses: u32,
}

impl Scoreboard {
    pub fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Pending => {}
            Verdict::OffTime { .. } => self.combo = 0,
            Verdict::Hit { .. } => {
                self.hits += 1;
                self.combo += 1;
                self.max_combo = self.max_combo.max(self.combo);
            }
        }
    }

    pub fn record_misses(&mut self, count: u32) {
        if count > 0 {
            self.misses += count;
            self.combo = 0;
        }
    }
}

/// Complete state of one session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed for the particle and arcade RNG streams
    pub seed: u64,
    pub level_name: String,
    pub settings: Settings,
    pub judge: Judge,
    /// Band members in level order
    pub lanes: Vec<BandMember>,
    pub phase: PhaseMachine,
    /// Visual particles (not gameplay-affecting)
    pub effects: Effects,
    /// Attached arcade field, stepped after the rhythm game each frame
    pub arcade: Option<ArcadeWorld>,
    pub outcome: Outcome,
    pub scoreboard: Scoreboard,
    /// Frames ticked since the start or last reset
    pub frame: u64,
    /// Clock position seen by the previous tick
    pub last_sample: Option<i64>,
    /// Lines already resolved this frame
    pub latch: LineLatch,
}

impl GameState {
    pub fn new(level: Level, settings: Settings, seed: u64) -> Self {
        let lanes: Vec<BandMember> = level
            .timelines
            .into_iter()
            .enumerate()
            .map(|(index, timeline)| {
                let mut lane = BandMember::new(
                    index,
                    timeline,
                    settings.lines,
                    settings.max_competency,
                    settings.start_competency,
                );
                lane.hit_bar_fraction = settings.layout.hit_bar_fraction;
                lane
            })
            .collect();

        let initial = settings.initial_lane.min(lanes.len().saturating_sub(1));
        let mut state = Self {
            seed,
            level_name: level.name,
            judge: Judge::new(settings.windows, settings.rewards.off_time),
            phase: PhaseMachine::new(initial, settings.transition_frames),
            effects: Effects::new(
                seed,
                settings.max_particles(),
                settings.particles_per_point,
            ),
            settings,
            lanes,
            arcade: None,
            outcome: Outcome::Playing,
            scoreboard: Scoreboard::default(),
            frame: 0,
            last_sample: None,
            latch: LineLatch::default(),
        };
        state.relayout();

        log::info!(
            "Session '{}' with {} band members, lane {} active",
            state.level_name,
            state.lanes.len(),
            initial
        );
        state
    }

    /// Attach an arcade field; resolving hits drop shells into it
    pub fn with_arcade(mut self, arcade: ArcadeWorld) -> Self {
        self.arcade = Some(arcade);
        self
    }

    pub fn active_lane(&self) -> &BandMember {
        &self.lanes[self.phase.active()]
    }

    /// Lane receiving trigger judgment this frame
    pub fn judged_lane(&self) -> usize {
        self.phase.judged_lane()
    }

    /// Total of every applied status, including the arcade field
    pub fn score(&self) -> i64 {
        let notes: i64 = self.lanes.iter().map(|l| l.stats.points).sum();
        notes + self.arcade.as_ref().map_or(0, |a| a.score)
    }

    /// Lay out lane rectangles for the current phase.
    ///
    /// Lanes sit side by side; each gets a width between the inactive and the
    /// active width according to its phase weight.
    pub fn relayout(&mut self) {
        let layout = &self.settings.layout;
        let mut x = layout.origin_x;
        for lane in self.lanes.iter_mut() {
            let width = lerp(
                layout.inactive_width,
                layout.active_width,
                self.phase.weight(lane.index),
            );
            lane.rect = LaneRect::new(x, layout.origin_y, width, layout.lane_height);
            x += width + layout.gap;
        }
    }

    /// Handle a switch edge for `goal` at the calibrated `position`.
    ///
    /// Judges the goal lane's switch notes and drops every unresolved note of
    /// the other lanes. Returns false when the request is ignored.
    pub fn begin_switch(&mut self, goal: usize, position: i64) -> bool {
        if goal >= self.lanes.len() {
            return false;
        }
        let vacated = self.phase.active();
        if !self.phase.request_switch(goal) {
            return false;
        }

        let award = self.settings.rewards.switch();
        let verdicts = self.lanes[goal].judge_switch(&self.judge, position, award, &mut self.effects);
        for verdict in verdicts.iter().copied() {
            self.scoreboard.record(verdict);
        }
        let dropped: usize = self
            .lanes
            .iter_mut()
            .filter(|lane| lane.index != goal)
            .map(BandMember::discard_unresolved)
            .sum();

        log::info!(
            "Switch {} -> {} at sample {} ({} switch notes hit, {} notes dropped)",
            vacated,
            goal,
            position,
            verdicts.len(),
            dropped
        );
        true
    }

    /// Decide win/lose once per frame
    pub fn update_outcome(&mut self) -> Outcome {
        if self.outcome.is_over() {
            return self.outcome;
        }
        if let Some(lane) = self.lanes.iter().position(BandMember::is_depleted) {
            self.outcome = Outcome::Lost { lane };
            log::info!("Game over: lane {lane} ran out of competency");
        } else if self.lanes.iter().all(BandMember::is_finished) {
            self.outcome = Outcome::Cleared;
            log::info!(
                "Level '{}' cleared, score {}, max combo {}",
                self.level_name,
                self.score(),
                self.scoreboard.max_combo
            );
        }
        self.outcome
    }

    /// Reclaim destroyed entities from every pool
    pub fn collect(&mut self) -> usize {
        let mut reclaimed = self.effects.collect();
        for lane in self.lanes.iter_mut() {
            reclaimed += lane.collect();
        }
        if let Some(arcade) = self.arcade.as_mut() {
            reclaimed += arcade.collect();
        }
        reclaimed
    }

    /// Restart the level from its first note
    pub fn reset(&mut self) {
        let start = self.settings.start_competency;
        for lane in self.lanes.iter_mut() {
            lane.reset(start);
        }
        let initial = self
            .settings
            .initial_lane
            .min(self.lanes.len().saturating_sub(1));
        self.phase.reset(initial);
        self.effects.reset();
        if let Some(arcade) = self.arcade.as_mut() {
            arcade.reset();
            arcade.spawn_ship();
        }
        self.outcome = Outcome::Playing;
        self.scoreboard = Scoreboard::default();
        self.frame = 0;
        self.last_sample = None;
        self.latch = LineLatch::default();
        self.relayout();
        log::info!("Session '{}' reset", self.level_name);
    }
}
