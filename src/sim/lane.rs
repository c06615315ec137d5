//! Band member state
//!
//! Each band member owns a note timeline, the notes currently on screen (hit
//! notes and switch notes in separate pools) and a competency meter.

use glam::Vec2;

use super::effects::Effects;
use super::judge::{Award, Judge, Verdict, Window};
use super::level::Timeline;
use super::note::Note;
use super::pool::Pool;
use crate::consts::MAX_LINES;

/// Per-frame "a press already resolved a note on this line" flags
pub type LineLatch = [bool; MAX_LINES];

/// Screen rectangle anchored at its bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LaneRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LaneRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y + self.height
    }
}

/// Judgment tallies of one band member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaneStats {
    pub on_beat: u32,
    pub off_beat: u32,
    pub off_time: u32,
    pub misses: u32,
    pub switches_hit: u32,
    pub switches_missed: u32,
    /// Sum of every status applied by judgments
    pub points: i64,
}

/// One playable band member
#[derive(Debug, Clone)]
pub struct BandMember {
    pub index: usize,
    pub rect: LaneRect,
    pub lines: usize,
    /// Hit bar height above the lane bottom, as a fraction of lane height
    pub hit_bar_fraction: f32,
    competency: i32,
    max_competency: i32,
    /// Single and hold notes on screen
    pub hit_notes: Pool<Note>,
    /// Switch notes on screen
    pub switch_notes: Pool<Note>,
    pub timeline: Timeline,
    pub stats: LaneStats,
}

impl BandMember {
    pub fn new(
        index: usize,
        timeline: Timeline,
        lines: usize,
        max_competency: i32,
        start_competency: i32,
    ) -> Self {
        Self {
            index,
            rect: LaneRect::default(),
            lines: lines.clamp(1, MAX_LINES),
            hit_bar_fraction: 0.2,
            competency: start_competency.clamp(0, max_competency),
            max_competency,
            hit_notes: Pool::with_capacity(64),
            switch_notes: Pool::with_capacity(8),
            timeline,
            stats: LaneStats::default(),
        }
    }

    #[inline]
    pub fn competency(&self) -> i32 {
        self.competency
    }

    #[inline]
    pub fn max_competency(&self) -> i32 {
        self.max_competency
    }

    /// Competency as 0-1
    pub fn competency_fraction(&self) -> f32 {
        self.competency as f32 / self.max_competency as f32
    }

    /// Apply a competency change, clamped to [0, max]
    pub fn comp_update(&mut self, delta: i32) -> i32 {
        self.competency = self
            .competency
            .saturating_add(delta)
            .clamp(0, self.max_competency);
        self.competency
    }

    /// Competency ran out (lose condition)
    pub fn is_depleted(&self) -> bool {
        self.competency == 0
    }

    /// Nothing left to spawn and nothing on screen
    pub fn is_finished(&self) -> bool {
        self.timeline.is_drained()
            && self.hit_notes.live_count() == 0
            && self.switch_notes.live_count() == 0
    }

    /// Screen y of the hit bar
    pub fn hit_bar_y(&self) -> f32 {
        self.rect.y + self.rect.height * self.hit_bar_fraction
    }

    /// Screen x of a line's center
    pub fn line_x(&self, line: usize) -> f32 {
        let line_width = self.rect.width / self.lines as f32;
        self.rect.x + line_width * (line as f32 + 0.5)
    }

    /// Pixels a note travels per sample so it crosses the lane in `spawn_lead`
    pub fn pixels_per_sample(&self, spawn_lead: i64) -> f32 {
        (self.rect.top() - self.hit_bar_y()) / spawn_lead.max(1) as f32
    }

    /// Move every due note from the timeline into its active pool
    pub fn spawn_due(&mut self, now: i64) -> usize {
        let mut spawned = 0;
        while let Some(note) = self.timeline.next_due(now) {
            if note.is_switch() {
                self.switch_notes.push(note);
            } else {
                self.hit_notes.push(note);
            }
            spawned += 1;
        }
        spawned
    }

    /// Recompute note positions and destroy notes past the bottom edge.
    ///
    /// Returns the number of notes missed this frame.
    pub fn advance(&mut self, now: i64, spawn_lead: i64, miss_penalty: i32) -> u32 {
        let speed = self.pixels_per_sample(spawn_lead);
        let hit_bar = self.hit_bar_y();
        let die_y = self.rect.y;
        let center_x = self.rect.x + self.rect.width * 0.5;
        let line_width = self.rect.width / self.lines as f32;
        let left = self.rect.x;

        let mut missed = 0;
        let mut switch_missed = 0;
        for note in self.hit_notes.iter_mut() {
            if note.destroyed {
                continue;
            }
            let x = note
                .line
                .map_or(center_x, |line| left + line_width * (line as f32 + 0.5));
            note.pos = Vec2::new(x, hit_bar + (note.hit_sample - now) as f32 * speed);
            note.tail_y = hit_bar + (note.tail_sample() - now) as f32 * speed;
            if note.tail_y < die_y {
                note.discard();
                missed += 1;
            }
        }
        for note in self.switch_notes.iter_mut() {
            if note.destroyed {
                continue;
            }
            note.pos = Vec2::new(center_x, hit_bar + (note.hit_sample - now) as f32 * speed);
            note.tail_y = note.pos.y;
            if note.pos.y < die_y {
                note.discard();
                switch_missed += 1;
            }
        }

        self.stats.misses += missed;
        self.stats.switches_missed += switch_missed;
        let total = missed + switch_missed;
        if total > 0 {
            self.comp_update(miss_penalty.saturating_mul(total as i32));
        }
        total
    }

    /// Judge a trigger press on `line` against this lane's hit notes.
    ///
    /// Notes are tried in spawn order until one resolves or the line latch is set.
    pub fn judge_press(
        &mut self,
        judge: &Judge,
        line: usize,
        position: i64,
        award: Award,
        latch: &mut LineLatch,
        effects: &mut Effects,
    ) -> Verdict {
        let mut outcome = Verdict::Pending;
        for i in 0..self.hit_notes.len() {
            if latch[line] {
                break;
            }
            let note = &mut self.hit_notes[i];
            if note.destroyed || note.line != Some(line) {
                continue;
            }
            let destroy_on_hit = !note.is_hold();
            let verdict = judge.judge(note, position, award, destroy_on_hit, false);
            let origin = note.pos;
            match verdict {
                Verdict::Pending => continue,
                Verdict::OffTime { .. } => {
                    self.stats.off_time += 1;
                }
                Verdict::Hit { on_beat, .. } => {
                    if self.hit_notes[i].is_hold() {
                        self.hit_notes[i].holding = true;
                    }
                    latch[line] = true;
                    if on_beat {
                        self.stats.on_beat += 1;
                    } else {
                        self.stats.off_beat += 1;
                    }
                }
            }
            self.apply(verdict, origin, effects);
            outcome = verdict;
        }
        outcome
    }

    /// Judge a trigger release on `line` against the holds being held there
    pub fn judge_release(
        &mut self,
        judge: &Judge,
        line: usize,
        position: i64,
        award: Award,
        effects: &mut Effects,
    ) -> Verdict {
        let mut outcome = Verdict::Pending;
        for i in 0..self.hit_notes.len() {
            let note = &mut self.hit_notes[i];
            if note.destroyed || !note.holding || note.line != Some(line) {
                continue;
            }
            let verdict = judge.judge(note, position, award, true, true);
            note.holding = false;
            let origin = Vec2::new(note.pos.x, note.tail_y);
            match verdict {
                Verdict::Pending => continue,
                Verdict::OffTime { .. } => self.stats.off_time += 1,
                Verdict::Hit { on_beat: true, .. } => self.stats.on_beat += 1,
                Verdict::Hit { on_beat: false, .. } => self.stats.off_beat += 1,
            }
            self.apply(verdict, origin, effects);
            outcome = verdict;
        }
        outcome
    }

    /// A switch into this lane: judge every visible switch note and consume them all.
    ///
    /// Only notes inside the resolving windows are judged. The rest are
    /// destroyed with no status and no competency change.
    /// Returns the verdicts of notes that resolved, in spawn order.
    pub fn judge_switch(
        &mut self,
        judge: &Judge,
        position: i64,
        award: Award,
        effects: &mut Effects,
    ) -> Vec<Verdict> {
        let mut resolved = Vec::new();
        for i in 0..self.switch_notes.len() {
            let note = &mut self.switch_notes[i];
            if note.destroyed {
                continue;
            }
            let window = judge.windows.classify(position, note.hit_sample);
            if !matches!(window, Window::OnBeat | Window::OffBeat) {
                note.discard();
                self.stats.switches_missed += 1;
                continue;
            }
            let verdict = judge.judge(note, position, award, true, false);
            let origin = note.pos;
            self.stats.switches_hit += 1;
            self.apply(verdict, origin, effects);
            resolved.push(verdict);
        }
        resolved
    }

    /// Drop every note still on screen without judging it (lane is being left
    /// behind by a switch). Returns how many were dropped.
    pub fn discard_unresolved(&mut self) -> usize {
        let mut count = 0;
        let notes = self.hit_notes.iter_mut().chain(self.switch_notes.iter_mut());
        for note in notes.filter(|n| !n.destroyed) {
            note.discard();
            count += 1;
        }
        count
    }

    fn apply(&mut self, verdict: Verdict, origin: Vec2, effects: &mut Effects) {
        let status = verdict.status();
        if status == 0 {
            return;
        }
        self.comp_update(status);
        self.stats.points += status as i64;
        let on_beat = matches!(verdict, Verdict::Hit { on_beat: true, .. });
        effects.burst(origin, status, on_beat);
        log::debug!(
            "lane {} judged {:?}, competency {}",
            self.index,
            verdict,
            self.competency
        );
    }

    /// Reclaim destroyed notes from both pools
    pub fn collect(&mut self) -> usize {
        self.hit_notes.collect() + self.switch_notes.collect()
    }

    /// Back to the load-time state
    pub fn reset(&mut self, start_competency: i32) {
        self.hit_notes.clear();
        self.switch_notes.clear();
        self.timeline.rewind();
        self.competency = start_competency.clamp(0, self.max_competency);
        self.stats = LaneStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::judge::Rewards;
    use proptest::prelude::*;

    const LEAD: i64 = 100_000;

    fn member(notes: Vec<Note>) -> BandMember {
        let mut lane = BandMember::new(0, Timeline::new(notes, LEAD), 4, 100, 50);
        lane.rect = LaneRect::new(0.0, 0.0, 400.0, 500.0);
        lane
    }

    fn effects() -> Effects {
        Effects::new(1, 256, 4)
    }

    #[test]
    fn test_spawn_splits_pools() {
        let mut lane = member(vec![
            Note::single(1, 0, 150_000),
            Note::switch(2, 160_000),
            Note::hold(3, 1, 170_000, 20_000),
        ]);
        assert_eq!(lane.spawn_due(50_000), 1);
        assert_eq!(lane.spawn_due(70_000), 2);
        assert_eq!(lane.hit_notes.len(), 2);
        assert_eq!(lane.switch_notes.len(), 1);
        assert!(lane.timeline.is_drained());
    }

    #[test]
    fn test_pools_stay_disjoint() {
        let notes: Vec<Note> = (0..20)
            .map(|i| {
                if i % 3 == 0 {
                    Note::switch(i + 1, 120_000 + i as i64 * 1_000)
                } else {
                    Note::single(i + 1, (i % 4) as usize, 120_000 + i as i64 * 1_000)
                }
            })
            .collect();
        let mut lane = member(notes);
        lane.spawn_due(1_000_000);

        for note in lane.hit_notes.iter() {
            assert!(lane.switch_notes.iter().all(|s| s.id != note.id));
            assert!(lane.timeline.pending().iter().all(|p| p.id != note.id));
        }
        assert!(lane.switch_notes.iter().all(|n| n.is_switch()));
        assert!(lane.hit_notes.iter().all(|n| !n.is_switch()));
    }

    #[test]
    fn test_advance_positions_and_miss() {
        let mut lane = member(vec![Note::single(1, 0, 150_000)]);
        lane.spawn_due(50_000);

        // Spawned at the top of the lane
        lane.advance(50_000, LEAD, -5);
        let note = &lane.hit_notes[0];
        assert!((note.pos.y - lane.rect.top()).abs() < 1e-3);
        assert!((note.pos.x - 50.0).abs() < 1e-3);

        // On the hit bar at its target
        lane.advance(150_000, LEAD, -5);
        assert!((lane.hit_notes[0].pos.y - lane.hit_bar_y()).abs() < 1e-3);

        // Hit bar is 100px above the bottom, speed is 0.004 px/sample: dies 25000 samples late
        assert_eq!(lane.advance(174_000, LEAD, -5), 0);
        assert_eq!(lane.advance(176_000, LEAD, -5), 1);
        assert!(lane.hit_notes[0].destroyed);
        assert_eq!(lane.hit_notes[0].hit_status, 0);
        assert_eq!(lane.competency(), 45);
        assert_eq!(lane.stats.misses, 1);
    }

    #[test]
    fn test_press_latch_resolves_one_note() {
        let mut lane = member(vec![
            Note::single(1, 0, 150_000),
            Note::single(2, 0, 152_000),
        ]);
        lane.spawn_due(100_000);
        let judge = Judge::default();
        let mut latch = LineLatch::default();
        let mut fx = effects();

        let verdict = lane.judge_press(&judge, 0, 151_000, Rewards::default().hit(), &mut latch, &mut fx);
        assert!(verdict.is_hit());
        assert!(latch[0]);
        assert!(lane.hit_notes[0].destroyed);
        assert!(!lane.hit_notes[1].destroyed);
        assert_eq!(lane.competency(), 53);
        assert_eq!(lane.stats.points, 3);
        assert_eq!(fx.particles.len(), 12);
    }

    #[test]
    fn test_press_ignores_other_lines() {
        let mut lane = member(vec![Note::single(1, 2, 150_000)]);
        lane.spawn_due(100_000);
        let mut latch = LineLatch::default();
        let verdict = lane.judge_press(
            &Judge::default(),
            1,
            150_000,
            Rewards::default().hit(),
            &mut latch,
            &mut effects(),
        );
        assert_eq!(verdict, Verdict::Pending);
        assert!(!lane.hit_notes[0].destroyed);
    }

    #[test]
    fn test_hold_press_then_release() {
        let mut lane = member(vec![Note::hold(1, 3, 150_000, 40_000)]);
        lane.spawn_due(100_000);
        let judge = Judge::default();
        let award = Rewards::default().hit();
        let mut fx = effects();

        let mut latch = LineLatch::default();
        lane.judge_press(&judge, 3, 150_500, award, &mut latch, &mut fx);
        assert!(lane.hit_notes[0].holding);
        assert!(!lane.hit_notes[0].destroyed);

        let verdict = lane.judge_release(&judge, 3, 190_000, award, &mut fx);
        assert!(matches!(verdict, Verdict::Hit { on_beat: true, destroyed: true, .. }));
        assert!(!lane.hit_notes[0].holding);
        assert_eq!(lane.competency(), 56);
        assert_eq!(lane.stats.on_beat, 2);
    }

    #[test]
    fn test_early_release_drops_hold() {
        let mut lane = member(vec![Note::hold(1, 0, 150_000, 200_000)]);
        lane.spawn_due(100_000);
        let judge = Judge::default();
        let award = Rewards::default().hit();
        let mut fx = effects();

        let mut latch = LineLatch::default();
        lane.judge_press(&judge, 0, 150_000, award, &mut latch, &mut fx);
        assert_eq!(lane.judge_release(&judge, 0, 200_000, award, &mut fx), Verdict::Pending);
        assert!(!lane.hit_notes[0].holding);
        assert!(!lane.hit_notes[0].destroyed);

        // Released holds are not judged again on a later release
        assert_eq!(lane.judge_release(&judge, 0, 350_000, award, &mut fx), Verdict::Pending);
    }

    #[test]
    fn test_switch_consumes_all_switch_notes() {
        let mut lane = member(vec![Note::switch(1, 150_000), Note::switch(2, 300_000)]);
        lane.spawn_due(250_000);
        assert_eq!(lane.switch_notes.len(), 2);

        let resolved = lane.judge_switch(
            &Judge::default(),
            152_000,
            Rewards::default().switch(),
            &mut effects(),
        );
        assert_eq!(resolved.len(), 1);
        assert!(lane.switch_notes.iter().all(|n| n.destroyed));
        assert_eq!(lane.switch_notes[0].hit_status, 4);
        assert_eq!(lane.switch_notes[1].hit_status, 0);
        assert_eq!(lane.stats.switches_hit, 1);
        assert_eq!(lane.stats.switches_missed, 1);
    }

    #[test]
    fn test_switch_note_in_off_time_band_dropped_without_status() {
        let mut lane = member(vec![Note::switch(1, 150_000)]);
        lane.spawn_due(100_000);
        let mut fx = effects();

        let resolved = lane.judge_switch(
            &Judge::default(),
            170_000,
            Rewards::default().switch(),
            &mut fx,
        );
        assert!(resolved.is_empty());
        assert!(lane.switch_notes[0].destroyed);
        assert_eq!(lane.switch_notes[0].hit_status, 0);
        assert_eq!(lane.competency(), 50);
        assert_eq!(lane.stats.points, 0);
        assert_eq!(lane.stats.off_time, 0);
        assert_eq!(lane.stats.switches_missed, 1);
        assert!(fx.particles.is_empty());
    }

    #[test]
    fn test_switch_note_off_beat() {
        let mut lane = member(vec![Note::switch(1, 150_000)]);
        lane.spawn_due(100_000);
        let resolved = lane.judge_switch(
            &Judge::default(),
            140_000,
            Rewards::default().switch(),
            &mut effects(),
        );
        assert_eq!(resolved.len(), 1);
        assert_eq!(lane.switch_notes[0].hit_status, 2);
        assert_eq!(lane.competency(), 52);
    }

    #[test]
    fn test_discard_unresolved_clears_both_pools() {
        let mut lane = member(vec![
            Note::single(1, 0, 150_000),
            Note::hold(2, 1, 150_000, 80_000),
            Note::switch(3, 160_000),
        ]);
        lane.spawn_due(100_000);
        let mut latch = LineLatch::default();
        lane.judge_press(&Judge::default(), 1, 150_000, Rewards::default().hit(), &mut latch, &mut effects());
        assert!(lane.hit_notes[1].holding);

        assert_eq!(lane.discard_unresolved(), 3);
        assert!(lane.hit_notes.iter().all(|n| n.destroyed && !n.holding));
        assert!(lane.switch_notes.iter().all(|n| n.destroyed));
        assert_eq!(lane.hit_notes[0].hit_status, 0);
        assert_eq!(lane.competency(), 53);

        // Discarded notes are not misses
        assert_eq!(lane.advance(1_000_000, LEAD, -5), 0);
        assert_eq!(lane.stats.misses, 0);
        assert_eq!(lane.collect(), 3);
    }

    #[test]
    fn test_off_time_press_then_later_note_resolves() {
        let mut lane = member(vec![
            Note::single(1, 0, 150_000),
            Note::single(2, 0, 170_000),
        ]);
        lane.spawn_due(100_000);
        let mut latch = LineLatch::default();

        let verdict = lane.judge_press(
            &Judge::default(),
            0,
            172_000,
            Rewards::default().hit(),
            &mut latch,
            &mut effects(),
        );
        assert!(matches!(verdict, Verdict::Hit { on_beat: true, .. }));
        assert_eq!(lane.hit_notes[0].hit_status, -1);
        assert!(!lane.hit_notes[0].destroyed);
        assert!(lane.hit_notes[1].destroyed);
        assert_eq!(lane.competency(), 52);
        assert_eq!(lane.stats.off_time, 1);
        assert!(latch[0]);
    }

    #[test]
    fn test_reset_rewinds() {
        let mut lane = member(vec![Note::single(1, 0, 150_000)]);
        lane.spawn_due(100_000);
        lane.comp_update(-30);
        lane.reset(50);
        assert!(lane.hit_notes.is_empty());
        assert_eq!(lane.timeline.pending().len(), 1);
        assert_eq!(lane.competency(), 50);
    }

    proptest! {
        #[test]
        fn prop_competency_stays_clamped(deltas in proptest::collection::vec(-150i32..150, 0..64)) {
            let mut lane = member(Vec::new());
            for delta in deltas {
                let c = lane.comp_update(delta);
                prop_assert!((0..=lane.max_competency()).contains(&c));
            }
        }
    }
}
