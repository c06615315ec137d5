//! Timing-window judgment
//!
//! Classifies the distance between the calibrated clock position and a note's
//! target into one of three concentric windows and writes the outcome into the
//! note. Lane-level side effects (competency, feedback, line latches) are
//! applied by the caller from the returned `Verdict`.

use serde::{Deserialize, Serialize};

use super::note::Note;
use crate::consts::{BEAT_RADIUS, INNER_RADIUS, OUTER_RADIUS};

/// Window radii in samples; `beat < inner < outer`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingWindows {
    /// Beyond this nothing is judged
    pub outer: i64,
    /// Inside this a judgment resolves the note
    pub inner: i64,
    /// Inside this a resolving judgment counts as on the beat
    pub beat: i64,
}

impl Default for TimingWindows {
    fn default() -> Self {
        Self {
            outer: OUTER_RADIUS,
            inner: INNER_RADIUS,
            beat: BEAT_RADIUS,
        }
    }
}

/// Which window a distance falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    OnBeat,
    OffBeat,
    OffTime,
    Outside,
}

impl TimingWindows {
    /// Build windows with the beat radius given in milliseconds
    pub fn with_beat_ms(outer: i64, inner: i64, beat_ms: f64, sample_rate: u32, channels: u32) -> Self {
        Self {
            outer,
            inner,
            beat: crate::ms_to_samples(beat_ms, sample_rate, channels),
        }
    }

    pub fn is_ordered(&self) -> bool {
        0 < self.beat && self.beat < self.inner && self.inner < self.outer
    }

    /// Scale every radius by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |r: i64| (r as f64 * factor).round() as i64;
        Self {
            outer: scale(self.outer),
            inner: scale(self.inner),
            beat: scale(self.beat),
        }
    }

    /// Window of `position` relative to `target`. Never overflows.
    #[inline]
    pub fn classify(&self, position: i64, target: i64) -> Window {
        let radius = |r: i64| r.max(0).unsigned_abs();
        let distance = position.abs_diff(target);
        if distance >= radius(self.outer) {
            Window::Outside
        } else if distance >= radius(self.inner) {
            Window::OffTime
        } else if distance < radius(self.beat) {
            Window::OnBeat
        } else {
            Window::OffBeat
        }
    }
}

/// Reward table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rewards {
    pub on_beat: i32,
    pub off_beat: i32,
    /// Status written for a press between the inner and outer windows
    pub off_time: i32,
    pub switch_on_beat: i32,
    pub switch_off_beat: i32,
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            on_beat: 3,
            off_beat: 1,
            off_time: -1,
            switch_on_beat: 4,
            switch_off_beat: 2,
        }
    }
}

impl Rewards {
    /// Award pair for single and hold notes
    pub fn hit(&self) -> Award {
        Award {
            on_beat: self.on_beat,
            off_beat: self.off_beat,
        }
    }

    /// Award pair for switch notes
    pub fn switch(&self) -> Award {
        Award {
            on_beat: self.switch_on_beat,
            off_beat: self.switch_off_beat,
        }
    }
}

/// Rewards granted by a resolving judgment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Award {
    pub on_beat: i32,
    pub off_beat: i32,
}

/// Outcome of one judgment call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Out of range (or already resolved); nothing changed
    Pending,
    /// Between the inner and outer windows; note stays eligible
    OffTime { status: i32 },
    /// Resolved
    Hit {
        reward: i32,
        on_beat: bool,
        destroyed: bool,
    },
}

impl Verdict {
    /// Status to apply to the lane's competency
    pub fn status(&self) -> i32 {
        match *self {
            Verdict::Pending => 0,
            Verdict::OffTime { status } => status,
            Verdict::Hit { reward, .. } => reward,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Verdict::Hit { .. })
    }
}

/// The window classifier
#[derive(Debug, Clone, Copy)]
pub struct Judge {
    pub windows: TimingWindows,
    pub off_time: i32,
}

impl Judge {
    pub fn new(windows: TimingWindows, off_time: i32) -> Self {
        Self { windows, off_time }
    }

    /// Judge `note` at the calibrated clock `position`.
    ///
    /// `lifted` anchors the judgment to a hold's tail and writes `tail_status`;
    /// passing it for anything but a hold is a caller bug.
    pub fn judge(
        &self,
        note: &mut Note,
        position: i64,
        award: Award,
        destroy_on_hit: bool,
        lifted: bool,
    ) -> Verdict {
        assert!(
            !lifted || note.is_hold(),
            "release judgment requested for {} note {}",
            note.kind.as_str(),
            note.id
        );

        if note.destroyed || (!lifted && note.head_resolved) {
            return Verdict::Pending;
        }

        let target = if lifted { note.tail_sample() } else { note.hit_sample };
        let window = self.windows.classify(position, target);

        let status = match window {
            Window::Outside => return Verdict::Pending,
            Window::OffTime => self.off_time,
            Window::OnBeat => award.on_beat,
            Window::OffBeat => award.off_beat,
        };

        if lifted {
            note.tail_status = status;
        } else {
            note.hit_status = status;
        }

        if window == Window::OffTime {
            return Verdict::OffTime { status };
        }

        if !lifted {
            note.head_resolved = true;
        }
        if destroy_on_hit {
            note.discard();
        }

        Verdict::Hit {
            reward: status,
            on_beat: window == Window::OnBeat,
            destroyed: destroy_on_hit,
        }
    }
}

impl Default for Judge {
    fn default() -> Self {
        Self::new(TimingWindows::default(), Rewards::default().off_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn award() -> Award {
        Rewards::default().hit()
    }

    #[test]
    fn test_on_beat_hit_destroys() {
        let judge = Judge::default();
        let mut note = Note::single(1, 0, 100_000);

        let verdict = judge.judge(&mut note, 103_000, award(), true, false);

        assert_eq!(
            verdict,
            Verdict::Hit {
                reward: 3,
                on_beat: true,
                destroyed: true
            }
        );
        assert_eq!(note.hit_status, 3);
        assert!(note.destroyed);
    }

    #[test]
    fn test_off_time_keeps_note_pending() {
        let judge = Judge::default();
        let mut note = Note::single(1, 0, 100_000);

        let verdict = judge.judge(&mut note, 120_000, award(), true, false);

        assert_eq!(verdict, Verdict::OffTime { status: -1 });
        assert_eq!(note.hit_status, -1);
        assert!(!note.destroyed);
        assert!(!note.head_resolved);
    }

    #[test]
    fn test_outside_changes_nothing() {
        let judge = Judge::default();
        let mut note = Note::single(1, 0, 100_000);

        let verdict = judge.judge(&mut note, 130_000, award(), true, false);

        assert_eq!(verdict, Verdict::Pending);
        assert_eq!(note.hit_status, 0);
        assert!(!note.destroyed);
    }

    #[test]
    fn test_off_time_then_better_judgment() {
        let judge = Judge::default();
        let mut note = Note::single(1, 0, 100_000);

        judge.judge(&mut note, 80_000, award(), true, false);
        assert_eq!(note.hit_status, -1);

        let verdict = judge.judge(&mut note, 90_000, award(), true, false);
        assert_eq!(
            verdict,
            Verdict::Hit {
                reward: 1,
                on_beat: false,
                destroyed: true
            }
        );
        assert_eq!(note.hit_status, 1);
    }

    #[test]
    fn test_early_press_is_symmetric() {
        let judge = Judge::default();
        let mut note = Note::single(1, 0, 100_000);
        let verdict = judge.judge(&mut note, 97_000, award(), true, false);
        assert!(matches!(verdict, Verdict::Hit { on_beat: true, .. }));
    }

    #[test]
    fn test_destroyed_note_is_frozen() {
        let judge = Judge::default();
        let mut note = Note::single(1, 0, 100_000);
        judge.judge(&mut note, 100_000, award(), true, false);
        assert_eq!(note.hit_status, 3);

        // Off-time press afterwards must not overwrite
        let verdict = judge.judge(&mut note, 120_000, award(), true, false);
        assert_eq!(verdict, Verdict::Pending);
        assert_eq!(note.hit_status, 3);
    }

    #[test]
    fn test_hold_head_then_tail() {
        let judge = Judge::default();
        let mut note = Note::hold(1, 0, 100_000, 50_000);

        let head = judge.judge(&mut note, 101_000, award(), false, false);
        assert!(matches!(head, Verdict::Hit { destroyed: false, .. }));
        assert!(note.head_resolved);
        assert!(!note.destroyed);

        // A second press on the head is ignored
        assert_eq!(
            judge.judge(&mut note, 101_000, award(), false, false),
            Verdict::Pending
        );

        // Release far from the tail is not judged
        assert_eq!(
            judge.judge(&mut note, 110_000, award(), true, true),
            Verdict::Pending
        );

        let tail = judge.judge(&mut note, 160_000, award(), true, true);
        assert!(matches!(tail, Verdict::Hit { on_beat: false, destroyed: true, .. }));
        assert_eq!(note.hit_status, 3);
        assert_eq!(note.tail_status, 1);
        assert!(note.destroyed);
    }

    #[test]
    #[should_panic(expected = "release judgment requested")]
    fn test_lifted_single_panics() {
        let judge = Judge::default();
        let mut note = Note::single(1, 0, 100_000);
        judge.judge(&mut note, 100_000, award(), true, true);
    }

    #[test]
    fn test_with_beat_ms() {
        let windows = TimingWindows::with_beat_ms(25_000, 18_000, 68.0, 44_100, 2);
        assert_eq!(windows.beat, 5_998);
        assert!(windows.is_ordered());
    }

    #[test]
    fn test_classify_extreme_positions() {
        let w = TimingWindows::default();
        assert_eq!(w.classify(i64::MAX, i64::MIN), Window::Outside);
        assert_eq!(w.classify(i64::MIN, i64::MAX), Window::Outside);
        assert_eq!(w.classify(i64::MAX, i64::MAX - 3_000), Window::OnBeat);
        assert_eq!(w.classify(100_000, 120_000), Window::OffTime);
        assert_eq!(w.classify(100_000, 90_000), Window::OffBeat);
    }

    #[test]
    fn test_judge_at_extreme_clock() {
        let judge = Judge::default();
        let mut note = Note::single(1, 0, 100_000);
        assert_eq!(judge.judge(&mut note, i64::MIN, award(), true, false), Verdict::Pending);
        assert_eq!(note.hit_status, 0);
    }

    proptest! {
        #[test]
        fn prop_windows_nest(d in 0i64..40_000) {
            let w = TimingWindows::default();
            if d < w.beat { prop_assert!(d < w.inner); }
            if d < w.inner { prop_assert!(d < w.outer); }
        }

        #[test]
        fn prop_closer_never_scores_less(a in 0i64..18_000, b in 0i64..18_000) {
            let judge = Judge::default();
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            let mut n1 = Note::single(1, 0, 100_000);
            let mut n2 = Note::single(2, 0, 100_000);
            let v_near = judge.judge(&mut n1, 100_000 + near, award(), true, false);
            let v_far = judge.judge(&mut n2, 100_000 - far, award(), true, false);
            prop_assert!(v_near.status() >= v_far.status());
        }

        #[test]
        fn prop_scaled_windows_stay_ordered(factor in 0.5f64..2.0) {
            prop_assert!(TimingWindows::default().scaled(factor).is_ordered());
        }
    }
}
