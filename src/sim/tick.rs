//! Per-frame simulation step
//!
//! Advances a session deterministically from the clock position and the
//! frame's input edges.

use crate::arcade::ArcadeInput;
use crate::consts::FRAME_DT;

use super::clock::SampleClock;
use super::input::FrameInput;
use super::judge::Verdict;
use super::lane::LineLatch;
use super::state::GameState;

/// Advance the session by one video frame.
///
/// Order: read the clock, phase transition, trigger judgment on the judged
/// lane, spawn and scroll notes, lose check, arcade step, collection.
pub fn tick(state: &mut GameState, input: &FrameInput, clock: &impl SampleClock) {
    if state.outcome.is_over() {
        return;
    }

    let now = clock.current_sample_position();
    if let Some(last) = state.last_sample {
        if now < last {
            log::warn!("Clock went backwards: {last} -> {now}");
        }
    }
    state.last_sample = Some(now);
    state.frame += 1;
    let position = now - state.settings.calibration_offset;

    // Phase
    if let Some(lane) = input.switch_edge(state.phase.active()) {
        state.begin_switch(lane, position);
    }
    if let Some(active) = state.phase.advance() {
        log::info!("Lane {active} active (frame {})", state.frame);
    }
    state.relayout();

    // Judgment
    state.latch = LineLatch::default();
    let judged = state.phase.judged_lane();
    let award = state.settings.rewards.hit();
    if let Some(lane) = state.lanes.get_mut(judged) {
        for line in 0..lane.lines {
            if input.trigger_pressed[line] {
                let verdict = lane.judge_press(
                    &state.judge,
                    line,
                    position,
                    award,
                    &mut state.latch,
                    &mut state.effects,
                );
                state.scoreboard.record(verdict);
                if let (Verdict::Hit { reward, .. }, Some(arcade)) = (verdict, state.arcade.as_mut()) {
                    arcade.drop_shell(line, reward);
                }
            }
            if input.trigger_released[line] {
                let verdict =
                    lane.judge_release(&state.judge, line, position, award, &mut state.effects);
                state.scoreboard.record(verdict);
            }
        }
    }

    // Spawn, scroll, misses
    let spawn_lead = state.settings.spawn_lead;
    let miss_penalty = state.settings.miss_penalty;
    for lane in state.lanes.iter_mut() {
        lane.spawn_due(position);
        let missed = lane.advance(position, spawn_lead, miss_penalty);
        state.scoreboard.record_misses(missed);
    }
    state.effects.update(FRAME_DT);

    state.update_outcome();

    if let Some(arcade) = state.arcade.as_mut() {
        arcade.step(&ArcadeInput::from_frame(input), FRAME_DT);
    }

    state.collect();
}
