//! Full sessions driven through the public API

use std::collections::HashSet;

use encore::arcade::{ArcadeConfig, ArcadeWorld, ObjectKind};
use encore::sim::{
    Autoplay, FrameClock, FrameInput, FrameView, GameState, LevelData, Outcome, Phase,
    SampleClock, tick,
};
use encore::{Difficulty, Settings};

const LEVEL: &str = r#"{
    "name": "soundcheck",
    "lanes": [
        [
            {"type": "single", "lane": 0, "sample": 100000},
            {"type": "single", "lane": 1, "sample": 130000},
            {"type": "hold", "lane": 2, "sample": 160000, "connections": [{"sample": 220000}]},
            {"type": "single", "lane": 3, "sample": 250000},
            {"type": "switch", "lane": -1, "sample": 450000},
            {"type": "single", "lane": 0, "sample": 520000}
        ],
        [
            {"type": "switch", "lane": -1, "sample": 300000},
            {"type": "single", "lane": 0, "sample": 360000},
            {"type": "single", "lane": 1, "sample": 400000}
        ]
    ]
}"#;

fn settings() -> Settings {
    Settings {
        spawn_lead: 100_000,
        ..Default::default()
    }
}

fn new_state(settings: Settings) -> GameState {
    let level = LevelData::from_json(LEVEL)
        .unwrap()
        .build(settings.lines, settings.spawn_lead)
        .unwrap();
    GameState::new(level, settings, 11)
}

/// Ids of every note a lane holds, asserting no id appears twice
fn assert_disjoint(state: &GameState) {
    for lane in &state.lanes {
        let mut seen = HashSet::new();
        let all = lane
            .hit_notes
            .iter()
            .chain(lane.switch_notes.iter())
            .chain(lane.timeline.pending().iter());
        for note in all {
            assert!(seen.insert(note.id), "note {} appears twice in lane {}", note.id, lane.index);
        }
        assert!(lane.switch_notes.iter().all(|n| n.is_switch()));
        assert!(lane.hit_notes.iter().all(|n| !n.is_switch()));
    }
}

fn assert_collected(state: &GameState) {
    for lane in &state.lanes {
        assert!(lane.hit_notes.iter().all(|n| !n.destroyed));
        assert!(lane.switch_notes.iter().all(|n| !n.destroyed));
        assert_eq!(lane.hit_notes.backing_len(), 0);
    }
    assert!(state.effects.particles.iter().all(|p| !p.destroyed));
    if let Some(arcade) = &state.arcade {
        assert!(arcade.objects.iter().all(|o| !o.destroyed));
    }
}

fn play(state: &mut GameState, offset: i64) {
    let mut clock = FrameClock::default();
    let mut player = Autoplay::new(offset);
    while !state.outcome.is_over() && state.frame < 5_000 {
        let input = player.input(state, clock.current_sample_position());
        tick(state, &input, &clock);
        clock.step();
        assert_disjoint(state);
        assert_collected(state);
    }
}

#[test]
fn autoplay_clears_level_on_beat() {
    let mut state = new_state(settings());
    play(&mut state, 0);

    assert_eq!(state.outcome, Outcome::Cleared);
    assert_eq!(state.phase.phase, Phase::Notes);
    assert_eq!(state.phase.active(), 0);
    assert_eq!(state.scoreboard.misses, 0);
    assert_eq!(state.scoreboard.max_combo, 10);

    let on_beat: u32 = state.lanes.iter().map(|l| l.stats.on_beat).sum();
    let switches: u32 = state.lanes.iter().map(|l| l.stats.switches_hit).sum();
    assert_eq!(on_beat, 8);
    assert_eq!(switches, 2);
    assert_eq!(state.score(), 8 * 3 + 2 * 4);
    assert!(state.lanes.iter().all(|l| l.competency() <= l.max_competency()));
}

#[test]
fn idle_player_loses() {
    let mut state = new_state(Settings {
        start_competency: 10,
        ..settings()
    });
    let mut clock = FrameClock::default();
    while !state.outcome.is_over() && state.frame < 5_000 {
        tick(&mut state, &FrameInput::default(), &clock);
        clock.step();
        assert_disjoint(&state);
        assert_collected(&state);
    }
    assert_eq!(state.outcome, Outcome::Lost { lane: 0 });
    assert!(state.scoreboard.misses >= 3);
    assert_eq!(state.score(), 0);
}

#[test]
fn reset_replays_identically() {
    let mut state = new_state(settings());
    play(&mut state, 2_000);
    let first = (state.score(), state.frame, state.scoreboard);

    state.reset();
    assert_eq!(state.outcome, Outcome::Playing);
    play(&mut state, 2_000);
    assert_eq!((state.score(), state.frame, state.scoreboard), first);
}

#[test]
fn arcade_field_receives_shells() {
    let arcade = ArcadeWorld::with_ship(ArcadeConfig::default(), 3);
    let mut state = new_state(settings()).with_arcade(arcade);
    let mut clock = FrameClock::default();
    let mut player = Autoplay::new(0);
    let mut shells_seen = HashSet::new();

    while !state.outcome.is_over() && state.frame < 5_000 {
        let input = player.input(&state, clock.current_sample_position());
        tick(&mut state, &input, &clock);
        clock.step();
        assert_collected(&state);

        let view = FrameView::capture(&state);
        for object in &view.objects {
            if matches!(object.kind, ObjectKind::Shell { .. }) {
                shells_seen.insert(object.id);
            }
        }
    }

    assert_eq!(state.outcome, Outcome::Cleared);
    // One shell per resolving press (the hold release does not drop one)
    assert_eq!(shells_seen.len(), 7);
}

#[test]
fn settings_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");

    let mut settings = Settings::from_difficulty(Difficulty::Hard);
    settings.calibration_offset = 1_200;
    settings.save(&path).unwrap();

    let loaded = Settings::load(&path).unwrap();
    assert_eq!(loaded.difficulty, Difficulty::Hard);
    assert_eq!(loaded.calibration_offset, 1_200);
    assert_eq!(loaded.windows, settings.windows);
    assert_eq!(loaded.miss_penalty, -6);

    std::fs::write(&path, "{ not json").unwrap();
    let fallback = Settings::load_or_default(&path);
    assert_eq!(fallback.difficulty, Difficulty::Normal);
}
