//! Encore headless runner
//!
//! Loads a level, plays it with the demo player against a frame-stepped clock
//! and prints the result.

#[cfg(not(target_arch = "wasm32"))]
mod runner {
    use std::path::PathBuf;

    use anyhow::{Context, Result, bail};
    use clap::Parser;
    use serde::Serialize;

    use encore::arcade::{ArcadeConfig, ArcadeWorld};
    use encore::consts::{CHANNELS, FRAME_RATE, SAMPLE_RATE};
    use encore::ms_to_samples;
    use encore::sim::{Autoplay, FrameClock, GameState, LevelData, Outcome, SampleClock, tick};
    use encore::{Difficulty, Settings};

    #[derive(Parser)]
    #[command(name = "encore", about = "Play a level headlessly and report the result")]
    pub struct Args {
        /// Level JSON file
        level: PathBuf,

        /// Settings JSON file (defaults are used when it cannot be read)
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Difficulty preset applied on top of the settings (easy, normal, hard)
        #[arg(long)]
        difficulty: Option<String>,

        /// Demo player timing error in milliseconds (positive = late)
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        offset_ms: f64,

        /// Attach the arcade field
        #[arg(long)]
        arcade: bool,

        /// Seed for particles and arcade spawns
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    }

    #[derive(Debug, Serialize)]
    struct LaneSummary {
        index: usize,
        competency: i32,
        on_beat: u32,
        off_beat: u32,
        off_time: u32,
        misses: u32,
        switches_hit: u32,
        switches_missed: u32,
    }

    #[derive(Debug, Serialize)]
    struct Summary {
        level: String,
        outcome: &'static str,
        lost_lane: Option<usize>,
        frames: u64,
        score: i64,
        max_combo: u32,
        hits: u32,
        misses: u32,
        arcade_score: Option<i64>,
        lanes: Vec<LaneSummary>,
    }

    impl Summary {
        fn from_state(state: &GameState) -> Self {
            Self {
                level: state.level_name.clone(),
                outcome: state.outcome.as_str(),
                lost_lane: match state.outcome {
                    Outcome::Lost { lane } => Some(lane),
                    _ => None,
                },
                frames: state.frame,
                score: state.score(),
                max_combo: state.scoreboard.max_combo,
                hits: state.scoreboard.hits,
                misses: state.scoreboard.misses,
                arcade_score: state.arcade.as_ref().map(|a| a.score),
                lanes: state
                    .lanes
                    .iter()
                    .map(|lane| LaneSummary {
                        index: lane.index,
                        competency: lane.competency(),
                        on_beat: lane.stats.on_beat,
                        off_beat: lane.stats.off_beat,
                        off_time: lane.stats.off_time,
                        misses: lane.stats.misses,
                        switches_hit: lane.stats.switches_hit,
                        switches_missed: lane.stats.switches_missed,
                    })
                    .collect(),
            }
        }

        fn print(&self) {
            println!("Level:     {}", self.level);
            match self.lost_lane {
                Some(lane) => println!("Outcome:   {} (lane {lane})", self.outcome),
                None => println!("Outcome:   {}", self.outcome),
            }
            println!("Frames:    {}", self.frames);
            println!("Score:     {}", self.score);
            println!("Max combo: {}", self.max_combo);
            println!("Hits:      {}  Misses: {}", self.hits, self.misses);
            if let Some(score) = self.arcade_score {
                println!("Arcade:    {score}");
            }
            for lane in &self.lanes {
                println!(
                    "  lane {}: competency {:>3}  on-beat {:>4}  off-beat {:>4}  off-time {:>4}  miss {:>4}  switch {}/{}",
                    lane.index,
                    lane.competency,
                    lane.on_beat,
                    lane.off_beat,
                    lane.off_time,
                    lane.misses,
                    lane.switches_hit,
                    lane.switches_hit + lane.switches_missed,
                );
            }
        }
    }

    fn load_settings(args: &Args) -> Result<Settings> {
        let mut settings = match &args.settings {
            Some(path) => Settings::load_or_default(path),
            None => Settings::default(),
        };
        if let Some(name) = &args.difficulty {
            let Some(difficulty) = Difficulty::from_str(name) else {
                bail!("unknown difficulty '{name}'");
            };
            settings.apply_difficulty(difficulty);
        }
        settings.validate().context("settings rejected")?;
        Ok(settings)
    }

    pub fn run(args: &Args) -> Result<()> {
        let settings = load_settings(args)?;
        let data = LevelData::from_path(&args.level)
            .with_context(|| format!("loading {}", args.level.display()))?;
        let level = data.build(settings.lines, settings.spawn_lead)?;
        let (singles, holds, switches) = level.kind_counts();
        log::info!(
            "Loaded '{}': {} lanes, {singles} singles, {holds} holds, {switches} switches",
            level.name,
            level.lane_count()
        );

        let end_sample = level.end_sample();
        let calibration = settings.calibration_offset;
        let mut state = GameState::new(level, settings, args.seed);
        if args.arcade {
            state = state.with_arcade(ArcadeWorld::with_ship(ArcadeConfig::default(), args.seed));
        }

        let mut clock = FrameClock::new(SAMPLE_RATE, CHANNELS, FRAME_RATE);
        let mut player = Autoplay::new(ms_to_samples(args.offset_ms, SAMPLE_RATE, CHANNELS));
        // Leave room for the last note to scroll off plus a few seconds
        let frame_limit =
            (end_sample / clock.samples_per_frame()).max(0) as u64 + 10 * FRAME_RATE as u64;

        while !state.outcome.is_over() && state.frame < frame_limit {
            let position = clock.current_sample_position() - calibration;
            let input = player.input(&state, position);
            tick(&mut state, &input, &clock);
            clock.step();

            if state.frame % (10 * FRAME_RATE as u64) == 0 {
                log::debug!(
                    "frame {}: score {}, combo {}",
                    state.frame,
                    state.score(),
                    state.scoreboard.combo
                );
            }
        }
        if !state.outcome.is_over() {
            log::warn!("Stopped after {frame_limit} frames without an outcome");
        }

        let summary = Summary::from_state(&state);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            summary.print();
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use clap::Parser;

    env_logger::init();
    let args = runner::Args::parse();
    match runner::run(&args) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on the web
}
