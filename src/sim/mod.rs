//! Deterministic note simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One `tick` per video frame, timed by the sample clock
//! - Seeded RNG only
//! - Stable iteration order (spawn order within each pool)
//! - No rendering, audio or device dependencies

pub mod autoplay;
pub mod clock;
pub mod effects;
pub mod input;
pub mod judge;
pub mod lane;
pub mod level;
pub mod note;
pub mod phase;
pub mod pool;
pub mod state;
pub mod tick;
pub mod view;

pub use autoplay::Autoplay;
pub use clock::{FrameClock, ManualClock, SampleClock};
pub use effects::{Effects, Particle, Tone};
pub use input::{ButtonState, EdgeDetector, FrameInput};
pub use judge::{Award, Judge, Rewards, TimingWindows, Verdict, Window};
pub use lane::{BandMember, LaneRect, LaneStats, LineLatch};
pub use level::{Level, LevelData, LevelError, Timeline};
pub use note::{Note, NoteKind};
pub use phase::{Phase, PhaseMachine};
pub use pool::{Pool, Reclaim};
pub use state::{GameState, Outcome, Scoreboard};
pub use tick::tick;
pub use view::FrameView;
