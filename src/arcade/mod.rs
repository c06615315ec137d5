//! Arcade field physics
//!
//! Circle entities in a closed set of kinds, static SDF terrain, a uniform
//! grid broad phase and pairwise responses. Owned by a single pool and
//! reclaimed with the same stop-and-copy collector as the notes.

pub mod collision;
pub mod grid;
pub mod object;
pub mod terrain;
pub mod world;

pub use collision::{Bounds, Contact, EPSILON, pair_mut, process_bounds, process_collision};
pub use grid::CellGrid;
pub use object::{GameObject, ObjectKind};
pub use terrain::{BOX_COEFF_REST, BUMP_COEFF_REST, Terrain};
pub use world::{ArcadeConfig, ArcadeInput, ArcadeWorld, StepReport, tick};
