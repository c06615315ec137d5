//! Arcade field entities
//!
//! Every entity is a circle; behaviour differs only by its `ObjectKind`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::pool::Reclaim;

/// Closed set of arcade entity types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// A falling note shell; `reward` is paid when it is shot or collected
    Shell { line: usize, reward: i32 },
    /// Static bonus pickup
    Star,
    /// Player projectile
    Bullet,
    /// The player
    Ship,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Shell { .. } => "shell",
            ObjectKind::Star => "star",
            ObjectKind::Bullet => "bullet",
            ObjectKind::Ship => "ship",
        }
    }

    /// Affected by gravity and terrain
    pub fn is_falling(&self) -> bool {
        matches!(self, ObjectKind::Shell { .. })
    }
}

/// A circular arcade entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameObject {
    pub id: u32,
    pub kind: ObjectKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub destroyed: bool,
}

impl GameObject {
    pub fn new(id: u32, kind: ObjectKind, pos: Vec2, radius: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            radius,
            destroyed: false,
        }
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    /// Circle-circle overlap (touching does not count)
    #[inline]
    pub fn overlaps(&self, other: &GameObject) -> bool {
        let radii = self.radius + other.radius;
        self.pos.distance_squared(other.pos) < radii * radii
    }

    /// Advance position by velocity
    #[inline]
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }
}

impl Reclaim for GameObject {
    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
