//! Bounds handling and pairwise collision response
//!
//! Both entry points dispatch on the closed `ObjectKind` set. Pair dispatch is
//! symmetric: `(a, b)` and `(b, a)` produce the same effects.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::object::{GameObject, ObjectKind};

/// Extra separation added when pushing overlapping shells apart
pub const EPSILON: f32 = 0.01;
/// Reward assigned to a shell that reaches the floor
pub const SHELL_FLOOR_PENALTY: i32 = -1;
/// Bonus for a shell hitting a star on top of its own reward
pub const STAR_BONUS: i32 = 2;

/// Playfield extents (y grows upward, origin bottom-left)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
    /// Shells whose bottom drops below this are spent
    pub floor: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            floor: 0.0,
        }
    }
}

/// Effect of a bounds or collision check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    None,
    /// Repositioned or bounced, nothing destroyed
    Adjusted,
    /// Something was destroyed; `points` go to the score
    Destroyed { points: i32 },
}

impl Contact {
    pub fn points(&self) -> i32 {
        match *self {
            Contact::Destroyed { points } => points,
            _ => 0,
        }
    }
}

/// Type-specific out-of-bounds handling for one object
pub fn process_bounds(obj: &mut GameObject, bounds: &Bounds) -> Contact {
    if obj.destroyed {
        return Contact::None;
    }
    match obj.kind {
        ObjectKind::Shell { .. } => {
            if obj.pos.y - obj.radius < bounds.floor {
                obj.destroyed = true;
                Contact::Destroyed {
                    points: SHELL_FLOOR_PENALTY,
                }
            } else {
                Contact::None
            }
        }
        ObjectKind::Bullet => {
            if obj.pos.y + obj.radius < 0.0 || obj.pos.y - obj.radius > bounds.height {
                obj.destroyed = true;
                Contact::Destroyed { points: 0 }
            } else {
                Contact::None
            }
        }
        ObjectKind::Ship => {
            let clamped = obj.pos.x.clamp(obj.radius, (bounds.width - obj.radius).max(obj.radius));
            if clamped != obj.pos.x {
                obj.pos.x = clamped;
                obj.vel.x = 0.0;
                Contact::Adjusted
            } else {
                Contact::None
            }
        }
        ObjectKind::Star => Contact::None,
    }
}

/// Resolve one candidate pair
pub fn process_collision(a: &mut GameObject, b: &mut GameObject, friction: f32) -> Contact {
    if a.destroyed || b.destroyed {
        return Contact::None;
    }
    match (a.kind, b.kind) {
        (ObjectKind::Shell { .. }, ObjectKind::Shell { .. }) => {
            if resolve_circles(a, b, friction) {
                Contact::Adjusted
            } else {
                Contact::None
            }
        }
        (ObjectKind::Shell { reward, .. }, other) | (other, ObjectKind::Shell { reward, .. }) => {
            if !a.overlaps(b) {
                return Contact::None;
            }
            let points = match other {
                ObjectKind::Star => reward + STAR_BONUS,
                ObjectKind::Bullet => reward,
                ObjectKind::Ship => 0,
                ObjectKind::Shell { .. } => unreachable!("shell pairs handled above"),
            };
            a.destroyed = true;
            b.destroyed = true;
            Contact::Destroyed { points }
        }
        (ObjectKind::Star | ObjectKind::Bullet | ObjectKind::Ship, _) => Contact::None,
    }
}

/// Separate two overlapping circles and exchange their normal velocities.
///
/// `friction` (0-1) damps the relative tangential velocity; 0 is frictionless.
/// Returns false when the circles do not overlap.
pub fn resolve_circles(a: &mut GameObject, b: &mut GameObject, friction: f32) -> bool {
    let delta = b.pos - a.pos;
    let dist = delta.length();
    let radii = a.radius + b.radius;
    if dist >= radii {
        return false;
    }

    // Coincident centers have no direction; pick one
    let normal = if dist > f32::EPSILON { delta / dist } else { Vec2::X };
    let push = (radii - dist) * 0.5 + EPSILON;
    a.pos -= normal * push;
    b.pos += normal * push;

    let axis = (b.pos - a.pos).normalize_or_zero();
    let axis = if axis == Vec2::ZERO { normal } else { axis };
    let va = a.vel.dot(axis);
    let vb = b.vel.dot(axis);
    a.vel += (vb - va) * axis;
    b.vel += (va - vb) * axis;

    if friction > 0.0 {
        let tangent = axis.perp();
        let slip = (b.vel - a.vel).dot(tangent) * 0.5 * friction.min(1.0);
        a.vel += tangent * slip;
        b.vel -= tangent * slip;
    }
    true
}

/// Mutable access to two distinct elements of a slice
pub fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert_ne!(i, j, "pair_mut needs two distinct indices");
    if i < j {
        let (head, tail) = items.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = items.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}
