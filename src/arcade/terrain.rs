//! Static terrain and its signed distance functions
//!
//! Terrain pieces never move. A falling object touching one is pushed back to
//! the surface and bounced with the piece's restitution coefficient.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::object::GameObject;

/// Restitution of box terrain (slightly lossy)
pub const BOX_COEFF_REST: f32 = 0.95;
/// Restitution of bumps (adds energy, pinball style)
pub const BUMP_COEFF_REST: f32 = 1.95;

/// Signed distance to a circle
#[inline]
pub fn sd_circle(p: Vec2, center: Vec2, radius: f32) -> f32 {
    (p - center).length() - radius
}

/// Signed distance to an axis-aligned box
#[inline]
pub fn sd_box(p: Vec2, min: Vec2, max: Vec2) -> f32 {
    let center = (min + max) * 0.5;
    let half = (max - min) * 0.5;
    let q = (p - center).abs() - half;
    q.max(Vec2::ZERO).length() + q.x.max(q.y).min(0.0)
}

/// Bounce `vel` off a surface with normal `n` if moving into it
#[inline]
pub fn bounce(vel: Vec2, n: Vec2, restitution: f32) -> Vec2 {
    let into = vel.dot(n);
    if into < 0.0 {
        vel - (1.0 + restitution) * into * n
    } else {
        vel
    }
}

/// A static terrain piece
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Terrain {
    /// Axis-aligned block
    Box { min: Vec2, max: Vec2 },
    /// Upper half-disc standing on `center`
    Bump { center: Vec2, radius: f32 },
}

impl Terrain {
    /// Signed distance from `p` to the piece's surface
    pub fn distance(&self, p: Vec2) -> f32 {
        match *self {
            Terrain::Box { min, max } => sd_box(p, min, max),
            Terrain::Bump { center, radius } => {
                if p.y >= center.y {
                    sd_circle(p, center, radius)
                } else {
                    // Below the flat side: distance to the base segment
                    let dx = (p.x - center.x).abs() - radius;
                    Vec2::new(dx.max(0.0), center.y - p.y).length()
                }
            }
        }
    }

    /// Resolve penetration and bounce. Returns true if the object was touching.
    pub fn collide(&self, obj: &mut GameObject) -> bool {
        if self.distance(obj.pos) >= obj.radius {
            return false;
        }
        match *self {
            Terrain::Box { min, max } => collide_box(obj, min, max),
            Terrain::Bump { center, radius } => collide_bump(obj, center, radius),
        }
    }
}

fn collide_box(obj: &mut GameObject, min: Vec2, max: Vec2) -> bool {
    let closest = obj.pos.clamp(min, max);
    let offset = obj.pos - closest;
    let dist = offset.length();

    let normal = if dist > f32::EPSILON {
        offset / dist
    } else {
        // Center inside the box: leave through the nearest face
        let to_min = obj.pos - min;
        let to_max = max - obj.pos;
        let faces = [
            (to_min.x, Vec2::NEG_X),
            (to_max.x, Vec2::X),
            (to_min.y, Vec2::NEG_Y),
            (to_max.y, Vec2::Y),
        ];
        let (_, n) = faces
            .into_iter()
            .fold((f32::INFINITY, Vec2::Y), |best, face| if face.0 < best.0 { face } else { best });
        n
    };

    let surface = if dist > f32::EPSILON {
        closest
    } else {
        // Project onto the chosen face
        let mut p = obj.pos;
        if normal.x < 0.0 {
            p.x = min.x;
        } else if normal.x > 0.0 {
            p.x = max.x;
        } else if normal.y < 0.0 {
            p.y = min.y;
        } else {
            p.y = max.y;
        }
        p
    };

    obj.pos = surface + normal * obj.radius;
    obj.vel = bounce(obj.vel, normal, BOX_COEFF_REST);
    true
}

fn collide_bump(obj: &mut GameObject, center: Vec2, radius: f32) -> bool {
    if obj.pos.y < center.y {
        // Under the base; the flat side is treated as a floor edge
        obj.pos.y = center.y - obj.radius;
        obj.vel = bounce(obj.vel, Vec2::NEG_Y, BUMP_COEFF_REST);
        return true;
    }
    let offset = obj.pos - center;
    let dist = offset.length();
    let normal = if dist > f32::EPSILON { offset / dist } else { Vec2::Y };

    obj.pos = center + normal * (radius + obj.radius);
    obj.vel = bounce(obj.vel, normal, BUMP_COEFF_REST);
    true
}
