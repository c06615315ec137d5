//! The arcade field
//!
//! Shells fall from the top of the screen, bounce off terrain and each other,
//! and are shot by the player's ship or collected on stars.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Bounds, Contact, pair_mut, process_bounds, process_collision};
use super::grid::CellGrid;
use super::object::{GameObject, ObjectKind};
use super::terrain::Terrain;
use crate::consts::MAX_LINES;
use crate::sim::input::FrameInput;
use crate::sim::pool::Pool;

/// Arcade tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeConfig {
    pub bounds: Bounds,
    /// Downward acceleration on shells (pixels/s²)
    pub gravity: f32,
    pub shell_radius: f32,
    pub star_radius: f32,
    pub bullet_radius: f32,
    pub ship_radius: f32,
    /// Horizontal ship speed (pixels/s)
    pub ship_speed: f32,
    /// Bullet speed (pixels/s, upward)
    pub bullet_speed: f32,
    /// Minimum broad-phase cell size
    pub cell_size: f32,
    /// Tangential damping in shell-shell contacts (0 = frictionless)
    pub friction: f32,
    /// Horizontal jitter given to new shells (pixels/s)
    pub spawn_jitter: f32,
    /// Lines the spawn row is divided into
    pub lines: usize,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            gravity: 400.0,
            shell_radius: 12.0,
            star_radius: 10.0,
            bullet_radius: 3.0,
            ship_radius: 16.0,
            ship_speed: 360.0,
            bullet_speed: 700.0,
            cell_size: 32.0,
            friction: 0.0,
            spawn_jitter: 20.0,
            lines: 4,
        }
    }
}

/// Ship control for one step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ArcadeInput {
    /// -1 (left) to 1 (right)
    pub ship_dir: f32,
    pub fire: bool,
}

impl ArcadeInput {
    /// Outer lines steer, inner lines fire
    pub fn from_frame(input: &FrameInput) -> Self {
        let right = input.trigger_held[MAX_LINES - 1] as i32 as f32;
        let left = input.trigger_held[0] as i32 as f32;
        Self {
            ship_dir: right - left,
            fire: input.trigger_pressed[1..MAX_LINES - 1].iter().any(|&p| p),
        }
    }
}

/// Counters for the last step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub candidate_pairs: usize,
    pub contacts: usize,
    pub destroyed: usize,
    pub points: i32,
}

/// All arcade entities and the static level geometry
#[derive(Debug, Clone)]
pub struct ArcadeWorld {
    pub config: ArcadeConfig,
    pub objects: Pool<GameObject>,
    pub terrain: Vec<Terrain>,
    pub score: i64,
    /// Set once the ship has been destroyed
    pub ship_lost: bool,
    grid: CellGrid,
    pairs: Vec<(usize, usize)>,
    rng: Pcg32,
    seed: u64,
    next_id: u32,
}

impl ArcadeWorld {
    pub fn new(config: ArcadeConfig, seed: u64) -> Self {
        let grid = CellGrid::new(config.cell_size);
        Self {
            config,
            objects: Pool::with_capacity(128),
            terrain: Vec::new(),
            score: 0,
            ship_lost: false,
            grid,
            pairs: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            seed,
            next_id: 1,
        }
    }

    /// A world with the player's ship placed at the bottom center
    pub fn with_ship(config: ArcadeConfig, seed: u64) -> Self {
        let mut world = Self::new(config, seed);
        world.spawn_ship();
        world
    }

    pub fn spawn_ship(&mut self) -> u32 {
        let pos = Vec2::new(self.config.bounds.width * 0.5, self.config.ship_radius * 2.0);
        self.spawn(ObjectKind::Ship, pos, Vec2::ZERO)
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn radius_for(&self, kind: ObjectKind) -> f32 {
        match kind {
            ObjectKind::Shell { .. } => self.config.shell_radius,
            ObjectKind::Star => self.config.star_radius,
            ObjectKind::Bullet => self.config.bullet_radius,
            ObjectKind::Ship => self.config.ship_radius,
        }
    }

    /// Add an entity; returns its id
    pub fn spawn(&mut self, kind: ObjectKind, pos: Vec2, vel: Vec2) -> u32 {
        let id = self.next_entity_id();
        let radius = self.radius_for(kind);
        self.objects.push(GameObject::new(id, kind, pos, radius).with_velocity(vel));
        id
    }

    /// Drop a shell from the top of the screen above `line`
    pub fn drop_shell(&mut self, line: usize, reward: i32) -> u32 {
        let lines = self.config.lines.max(1);
        let slot = self.config.bounds.width / lines as f32;
        let x = slot * (line.min(lines - 1) as f32 + 0.5);
        let y = self.config.bounds.height - self.config.shell_radius;
        let jitter = self.config.spawn_jitter;
        let vx = if jitter > 0.0 {
            self.rng.random_range(-jitter..jitter)
        } else {
            0.0
        };
        self.spawn(ObjectKind::Shell { line, reward }, Vec2::new(x, y), Vec2::new(vx, 0.0))
    }

    pub fn ship(&self) -> Option<&GameObject> {
        self.objects
            .iter()
            .find(|o| o.kind == ObjectKind::Ship && !o.destroyed)
    }

    /// Advance the field by `dt`. Destroyed objects stay in the pool until `collect`.
    pub fn step(&mut self, input: &ArcadeInput, dt: f32) -> StepReport {
        let mut report = StepReport::default();

        // Ship control
        let mut muzzle = None;
        for obj in self.objects.iter_mut() {
            if obj.kind == ObjectKind::Ship && !obj.destroyed {
                obj.vel.x = input.ship_dir.clamp(-1.0, 1.0) * self.config.ship_speed;
                if input.fire {
                    muzzle = Some(obj.pos + Vec2::Y * (obj.radius + self.config.bullet_radius));
                }
            }
        }
        if let Some(pos) = muzzle {
            self.spawn(ObjectKind::Bullet, pos, Vec2::Y * self.config.bullet_speed);
        }

        // Integrate and resolve terrain
        for obj in self.objects.iter_mut() {
            if obj.destroyed {
                continue;
            }
            if obj.kind.is_falling() {
                obj.vel.y -= self.config.gravity * dt;
            }
            obj.integrate(dt);
            if obj.kind.is_falling() {
                for piece in &self.terrain {
                    piece.collide(obj);
                }
            }
        }

        // Bounds
        for obj in self.objects.iter_mut() {
            let contact = process_bounds(obj, &self.config.bounds);
            if let Contact::Destroyed { points } = contact {
                report.destroyed += 1;
                report.points += points;
            }
        }

        // Broad phase, then narrow phase per candidate pair
        self.grid.rebuild(self.objects.as_slice());
        self.pairs.clear();
        self.grid.candidate_pairs(self.objects.as_slice(), &mut self.pairs);
        report.candidate_pairs = self.pairs.len();

        let objects = self.objects.as_mut_slice();
        for &(i, j) in &self.pairs {
            let (a, b) = pair_mut(objects, i, j);
            let ship_hit = (a.kind == ObjectKind::Ship) || (b.kind == ObjectKind::Ship);
            match process_collision(a, b, self.config.friction) {
                Contact::None => {}
                Contact::Adjusted => report.contacts += 1,
                Contact::Destroyed { points } => {
                    report.contacts += 1;
                    report.destroyed += 2;
                    report.points += points;
                    if ship_hit {
                        self.ship_lost = true;
                    }
                }
            }
        }

        self.score += report.points as i64;
        if report.destroyed > 0 {
            log::trace!("arcade step: {report:?}");
        }
        report
    }

    /// Reclaim destroyed objects
    pub fn collect(&mut self) -> usize {
        self.objects.collect()
    }

    /// Remove every entity, keeping terrain
    pub fn clear(&mut self) {
        self.objects.clear();
        self.pairs.clear();
        self.score = 0;
        self.ship_lost = false;
    }

    /// Clear and restart ids and the spawn RNG
    pub fn reset(&mut self) {
        self.clear();
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.next_id = 1;
    }
}

/// Step and collect in one call (standalone arcade loop)
pub fn tick(world: &mut ArcadeWorld, input: &ArcadeInput, dt: f32) -> StepReport {
    let report = world.step(input, dt);
    world.collect();
    report
}
