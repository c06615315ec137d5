//! Judgment feedback particles
//!
//! Not gameplay-affecting. Bursts are seeded from the session RNG so replays
//! produce the same picture.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::pool::{Pool, Reclaim};

/// Colour family of a particle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    OnBeat,
    OffBeat,
    Penalty,
}

impl Tone {
    pub fn for_status(status: i32, on_beat: bool) -> Self {
        if status < 0 {
            Tone::Penalty
        } else if on_beat {
            Tone::OnBeat
        } else {
            Tone::OffBeat
        }
    }
}

/// A particle for visual effects
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub tone: Tone,
    /// 0-1, decreases over time
    pub life: f32,
    pub size: f32,
    pub destroyed: bool,
}

impl Reclaim for Particle {
    fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

/// Downward pull on particles (pixels/s²)
const PARTICLE_GRAVITY: f32 = 600.0;

/// The global transient-object list
#[derive(Debug, Clone)]
pub struct Effects {
    pub particles: Pool<Particle>,
    rng: Pcg32,
    seed: u64,
    max_particles: usize,
    per_point: usize,
}

impl Effects {
    pub fn new(seed: u64, max_particles: usize, per_point: usize) -> Self {
        Self {
            particles: Pool::with_capacity(max_particles),
            rng: Pcg32::seed_from_u64(seed),
            seed,
            max_particles,
            per_point,
        }
    }

    /// Emit a burst whose size follows the magnitude of `status`
    pub fn burst(&mut self, origin: Vec2, status: i32, on_beat: bool) -> usize {
        let wanted = status.unsigned_abs() as usize * self.per_point;
        let room = self.max_particles.saturating_sub(self.particles.len());
        let count = wanted.min(room);
        let tone = Tone::for_status(status, on_beat);

        for _ in 0..count {
            let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
            let speed: f32 = self.rng.random_range(80.0..240.0);
            self.particles.push(Particle {
                pos: origin,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                tone,
                life: 1.0,
                size: self.rng.random_range(2.0..5.0),
                destroyed: false,
            });
        }
        count
    }

    /// Move particles and mark expired ones
    pub fn update(&mut self, dt: f32) {
        for particle in self.particles.iter_mut() {
            particle.pos += particle.vel * dt;
            particle.vel.y -= PARTICLE_GRAVITY * dt;
            particle.vel *= 0.98;
            particle.life -= dt * 1.5;
            particle.size *= 0.995;
            if particle.life <= 0.0 {
                particle.destroyed = true;
            }
        }
    }

    pub fn collect(&mut self) -> usize {
        self.particles.collect()
    }

    /// Drop all particles and restart the RNG stream
    pub fn reset(&mut self) {
        self.particles.clear();
        self.rng = Pcg32::seed_from_u64(self.seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_scales_with_reward() {
        let mut effects = Effects::new(1, 512, 4);
        assert_eq!(effects.burst(Vec2::ZERO, 3, true), 12);
        assert_eq!(effects.burst(Vec2::ZERO, -1, false), 4);
        assert_eq!(effects.burst(Vec2::ZERO, 0, false), 0);
        assert_eq!(effects.particles.len(), 16);
        assert_eq!(effects.particles[12].tone, Tone::Penalty);
    }

    #[test]
    fn test_burst_respects_cap() {
        let mut effects = Effects::new(1, 10, 4);
        assert_eq!(effects.burst(Vec2::ZERO, 2, true), 8);
        assert_eq!(effects.burst(Vec2::ZERO, 2, true), 2);
        assert_eq!(effects.burst(Vec2::ZERO, 2, true), 0);
    }

    #[test]
    fn test_particles_expire_and_collect() {
        let mut effects = Effects::new(7, 64, 4);
        effects.burst(Vec2::new(10.0, 10.0), 3, true);
        for _ in 0..60 {
            effects.update(1.0 / 60.0);
        }
        assert!(effects.particles.iter().all(|p| p.destroyed));
        assert_eq!(effects.collect(), 12);
        assert!(effects.particles.is_empty());
    }

    #[test]
    fn test_same_seed_same_burst() {
        let mut a = Effects::new(42, 64, 4);
        let mut b = Effects::new(42, 64, 4);
        a.burst(Vec2::ZERO, 2, true);
        b.burst(Vec2::ZERO, 2, true);
        for (pa, pb) in a.particles.iter().zip(b.particles.iter()) {
            assert_eq!(pa.vel, pb.vel);
        }
    }
}
