//! Orbiting particle swarm around the player
//!
//! Particles live in player-relative space (cell units). Each one chases a
//! target rotating on its ring while a weak gravity pulls it toward the
//! center. Forces act as per-frame impulses; only the orbit angle depends on
//! the frame delta.

use glam::Vec2;

use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub target: Vec2,
    /// Current orbit angle of the target (radians)
    pub angle: f32,
    /// Orbit radius (cell units)
    pub radius: f32,
}

impl Particle {
    fn seeded(id: u32) -> Self {
        let ring = id as usize / PARTICLES_PER_RING;
        let slot = id as usize % PARTICLES_PER_RING;
        let radius = PARTICLE_BASE_RADIUS + ring as f32 * PARTICLE_RING_SPACING;
        let angle = slot as f32 / PARTICLES_PER_RING as f32 * std::f32::consts::TAU;
        let pos = Vec2::new(angle.cos(), angle.sin()) * radius;
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            target: pos,
            angle,
            radius,
        }
    }

    /// Angular speed of this particle's orbit target (rad/s)
    fn orbit_speed(&self) -> f32 {
        0.5 + self.id as f32 * 0.01
    }

    fn step(&mut self, dt: f32) {
        self.angle += self.orbit_speed() * dt;
        self.target = Vec2::new(self.angle.cos(), self.angle.sin()) * self.radius;

        let distance = self.pos.length();
        let gravity = -self.pos.normalize_or_zero() * PARTICLE_GRAVITY / (distance + 0.1);
        let orbit = (self.target - self.pos) * PARTICLE_ORBIT_STRENGTH;

        self.vel += gravity + orbit;
        self.vel *= PARTICLE_DAMPING;
        self.vel = self.vel.clamp_length_max(PARTICLE_MAX_SPEED);
        self.pos += self.vel;
    }
}

/// Fixed pool of `PARTICLE_COUNT` particles
#[derive(Debug, Clone)]
pub struct ParticleSwarm {
    particles: Vec<Particle>,
}

impl Default for ParticleSwarm {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticleSwarm {
    /// Three concentric rings of twenty, evenly spaced
    pub fn new() -> Self {
        Self {
            particles: (0..PARTICLE_COUNT as u32).map(Particle::seeded).collect(),
        }
    }

    /// Re-seed the pool (restores determinism from a known state)
    pub fn reset(&mut self) {
        for (id, particle) in self.particles.iter_mut().enumerate() {
            *particle = Particle::seeded(id as u32);
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Integrate one frame. `dt` is in seconds and clamped to a sane range.
    pub fn step(&mut self, dt: f32) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, PARTICLE_MAX_DT)
        } else {
            0.0
        };
        for particle in &mut self.particles {
            particle.step(dt);
        }
    }

    /// `(x, y, vx, vy)` per particle, in id order, for `u_particles`
    pub fn uniform_data(&self) -> [[f32; 4]; PARTICLE_COUNT] {
        let mut data = [[0.0; 4]; PARTICLE_COUNT];
        for (slot, p) in data.iter_mut().zip(&self.particles) {
            *slot = [p.pos.x, p.pos.y, p.vel.x, p.vel.y];
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_seeded_rings() {
        let swarm = ParticleSwarm::new();
        assert_eq!(swarm.len(), 60);
        let p = swarm.particles();
        assert!((p[0].radius - 0.06).abs() < 1e-6);
        assert!((p[20].radius - 0.09).abs() < 1e-6);
        assert!((p[59].radius - 0.12).abs() < 1e-6);
        assert!((p[0].pos - Vec2::new(0.06, 0.0)).length() < 1e-6);
        for (i, particle) in p.iter().enumerate() {
            assert_eq!(particle.id, i as u32);
        }
    }

    #[test]
    fn test_ids_stable_across_frames() {
        let mut swarm = ParticleSwarm::new();
        for _ in 0..100 {
            swarm.step(1.0 / 60.0);
        }
        assert_eq!(swarm.len(), 60);
        for (i, particle) in swarm.particles().iter().enumerate() {
            assert_eq!(particle.id, i as u32);
        }
    }

    #[test]
    fn test_deterministic_and_restartable() {
        let mut a = ParticleSwarm::new();
        let mut b = ParticleSwarm::new();
        for _ in 0..30 {
            a.step(0.016);
            b.step(0.016);
        }
        assert_eq!(a.uniform_data(), b.uniform_data());

        a.reset();
        assert_eq!(a.uniform_data(), ParticleSwarm::new().uniform_data());
    }

    #[test]
    fn test_non_finite_dt_does_not_poison_state() {
        let mut swarm = ParticleSwarm::new();
        swarm.step(f32::NAN);
        swarm.step(f32::INFINITY);
        for p in swarm.particles() {
            assert!(p.pos.is_finite());
            assert!(p.vel.is_finite());
        }
    }

    #[test]
    fn test_particles_stay_near_player() {
        let mut swarm = ParticleSwarm::new();
        for _ in 0..600 {
            swarm.step(1.0 / 60.0);
        }
        for p in swarm.particles() {
            assert!(p.pos.length() < 0.5, "particle {} drifted to {:?}", p.id, p.pos);
        }
    }

    proptest! {
        #[test]
        fn prop_speed_never_exceeds_max(dts in proptest::collection::vec(0.0f32..0.5, 1..120)) {
            let mut swarm = ParticleSwarm::new();
            for dt in dts {
                swarm.step(dt);
                prop_assert_eq!(swarm.len(), PARTICLE_COUNT);
                for p in swarm.particles() {
                    prop_assert!(p.vel.length() <= PARTICLE_MAX_SPEED + 1e-6);
                }
            }
        }
    }
}
