//! Burst particles: the pop effect that can push, or chain-pop, nearby bubbles.
//!
//! ## Design
//!
//! Particles are plain records owned by [`crate::world::BubbleWorld`].  A burst
//! is emitted by [`emit_burst`] whenever a bubble pops; [`advance_particles`]
//! then moves, ages, and bounces every particle once per tick.
//!
//! | Burst          | Count | Lifetime | Contact with a live bubble         |
//! |----------------|-------|----------|------------------------------------|
//! | `Pop`          | 30    | 1.0 s    | pushes it, particle bounces away   |
//! | `Grenade`      | 50    | 1.0 s    | pops it (chain reaction)           |
//! | `LaserSpark`   | 15    | 0.3 s    | pushes it, particle bounces away   |
//!
//! Each particle interacts with at most one bubble; after that it is purely
//! cosmetic until it expires.  Play-area edges reflect particles with a fixed
//! `PARTICLE_WALL_RETENTION`, independent of `bounce_energy`.

use bevy::prelude::*;
use rand::Rng;

use crate::bounds::{symmetric, PlayBounds};
use crate::bubble::{Bubble, BubbleKind};
use crate::config::BubbleSettings;
use crate::constants::*;
use crate::spatial_partition::SpatialGrid;

/// What caused a burst; decides count, lifetime, and whether it chain-pops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BurstKind {
    Pop,
    Grenade,
    LaserSpark,
}

impl BurstKind {
    #[inline]
    pub fn count(self) -> usize {
        match self {
            BurstKind::Pop => POP_BURST_COUNT,
            BurstKind::Grenade => GRENADE_BURST_COUNT,
            BurstKind::LaserSpark => LASER_SPARK_COUNT,
        }
    }

    #[inline]
    pub fn lifetime(self) -> f32 {
        match self {
            BurstKind::Pop | BurstKind::Grenade => PARTICLE_LIFETIME,
            BurstKind::LaserSpark => SPARK_LIFETIME,
        }
    }

    /// Whether particles of this burst pop the bubbles they touch.
    #[inline]
    pub fn explosive(self) -> bool {
        self == BurstKind::Grenade
    }

    /// Burst emitted when a bubble of `kind` pops.
    #[inline]
    pub fn for_bubble(kind: BubbleKind) -> Self {
        match kind {
            BubbleKind::Regular => BurstKind::Pop,
            BubbleKind::Grenade => BurstKind::Grenade,
        }
    }
}

/// Short-lived effect particle.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    /// World-space velocity (units/s), before the particle speed multiplier.
    pub velocity: Vec2,
    pub size: f32,
    /// Time alive so far (s).
    pub age: f32,
    /// Total lifetime (s); the particle is removed when `age >= lifetime`.
    pub lifetime: f32,
    /// Hue inherited from the popped bubble (degrees).
    pub hue: f32,
    pub explosive: bool,
    /// Set once the particle has pushed or popped a bubble.
    pub spent: bool,
}

impl Particle {
    /// Linear fade from 1 at birth to 0 at `lifetime`.
    #[inline]
    pub fn opacity(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        (1.0 - self.age / self.lifetime).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.age >= self.lifetime
    }
}

/// Append one burst of `kind` at `origin`.  Returns the number of particles emitted.
///
/// Angles are evenly spaced around the circle with a little random spread;
/// every particle gets a small upward bias.
pub fn emit_burst(
    particles: &mut Vec<Particle>,
    origin: Vec2,
    kind: BurstKind,
    hue: f32,
    rng: &mut impl Rng,
) -> usize {
    let count = kind.count();
    particles.reserve(count);

    for i in 0..count {
        let angle = std::f32::consts::TAU * i as f32 / count as f32
            + symmetric(rng, PARTICLE_ANGLE_SPREAD);
        let speed = rng.gen_range(PARTICLE_SPEED_MIN..PARTICLE_SPEED_MAX);
        let velocity = Vec2::from_angle(angle) * speed + Vec2::Y * PARTICLE_UPWARD_BIAS;

        particles.push(Particle {
            position: origin,
            velocity,
            size: rng.gen_range(PARTICLE_SIZE_MIN..PARTICLE_SIZE_MAX),
            age: 0.0,
            lifetime: kind.lifetime(),
            hue: (hue + symmetric(rng, 20.0)).rem_euclid(360.0),
            explosive: kind.explosive(),
            spent: false,
        });
    }

    count
}

/// Keep a particle inside the play area, reflecting off the edges.
fn bounce_off_edges(p: &mut Particle, bounds: &PlayBounds) {
    let limit = bounds.inset(p.size);
    if p.position.x.abs() > limit.x {
        p.position.x = limit.x * p.position.x.signum();
        p.velocity.x = -p.velocity.x * PARTICLE_WALL_RETENTION;
    }
    if p.position.y.abs() > limit.y {
        p.position.y = limit.y * p.position.y.signum();
        p.velocity.y = -p.velocity.y * PARTICLE_WALL_RETENTION;
    }
}

/// Advance all particles by `delta` and resolve their contacts with bubbles.
///
/// `grid` must index `bubbles` (see [`crate::collision::rebuild_grid`]).
/// Bubbles popped by explosive particles are marked in `popped`; their indices
/// are returned in the order they were hit.  Expired particles are removed.
pub fn advance_particles(
    particles: &mut Vec<Particle>,
    bubbles: &mut [Bubble],
    popped: &mut [bool],
    grid: &SpatialGrid,
    bounds: &PlayBounds,
    settings: &BubbleSettings,
    delta: f32,
) -> Vec<usize> {
    let mut chain = Vec::new();
    let scale = delta * PARTICLE_SPEED_MULTIPLIER * settings.bubble_speed;
    let reach = grid.cell_size() + PARTICLE_CONTACT_EPSILON;

    particles.retain_mut(|p| {
        p.age += delta;
        if p.is_expired() {
            return false;
        }

        p.position += p.velocity * scale;
        bounce_off_edges(p, bounds);

        if p.spent || bubbles.is_empty() {
            return true;
        }

        let hit = grid.query(p.position, reach).find(|&j| {
            !popped[j]
                && bubbles[j].position_2d().distance(p.position)
                    < bubbles[j].size + PARTICLE_CONTACT_EPSILON
        });
        let Some(j) = hit else {
            return true;
        };
        p.spent = true;

        if p.explosive {
            popped[j] = true;
            chain.push(j);
            return true;
        }

        let bubble = &mut bubbles[j];
        let toward = (bubble.position_2d() - p.position).normalize_or_zero();
        let speed = p.velocity.length();
        bubble.push(toward * speed * p.size * settings.particle_force * PARTICLE_IMPULSE_SCALE);

        let closing = p.velocity.dot(toward);
        if closing > 0.0 {
            p.velocity -= 2.0 * closing * toward;
        }
        true
    });

    chain
}
