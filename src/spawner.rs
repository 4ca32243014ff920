//! Timed bubble spawner.
//!
//! ## Spawn zones
//!
//! | Zone    | Weight | Position                                              |
//! |---------|--------|-------------------------------------------------------|
//! | Top     | 10 %   | on the ceiling, within the central 80 % of its width  |
//! | Bottom  | 10 %   | on the floor, same span                               |
//! | Left    | 10 %   | on the left wall, within the central 80 % of height   |
//! | Right   | 10 %   | on the right wall, same span                          |
//! | Centre  | 60 %   | triangular distribution per axis, peaking at 0        |
//!
//! Initial velocity points at the centre and scales with the distance from it,
//! so edge spawns drift in briskly while centre spawns barely move.

use bevy::prelude::*;
use rand::Rng;

use crate::bounds::{symmetric, PlayBounds};
use crate::bubble::{BubbleKind, BubbleSpec};
use crate::config::BubbleSettings;
use crate::constants::{
    BUBBLE_SIZE_MAX, BUBBLE_SIZE_MIN, EDGE_SPAN_FRACTION, EDGE_ZONE_WEIGHT, GRENADE_SIZE_FACTOR,
    SPAWN_SPEED_FRACTION, SPAWN_SPIN_RANGE,
};

/// Region a new bubble is placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpawnZone {
    Top,
    Bottom,
    Left,
    Right,
    Center,
}

impl SpawnZone {
    /// Weighted draw: each edge `EDGE_ZONE_WEIGHT`, the centre takes the rest.
    pub fn pick(rng: &mut impl Rng) -> Self {
        let roll: f32 = rng.gen();
        match (roll / EDGE_ZONE_WEIGHT) as u32 {
            0 => SpawnZone::Top,
            1 => SpawnZone::Bottom,
            2 => SpawnZone::Left,
            3 => SpawnZone::Right,
            _ => SpawnZone::Center,
        }
    }
}

/// Interval accumulator driving the spawner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnTimer {
    /// Seconds accumulated since the last spawn attempt.
    pub elapsed: f32,
}

impl SpawnTimer {
    /// Advance by `delta`; returns `true` once per elapsed interval.
    ///
    /// At most one spawn fires per call so a long frame cannot flood the field.
    pub fn tick(&mut self, delta: f32, interval: f32) -> bool {
        self.elapsed += delta;
        if self.elapsed >= interval {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

/// Triangular sample in `±half`, peaking at 0.
fn triangular(rng: &mut impl Rng, half: f32) -> f32 {
    let a: f32 = rng.gen();
    let b: f32 = rng.gen();
    (a + b - 1.0) * half
}

/// Position for a body of radius `radius` in `zone`.
pub fn spawn_position(zone: SpawnZone, bounds: &PlayBounds, radius: f32, rng: &mut impl Rng) -> Vec2 {
    let limit = bounds.inset(radius);
    let along_x = symmetric(rng, limit.x * EDGE_SPAN_FRACTION);
    let along_y = symmetric(rng, limit.y * EDGE_SPAN_FRACTION);
    match zone {
        SpawnZone::Top => Vec2::new(along_x, limit.y),
        SpawnZone::Bottom => Vec2::new(along_x, -limit.y),
        SpawnZone::Left => Vec2::new(-limit.x, along_y),
        SpawnZone::Right => Vec2::new(limit.x, along_y),
        SpawnZone::Center => Vec2::new(triangular(rng, limit.x), triangular(rng, limit.y)),
    }
}

/// Inward velocity for a spawn at `position`.
///
/// Magnitude is `SPAWN_SPEED_FRACTION · bubble_speed · (distance / max_distance)`.
pub fn spawn_velocity(
    position: Vec2,
    bounds: &PlayBounds,
    settings: &BubbleSettings,
    rng: &mut impl Rng,
) -> Vec2 {
    let max_distance = bounds.max_distance();
    if max_distance <= 0.0 {
        return Vec2::ZERO;
    }
    let distance = position.length();
    let direction = match (-position).try_normalize() {
        Some(d) => d,
        None => Vec2::from_angle(rng.gen_range(0.0..std::f32::consts::TAU)),
    };
    let ratio = (distance / max_distance).min(1.0);
    direction * SPAWN_SPEED_FRACTION * settings.bubble_speed * ratio
}

/// Draw a complete bubble for the current settings.
pub fn random_bubble(bounds: &PlayBounds, settings: &BubbleSettings, rng: &mut impl Rng) -> BubbleSpec {
    // Settings inserted directly skip sanitising; NaN would panic `gen_bool`.
    let chance = if settings.grenade_chance.is_nan() {
        0.0
    } else {
        settings.grenade_chance.clamp(0.0, 1.0)
    };
    let kind = if rng.gen_bool(chance as f64) {
        BubbleKind::Grenade
    } else {
        BubbleKind::Regular
    };

    let mut size = rng.gen_range(BUBBLE_SIZE_MIN..BUBBLE_SIZE_MAX) * settings.spawn_size;
    if kind.is_grenade() {
        size *= GRENADE_SIZE_FACTOR;
    }

    let zone = SpawnZone::pick(rng);
    let position = spawn_position(zone, bounds, size, rng);
    let velocity = spawn_velocity(position, bounds, settings, rng);
    let spin = symmetric(rng, SPAWN_SPIN_RANGE * settings.bubble_speed);
    let hue = match kind {
        BubbleKind::Grenade => rng.gen_range(0.0..20.0),
        BubbleKind::Regular => rng.gen_range(0.0..360.0),
    };

    BubbleSpec {
        position,
        velocity,
        angular_velocity: spin,
        size,
        kind,
        hue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn timer_fires_once_per_interval() {
        let mut timer = SpawnTimer::default();
        let fired = (0..10).filter(|_| timer.tick(0.25, 1.0)).count();
        assert_eq!(fired, 2);
    }

    #[test]
    fn zone_weights_roughly_match() {
        let mut rng = StdRng::seed_from_u64(11);
        let n = 20_000;
        let centre = (0..n)
            .filter(|_| SpawnZone::pick(&mut rng) == SpawnZone::Center)
            .count() as f32
            / n as f32;
        assert!((centre - 0.6).abs() < 0.02, "centre share was {centre}");
    }

    #[test]
    fn nan_grenade_chance_spawns_regular_bubbles() {
        let bounds = PlayBounds::new(8.0, 5.0);
        let settings = BubbleSettings {
            grenade_chance: f32::NAN,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..50 {
            assert_eq!(random_bubble(&bounds, &settings, &mut rng).kind, BubbleKind::Regular);
        }
    }

    #[test]
    fn spawns_stay_inside_bounds() {
        let bounds = PlayBounds::new(8.0, 5.0);
        let settings = BubbleSettings::default();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..500 {
            let spec = random_bubble(&bounds, &settings, &mut rng);
            let limit = bounds.inset(spec.size);
            assert!(spec.position.x.abs() <= limit.x + 1e-5);
            assert!(spec.position.y.abs() <= limit.y + 1e-5);
        }
    }

    #[test]
    fn velocity_points_inward_and_respects_cap() {
        let bounds = PlayBounds::new(8.0, 5.0);
        let settings = BubbleSettings {
            bubble_speed: 2.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(6);
        let pos = Vec2::new(7.0, 0.0);
        let v = spawn_velocity(pos, &bounds, &settings, &mut rng);
        assert!(v.x < 0.0 && v.y.abs() < 1e-6);
        assert!(v.length() <= SPAWN_SPEED_FRACTION * settings.bubble_speed + 1e-6);

        let near = spawn_velocity(Vec2::new(0.5, 0.0), &bounds, &settings, &mut rng);
        assert!(near.length() < v.length(), "centre spawns must be slower");
    }

    #[test]
    fn grenade_chance_extremes() {
        let bounds = PlayBounds::new(8.0, 5.0);
        let mut rng = StdRng::seed_from_u64(8);
        let always = BubbleSettings {
            grenade_chance: 1.0,
            ..Default::default()
        };
        let never = BubbleSettings {
            grenade_chance: 0.0,
            ..Default::default()
        };
        for _ in 0..50 {
            assert_eq!(random_bubble(&bounds, &always, &mut rng).kind, BubbleKind::Grenade);
            assert_eq!(random_bubble(&bounds, &never, &mut rng).kind, BubbleKind::Regular);
        }
    }
}
