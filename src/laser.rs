//! Laser projectiles and their hit test against bubbles.

use bevy::prelude::*;

use crate::bounds::PlayBounds;
use crate::bubble::Bubble;
use crate::constants::{LASER_HIT_MARGIN, LASER_MAX_AGE, LASER_SPEED};
use crate::error::{SimError, SimResult};
use crate::spatial_partition::SpatialGrid;

/// A straight-flying laser bolt.
#[derive(Debug, Clone, PartialEq)]
pub struct Laser {
    pub id: u64,
    pub position: Vec2,
    /// Unit vector.
    pub direction: Vec2,
    /// World clock (s) at which the laser was fired.
    pub start_time: f32,
    /// Seconds since it was fired.
    pub age: f32,
}

/// What happened to a laser during [`advance_lasers`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LaserOutcome {
    /// Hit the bubble at `index` at `point`.
    Hit { laser: u64, index: usize, point: Vec2 },
    /// Ran out of age or left the play area.
    Expired { laser: u64 },
}

impl Laser {
    /// Build a laser; `direction` need not be normalised but must be non-zero.
    pub fn new(id: u64, origin: Vec2, direction: Vec2, now: f32) -> SimResult<Self> {
        let direction = direction
            .try_normalize()
            .ok_or(SimError::DegenerateDirection)?;
        Ok(Self {
            id,
            position: origin,
            direction,
            start_time: now,
            age: 0.0,
        })
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.direction * LASER_SPEED
    }
}

/// Closest point to `p` on the segment `a → b`.
fn closest_on_segment(a: Vec2, b: Vec2, p: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Move every laser, test it against the live bubbles, and drop spent ones.
///
/// The hit test covers the whole segment the laser swept this tick, so a long
/// frame cannot carry a bolt past a small bubble.  `grid` must index
/// `bubbles`.  A laser hits a bubble whose centre comes within
/// `size + LASER_HIT_MARGIN` of the swept segment; of several, the first one
/// along the path wins.  The bubble is marked in `popped` so a second laser in
/// the same tick cannot claim it.
pub fn advance_lasers(
    lasers: &mut Vec<Laser>,
    bubbles: &[Bubble],
    popped: &mut [bool],
    grid: &SpatialGrid,
    bounds: &PlayBounds,
    delta: f32,
) -> Vec<LaserOutcome> {
    let mut outcomes = Vec::new();

    lasers.retain_mut(|laser| {
        let start = laser.position;
        laser.age += delta;
        laser.position += laser.velocity() * delta;
        let end = laser.position;

        let reach = start.distance(end) * 0.5 + grid.cell_size() + LASER_HIT_MARGIN;
        let hit = grid
            .query((start + end) * 0.5, reach)
            .filter(|&j| !popped[j])
            .filter_map(|j| {
                let centre = bubbles[j].position_2d();
                let point = closest_on_segment(start, end, centre);
                (point.distance(centre) < bubbles[j].size + LASER_HIT_MARGIN)
                    .then(|| (j, point, start.distance(point)))
            })
            .min_by(|a, b| a.2.total_cmp(&b.2));

        if let Some((index, point, _)) = hit {
            popped[index] = true;
            outcomes.push(LaserOutcome::Hit {
                laser: laser.id,
                index,
                point,
            });
            return false;
        }

        if laser.age >= LASER_MAX_AGE || !bounds.contains(laser.position) {
            outcomes.push(LaserOutcome::Expired { laser: laser.id });
            return false;
        }
        true
    });

    outcomes
}
