//! Pairwise bubble/bubble collision resolution.
//!
//! ## Rules
//!
//! Two bubbles overlap when `distance < (size_a + size_b) · OVERLAP_MARGIN`.
//! For an overlapping pair, with `n = normalize(pos_a − pos_b)` and
//! `v_n = (vel_a − vel_b) · n`:
//!
//! | Condition                    | Response                                   |
//! |------------------------------|--------------------------------------------|
//! | `|v_n| > explosion_threshold` | both bubbles pop, no impulse               |
//! | `v_n < 0` (approaching)      | elastic impulse, spin, separation          |
//! | otherwise (already parting)  | separation only                            |
//!
//! The impulse is applied equal-and-opposite, so the pair's total velocity is
//! unchanged by a bounce.

use bevy::prelude::*;

use crate::bubble::Bubble;
use crate::config::BubbleSettings;
use crate::constants::{IMPULSE_GAIN, OVERLAP_MARGIN, PAIR_SPIN_FACTOR, SEPARATION_FRACTION};
use crate::spatial_partition::SpatialGrid;

/// Result of testing one pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PairOutcome {
    /// Not overlapping; nothing changed.
    Apart,
    /// Overlapping but already moving apart; pushed out of overlap only.
    Separated,
    /// Approaching below the threshold; `impulse` was added to `a` and
    /// subtracted from `b`.
    Bounced { impulse: Vec2 },
    /// Impact above the threshold; both must pop.  Neither body was modified.
    Pop { impact_speed: f32 },
}

/// Distance at which two bubbles count as overlapping.
#[inline]
pub fn combined_size(a: &Bubble, b: &Bubble) -> f32 {
    (a.size + b.size) * OVERLAP_MARGIN
}

/// Test and resolve a single pair.
pub fn resolve_pair(a: &mut Bubble, b: &mut Bubble, settings: &BubbleSettings) -> PairOutcome {
    let delta = a.position_2d() - b.position_2d();
    let distance = delta.length();
    let combined = combined_size(a, b);
    if distance >= combined {
        return PairOutcome::Apart;
    }

    // Coincident centres have no defined normal; pick one so they still part.
    let normal = if distance > f32::EPSILON {
        delta / distance
    } else {
        Vec2::X
    };
    let relative = a.velocity_2d() - b.velocity_2d();
    let velocity_along_normal = relative.dot(normal);
    let impact_speed = velocity_along_normal.abs();

    if impact_speed > settings.explosion_threshold() {
        return PairOutcome::Pop { impact_speed };
    }

    let mut outcome = PairOutcome::Separated;
    if velocity_along_normal < 0.0 {
        let restitution = IMPULSE_GAIN * settings.bounce_energy;
        let strength = -(1.0 + restitution) * velocity_along_normal;
        let impulse = normal * strength * IMPULSE_GAIN * settings.bounce_energy;
        a.push(impulse);
        b.push(-impulse);

        let tangential = relative.dot(normal.perp());
        a.add_spin(tangential * PAIR_SPIN_FACTOR);
        b.add_spin(-tangential * PAIR_SPIN_FACTOR);
        outcome = PairOutcome::Bounced { impulse };
    }

    let overlap = combined - distance;
    let shift = normal * (overlap * SEPARATION_FRACTION * 0.5);
    a.position += shift.extend(0.0);
    b.position -= shift.extend(0.0);

    outcome
}

/// Borrow two distinct elements mutably.  `i < j` is required.
fn pair_mut(bubbles: &mut [Bubble], i: usize, j: usize) -> (&mut Bubble, &mut Bubble) {
    debug_assert!(i < j);
    let (head, tail) = bubbles.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

/// Rebuild `grid` for the current bubble positions.
pub fn rebuild_grid(grid: &mut SpatialGrid, bubbles: &[Bubble]) {
    let max_size = bubbles.iter().map(|b| b.size).fold(0.0, f32::max);
    grid.rebuild(2.0 * max_size * OVERLAP_MARGIN);
    for (i, b) in bubbles.iter().enumerate() {
        grid.insert(i, b.position_2d());
    }
}

/// Resolve every live pair exactly once.
///
/// Returns the index pairs that popped, in discovery order.  A bubble that
/// pops is marked in `popped` and skipped for the remainder of the pass.
pub fn resolve_collisions(
    bubbles: &mut [Bubble],
    grid: &mut SpatialGrid,
    settings: &BubbleSettings,
    popped: &mut [bool],
) -> Vec<(usize, usize)> {
    debug_assert_eq!(bubbles.len(), popped.len());
    rebuild_grid(grid, bubbles);
    // The grid holds positions from before separation; one extra ring of
    // cells covers bodies nudged across a cell boundary during the pass.
    let reach = grid.cell_size() * 2.0;

    let mut pops = Vec::new();
    let mut candidates: Vec<usize> = Vec::new();

    for i in 0..bubbles.len() {
        if popped[i] {
            continue;
        }
        candidates.clear();
        candidates.extend(grid.query(bubbles[i].position_2d(), reach).filter(|&j| j > i));
        candidates.sort_unstable();

        for &j in &candidates {
            if popped[i] {
                break;
            }
            if popped[j] {
                continue;
            }
            let (a, b) = pair_mut(bubbles, i, j);
            if let PairOutcome::Pop { .. } = resolve_pair(a, b, settings) {
                popped[i] = true;
                popped[j] = true;
                pops.push((i, j));
            }
        }
    }

    pops
}
