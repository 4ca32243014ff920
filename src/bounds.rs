//! Play-area bounds and the wall resolver.
//!
//! The visible play area is the slice of the z = 0 plane seen by a perspective
//! camera looking down -Z:
//!
//! ```text
//! height = 2 · tan(fov / 2) · camera_z
//! width  = height · aspect
//! ```
//!
//! Each body is kept inside the half-extents shrunk by its own radius so it
//! never pokes out of the frame.

use bevy::prelude::*;
use rand::Rng;

use crate::bubble::Bubble;
use crate::config::BubbleSettings;
use crate::constants::{WALL_JITTER, WALL_SPIN_FACTOR};

/// Half-extents of the play area, centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayBounds {
    pub half_width: f32,
    pub half_height: f32,
}

/// Which walls a body touched during [`resolve_walls`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallContact {
    pub left: bool,
    pub right: bool,
    pub floor: bool,
    pub ceiling: bool,
}

impl WallContact {
    #[inline]
    pub fn any(self) -> bool {
        self.left || self.right || self.floor || self.ceiling
    }
}

impl PlayBounds {
    pub fn new(half_width: f32, half_height: f32) -> Self {
        Self {
            half_width: half_width.max(0.0),
            half_height: half_height.max(0.0),
        }
    }

    /// Bounds seen by a perspective camera at `camera_z` with vertical
    /// field-of-view `fov` (radians).
    pub fn from_perspective(fov: f32, aspect: f32, camera_z: f32) -> Self {
        let height = 2.0 * (fov * 0.5).tan() * camera_z;
        let width = height * aspect;
        Self::new(width * 0.5, height * 0.5)
    }

    pub fn from_settings(settings: &BubbleSettings) -> Self {
        Self::from_perspective(
            settings.camera_fov_deg.to_radians(),
            settings.aspect_ratio,
            settings.camera_z,
        )
    }

    /// Half-extents available to the centre of a body of radius `radius`.
    #[inline]
    pub fn inset(&self, radius: f32) -> Vec2 {
        Vec2::new(
            (self.half_width - radius).max(0.0),
            (self.half_height - radius).max(0.0),
        )
    }

    /// Whether `point` lies inside the (unshrunk) play area.
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x.abs() <= self.half_width && point.y.abs() <= self.half_height
    }

    /// Clamp a bubble's centre inside the walls without touching its velocity.
    ///
    /// Used after pair separation, which can nudge a body that was just
    /// clamped onto a wall back past it.
    #[inline]
    pub fn confine(&self, bubble: &mut Bubble) {
        let limit = self.inset(bubble.size);
        bubble.position.x = bubble.position.x.clamp(-limit.x, limit.x);
        bubble.position.y = bubble.position.y.clamp(-limit.y, limit.y);
    }

    /// Length of the half-diagonal, the farthest a point inside can be from the centre.
    #[inline]
    pub fn max_distance(&self) -> f32 {
        Vec2::new(self.half_width, self.half_height).length()
    }
}

impl Default for PlayBounds {
    fn default() -> Self {
        Self::from_settings(&BubbleSettings::default())
    }
}

/// Random value in `±half`, or 0 for a degenerate range.
#[inline]
pub(crate) fn symmetric(rng: &mut impl Rng, half: f32) -> f32 {
    if half > 0.0 {
        rng.gen_range(-half..half)
    } else {
        0.0
    }
}

/// Reflect a bubble off any wall it has crossed.
///
/// For each axis where `|p| > bound`: the velocity component is reflected and
/// scaled by `bounce_energy`, the position is clamped onto the wall, a small
/// random kick is added to the other axis, and spin proportional to the
/// reflected speed is added.
pub fn resolve_walls(
    bubble: &mut Bubble,
    bounds: &PlayBounds,
    settings: &BubbleSettings,
    rng: &mut impl Rng,
) -> WallContact {
    let limit = bounds.inset(bubble.size);
    let energy = settings.bounce_energy;
    let mut contact = WallContact::default();

    if bubble.position.x.abs() > limit.x {
        let side = bubble.position.x.signum();
        contact.left = side < 0.0;
        contact.right = side > 0.0;
        bubble.position.x = limit.x * side;
        bubble.velocity.x = -bubble.velocity.x * energy;
        bubble.velocity.y += symmetric(rng, WALL_JITTER);
        bubble.add_spin(bubble.velocity.x * energy * WALL_SPIN_FACTOR);
    }

    if bubble.position.y.abs() > limit.y {
        let side = bubble.position.y.signum();
        contact.floor = side < 0.0;
        contact.ceiling = side > 0.0;
        bubble.position.y = limit.y * side;
        bubble.velocity.y = -bubble.velocity.y * energy;
        bubble.velocity.x += symmetric(rng, WALL_JITTER);
        bubble.add_spin(bubble.velocity.y * energy * WALL_SPIN_FACTOR);
    }

    contact
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bubble::{BubbleId, BubbleSpec};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn perspective_bounds_match_field_of_view() {
        let b = PlayBounds::from_perspective(90f32.to_radians(), 2.0, 5.0);
        // tan(45°) = 1 → height 10, width 20
        assert!((b.half_height - 5.0).abs() < 1e-4);
        assert!((b.half_width - 10.0).abs() < 1e-4);
    }

    #[test]
    fn inset_never_goes_negative() {
        let b = PlayBounds::new(1.0, 1.0);
        assert_eq!(b.inset(5.0), Vec2::ZERO);
    }

    #[test]
    fn ceiling_hit_clamps_and_reflects() {
        // Effective ceiling at 10.0 for a radius-0.5 bubble.
        let bounds = PlayBounds::new(20.5, 10.5);
        let settings = BubbleSettings {
            bounce_energy: 0.8,
            gravity: 0.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let mut b = Bubble::from_spec(
            BubbleId(1),
            BubbleSpec::regular(Vec2::new(0.0, 10.4), Vec2::new(0.0, 5.0), 0.5),
        );
        let contact = resolve_walls(&mut b, &bounds, &settings, &mut rng);
        assert!(contact.ceiling && !contact.floor);
        assert!((b.position.y - 10.0).abs() < 1e-5);
        assert!((b.velocity.y + 4.0).abs() < 1e-5);
        assert!(b.velocity.x.abs() <= WALL_JITTER);
    }

    #[test]
    fn left_wall_hit_points_velocity_back_inside() {
        let bounds = PlayBounds::new(5.0, 5.0);
        let settings = BubbleSettings::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut b = Bubble::from_spec(
            BubbleId(1),
            BubbleSpec::regular(Vec2::new(-7.0, 0.0), Vec2::new(-3.0, 0.0), 1.0),
        );
        let contact = resolve_walls(&mut b, &bounds, &settings, &mut rng);
        assert!(contact.left);
        assert_eq!(b.position.x, -4.0);
        assert!(b.velocity.x > 0.0);
        assert_ne!(b.angular_velocity, 0.0, "wall hit should add spin");
    }

    #[test]
    fn bubble_inside_is_untouched() {
        let bounds = PlayBounds::new(5.0, 5.0);
        let mut rng = StdRng::seed_from_u64(3);
        let spec = BubbleSpec::regular(Vec2::new(1.0, 1.0), Vec2::new(1.0, 1.0), 0.5);
        let mut b = Bubble::from_spec(BubbleId(1), spec);
        let before = b.clone();
        let contact = resolve_walls(&mut b, &bounds, &BubbleSettings::default(), &mut rng);
        assert!(!contact.any());
        assert_eq!(b, before);
    }

    #[test]
    fn confine_moves_position_only() {
        let bounds = PlayBounds::new(2.0, 2.0);
        let mut b = Bubble::from_spec(
            BubbleId(1),
            BubbleSpec::regular(Vec2::new(3.0, -1.0), Vec2::new(1.0, 1.0), 0.5),
        );
        bounds.confine(&mut b);
        assert_eq!(b.position_2d(), Vec2::new(1.5, -1.0));
        assert_eq!(b.velocity_2d(), Vec2::new(1.0, 1.0));
    }
}
