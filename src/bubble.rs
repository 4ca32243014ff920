//! Bubble bodies and the per-body integrator.

use std::fmt;

use bevy::prelude::*;

use crate::config::BubbleSettings;
use crate::constants::{
    ANGULAR_DECAY, GRENADE_POINTS, MAX_BUBBLE_SPEED, MAX_ROTATION, REGULAR_POINTS,
};

/// Stable identifier of a bubble for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BubbleId(pub u64);

impl fmt::Display for BubbleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bubble variant.  Grenades score more and their bursts chain-pop neighbours;
/// the integrator and resolvers treat both kinds identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BubbleKind {
    #[default]
    Regular,
    Grenade,
}

impl BubbleKind {
    #[inline]
    pub fn points(self) -> u32 {
        match self {
            BubbleKind::Regular => REGULAR_POINTS,
            BubbleKind::Grenade => GRENADE_POINTS,
        }
    }

    #[inline]
    pub fn is_grenade(self) -> bool {
        self == BubbleKind::Grenade
    }
}

/// A live, collidable circular body.
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub id: BubbleId,
    /// World position; z stays at the spawn depth.
    pub position: Vec3,
    /// World velocity; z is always 0.
    pub velocity: Vec3,
    /// In-plane spin (rad/s).
    pub angular_velocity: f32,
    /// Accumulated in-plane rotation (rad).
    pub rotation: f32,
    /// Radius.
    pub size: f32,
    pub kind: BubbleKind,
    /// Presentation hue in degrees; the engine only hands it on to bursts.
    pub hue: f32,
}

/// Everything needed to place a bubble; the world assigns the id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleSpec {
    pub position: Vec2,
    pub velocity: Vec2,
    pub angular_velocity: f32,
    pub size: f32,
    pub kind: BubbleKind,
    pub hue: f32,
}

impl BubbleSpec {
    /// A regular, non-spinning bubble; handy for scripted scenarios.
    pub fn regular(position: Vec2, velocity: Vec2, size: f32) -> Self {
        Self {
            position,
            velocity,
            angular_velocity: 0.0,
            size,
            kind: BubbleKind::Regular,
            hue: 200.0,
        }
    }

    pub fn grenade(position: Vec2, velocity: Vec2, size: f32) -> Self {
        Self {
            kind: BubbleKind::Grenade,
            hue: 0.0,
            ..Self::regular(position, velocity, size)
        }
    }
}

impl Bubble {
    pub fn from_spec(id: BubbleId, spec: BubbleSpec) -> Self {
        Self {
            id,
            position: spec.position.extend(0.0),
            velocity: spec.velocity.extend(0.0),
            angular_velocity: spec.angular_velocity,
            rotation: 0.0,
            size: spec.size,
            kind: spec.kind,
            hue: spec.hue,
        }
    }

    #[inline]
    pub fn position_2d(&self) -> Vec2 {
        self.position.truncate()
    }

    #[inline]
    pub fn velocity_2d(&self) -> Vec2 {
        self.velocity.truncate()
    }

    /// Add a 2D velocity change.
    #[inline]
    pub fn push(&mut self, dv: Vec2) {
        self.velocity.x += dv.x;
        self.velocity.y += dv.y;
    }

    /// Add spin, keeping the result inside `±MAX_ROTATION`.
    #[inline]
    pub fn add_spin(&mut self, spin: f32) {
        self.angular_velocity = (self.angular_velocity + spin).clamp(-MAX_ROTATION, MAX_ROTATION);
    }

    /// Advance position and rotation by one step.
    ///
    /// Speed is first capped at `MAX_BUBBLE_SPEED`.  Position moves by
    /// `velocity * delta * bubble_speed`; gravity is applied to the velocity
    /// afterwards, so it only affects the next step.  Spin decays every update
    /// and is clamped to `±MAX_ROTATION`.
    pub fn integrate(&mut self, delta: f32, settings: &BubbleSettings) {
        let capped = self.velocity_2d().clamp_length_max(MAX_BUBBLE_SPEED);
        self.velocity.x = capped.x;
        self.velocity.y = capped.y;
        let step = self.velocity * delta * settings.bubble_speed;
        self.position.x += step.x;
        self.position.y += step.y;
        self.velocity.y -= settings.gravity * delta;
        self.rotation += self.angular_velocity * delta;
        self.angular_velocity =
            (self.angular_velocity * ANGULAR_DECAY).clamp(-MAX_ROTATION, MAX_ROTATION);
    }
}
