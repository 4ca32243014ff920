//! One-way notifications emitted by the engine.
//!
//! [`crate::world::BubbleWorld`] returns these from every mutating call; the
//! Bevy host forwards them as messages so scoring, audio, and rendering can
//! react without touching simulation state.

use bevy::prelude::*;

use crate::bubble::{BubbleId, BubbleKind};
use crate::particles::BurstKind;

/// Why a bubble was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PopCause {
    /// Tapped / clicked by the player.
    Input,
    /// Hit by a laser.
    Laser,
    /// High-speed impact with another bubble.
    Collision,
    /// Touched by a particle from a grenade burst.
    ChainReaction,
}

#[derive(Message, Debug, Clone, PartialEq)]
pub enum SimEvent {
    Spawned {
        id: BubbleId,
        kind: BubbleKind,
        position: Vec2,
    },
    Popped {
        id: BubbleId,
        kind: BubbleKind,
        cause: PopCause,
        points: u32,
        position: Vec2,
    },
    BurstEmitted {
        position: Vec2,
        count: usize,
        kind: BurstKind,
    },
    LaserFired {
        laser: u64,
        origin: Vec2,
        direction: Vec2,
    },
    LaserExpired {
        laser: u64,
    },
    /// A bubble was pressed against the ceiling this tick.  What that means is
    /// up to the host.
    CeilingContact {
        id: BubbleId,
        position: Vec2,
    },
}

impl SimEvent {
    /// Points carried by a pop; 0 for every other event.
    #[inline]
    pub fn points(&self) -> u32 {
        match self {
            SimEvent::Popped { points, .. } => *points,
            _ => 0,
        }
    }
}
