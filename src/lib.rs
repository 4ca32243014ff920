//! Bubble Pop physics engine library
//!
//! A small arcade physics core: bubbles drift, bounce, collide, and
//! pop into particle bursts that can push or chain-pop their neighbours.  The
//! engine ([`world::BubbleWorld`]) is plain data driven by one `step` call per
//! frame; the remaining modules host it inside a Bevy app.

pub mod audio;
pub mod bounds;
pub mod bubble;
pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod graphics;
pub mod input;
pub mod laser;
pub mod particles;
pub mod rendering;
pub mod simulation;
pub mod spatial_partition;
pub mod spawner;
pub mod state;
pub mod world;
