//! Simulation plugin: owns the [`BubbleWorld`] resource and drives it once per frame.
//!
//! ## Systems (registered by `SimulationPlugin`)
//!
//! | System                        | Schedule              | Purpose                                  |
//! |-------------------------------|-----------------------|------------------------------------------|
//! | `load_bubble_settings`        | `Startup`             | Read `assets/bubbles.toml`               |
//! | `seed_rng_system`             | `Startup`             | Seed `SimRng` from `rng_seed` or entropy |
//! | `init_bounds_system`          | `Startup`             | Play area from the configured camera     |
//! | `hot_reload_settings_system`  | `Update`              | Swap in edited settings                  |
//! | `apply_requests_system`       | `Update / in Playing` | Pop / fire requests from input           |
//! | `physics_step_system`         | `Update / in Playing` | `BubbleWorld::step`, forward events      |
//! | `teardown_world`              | `OnExit(Playing)`     | Clear every body, particle, and laser    |
//!
//! Requests are applied before the step, so a click and the step it lands in
//! see the same world.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bubble::BubbleId;
use crate::config::{
    hot_reload_settings_system, load_bubble_settings, BubbleSettings, SettingsSource,
};
use crate::constants::MAX_FRAME_DELTA;
use crate::events::SimEvent;
use crate::state::GameState;
use crate::world::BubbleWorld;

// ── Resources ─────────────────────────────────────────────────────────────────

/// The single random source every engine draw goes through.
#[derive(Resource)]
pub struct SimRng(pub StdRng);

impl SimRng {
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(StdRng::seed_from_u64(seed)),
            None => Self(StdRng::from_entropy()),
        }
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::from_seed(None)
    }
}

// ── Messages ──────────────────────────────────────────────────────────────────

/// Ask the engine to pop a bubble (pointer / tap).
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct PopRequest {
    pub id: BubbleId,
}

/// Ask the engine to fire a laser.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct FireRequest {
    pub origin: Vec2,
    pub direction: Vec2,
}

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Requires [`crate::state::GameStatePlugin`] to be added first.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BubbleSettings>()
            .init_resource::<SettingsSource>()
            .init_resource::<BubbleWorld>()
            .init_resource::<SimRng>()
            .add_message::<SimEvent>()
            .add_message::<PopRequest>()
            .add_message::<FireRequest>()
            .add_systems(
                Startup,
                (load_bubble_settings, seed_rng_system, init_bounds_system).chain(),
            )
            .add_systems(
                Update,
                (
                    hot_reload_settings_system,
                    (apply_requests_system, physics_step_system)
                        .chain()
                        .run_if(in_state(GameState::Playing)),
                )
                    .chain(),
            )
            .add_systems(OnExit(GameState::Playing), teardown_world);
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

/// Reseed after the settings file has been read.
pub fn seed_rng_system(settings: Res<BubbleSettings>, mut rng: ResMut<SimRng>) {
    *rng = SimRng::from_seed(settings.rng_seed);
    match settings.rng_seed {
        Some(seed) => info!("[sim] Using fixed seed {seed}"),
        None => debug!("[sim] Seeded from entropy"),
    }
}

/// Size the play area from the configured camera until a window reports in.
pub fn init_bounds_system(settings: Res<BubbleSettings>, mut world: ResMut<BubbleWorld>) {
    let bounds = crate::bounds::PlayBounds::from_settings(&settings);
    world.set_bounds(bounds);
    info!(
        "[sim] Play area {:.2} x {:.2}",
        bounds.half_width * 2.0,
        bounds.half_height * 2.0
    );
}

// ── Update ────────────────────────────────────────────────────────────────────

/// Forward pop and fire requests to the engine.
///
/// Unknown ids are expected (the bubble may have popped earlier this frame)
/// and only logged at debug level.
pub fn apply_requests_system(
    mut pops: MessageReader<PopRequest>,
    mut fires: MessageReader<FireRequest>,
    mut world: ResMut<BubbleWorld>,
    mut rng: ResMut<SimRng>,
    mut out: MessageWriter<SimEvent>,
) {
    for request in pops.read() {
        match world.pop_bubble(request.id, &mut rng.0) {
            Ok(events) => {
                out.write_batch(events);
            }
            Err(e) => debug!("[sim] Pop request ignored: {e}"),
        }
    }
    for request in fires.read() {
        match world.spawn_laser(request.origin, request.direction) {
            Ok(event) => {
                out.write(event);
            }
            Err(e) => debug!("[sim] Fire request ignored: {e}"),
        }
    }
}

/// Advance the world by this frame's delta (clamped) and publish the events.
pub fn physics_step_system(
    time: Res<Time>,
    settings: Res<BubbleSettings>,
    mut world: ResMut<BubbleWorld>,
    mut rng: ResMut<SimRng>,
    mut out: MessageWriter<SimEvent>,
) {
    let delta = time.delta_secs().min(MAX_FRAME_DELTA);
    if delta <= 0.0 {
        return;
    }
    let events = world.step(delta, &settings, &mut rng.0);
    out.write_batch(events);
}

pub fn teardown_world(mut world: ResMut<BubbleWorld>) {
    let stats = world.stats();
    info!(
        "[sim] Round over: {} spawned, {} popped, {} lasers fired",
        stats.spawned,
        stats.total_popped(),
        stats.lasers_fired
    );
    world.clear();
}
