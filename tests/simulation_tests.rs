//! Headless tests for [`SimulationPlugin`]: the engine running inside a Bevy app.
//!
//! Frame time is fixed with `TimeUpdateStrategy::ManualDuration` and the RNG
//! is seeded through `rng_seed`, so every run sees the same world.
//!
//! Covered scenarios:
//! 1. A `PopRequest` removes the bubble and scores it.
//! 2. A `PopRequest` for an unknown id is ignored.
//! 3. A `FireRequest` launches a laser that pops a bubble in its path.
//! 4. The spawner respects `max_bubbles` frame after frame.
//! 5. Two apps with the same seed produce the same world.
//! 6. Leaving `Playing` clears the world.
//! 7. Editing the settings file is picked up without a restart.

use std::path::PathBuf;
use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use bubble_pop::bubble::{BubbleId, BubbleSpec};
use bubble_pop::config::{BubbleSettings, SettingsSource};
use bubble_pop::events::SimEvent;
use bubble_pop::simulation::{FireRequest, PopRequest, SimulationPlugin};
use bubble_pop::state::{GameState, GameStatePlugin, ScoreBoard};
use bubble_pop::world::BubbleWorld;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Every `SimEvent` seen so far.
#[derive(Resource, Default)]
struct Seen(Vec<SimEvent>);

fn collect_events(mut events: MessageReader<SimEvent>, mut seen: ResMut<Seen>) {
    seen.0.extend(events.read().cloned());
}

fn quiet_settings() -> BubbleSettings {
    BubbleSettings {
        gravity: 0.0,
        spawn_rate: 60_000.0,
        rng_seed: Some(42),
        ..Default::default()
    }
}

/// Headless app running the full simulation at a fixed 16 ms per frame.
///
/// The settings file path points nowhere so the inserted settings stay in
/// place through `Startup`.
fn sim_app_with_source(settings: BubbleSettings, source: SettingsSource) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin))
        .add_plugins((GameStatePlugin, SimulationPlugin))
        .init_resource::<ButtonInput<KeyCode>>()
        .init_resource::<Seen>()
        .insert_resource(settings)
        .insert_resource(source)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)))
        .add_systems(PostUpdate, collect_events);
    app.update(); // Startup
    app
}

fn sim_app(settings: BubbleSettings) -> App {
    sim_app_with_source(
        settings,
        SettingsSource {
            path: PathBuf::from("does/not/exist/bubbles.toml"),
            ..Default::default()
        },
    )
}

fn insert(app: &mut App, spec: BubbleSpec) -> BubbleId {
    let settings = app.world().resource::<BubbleSettings>().clone();
    app.world_mut()
        .resource_mut::<BubbleWorld>()
        .insert_bubble(spec, &settings)
        .expect("population cap reached")
}

fn run(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn pop_request_removes_and_scores() {
    let mut app = sim_app(quiet_settings());
    let id = insert(&mut app, BubbleSpec::regular(Vec2::new(2.0, 1.0), Vec2::ZERO, 0.5));

    app.world_mut().write_message(PopRequest { id });
    run(&mut app, 2);

    assert!(app.world().resource::<BubbleWorld>().get(id).is_none());
    assert_eq!(app.world().resource::<ScoreBoard>().points, 1);
    assert_eq!(app.world().resource::<BubbleWorld>().particles().len(), 30);
}

#[test]
fn unknown_pop_request_is_ignored() {
    let mut app = sim_app(quiet_settings());
    insert(&mut app, BubbleSpec::regular(Vec2::ZERO, Vec2::ZERO, 0.5));

    app.world_mut().write_message(PopRequest { id: BubbleId(999) });
    run(&mut app, 2);

    assert_eq!(app.world().resource::<BubbleWorld>().len(), 1);
    assert_eq!(app.world().resource::<ScoreBoard>().points, 0);
}

#[test]
fn fire_request_launches_a_laser_that_pops() {
    let mut app = sim_app(quiet_settings());
    let target = insert(&mut app, BubbleSpec::regular(Vec2::new(0.0, 2.0), Vec2::ZERO, 0.5));

    app.world_mut().write_message(FireRequest {
        origin: Vec2::new(0.0, -3.0),
        direction: Vec2::Y,
    });
    run(&mut app, 30);

    let world = app.world().resource::<BubbleWorld>();
    assert!(world.get(target).is_none(), "laser must pop the bubble above it");
    assert_eq!(world.stats().lasers_fired, 1);
    assert_eq!(world.stats().popped_by_laser, 1);
    assert!(world.lasers().is_empty());

    let seen = &app.world().resource::<Seen>().0;
    assert!(seen.iter().any(|e| matches!(e, SimEvent::LaserFired { .. })));
}

#[test]
fn spawner_respects_cap_every_frame() {
    let mut app = sim_app(BubbleSettings {
        spawn_rate: 16.0,
        max_bubbles: 4,
        rng_seed: Some(3),
        ..Default::default()
    });
    for _ in 0..300 {
        app.update();
        assert!(app.world().resource::<BubbleWorld>().len() <= 4);
    }
    let spawned = app.world().resource::<BubbleWorld>().stats().spawned;
    assert!(spawned >= 4, "spawner never filled the field ({spawned} spawned)");
}

#[test]
fn same_seed_same_world() {
    let settings = BubbleSettings {
        spawn_rate: 50.0,
        rng_seed: Some(1234),
        ..Default::default()
    };
    let mut a = sim_app(settings.clone());
    let mut b = sim_app(settings);
    run(&mut a, 120);
    run(&mut b, 120);

    let wa = a.world().resource::<BubbleWorld>();
    let wb = b.world().resource::<BubbleWorld>();
    assert!(!wa.is_empty());
    assert_eq!(wa.bubbles(), wb.bubbles());
    assert_eq!(wa.particles(), wb.particles());
}

#[test]
fn leaving_playing_clears_the_world() {
    let mut app = sim_app(quiet_settings());
    insert(&mut app, BubbleSpec::regular(Vec2::ZERO, Vec2::ZERO, 0.5));
    insert(&mut app, BubbleSpec::regular(Vec2::new(3.0, 0.0), Vec2::ZERO, 0.5));

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::GameOver);
    app.update();

    let world = app.world().resource::<BubbleWorld>();
    assert!(world.is_empty());
    assert!(world.particles().is_empty());

    // Nothing spawns or moves while the round is over.
    run(&mut app, 10);
    assert!(app.world().resource::<BubbleWorld>().is_empty());
}

#[test]
fn edited_settings_file_is_hot_reloaded() {
    let path = std::env::temp_dir().join(format!("bubble_pop_reload_{}.toml", std::process::id()));
    std::fs::write(&path, "gravity = 0.0\nmax_bubbles = 7\n").expect("write temp settings");

    let mut app = sim_app_with_source(
        BubbleSettings::default(),
        SettingsSource {
            path: path.clone(),
            ..Default::default()
        },
    );
    assert_eq!(app.world().resource::<BubbleSettings>().max_bubbles, 7);

    std::fs::write(&path, "gravity = 0.0\nmax_bubbles = 3\nbounce_energy = 9.0\n")
        .expect("rewrite temp settings");
    {
        // Force the next poll to see a change even on coarse-mtime filesystems.
        let mut source = app.world_mut().resource_mut::<SettingsSource>();
        source.last_modified = None;
        source.poll_timer = 0.0;
    }
    app.update();

    let settings = app.world().resource::<BubbleSettings>();
    assert_eq!(settings.max_bubbles, 3);
    assert_eq!(settings.bounce_energy, 2.0, "out-of-range values are clamped");

    let _ = std::fs::remove_file(&path);
}
