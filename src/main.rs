use bevy::prelude::*;
use bevy::window::WindowResolution;

use bubble_pop::audio::SoundCuePlugin;
use bubble_pop::config::load_bubble_settings;
use bubble_pop::input::LaserCooldown;
use bubble_pop::simulation::{apply_requests_system, physics_step_system, SimulationPlugin};
use bubble_pop::state::{GameState, GameStatePlugin};
use bubble_pop::{graphics, input, rendering};

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Bubble Pop".into(),
            resolution: WindowResolution::new(1280, 720),
            ..Default::default()
        }),
        ..Default::default()
    }))
    .insert_resource(ClearColor(Color::srgb(0.05, 0.07, 0.16)))
    // GameStatePlugin must come first: SimulationPlugin gates on GameState.
    .add_plugins((GameStatePlugin, SimulationPlugin, SoundCuePlugin))
    .init_resource::<LaserCooldown>()
    .add_systems(
        Startup,
        (
            // Settings first so the camera sees the final FOV / distance.
            graphics::setup_camera.after(load_bubble_settings),
            rendering::setup_render_assets,
            rendering::setup_hud,
        ),
    )
    .add_systems(
        Update,
        (
            graphics::sync_camera_system,
            graphics::sync_play_bounds_system.before(physics_step_system),
            (input::pointer_pop_system, input::laser_fire_system)
                .before(apply_requests_system)
                .run_if(in_state(GameState::Playing)),
        ),
    )
    .add_systems(
        Update,
        (
            rendering::sync_bubble_visuals_system,
            rendering::sync_particle_pool_system,
            rendering::sync_laser_pool_system,
            rendering::hud_score_display_system,
            rendering::game_over_banner_system,
        )
            .after(physics_step_system),
    );

    app.run();
}
