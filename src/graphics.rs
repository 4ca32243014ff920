use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::bounds::PlayBounds;
use crate::config::BubbleSettings;
use crate::world::BubbleWorld;

/// Marker for the scene camera.
#[derive(Component)]
pub struct MainCamera;

/// Setup the perspective camera looking down -Z at the play plane, plus a key light.
pub fn setup_camera(mut commands: Commands, settings: Res<BubbleSettings>) {
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: settings.camera_fov_deg.to_radians(),
            ..default()
        }),
        Transform::from_xyz(0.0, 0.0, settings.camera_z).looking_at(Vec3::ZERO, Vec3::Y),
        MainCamera,
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            ..default()
        },
        Transform::from_xyz(3.0, 6.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    info!("[setup] Camera spawned");
}

/// Keep the play area matched to what the camera sees.
///
/// Re-derived whenever the window is resized or the camera settings change.
pub fn sync_play_bounds_system(
    settings: Res<BubbleSettings>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut world: ResMut<BubbleWorld>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    if window.height() <= 0.0 {
        return;
    }
    let aspect = window.width() / window.height();
    let bounds = PlayBounds::from_perspective(
        settings.camera_fov_deg.to_radians(),
        aspect,
        settings.camera_z,
    );
    if bounds != world.bounds() {
        debug!(
            "[setup] Play area resized to {:.2} x {:.2}",
            bounds.half_width * 2.0,
            bounds.half_height * 2.0
        );
        world.set_bounds(bounds);
    }
}

/// Apply hot-reloaded camera settings to the live camera.
pub fn sync_camera_system(
    settings: Res<BubbleSettings>,
    mut cameras: Query<(&mut Projection, &mut Transform), With<MainCamera>>,
) {
    if !settings.is_changed() {
        return;
    }
    for (mut projection, mut transform) in cameras.iter_mut() {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.fov = settings.camera_fov_deg.to_radians();
        }
        transform.translation.z = settings.camera_z;
    }
}
