//! Pointer and keyboard input: turns clicks into [`PopRequest`]s and
//! Space / right-click into [`FireRequest`]s.
//!
//! | Input              | Effect                                             |
//! |--------------------|----------------------------------------------------|
//! | Left click / tap   | Pop the bubble under the cursor                    |
//! | Right click, Space | Fire a laser from the bottom centre at the cursor  |
//!
//! Cursor positions are projected onto the z = 0 play plane through the
//! perspective camera, so picking matches what is on screen at any FOV.

use bevy::input::mouse::MouseButton;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::bounds::PlayBounds;
use crate::config::BubbleSettings;
use crate::graphics::MainCamera;
use crate::simulation::{FireRequest, PopRequest};
use crate::world::BubbleWorld;

/// Gap between the floor and the laser muzzle, in world units.
const MUZZLE_LIFT: f32 = 0.3;

/// Enforces a minimum interval between consecutive laser shots.
#[derive(Resource, Default)]
pub struct LaserCooldown {
    /// Remaining cooldown in seconds; decremented each frame, clamped to 0.
    pub timer: f32,
}

/// Where lasers leave from: centred, just above the floor.
pub fn laser_muzzle(bounds: &PlayBounds) -> Vec2 {
    Vec2::new(0.0, -bounds.half_height + MUZZLE_LIFT)
}

/// Project a cursor position onto the z = 0 play plane.
pub fn cursor_to_play_plane(
    camera: &Camera,
    camera_transform: &GlobalTransform,
    cursor: Vec2,
) -> Option<Vec2> {
    let ray = camera.viewport_to_world(camera_transform, cursor).ok()?;
    let distance = ray.intersect_plane(Vec3::ZERO, InfinitePlane3d::new(Vec3::Z))?;
    Some(ray.get_point(distance).truncate())
}

fn cursor_world(
    windows: &Query<&Window, With<PrimaryWindow>>,
    cameras: &Query<(&Camera, &GlobalTransform), With<MainCamera>>,
) -> Option<Vec2> {
    let window = windows.single().ok()?;
    let cursor = window.cursor_position()?;
    let (camera, transform) = cameras.single().ok()?;
    cursor_to_play_plane(camera, transform, cursor)
}

/// Left click pops the bubble under the cursor.
pub fn pointer_pop_system(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    world: Res<BubbleWorld>,
    mut requests: MessageWriter<PopRequest>,
) {
    if !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(point) = cursor_world(&windows, &cameras) else {
        return;
    };
    match world.pick_bubble(point) {
        Some(id) => {
            requests.write(PopRequest { id });
        }
        None => debug!("[input] Click at ({:.2}, {:.2}) missed", point.x, point.y),
    }
}

/// Space or right click fires a laser toward the cursor (straight up when the
/// cursor is outside the window).
#[allow(clippy::too_many_arguments)]
pub fn laser_fire_system(
    keys: Res<ButtonInput<KeyCode>>,
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    world: Res<BubbleWorld>,
    settings: Res<BubbleSettings>,
    time: Res<Time>,
    mut cooldown: ResMut<LaserCooldown>,
    mut requests: MessageWriter<FireRequest>,
) {
    cooldown.timer = (cooldown.timer - time.delta_secs()).max(0.0);

    let wants_fire = keys.just_pressed(KeyCode::Space) || buttons.just_pressed(MouseButton::Right);
    if !wants_fire || cooldown.timer > 0.0 {
        return;
    }

    let origin = laser_muzzle(&world.bounds());
    let direction = cursor_world(&windows, &cameras)
        .and_then(|target| (target - origin).try_normalize())
        .unwrap_or(Vec2::Y);

    requests.write(FireRequest { origin, direction });
    cooldown.timer = settings.laser_cooldown;
}
