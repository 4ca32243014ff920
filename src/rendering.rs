//! Rendering systems: bubble spheres, particle discs, laser bolts, and the HUD.
//!
//! The engine never holds render handles.  Every frame the systems here read
//! [`BubbleWorld`] and bring the scene in line with it.
//!
//! ## Layer Model
//!
//! | Layer          | Technology            | Synced by                        |
//! |----------------|-----------------------|----------------------------------|
//! | Bubbles        | `Mesh3d` sphere       | [`BubbleId`] via [`BubbleVisual`] |
//! | Particles      | `Mesh3d` disc, pooled | slot index via [`ParticleSlot`]  |
//! | Lasers         | `Mesh3d` bolt, pooled | slot index via [`LaserSlot`]     |
//! | Score HUD      | Bevy UI               | [`ScoreBoard`] change            |
//! | Game-over text | Bevy UI               | `GameState`                      |
//!
//! ## System Responsibilities
//!
//! | System                        | Schedule | Purpose                               |
//! |-------------------------------|----------|---------------------------------------|
//! | `setup_render_assets`         | Startup  | Shared sphere / disc / bolt meshes    |
//! | `setup_hud`                   | Startup  | Score text and game-over banner       |
//! | `sync_bubble_visuals_system`  | Update   | Spawn / move / despawn bubble spheres |
//! | `sync_particle_pool_system`   | Update   | Place and fade pooled particle discs  |
//! | `sync_laser_pool_system`      | Update   | Place pooled laser bolts              |
//! | `hud_score_display_system`    | Update   | Refresh score text                    |
//! | `game_over_banner_system`     | Update   | Show / hide the game-over text        |

use std::collections::HashMap;

use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};

use crate::bubble::{Bubble, BubbleId, BubbleKind};
use crate::state::{GameState, ScoreBoard};
use crate::world::BubbleWorld;

/// Bubbles sit slightly behind particles and lasers so effects stay visible.
const PARTICLE_Z: f32 = 0.05;
const LASER_Z: f32 = 0.1;
const LASER_LENGTH: f32 = 0.6;
const LASER_WIDTH: f32 = 0.06;
const HUD_FONT_SIZE: f32 = 22.0;

// ── Resources ────────────────────────────────────────────────────────────────

/// Meshes shared by every bubble, particle, and laser entity (created once at startup).
#[derive(Resource)]
pub struct RenderMeshes {
    pub sphere: Handle<Mesh>,
    pub disc: Handle<Mesh>,
    pub bolt: Handle<Mesh>,
}

// ── Components ───────────────────────────────────────────────────────────────

/// Links a sphere entity to the engine bubble it draws.
#[derive(Component, Debug, Clone, Copy)]
pub struct BubbleVisual {
    pub id: BubbleId,
}

/// Pooled particle disc.  Slot `i` draws `BubbleWorld::particles()[i]`.
#[derive(Component, Debug)]
pub struct ParticleSlot {
    pub index: usize,
    pub material: Handle<StandardMaterial>,
}

/// Pooled laser bolt.  Slot `i` draws `BubbleWorld::lasers()[i]`.
#[derive(Component, Debug, Clone, Copy)]
pub struct LaserSlot {
    pub index: usize,
}

/// Marker for the score text node.
#[derive(Component)]
pub struct HudScoreDisplay;

/// Marker for the game-over banner.
#[derive(Component)]
pub struct GameOverBanner;

// ── Colours ──────────────────────────────────────────────────────────────────

fn bubble_color(bubble: &Bubble) -> Color {
    match bubble.kind {
        BubbleKind::Regular => Color::hsla(bubble.hue, 0.75, 0.65, 0.55),
        BubbleKind::Grenade => Color::hsla(bubble.hue, 0.9, 0.35, 0.9),
    }
}

fn bubble_material(bubble: &Bubble) -> StandardMaterial {
    let emissive = match bubble.kind {
        BubbleKind::Grenade => LinearRgba::rgb(0.6, 0.05, 0.0),
        BubbleKind::Regular => LinearRgba::BLACK,
    };
    StandardMaterial {
        base_color: bubble_color(bubble),
        emissive,
        perceptual_roughness: 0.08,
        reflectance: 0.9,
        alpha_mode: AlphaMode::Blend,
        ..default()
    }
}

fn particle_color(hue: f32, opacity: f32) -> Color {
    Color::hsla(hue, 0.85, 0.7, opacity)
}

// ── Startup ──────────────────────────────────────────────────────────────────

pub fn setup_render_assets(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    commands.insert_resource(RenderMeshes {
        sphere: meshes.add(Sphere::new(1.0).mesh().uv(32, 18)),
        disc: meshes.add(disc_mesh(1.0, 12)),
        bolt: meshes.add(Cuboid::new(LASER_WIDTH, LASER_LENGTH, LASER_WIDTH)),
    });
}

/// Spawn the top-left score text and the (hidden) game-over banner.
pub fn setup_hud(mut commands: Commands) {
    commands.spawn((
        Text::new("Score: 0"),
        TextFont {
            font_size: HUD_FONT_SIZE,
            ..default()
        },
        TextColor(Color::srgb(0.95, 0.88, 0.45)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            ..default()
        },
        HudScoreDisplay,
    ));

    commands.spawn((
        Text::new("A bubble escaped!  Press R to play again"),
        TextFont {
            font_size: HUD_FONT_SIZE * 1.5,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Percent(20.0),
            top: Val::Percent(45.0),
            ..default()
        },
        Visibility::Hidden,
        GameOverBanner,
    ));
}

// ── Update: bubbles ──────────────────────────────────────────────────────────

/// Spawn a sphere for every new bubble, move existing ones, and despawn the
/// spheres whose bubble has popped.
pub fn sync_bubble_visuals_system(
    mut commands: Commands,
    world: Res<BubbleWorld>,
    render: Res<RenderMeshes>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut visuals: Query<(Entity, &BubbleVisual, &mut Transform)>,
) {
    let live: HashMap<BubbleId, &Bubble> = world.bubbles().iter().map(|b| (b.id, b)).collect();
    let mut drawn = Vec::with_capacity(live.len());

    for (entity, visual, mut transform) in visuals.iter_mut() {
        match live.get(&visual.id) {
            Some(bubble) => {
                *transform = bubble_transform(bubble);
                drawn.push(visual.id);
            }
            None => commands.entity(entity).despawn(),
        }
    }

    for bubble in world.bubbles() {
        if drawn.contains(&bubble.id) {
            continue;
        }
        commands.spawn((
            Mesh3d(render.sphere.clone()),
            MeshMaterial3d(materials.add(bubble_material(bubble))),
            bubble_transform(bubble),
            BubbleVisual { id: bubble.id },
        ));
    }
}

fn bubble_transform(bubble: &Bubble) -> Transform {
    Transform::from_translation(bubble.position)
        .with_rotation(Quat::from_rotation_z(bubble.rotation))
        .with_scale(Vec3::splat(bubble.size))
}

// ── Update: particles ────────────────────────────────────────────────────────

/// Grow the disc pool to the live particle count and hide unused slots.
///
/// Each slot owns an unlit material whose alpha follows the particle's opacity.
pub fn sync_particle_pool_system(
    mut commands: Commands,
    world: Res<BubbleWorld>,
    render: Res<RenderMeshes>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut pool: Query<(&ParticleSlot, &mut Transform, &mut Visibility)>,
) {
    let particles = world.particles();
    let mut pooled = 0;

    for (slot, mut transform, mut visibility) in pool.iter_mut() {
        pooled += 1;
        let Some(p) = particles.get(slot.index) else {
            *visibility = Visibility::Hidden;
            continue;
        };
        *visibility = Visibility::Visible;
        *transform = Transform::from_translation(p.position.extend(PARTICLE_Z))
            .with_scale(Vec3::splat(p.size));
        if let Some(material) = materials.get_mut(&slot.material) {
            material.base_color = particle_color(p.hue, p.opacity());
        }
    }

    for (index, p) in particles.iter().enumerate().skip(pooled) {
        let material = materials.add(StandardMaterial {
            base_color: particle_color(p.hue, p.opacity()),
            unlit: true,
            alpha_mode: AlphaMode::Blend,
            ..default()
        });
        commands.spawn((
            Mesh3d(render.disc.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_translation(p.position.extend(PARTICLE_Z))
                .with_scale(Vec3::splat(p.size)),
            Visibility::Visible,
            ParticleSlot { index, material },
        ));
    }
}

// ── Update: lasers ───────────────────────────────────────────────────────────

pub fn sync_laser_pool_system(
    mut commands: Commands,
    world: Res<BubbleWorld>,
    render: Res<RenderMeshes>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut pool: Query<(&LaserSlot, &mut Transform, &mut Visibility)>,
) {
    let lasers = world.lasers();
    let mut pooled = 0;

    for (slot, mut transform, mut visibility) in pool.iter_mut() {
        pooled += 1;
        match lasers.get(slot.index) {
            Some(laser) => {
                *visibility = Visibility::Visible;
                *transform = laser_transform(laser.position, laser.direction);
            }
            None => *visibility = Visibility::Hidden,
        }
    }

    if lasers.len() <= pooled {
        return;
    }
    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.4, 1.0, 0.6),
        emissive: LinearRgba::rgb(0.8, 4.0, 1.2),
        unlit: true,
        ..default()
    });
    for (index, laser) in lasers.iter().enumerate().skip(pooled) {
        commands.spawn((
            Mesh3d(render.bolt.clone()),
            MeshMaterial3d(material.clone()),
            laser_transform(laser.position, laser.direction),
            Visibility::Visible,
            LaserSlot { index },
        ));
    }
}

/// The bolt mesh is long along +Y; rotate it onto `direction`.
fn laser_transform(position: Vec2, direction: Vec2) -> Transform {
    Transform::from_translation(position.extend(LASER_Z))
        .with_rotation(Quat::from_rotation_z(direction.to_angle() - std::f32::consts::FRAC_PI_2))
}

// ── Update: HUD ──────────────────────────────────────────────────────────────

pub fn hud_score_display_system(
    score: Res<ScoreBoard>,
    mut text_query: Query<&mut Text, With<HudScoreDisplay>>,
) {
    if !score.is_changed() {
        return;
    }
    for mut text in text_query.iter_mut() {
        *text = Text::new(format!(
            "Score: {}  ({} popped, {} by laser, {} chained)",
            score.points,
            score.total_pops(),
            score.by_laser,
            score.by_chain
        ));
    }
}

pub fn game_over_banner_system(
    state: Res<State<GameState>>,
    mut query: Query<&mut Visibility, With<GameOverBanner>>,
) {
    if !state.is_changed() {
        return;
    }
    let vis = match state.get() {
        GameState::GameOver => Visibility::Visible,
        GameState::Playing => Visibility::Hidden,
    };
    for mut v in query.iter_mut() {
        *v = vis;
    }
}

// ── Mesh helpers ─────────────────────────────────────────────────────────────

/// Triangle-fan disc in the XY plane facing +Z.
fn disc_mesh(radius: f32, sides: u32) -> Mesh {
    let n = sides as usize;
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(n + 1);

    positions.push([0.0, 0.0, 0.0]);
    normals.push([0.0, 0.0, 1.0]);
    uvs.push([0.5, 0.5]);

    for i in 0..n {
        let (sin, cos) = (std::f32::consts::TAU * i as f32 / n as f32).sin_cos();
        positions.push([radius * cos, radius * sin, 0.0]);
        normals.push([0.0, 0.0, 1.0]);
        uvs.push([0.5 + 0.5 * cos, 0.5 + 0.5 * sin]);
    }

    let indices: Vec<u32> = (0..n as u32)
        .flat_map(|i| [0, i + 1, (i + 1) % n as u32 + 1])
        .collect();

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}
