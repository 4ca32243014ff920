//! Centralised physics and gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! Values that players or designers adjust at runtime are mirrored in
//! [`crate::config::BubbleSettings`]; everything else is fixed engine tuning.
//!
//! World units: with the default camera (`CAMERA_FOV_DEG = 75`, `CAMERA_Z =
//! 10`) the visible play area is roughly 27 × 15 units at 16:9.

// ── Settings defaults ─────────────────────────────────────────────────────────

/// Multiplier applied to every bubble's velocity during integration.
pub const BUBBLE_SPEED: f32 = 1.0;

/// Downward acceleration (units/s²) applied to bubble velocity.
///
/// 0.0 gives a floaty zero-g field; above ~2.0 bubbles pile up on the floor.
pub const GRAVITY: f32 = 0.3;

/// Velocity retained after a wall or bubble collision.
/// 0.0 = dead stop; 1.0 = perfectly elastic walls.
pub const BOUNCE_ENERGY: f32 = 0.8;

/// Divides [`EXPLOSION_BASE_THRESHOLD`].  Higher power → lower threshold →
/// easier chain pops.
pub const EXPLOSION_POWER: f32 = 1.0;

/// Scales the impulse a burst particle applies to a bubble it touches.
pub const PARTICLE_FORCE: f32 = 1.0;

/// Multiplier on the spawn radius range.
pub const SPAWN_SIZE: f32 = 1.0;

/// Probability in `[0, 1]` that a spawned bubble is a grenade.
pub const GRENADE_CHANCE: f32 = 0.1;

/// Milliseconds between spawn attempts.
pub const SPAWN_RATE_MS: f32 = 1200.0;

/// Population cap.  The spawner never exceeds it.
pub const MAX_BUBBLES: usize = 20;

// ── Camera / play area ────────────────────────────────────────────────────────

/// Vertical field of view of the perspective camera (degrees).
pub const CAMERA_FOV_DEG: f32 = 75.0;

/// Distance of the camera from the z = 0 play plane.
pub const CAMERA_Z: f32 = 10.0;

/// Aspect ratio used until a window reports its real size (and in headless runs).
pub const DEFAULT_ASPECT_RATIO: f32 = 16.0 / 9.0;

// ── Integrator ───────────────────────────────────────────────────────────────

/// Angular velocity is multiplied by this every update.
pub const ANGULAR_DECAY: f32 = 0.98;

/// Angular velocity magnitude clamp (rad/s).
pub const MAX_ROTATION: f32 = 4.0;

/// Speed cap (units/s) applied by the integrator at the start of each step.
///
/// With `bounce_energy` above ~0.6 a pair bounce returns more speed than it
/// took, which is normally bounded by the pop threshold.  With
/// `explosion_power = 0` nothing pops, so this keeps speeds finite.
pub const MAX_BUBBLE_SPEED: f32 = 40.0;

/// Upper bound on the frame delta fed to the engine (s).
///
/// A window drag or breakpoint can hand the app a multi-second frame; without
/// the clamp a single step would carry fast bubbles straight through each other.
pub const MAX_FRAME_DELTA: f32 = 0.1;

// ── Wall response ─────────────────────────────────────────────────────────────

/// Half-width of the random perpendicular velocity kick added on a wall hit.
pub const WALL_JITTER: f32 = 0.15;

/// Spin added per unit of reflected velocity on a wall hit.
pub const WALL_SPIN_FACTOR: f32 = 0.5;

// ── Bubble/bubble collision ─────────────────────────────────────────────────

/// Overlap is declared at `(size_a + size_b) * OVERLAP_MARGIN`.
pub const OVERLAP_MARGIN: f32 = 1.2;

/// Impact speed above which a colliding pair pops, at `explosion_power = 1`.
pub const EXPLOSION_BASE_THRESHOLD: f32 = 3.0;

/// Restitution and impulse gain, both multiplied by `bounce_energy`.
pub const IMPULSE_GAIN: f32 = 1.2;

/// Fraction of the overlap removed per tick (split evenly between the bodies).
pub const SEPARATION_FRACTION: f32 = 0.6;

/// Spin added per unit of tangential relative velocity.
pub const PAIR_SPIN_FACTOR: f32 = 0.3;

// ── Bubbles ──────────────────────────────────────────────────────────────────

/// Radius range before `spawn_size` scaling.
pub const BUBBLE_SIZE_MIN: f32 = 0.4;
pub const BUBBLE_SIZE_MAX: f32 = 0.8;

/// Grenades are drawn this much larger than regular bubbles.
pub const GRENADE_SIZE_FACTOR: f32 = 1.3;

/// Points awarded per pop.
pub const REGULAR_POINTS: u32 = 1;
pub const GRENADE_POINTS: u32 = 5;

// ── Spawner ──────────────────────────────────────────────────────────────────

/// Probability of each edge zone; the remainder goes to the centre zone.
pub const EDGE_ZONE_WEIGHT: f32 = 0.1;

/// Fraction of an edge's span that edge spawns are confined to.
pub const EDGE_SPAN_FRACTION: f32 = 0.8;

/// Spawn speed cap as a fraction of `bubble_speed`.
pub const SPAWN_SPEED_FRACTION: f32 = 0.6;

/// Angular velocity is drawn from `±SPAWN_SPIN_RANGE * bubble_speed`.
pub const SPAWN_SPIN_RANGE: f32 = 0.5;

// ── Particles ────────────────────────────────────────────────────────────────

pub const POP_BURST_COUNT: usize = 30;
pub const GRENADE_BURST_COUNT: usize = 50;
pub const LASER_SPARK_COUNT: usize = 15;

/// Lifetime of pop and grenade particles (s).
pub const PARTICLE_LIFETIME: f32 = 1.0;

/// Lifetime of laser impact sparks (s).
pub const SPARK_LIFETIME: f32 = 0.3;

/// Particles integrate this much faster than bubbles.
pub const PARTICLE_SPEED_MULTIPLIER: f32 = 2.0;

/// Outward speed range (units/s).
pub const PARTICLE_SPEED_MIN: f32 = 1.5;
pub const PARTICLE_SPEED_MAX: f32 = 4.0;

/// Added to every particle's y velocity at emission.
pub const PARTICLE_UPWARD_BIAS: f32 = 0.5;

/// Random angular jitter (radians) on top of the even angular spacing.
pub const PARTICLE_ANGLE_SPREAD: f32 = 0.3;

/// Particle radius range.
pub const PARTICLE_SIZE_MIN: f32 = 0.04;
pub const PARTICLE_SIZE_MAX: f32 = 0.12;

/// Extra reach added to a bubble's radius when testing particle contact.
pub const PARTICLE_CONTACT_EPSILON: f32 = 0.1;

/// Converts particle speed × size × `particle_force` into bubble velocity.
pub const PARTICLE_IMPULSE_SCALE: f32 = 0.5;

/// Velocity retained by a particle bouncing off a play-area edge.
///
/// Deliberately independent of `bounce_energy`.
pub const PARTICLE_WALL_RETENTION: f32 = 0.8;

// ── Lasers ───────────────────────────────────────────────────────────────────

/// Laser speed (units/s); not scaled by `bubble_speed`.
pub const LASER_SPEED: f32 = 18.0;

/// Seconds before an unspent laser is removed.
pub const LASER_MAX_AGE: f32 = 2.0;

/// Extra reach added to a bubble's radius for laser hits.
pub const LASER_HIT_MARGIN: f32 = 0.2;

/// Minimum seconds between two shots.
pub const LASER_COOLDOWN: f32 = 0.25;

// ── Host ─────────────────────────────────────────────────────────────────────

/// Settings file path, relative to the working directory.
pub const SETTINGS_PATH: &str = "assets/bubbles.toml";

/// How often the settings file is checked for changes (s).
pub const SETTINGS_POLL_SECS: f32 = 1.0;
