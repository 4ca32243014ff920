//! Scenario tests for [`BubbleWorld`] driven directly, without a Bevy app.
//!
//! Every test seeds its own `StdRng`, so runs are reproducible.
//!
//! Covered scenarios:
//! 1. Head-on impact above the threshold pops both bubbles with one midpoint burst.
//! 2. A grenade in a high-speed impact bursts once, at the grenade.
//! 3. Grenade particles chain-pop a neighbour on later ticks.
//! 4. Gentle contacts bounce without popping and keep both bubbles.
//! 5. The population never exceeds `max_bubbles`.
//! 6. Every bubble stays inside the play area under heavy traffic.
//! 7. Popping the same bubble twice scores once.
//! 8. Particles fade out and are gone after their lifetime.
//! 9. A bubble flying into the ceiling is clamped and reflected within one step.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use bubble_pop::bounds::PlayBounds;
use bubble_pop::bubble::{BubbleKind, BubbleSpec};
use bubble_pop::config::BubbleSettings;
use bubble_pop::error::SimError;
use bubble_pop::events::{PopCause, SimEvent};
use bubble_pop::particles::BurstKind;
use bubble_pop::world::BubbleWorld;

const DT: f32 = 0.016;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// No gravity and a spawner that never fires within a test.
fn still_settings() -> BubbleSettings {
    BubbleSettings {
        gravity: 0.0,
        spawn_rate: 60_000.0,
        explosion_power: 1.0,
        ..Default::default()
    }
}

fn run(world: &mut BubbleWorld, settings: &BubbleSettings, rng: &mut StdRng, ticks: usize) -> Vec<SimEvent> {
    (0..ticks).flat_map(|_| world.step(DT, settings, rng)).collect()
}

fn bursts(events: &[SimEvent]) -> Vec<(Vec2, usize, BurstKind)> {
    events
        .iter()
        .filter_map(|e| match e {
            SimEvent::BurstEmitted { position, count, kind } => Some((*position, *count, *kind)),
            _ => None,
        })
        .collect()
}

fn pops(events: &[SimEvent]) -> Vec<&SimEvent> {
    events
        .iter()
        .filter(|e| matches!(e, SimEvent::Popped { .. }))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn head_on_impact_pops_both_with_one_midpoint_burst() {
    let settings = still_settings();
    let mut rng = StdRng::seed_from_u64(1);
    let mut world = BubbleWorld::default();
    let a = world
        .insert_bubble(BubbleSpec::regular(Vec2::new(-1.0, 0.0), Vec2::new(2.0, 0.0), 0.6), &settings)
        .unwrap();
    let b = world
        .insert_bubble(BubbleSpec::regular(Vec2::new(1.0, 0.0), Vec2::new(-2.0, 0.0), 0.6), &settings)
        .unwrap();

    let events = run(&mut world, &settings, &mut rng, 30);

    assert!(world.get(a).is_none() && world.get(b).is_none(), "both must be removed");
    let popped = pops(&events);
    assert_eq!(popped.len(), 2);
    assert!(popped
        .iter()
        .all(|e| matches!(e, SimEvent::Popped { cause: PopCause::Collision, .. })));

    let bursts = bursts(&events);
    assert_eq!(bursts.len(), 1, "exactly one burst per colliding pair");
    let (position, count, kind) = bursts[0];
    assert_eq!(count, 30);
    assert_eq!(kind, BurstKind::Pop);
    assert!(position.length() < 1e-4, "burst must be at the midpoint, got {position}");
}

#[test]
fn grenade_impact_bursts_once_at_the_grenade() {
    let settings = still_settings();
    let mut rng = StdRng::seed_from_u64(2);
    let mut world = BubbleWorld::default();
    world.insert_bubble(BubbleSpec::grenade(Vec2::new(-1.0, 0.5), Vec2::new(3.0, 0.0), 0.6), &settings);
    world.insert_bubble(BubbleSpec::regular(Vec2::new(1.0, 0.5), Vec2::new(-2.0, 0.0), 0.6), &settings);

    // Stop right after the pop so no particle has moved yet.
    let mut events = Vec::new();
    for _ in 0..60 {
        events.extend(world.step(DT, &settings, &mut rng));
        if !world.particles().is_empty() {
            break;
        }
    }

    assert!(world.is_empty());
    let grenade_at = events
        .iter()
        .find_map(|e| match e {
            SimEvent::Popped {
                kind: BubbleKind::Grenade,
                position,
                ..
            } => Some(*position),
            _ => None,
        })
        .expect("grenade must pop");

    let bursts = bursts(&events);
    assert_eq!(bursts.len(), 1);
    assert_eq!(bursts[0].1, 50);
    assert_eq!(bursts[0].2, BurstKind::Grenade);
    assert_eq!(bursts[0].0, grenade_at);
    assert_eq!(world.particles().len(), 50);
    assert!(world.particles().iter().all(|p| p.explosive));
}

#[test]
fn grenade_particles_chain_pop_neighbours() {
    let settings = still_settings();
    let mut rng = StdRng::seed_from_u64(3);
    let mut world = BubbleWorld::default();
    let grenade = world
        .insert_bubble(BubbleSpec::grenade(Vec2::ZERO, Vec2::ZERO, 0.5), &settings)
        .unwrap();
    let neighbour = world
        .insert_bubble(BubbleSpec::regular(Vec2::new(1.2, 0.0), Vec2::ZERO, 0.5), &settings)
        .unwrap();

    let first = world.pop_bubble(grenade, &mut rng).unwrap();
    assert_eq!(first.iter().map(SimEvent::points).sum::<u32>(), 5);

    let events = run(&mut world, &settings, &mut rng, 30);
    assert!(world.get(neighbour).is_none(), "neighbour must be chain-popped");
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::Popped { id, cause: PopCause::ChainReaction, points: 1, .. } if *id == neighbour
    )));
    // The chained regular bubble bursts as a plain pop.
    assert!(bursts(&events).iter().any(|&(_, count, kind)| count == 30 && kind == BurstKind::Pop));
    assert_eq!(world.stats().popped_by_chain, 1);
}

#[test]
fn gentle_contact_bounces_without_popping() {
    let settings = still_settings();
    let mut rng = StdRng::seed_from_u64(4);
    let mut world = BubbleWorld::default();
    let a = world
        .insert_bubble(BubbleSpec::regular(Vec2::new(-1.0, 0.0), Vec2::new(0.5, 0.0), 0.5), &settings)
        .unwrap();
    let b = world
        .insert_bubble(BubbleSpec::regular(Vec2::new(1.0, 0.0), Vec2::new(-0.5, 0.0), 0.5), &settings)
        .unwrap();

    let events = run(&mut world, &settings, &mut rng, 120);
    assert!(pops(&events).is_empty());
    let (a, b) = (world.get(a).unwrap(), world.get(b).unwrap());
    assert!(a.velocity.x < 0.0 && b.velocity.x > 0.0, "pair must be moving apart");
    assert!((a.velocity.x + b.velocity.x).abs() < 1e-4, "bounce is symmetric");
}

#[test]
fn population_never_exceeds_cap() {
    let settings = BubbleSettings {
        spawn_rate: 16.0,
        max_bubbles: 6,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(5);
    let mut world = BubbleWorld::default();
    let mut peak = 0;
    for _ in 0..1_500 {
        world.step(0.02, &settings, &mut rng);
        assert!(world.len() <= settings.max_bubbles);
        peak = peak.max(world.len());
    }
    assert_eq!(peak, settings.max_bubbles, "spawner should fill up to the cap");
}

#[test]
fn bubbles_stay_inside_the_play_area() {
    let settings = BubbleSettings {
        spawn_rate: 16.0,
        max_bubbles: 30,
        bubble_speed: 3.0,
        gravity: 1.0,
        ..Default::default()
    };
    let bounds = PlayBounds::new(6.0, 4.0);
    let mut rng = StdRng::seed_from_u64(6);
    let mut world = BubbleWorld::new(bounds);
    for i in 0..10 {
        let x = -4.0 + i as f32 * 0.9;
        world.insert_bubble(BubbleSpec::regular(Vec2::new(x, 0.0), Vec2::new(2.5, 2.0), 0.4), &settings);
    }

    for _ in 0..2_000 {
        world.step(DT, &settings, &mut rng);
        for bubble in world.bubbles() {
            let limit = bounds.inset(bubble.size);
            assert!(bubble.position.x.abs() <= limit.x + 1e-4, "{bubble:?} escaped sideways");
            assert!(bubble.position.y.abs() <= limit.y + 1e-4, "{bubble:?} escaped vertically");
        }
    }
}

#[test]
fn double_pop_scores_once() {
    let settings = still_settings();
    let mut rng = StdRng::seed_from_u64(7);
    let mut world = BubbleWorld::default();
    let id = world
        .insert_bubble(BubbleSpec::regular(Vec2::ZERO, Vec2::ZERO, 0.5), &settings)
        .unwrap();

    let mut score = 0;
    for _ in 0..3 {
        match world.pop_bubble(id, &mut rng) {
            Ok(events) => score += events.iter().map(SimEvent::points).sum::<u32>(),
            Err(e) => assert!(matches!(e, SimError::UnknownBubble(x) if x == id)),
        }
    }
    assert_eq!(score, 1);
    assert_eq!(world.stats().total_popped(), 1);
}

#[test]
fn particles_fade_and_expire() {
    let settings = still_settings();
    let mut rng = StdRng::seed_from_u64(8);
    let mut world = BubbleWorld::default();
    let id = world
        .insert_bubble(BubbleSpec::regular(Vec2::ZERO, Vec2::ZERO, 0.5), &settings)
        .unwrap();
    world.pop_bubble(id, &mut rng).unwrap();
    assert_eq!(world.particles().len(), 30);

    let mut last = 1.0;
    for _ in 0..10 {
        world.step(0.05, &settings, &mut rng);
        let opacity = world.particles()[0].opacity();
        assert!(opacity < last);
        last = opacity;
    }
    run(&mut world, &settings, &mut rng, 40);
    assert!(world.particles().is_empty(), "all particles must be gone after 1 s");
}

#[test]
fn laser_with_no_direction_is_rejected() {
    let mut world = BubbleWorld::default();
    assert!(matches!(
        world.spawn_laser(Vec2::ZERO, Vec2::ZERO),
        Err(SimError::DegenerateDirection)
    ));
    assert!(world.lasers().is_empty());
    assert_eq!(world.stats().lasers_fired, 0);
}

#[test]
fn ceiling_hit_through_step_clamps_and_reflects() {
    let settings = BubbleSettings {
        bubble_speed: 1.0,
        bounce_energy: 0.8,
        ..still_settings()
    };
    // Effective ceiling at 10.0 for a radius-0.5 bubble.
    let mut world = BubbleWorld::new(PlayBounds::new(20.5, 10.5));
    let mut rng = StdRng::seed_from_u64(9);
    let id = world
        .insert_bubble(BubbleSpec::regular(Vec2::new(0.0, 9.9), Vec2::new(0.0, 5.0), 0.5), &settings)
        .unwrap();

    let events = world.step(0.1, &settings, &mut rng);

    let bubble = world.get(id).unwrap();
    assert!((bubble.position.y - 10.0).abs() < 1e-5, "y = {}", bubble.position.y);
    assert!((bubble.velocity.y + 5.0 * settings.bounce_energy).abs() < 1e-5);
    assert!(events
        .iter()
        .any(|e| matches!(e, SimEvent::CeilingContact { id: hit, .. } if *hit == id)));
}
