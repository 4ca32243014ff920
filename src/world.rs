//! The bubble registry and the per-frame step.
//!
//! [`BubbleWorld`] owns every live bubble, particle, and laser.  The host calls
//! [`BubbleWorld::step`] once per frame with the frame delta and the current
//! settings snapshot; everything that happened is returned as an ordered list
//! of [`SimEvent`]s.  The only other mutating entry points are
//! [`BubbleWorld::pop_bubble`], [`BubbleWorld::spawn_laser`], and
//! [`BubbleWorld::clear`].
//!
//! ## Tick order
//!
//! | # | Phase                                   | Module          |
//! |---|-----------------------------------------|-----------------|
//! | 1 | integrate + wall response, per bubble   | `bubble`, `bounds` |
//! | 2 | pairwise collision, remove popped pairs | `collision`     |
//! | 3 | laser advance + hits                    | `laser`         |
//! | 4 | particle advance + contacts             | `particles`     |
//! | 5 | remove laser / chain pops, emit bursts  | `particles`     |
//! | 6 | spawner                                 | `spawner`       |
//! | 7 | ceiling reports for survivors           | —               |
//!
//! Bursts created during a tick are emitted at its end, so new particles
//! start moving on the following tick.  Chain reactions therefore propagate
//! one link per tick.

use bevy::prelude::*;
use rand::Rng;

use crate::bounds::{resolve_walls, PlayBounds};
use crate::bubble::{Bubble, BubbleId, BubbleKind, BubbleSpec};
use crate::collision::{rebuild_grid, resolve_collisions};
use crate::config::BubbleSettings;
use crate::error::{SimError, SimResult};
use crate::events::{PopCause, SimEvent};
use crate::laser::{advance_lasers, Laser, LaserOutcome};
use crate::particles::{advance_particles, emit_burst, BurstKind, Particle};
use crate::spatial_partition::SpatialGrid;
use crate::spawner::{random_bubble, SpawnTimer};

/// Running totals for the stats overlay and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimStats {
    pub spawned: u32,
    pub popped_by_input: u32,
    pub popped_by_laser: u32,
    pub popped_by_collision: u32,
    pub popped_by_chain: u32,
    pub lasers_fired: u32,
    pub bursts: u32,
}

impl SimStats {
    fn record_pop(&mut self, cause: PopCause) {
        match cause {
            PopCause::Input => self.popped_by_input += 1,
            PopCause::Laser => self.popped_by_laser += 1,
            PopCause::Collision => self.popped_by_collision += 1,
            PopCause::ChainReaction => self.popped_by_chain += 1,
        }
    }

    #[inline]
    pub fn total_popped(&self) -> u32 {
        self.popped_by_input + self.popped_by_laser + self.popped_by_collision + self.popped_by_chain
    }
}

/// A burst queued during a tick, emitted at its end.
#[derive(Debug, Clone, Copy)]
struct PendingBurst {
    origin: Vec2,
    kind: BurstKind,
    hue: f32,
}

#[derive(Resource, Debug, Clone)]
pub struct BubbleWorld {
    bubbles: Vec<Bubble>,
    particles: Vec<Particle>,
    lasers: Vec<Laser>,
    bounds: PlayBounds,
    spawner: SpawnTimer,
    grid: SpatialGrid,
    /// Simulation time (s) since the last [`Self::clear`].
    clock: f32,
    next_bubble_id: u64,
    next_laser_id: u64,
    stats: SimStats,
}

impl Default for BubbleWorld {
    fn default() -> Self {
        Self::new(PlayBounds::default())
    }
}

/// Remove every element whose flag is set.
fn retain_unflagged<T>(items: &mut Vec<T>, flags: &[bool]) {
    let mut i = 0;
    items.retain(|_| {
        let keep = !flags[i];
        i += 1;
        keep
    });
}

impl BubbleWorld {
    pub fn new(bounds: PlayBounds) -> Self {
        Self {
            bubbles: Vec::new(),
            particles: Vec::new(),
            lasers: Vec::new(),
            bounds,
            spawner: SpawnTimer::default(),
            grid: SpatialGrid::default(),
            clock: 0.0,
            next_bubble_id: 1,
            next_laser_id: 1,
            stats: SimStats::default(),
        }
    }

    // ── Read access ──────────────────────────────────────────────────────────

    #[inline]
    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn lasers(&self) -> &[Laser] {
        &self.lasers
    }

    #[inline]
    pub fn bounds(&self) -> PlayBounds {
        self.bounds
    }

    #[inline]
    pub fn stats(&self) -> SimStats {
        self.stats
    }

    #[inline]
    pub fn clock(&self) -> f32 {
        self.clock
    }

    pub fn get(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.id == id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }

    /// Topmost bubble under `point`: the one whose centre is nearest among
    /// those containing it.
    pub fn pick_bubble(&self, point: Vec2) -> Option<BubbleId> {
        self.bubbles
            .iter()
            .map(|b| (b.id, b.position_2d().distance(point), b.size))
            .filter(|&(_, d, size)| d <= size)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _, _)| id)
    }

    // ── Mutation ─────────────────────────────────────────────────────────────

    /// Replace the play bounds (e.g. after a window resize).  Bodies outside
    /// the new bounds are pulled back in by the next step.
    pub fn set_bounds(&mut self, bounds: PlayBounds) {
        self.bounds = bounds;
    }

    /// Place a bubble directly.  Returns `None` when the population is at the cap.
    pub fn insert_bubble(&mut self, spec: BubbleSpec, settings: &BubbleSettings) -> Option<BubbleId> {
        if self.bubbles.len() >= settings.max_bubbles {
            return None;
        }
        let id = BubbleId(self.next_bubble_id);
        self.next_bubble_id += 1;
        self.bubbles.push(Bubble::from_spec(id, spec));
        self.stats.spawned += 1;
        Some(id)
    }

    /// Pop a bubble on external request (pointer / tap).
    ///
    /// Popping an unknown or already-popped id returns
    /// [`SimError::UnknownBubble`] and changes nothing.
    pub fn pop_bubble(&mut self, id: BubbleId, rng: &mut impl Rng) -> SimResult<Vec<SimEvent>> {
        let index = self
            .bubbles
            .iter()
            .position(|b| b.id == id)
            .ok_or(SimError::UnknownBubble(id))?;
        let bubble = self.bubbles.remove(index);

        let mut events = Vec::with_capacity(2);
        record_pop(&mut self.stats, &bubble, PopCause::Input, &mut events);
        let burst = PendingBurst {
            origin: bubble.position_2d(),
            kind: BurstKind::for_bubble(bubble.kind),
            hue: bubble.hue,
        };
        self.emit(burst, rng, &mut events);
        Ok(events)
    }

    /// Fire a laser from `origin` along `direction`.
    pub fn spawn_laser(&mut self, origin: Vec2, direction: Vec2) -> SimResult<SimEvent> {
        let laser = Laser::new(self.next_laser_id, origin, direction, self.clock)?;
        self.next_laser_id += 1;
        self.stats.lasers_fired += 1;
        let event = SimEvent::LaserFired {
            laser: laser.id,
            origin,
            direction: laser.direction,
        };
        self.lasers.push(laser);
        Ok(event)
    }

    /// Tear the simulation down: drop every body, particle, and laser and
    /// restart the spawn timer.  Ids keep counting up so they stay unique.
    pub fn clear(&mut self) {
        self.bubbles.clear();
        self.particles.clear();
        self.lasers.clear();
        self.spawner.reset();
        self.grid.clear();
        self.clock = 0.0;
        self.stats = SimStats::default();
    }

    /// Advance the simulation by `delta` seconds.
    pub fn step(
        &mut self,
        delta: f32,
        settings: &BubbleSettings,
        rng: &mut impl Rng,
    ) -> Vec<SimEvent> {
        let delta = delta.max(0.0);
        self.clock += delta;
        let mut events = Vec::new();
        let mut bursts: Vec<PendingBurst> = Vec::new();

        // 1. Integrate and bounce off walls.
        let mut at_ceiling: Vec<BubbleId> = Vec::new();
        for bubble in self.bubbles.iter_mut() {
            bubble.integrate(delta, settings);
            if resolve_walls(bubble, &self.bounds, settings, rng).ceiling {
                at_ceiling.push(bubble.id);
            }
        }

        // 2. Pairwise collisions.
        let mut popped = vec![false; self.bubbles.len()];
        let pairs = resolve_collisions(&mut self.bubbles, &mut self.grid, settings, &mut popped);
        for (i, j) in pairs {
            let (a, b) = (&self.bubbles[i], &self.bubbles[j]);
            bursts.push(collision_burst(a, b));
            record_pop(&mut self.stats, a, PopCause::Collision, &mut events);
            record_pop(&mut self.stats, b, PopCause::Collision, &mut events);
        }
        retain_unflagged(&mut self.bubbles, &popped);
        for bubble in self.bubbles.iter_mut() {
            self.bounds.confine(bubble);
        }

        // 3. Lasers.  The grid is rebuilt for the surviving bubbles and shared
        //    with the particle phase; nothing is removed until both are done.
        rebuild_grid(&mut self.grid, &self.bubbles);
        let mut popped = vec![false; self.bubbles.len()];
        let outcomes = advance_lasers(
            &mut self.lasers,
            &self.bubbles,
            &mut popped,
            &self.grid,
            &self.bounds,
            delta,
        );
        for outcome in outcomes {
            match outcome {
                LaserOutcome::Hit { index, point, .. } => {
                    let bubble = &self.bubbles[index];
                    bursts.push(PendingBurst {
                        origin: point,
                        kind: BurstKind::LaserSpark,
                        hue: bubble.hue,
                    });
                    record_pop(&mut self.stats, bubble, PopCause::Laser, &mut events);
                }
                LaserOutcome::Expired { laser } => events.push(SimEvent::LaserExpired { laser }),
            }
        }

        // 4. Particles; explosive ones chain-pop what they touch.
        let chain = advance_particles(
            &mut self.particles,
            &mut self.bubbles,
            &mut popped,
            &self.grid,
            &self.bounds,
            settings,
            delta,
        );
        for index in chain {
            let bubble = &self.bubbles[index];
            bursts.push(PendingBurst {
                origin: bubble.position_2d(),
                kind: BurstKind::for_bubble(bubble.kind),
                hue: bubble.hue,
            });
            record_pop(&mut self.stats, bubble, PopCause::ChainReaction, &mut events);
        }

        // 5. Remove laser / chain pops and emit this tick's bursts.
        retain_unflagged(&mut self.bubbles, &popped);
        for burst in bursts {
            self.emit(burst, rng, &mut events);
        }

        // 6. Spawner.
        if self.spawner.tick(delta, settings.spawn_interval_secs()) {
            let spec = random_bubble(&self.bounds, settings, rng);
            if let Some(id) = self.insert_bubble(spec, settings) {
                events.push(SimEvent::Spawned {
                    id,
                    kind: spec.kind,
                    position: spec.position,
                });
            }
        }

        // 7. Ceiling reports for bubbles that are still alive.
        for id in at_ceiling {
            if let Some(bubble) = self.get(id) {
                events.push(SimEvent::CeilingContact {
                    id,
                    position: bubble.position_2d(),
                });
            }
        }

        events
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn emit(&mut self, burst: PendingBurst, rng: &mut impl Rng, events: &mut Vec<SimEvent>) {
        let count = emit_burst(&mut self.particles, burst.origin, burst.kind, burst.hue, rng);
        self.stats.bursts += 1;
        events.push(SimEvent::BurstEmitted {
            position: burst.origin,
            count,
            kind: burst.kind,
        });
    }
}

fn record_pop(stats: &mut SimStats, bubble: &Bubble, cause: PopCause, events: &mut Vec<SimEvent>) {
    stats.record_pop(cause);
    events.push(SimEvent::Popped {
        id: bubble.id,
        kind: bubble.kind,
        cause,
        points: bubble.kind.points(),
        position: bubble.position_2d(),
    });
}

/// The single burst for a colliding pair: at the grenade if there is one,
/// otherwise a regular burst at the midpoint.
fn collision_burst(a: &Bubble, b: &Bubble) -> PendingBurst {
    let grenade = [a, b].into_iter().find(|x| x.kind == BubbleKind::Grenade);
    match grenade {
        Some(g) => PendingBurst {
            origin: g.position_2d(),
            kind: BurstKind::Grenade,
            hue: g.hue,
        },
        None => PendingBurst {
            origin: (a.position_2d() + b.position_2d()) * 0.5,
            kind: BurstKind::Pop,
            hue: a.hue,
        },
    }
}
