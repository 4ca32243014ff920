//! Round state and scoring — `GameState`, `ScoreBoard`, and `GameStatePlugin`.
//!
//! ## States
//!
//! | State       | Description                                         |
//! |-------------|-----------------------------------------------------|
//! | `Playing`   | Initial state; simulation and input active          |
//! | `GameOver`  | A bubble reached the ceiling; `R` starts a new round |
//!
//! ## Systems (registered by `GameStatePlugin`)
//!
//! | System                  | Schedule                 | Purpose                          |
//! |-------------------------|--------------------------|----------------------------------|
//! | `reset_scoreboard`      | `OnEnter(Playing)`       | Zero the score for a new round   |
//! | `score_system`          | `Update`                 | Accumulate `Popped` points       |
//! | `ceiling_game_over_system` | `Update / in Playing` | End the round on ceiling contact |
//! | `restart_system`        | `Update / in GameOver`   | `R` → back to `Playing`          |

use bevy::prelude::*;

use crate::config::BubbleSettings;
use crate::events::{PopCause, SimEvent};

// ── Game state ────────────────────────────────────────────────────────────────

/// Top-level round state machine.
///
/// Every simulation system in [`crate::simulation::SimulationPlugin`] runs
/// under `.run_if(in_state(GameState::Playing))`; leaving `Playing` tears the
/// world down.
#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    #[default]
    Playing,
    GameOver,
}

// ── Score ─────────────────────────────────────────────────────────────────────

/// Points and pop counts for the current round.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    pub points: u32,
    pub by_input: u32,
    pub by_laser: u32,
    pub by_collision: u32,
    pub by_chain: u32,
}

impl ScoreBoard {
    /// Credit one pop.
    pub fn record(&mut self, cause: PopCause, points: u32) {
        self.points += points;
        match cause {
            PopCause::Input => self.by_input += 1,
            PopCause::Laser => self.by_laser += 1,
            PopCause::Collision => self.by_collision += 1,
            PopCause::ChainReaction => self.by_chain += 1,
        }
    }

    #[inline]
    pub fn total_pops(&self) -> u32 {
        self.by_input + self.by_laser + self.by_collision + self.by_chain
    }
}

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Registers `GameState`, the score board, and the round-flow systems.
///
/// Must be added before any plugin that calls
/// `.run_if(in_state(GameState::Playing))`.
pub struct GameStatePlugin;

impl Plugin for GameStatePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .init_resource::<ScoreBoard>()
            .add_message::<SimEvent>()
            .add_systems(OnEnter(GameState::Playing), reset_scoreboard)
            .add_systems(
                Update,
                (
                    score_system,
                    ceiling_game_over_system.run_if(in_state(GameState::Playing)),
                    restart_system.run_if(in_state(GameState::GameOver)),
                ),
            );
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

pub fn reset_scoreboard(mut score: ResMut<ScoreBoard>) {
    *score = ScoreBoard::default();
}

/// Add every `Popped` message to the score board.
pub fn score_system(mut events: MessageReader<SimEvent>, mut score: ResMut<ScoreBoard>) {
    for event in events.read() {
        if let SimEvent::Popped { cause, points, .. } = event {
            score.record(*cause, *points);
        }
    }
}

/// End the round when a bubble touches the ceiling, if the settings say so.
pub fn ceiling_game_over_system(
    mut events: MessageReader<SimEvent>,
    settings: Res<BubbleSettings>,
    score: Res<ScoreBoard>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let contact = events
        .read()
        .filter_map(|e| match e {
            SimEvent::CeilingContact { id, .. } => Some(*id),
            _ => None,
        })
        .last();
    let Some(id) = contact else {
        return;
    };
    if !settings.ceiling_ends_game {
        return;
    }
    info!(
        "[state] Bubble {id} reached the ceiling; game over with {} points",
        score.points
    );
    next_state.set(GameState::GameOver);
}

/// `R` starts a new round.
pub fn restart_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if keys.just_pressed(KeyCode::KeyR) {
        info!("[state] Restarting");
        next_state.set(GameState::Playing);
    }
}
