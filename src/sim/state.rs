//! Game state and core simulation types
//!
//! Everything the main loop mutates lives on [`GameState`]. The state owns
//! every entity; nothing outlives the run that spawned it.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collectable::{self, Collectable};
use super::entity::Stage;
use super::obstacle::{self, Obstacle};
use super::particle::Particle;
use super::player::{Player, PlayerParams};
use super::score_text::ScoreText;
use super::tick::random_spawn_position;
use crate::consts::*;

/// Bounds every main-stage entity is confined to
pub const GAME_STAGE: Stage = Stage::new(
    BORDER_WIDTH,
    STAGE_WIDTH + BORDER_WIDTH,
    BORDER_WIDTH,
    STAGE_HEIGHT + BORDER_WIDTH,
);

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No run has been started yet
    NotStarted,
    /// Active gameplay
    Running,
    /// The player hit an obstacle without a powerup
    Ended,
}

/// Notifications for the UI, emitted synchronously during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    ScoreChanged {
        score: u32,
    },
    /// Charge meter level, with a suggested CSS transition duration
    PowerChanged {
        percent: f32,
        transition_ms: u32,
    },
    GameEnded {
        score: u32,
        time_ms: u64,
        collected: u32,
    },
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub score: u32,
    /// Combo tier, 0..=MAX_COLLECT_CHAIN
    pub score_multiplier: u32,
    pub collectables_collected: u32,
    /// Simulated seconds since the run started
    pub elapsed: f64,
    /// Set when the run ends
    pub time_taken_ms: Option<u64>,
    pub player: Player,
    pub collectable: Collectable,
    /// Sorted by id
    pub obstacles: Vec<Obstacle>,
    /// Sorted by id
    pub particles: Vec<Particle>,
    pub score_text: Option<ScoreText>,
    /// Pending notifications, drained by the caller
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Fresh run: player centred, one obstacle and one collectable placed
    /// away from the player
    pub fn new(seed: u64, params: &PlayerParams) -> Self {
        let player = Player::new(
            1,
            Vec2::new(STAGE_WIDTH / 2.0, STAGE_HEIGHT / 2.0),
            params,
        );
        let mut rng = Pcg32::seed_from_u64(seed);

        let obstacle_pos =
            random_spawn_position(&mut rng, &GAME_STAGE, player.body.pos, obstacle::RADIUS);
        let obstacle = Obstacle::new(2, obstacle_pos, &mut rng);

        let collectable_pos =
            random_spawn_position(&mut rng, &GAME_STAGE, player.body.pos, collectable::RADIUS);
        let collectable = Collectable::new(3, collectable_pos);

        Self {
            seed,
            rng,
            phase: GamePhase::Running,
            score: 0,
            score_multiplier: 0,
            collectables_collected: 0,
            elapsed: 0.0,
            time_taken_ms: None,
            player,
            collectable,
            obstacles: vec![obstacle],
            particles: Vec::new(),
            score_text: None,
            events: Vec::new(),
            next_id: 4,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn has_ended(&self) -> bool {
        self.phase == GamePhase::Ended
    }

    /// Current position of a live entity
    pub fn position_of(&self, id: u32) -> Option<Vec2> {
        if self.player.body.id == id {
            return Some(self.player.body.pos);
        }
        if self.collectable.body.id == id {
            return Some(self.collectable.body.pos);
        }
        self.obstacles
            .iter()
            .map(|o| &o.body)
            .chain(self.particles.iter().map(|p| &p.body))
            .find(|b| b.id == id)
            .map(|b| b.pos)
    }

    /// Take all pending notifications in emission order
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
