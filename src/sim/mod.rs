//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Delta time supplied by the caller
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collectable;
pub mod colour;
pub mod entity;
pub mod lerp;
pub mod obstacle;
pub mod particle;
pub mod player;
pub mod preview;
pub mod score_text;
pub mod state;
pub mod tick;

pub use collectable::Collectable;
pub use colour::Colour;
pub use entity::{Body, Stage, TrailPoint};
pub use lerp::{Easing, lerp};
pub use obstacle::Obstacle;
pub use particle::Particle;
pub use player::{Player, PlayerParams};
pub use preview::{PREVIEW_STAGE, PreviewSlot, PreviewState, preview_tick};
pub use score_text::ScoreText;
pub use state::{GAME_STAGE, GameEvent, GamePhase, GameState};
pub use tick::{TickInput, clear_reward, collect_reward, random_spawn_position, tick};
