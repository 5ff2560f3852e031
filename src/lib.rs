//! Dots - a dodge-and-collect arcade game
//!
//! Core modules:
//! - `sim`: Simulation (entities, collisions, scoring, spawn placement)
//! - `renderer`: Draw-primitive surface and frame drawing
//! - `platform`: Frame scheduling and input mapping
//! - `game`: Orchestrator tying the main and preview loops together
//! - `settings`: Persisted player preferences
//! - `leaderboard`: Score service contract and browser client

pub mod game;
pub mod leaderboard;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Main stage border thickness
    pub const BORDER_WIDTH: f32 = 4.0;
    /// Main stage reference size (logical units, border included)
    pub const GAME_REF_WIDTH: f32 = 1920.0 + BORDER_WIDTH * 2.0;
    pub const GAME_REF_HEIGHT: f32 = 903.0 + BORDER_WIDTH * 2.0;
    /// Playable area inside the border
    pub const STAGE_WIDTH: f32 = GAME_REF_WIDTH - BORDER_WIDTH * 2.0;
    pub const STAGE_HEIGHT: f32 = GAME_REF_HEIGHT - BORDER_WIDTH * 2.0;

    /// Preview stage border thickness
    pub const PREVIEW_BORDER_WIDTH: f32 = 1.0;
    pub const PREVIEW_REF_WIDTH: f32 = 1020.0 + PREVIEW_BORDER_WIDTH * 2.0;
    pub const PREVIEW_REF_HEIGHT: f32 = 508.0 + PREVIEW_BORDER_WIDTH * 2.0;
    /// The preview stage is inset by the main border width, not its own
    pub const PREVIEW_STAGE_WIDTH: f32 = PREVIEW_REF_WIDTH - BORDER_WIDTH * 2.0;
    pub const PREVIEW_STAGE_HEIGHT: f32 = PREVIEW_REF_HEIGHT - BORDER_WIDTH * 2.0;
    /// Seconds before a touched preview collectable reappears
    pub const PREVIEW_COLLECTABLE_RESPAWN_TIME: f32 = 1.5;
    /// Number of collectables laid out in the preview ring
    pub const PREVIEW_COLLECTABLE_COUNT: usize = 5;

    /// Minimum distance between a fresh spawn and the player
    pub const MIN_SPAWN_DIST_FROM_PLAYER: f32 = 200.0;

    /// Scoring
    pub const BASE_COLLECT_SCORE: u32 = 5;
    pub const MAX_COLLECT_CHAIN: u32 = 5;
    pub const MAX_COLLECT_SCORE: u32 = BASE_COLLECT_SCORE * (1 << MAX_COLLECT_CHAIN);
    /// Seconds a score label stays on screen; doubles as the combo window
    pub const TIME_TO_CHAIN: f32 = 1.85;

    /// Particles spawned per burst
    pub const PARTICLES_PER_BURST: usize = 5;

    /// Power meter CSS transition hints (ms)
    pub const POWER_TRANSITION_GAIN_MS: u32 = 750;
    pub const POWER_TRANSITION_DRAIN_MS: u32 = 100;
}

/// Clamp each axis independently. Omitted Y bounds reuse the X bounds.
#[inline]
pub fn clamp_axes(v: Vec2, min_x: f32, max_x: f32, min_y: Option<f32>, max_y: Option<f32>) -> Vec2 {
    let min_y = min_y.unwrap_or(min_x);
    let max_y = max_y.unwrap_or(max_x);
    Vec2::new(v.x.max(min_x).min(max_x), v.y.max(min_y).min(max_y))
}

/// Unit vector in the direction of `v`; the zero vector stays zero.
#[inline]
pub fn normalise_guarded(v: Vec2) -> Vec2 {
    v.normalize_or_zero()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_axes_reuses_x_bounds() {
        let v = clamp_axes(Vec2::new(-9.0, 12.0), -5.0, 5.0, None, None);
        assert_eq!(v, Vec2::new(-5.0, 5.0));

        let v = clamp_axes(Vec2::new(50.0, -50.0), 0.0, 10.0, Some(-20.0), Some(20.0));
        assert_eq!(v, Vec2::new(10.0, -20.0));
    }

    #[test]
    fn test_normalise_guarded_zero() {
        assert_eq!(normalise_guarded(Vec2::ZERO), Vec2::ZERO);
        let n = normalise_guarded(Vec2::new(1.0, 1.0));
        assert!((n.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_stage_dimensions() {
        use consts::*;
        assert_eq!(GAME_REF_WIDTH, 1928.0);
        assert_eq!(GAME_REF_HEIGHT, 911.0);
        assert_eq!(STAGE_WIDTH, 1920.0);
        assert_eq!(STAGE_HEIGHT, 903.0);
        assert_eq!(MAX_COLLECT_SCORE, 160);
    }
}
