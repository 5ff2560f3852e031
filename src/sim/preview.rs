//! Preview stage: a sandbox for auditioning player parameters.
//!
//! A row of collectables that reappear shortly after being touched, plus
//! particles. No obstacles, no score and no way to lose.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collectable::Collectable;
use super::entity::Stage;
use super::particle::Particle;
use super::player::{Player, PlayerParams};
use super::tick::TickInput;
use crate::consts::*;

/// Extra room on the far edges of the preview stage
const PREVIEW_STAGE_SLACK: f32 = 5.0;

/// Bounds for preview entities
pub const PREVIEW_STAGE: Stage = Stage::new(
    PREVIEW_BORDER_WIDTH,
    PREVIEW_STAGE_WIDTH + PREVIEW_STAGE_SLACK,
    PREVIEW_BORDER_WIDTH,
    PREVIEW_STAGE_HEIGHT + PREVIEW_STAGE_SLACK,
);

/// One collectable in the preview row with its respawn countdown
#[derive(Debug, Clone)]
pub struct PreviewSlot {
    pub collectable: Collectable,
    /// Seconds until the collectable reappears; zero while visible
    pub respawn_remaining: f32,
}

impl PreviewSlot {
    pub fn is_visible(&self) -> bool {
        self.respawn_remaining == 0.0
    }
}

#[derive(Debug, Clone)]
pub struct PreviewState {
    pub rng: Pcg32,
    pub player: Player,
    pub slots: Vec<PreviewSlot>,
    /// Sorted by id
    pub particles: Vec<Particle>,
    next_id: u32,
}

impl PreviewState {
    pub fn new(seed: u64, params: &PlayerParams) -> Self {
        let player = Player::new(
            1,
            Vec2::new(PREVIEW_STAGE_WIDTH / 2.0, PREVIEW_STAGE_HEIGHT / 2.0),
            params,
        );

        let spacing = PREVIEW_REF_WIDTH / PREVIEW_COLLECTABLE_COUNT as f32;
        let slots = (0..PREVIEW_COLLECTABLE_COUNT)
            .map(|i| PreviewSlot {
                collectable: Collectable::new(
                    2 + i as u32,
                    Vec2::new(
                        spacing * (i + 1) as f32 - spacing / 2.0,
                        PREVIEW_REF_HEIGHT * 0.25,
                    ),
                ),
                respawn_remaining: 0.0,
            })
            .collect();

        Self {
            rng: Pcg32::seed_from_u64(seed),
            player,
            slots,
            particles: Vec::new(),
            next_id: 2 + PREVIEW_COLLECTABLE_COUNT as u32,
        }
    }

    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Advance the preview by one frame
pub fn preview_tick(state: &mut PreviewState, input: &TickInput, dt: f32) {
    let stage = PREVIEW_STAGE;

    state
        .player
        .next_frame(dt, &stage, input.intent(), &mut state.rng);

    for index in 0..state.slots.len() {
        let slot = &mut state.slots[index];
        if !slot.is_visible() {
            slot.respawn_remaining = (slot.respawn_remaining - dt).max(0.0);
            continue;
        }

        if !state.player.body.is_colliding_with(&slot.collectable.body) {
            continue;
        }

        state.player.add_charge();
        slot.respawn_remaining = PREVIEW_COLLECTABLE_RESPAWN_TIME;

        let source = slot.collectable.body.clone();
        let speed = state.player.body.speed;
        let vel = state.player.body.vel;
        for _ in 0..PARTICLES_PER_BURST {
            let id = state.next_entity_id();
            let particle = Particle::new(id, &source, speed, vel, &mut state.rng);
            state.particles.push(particle);
        }
    }

    for particle in &mut state.particles {
        particle.next_frame(dt, &stage);
    }
    state.particles.retain(|p| !p.should_despawn());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_layout() {
        let state = PreviewState::new(1, &PlayerParams::default());
        assert_eq!(state.slots.len(), PREVIEW_COLLECTABLE_COUNT);

        let xs: Vec<f32> = state
            .slots
            .iter()
            .map(|s| s.collectable.body.pos.x)
            .collect();
        let spacing = PREVIEW_REF_WIDTH / 5.0;
        for (i, x) in xs.iter().enumerate() {
            assert!((x - (spacing * i as f32 + spacing / 2.0)).abs() < 1e-3);
        }
        assert!(state.slots.iter().all(|s| s.collectable.body.pos.y == 127.5));
        assert!(state.slots.iter().all(PreviewSlot::is_visible));
    }

    #[test]
    fn test_touch_hides_then_respawns() {
        let mut state = PreviewState::new(1, &PlayerParams::default());
        state.player.body.pos = state.slots[0].collectable.body.pos;

        preview_tick(&mut state, &TickInput::default(), 0.0);
        assert_eq!(state.player.charge_amount, 1);
        assert_eq!(state.particles.len(), PARTICLES_PER_BURST);
        assert!(!state.slots[0].is_visible());
        assert!(state.slots[1].is_visible());

        // Hidden slots cannot be collected again
        preview_tick(&mut state, &TickInput::default(), 0.5);
        assert_eq!(state.player.charge_amount, 1);

        state.player.body.pos = Vec2::new(900.0, 450.0);
        preview_tick(&mut state, &TickInput::default(), 1.0);
        assert!(state.slots[0].is_visible());
    }

    #[test]
    fn test_player_confined_to_preview_stage() {
        let mut state = PreviewState::new(1, &PlayerParams::default());
        let input = TickInput {
            right: true,
            down: true,
            ..Default::default()
        };
        for _ in 0..600 {
            preview_tick(&mut state, &input, 1.0 / 60.0);
        }
        let r = state.player.body.radius;
        assert_eq!(state.player.body.pos.x, PREVIEW_STAGE.max_x - r);
        assert_eq!(state.player.body.pos.y, PREVIEW_STAGE.max_y - r);
    }
}
