//! Per-frame simulation update
//!
//! Advances every entity, resolves collisions, applies the scoring rules and
//! queues UI notifications. Rendering is a separate pass over the state.

use glam::Vec2;
use rand::Rng;

use super::collectable;
use super::colour::Colour;
use super::entity::{Body, Stage};
use super::obstacle::{self, Obstacle};
use super::particle::Particle;
use super::score_text::ScoreText;
use super::state::{GAME_STAGE, GameEvent, GamePhase, GameState};
use crate::consts::*;
use crate::normalise_guarded;

/// Resample attempts before falling back to the farthest corner
const MAX_SPAWN_ATTEMPTS: usize = 16;
/// Slack for the push-away step landing a hair short of the exclusion radius
const SPAWN_DIST_EPSILON: f32 = 1e-3;

/// Directional input held during a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Reserved; the simulation ignores it
    pub pause: bool,
}

impl TickInput {
    /// Aggregate the held directions into one vector. Diagonals are
    /// normalised so they are no faster than a single axis.
    pub fn intent(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        let dir = Vec2::new(axis(self.left, self.right), axis(self.up, self.down));

        if dir.x != 0.0 && dir.y != 0.0 {
            normalise_guarded(dir)
        } else {
            dir
        }
    }
}

/// Points awarded for a collectable at combo tier `multiplier`
pub fn collect_reward(multiplier: u32) -> u32 {
    BASE_COLLECT_SCORE << multiplier.min(MAX_COLLECT_CHAIN)
}

/// 40% of the collectable reward at the same tier, rounded up
pub fn clear_reward(multiplier: u32) -> u32 {
    (collect_reward(multiplier) * 2).div_ceil(5)
}

/// Advance the game state by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.phase == GamePhase::NotStarted {
        return;
    }

    let stage = GAME_STAGE;
    let running = state.phase == GamePhase::Running;

    if running {
        state.elapsed += f64::from(dt);
        // The label was drawn last frame in its current state; age it now
        advance_score_text(state, dt);
    }

    state.collectable.next_frame(dt, &stage);
    for particle in &mut state.particles {
        particle.next_frame(dt, &stage);
    }
    for obstacle in &mut state.obstacles {
        obstacle.next_frame(dt, &stage);
    }
    if running {
        state
            .player
            .next_frame(dt, &stage, input.intent(), &mut state.rng);
    }

    if running {
        resolve_obstacle_hits(state);
    }

    if state.phase == GamePhase::Running
        && state.collectable.body.is_colliding_with(&state.player.body)
    {
        collect(state);
    }

    state.particles.retain(|p| !p.should_despawn());

    if state.phase == GamePhase::Running && state.player.in_powerup() {
        state.events.push(GameEvent::PowerChanged {
            percent: state.player.charge_percent(),
            transition_ms: POWER_TRANSITION_DRAIN_MS,
        });
    }
}

fn advance_score_text(state: &mut GameState, dt: f32) {
    if let Some(text) = &mut state.score_text {
        text.next_frame(dt);
        if text.should_despawn() {
            state.score_text = None;
        }
    }
}

fn resolve_obstacle_hits(state: &mut GameState) {
    let hits: Vec<u32> = state
        .obstacles
        .iter()
        .filter(|o| o.is_colliding_with(&state.player.body))
        .map(|o| o.body.id)
        .collect();

    for id in hits {
        if state.player.in_powerup() {
            clear_obstacle(state, id);
        } else {
            end_game(state);
            break;
        }
    }
}

/// Continue the combo if the last label is still showing, otherwise reset it
fn advance_multiplier(state: &mut GameState) {
    state.score_multiplier = if state.score_text.is_some() {
        (state.score_multiplier + 1).min(MAX_COLLECT_CHAIN)
    } else {
        0
    };
}

fn award(state: &mut GameState, reward: u32, colour: Colour) {
    state.score += reward;
    state.events.push(GameEvent::ScoreChanged { score: state.score });
    state.score_text = Some(ScoreText::new(
        state.player.body.id,
        reward,
        MAX_COLLECT_SCORE,
        TIME_TO_CHAIN,
        colour,
        Colour::WHITE,
    ));
}

fn clear_obstacle(state: &mut GameState, id: u32) {
    let Some(index) = state.obstacles.iter().position(|o| o.body.id == id) else {
        return;
    };
    let cleared = state.obstacles.remove(index);

    advance_multiplier(state);
    let reward = clear_reward(state.score_multiplier);
    award(state, reward, obstacle::COLOUR);
    burst(state, &cleared.body);

    log::debug!(
        "Cleared obstacle {} for {} (tier {})",
        id,
        reward,
        state.score_multiplier
    );
}

fn collect(state: &mut GameState) {
    advance_multiplier(state);
    let reward = collect_reward(state.score_multiplier);
    state.collectables_collected += 1;
    state.player.add_charge();
    award(state, reward, collectable::COLOUR);

    state.events.push(GameEvent::PowerChanged {
        percent: state.player.charge_percent(),
        transition_ms: POWER_TRANSITION_GAIN_MS,
    });

    let source = state.collectable.body.clone();
    burst(state, &source);

    relocate_collectable(state);
    spawn_obstacle(state);

    log::debug!(
        "Collected #{} for {} (tier {})",
        state.collectables_collected,
        reward,
        state.score_multiplier
    );
}

fn end_game(state: &mut GameState) {
    state.phase = GamePhase::Ended;

    let source = state.player.body.clone();
    burst(state, &source);

    let time_ms = (state.elapsed * 1000.0).round() as u64;
    state.time_taken_ms = Some(time_ms);
    state.events.push(GameEvent::GameEnded {
        score: state.score,
        time_ms,
        collected: state.collectables_collected,
    });

    log::info!(
        "Game over: score {}, {} collected, {} ms",
        state.score,
        state.collectables_collected,
        time_ms
    );
}

/// Throw a particle burst from `source`, seeded with the player's motion
fn burst(state: &mut GameState, source: &Body) {
    let speed = state.player.body.speed;
    let vel = state.player.body.vel;

    for _ in 0..PARTICLES_PER_BURST {
        let id = state.next_entity_id();
        let particle = Particle::new(id, source, speed, vel, &mut state.rng);
        state.particles.push(particle);
    }
}

fn relocate_collectable(state: &mut GameState) {
    let pos = random_spawn_position(
        &mut state.rng,
        &GAME_STAGE,
        state.player.body.pos,
        collectable::RADIUS,
    );
    state.collectable.reset_position(pos);
}

/// Add a fresh obstacle away from the player
pub fn spawn_obstacle(state: &mut GameState) {
    let pos = random_spawn_position(
        &mut state.rng,
        &GAME_STAGE,
        state.player.body.pos,
        obstacle::RADIUS,
    );
    let id = state.next_entity_id();
    let obstacle = Obstacle::new(id, pos, &mut state.rng);
    log::debug!("Spawned obstacle {} at ({:.0}, {:.0})", id, pos.x, pos.y);
    state.obstacles.push(obstacle);
}

/// Pick a uniformly random point inside `stage` inset by `radius`, at least
/// [`MIN_SPAWN_DIST_FROM_PLAYER`] away from `player_pos`.
///
/// Points that land too close are pushed straight away from the player and
/// clamped back inside. Near a corner the clamp can undo the push, in which
/// case the point is resampled; if every attempt fails the inset corner
/// farthest from the player is used.
pub fn random_spawn_position<R: Rng>(
    rng: &mut R,
    stage: &Stage,
    player_pos: Vec2,
    radius: f32,
) -> Vec2 {
    let inner = stage.inset(radius);

    for _ in 0..MAX_SPAWN_ATTEMPTS {
        let mut pos = Vec2::new(
            rng.random_range(inner.min_x..=inner.max_x),
            rng.random_range(inner.min_y..=inner.max_y),
        );

        let dist = pos.distance(player_pos);
        if dist < MIN_SPAWN_DIST_FROM_PLAYER {
            let away = if dist > 0.0 {
                (pos - player_pos) / dist
            } else {
                Vec2::X
            };
            pos += away * (MIN_SPAWN_DIST_FROM_PLAYER - dist);
        }

        let pos = inner.clamp(pos);
        if pos.distance(player_pos) >= MIN_SPAWN_DIST_FROM_PLAYER - SPAWN_DIST_EPSILON {
            return pos;
        }
    }

    farthest_corner(&inner, player_pos)
}

fn farthest_corner(inner: &Stage, from: Vec2) -> Vec2 {
    let x = if from.x - inner.min_x > inner.max_x - from.x {
        inner.min_x
    } else {
        inner.max_x
    };
    let y = if from.y - inner.min_y > inner.max_y - from.y {
        inner.min_y
    } else {
        inner.max_y
    };
    Vec2::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::player::PlayerParams;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const DT: f32 = 1.0 / 60.0;

    /// Fresh run with no obstacles and the collectable out of reach
    fn quiet_state() -> GameState {
        let mut state = GameState::new(12345, &PlayerParams::default());
        state.obstacles.clear();
        let far = farthest_corner(&GAME_STAGE.inset(collectable::RADIUS), state.player.body.pos);
        state.collectable.reset_position(far);
        state
    }

    #[test]
    fn test_intent_axes() {
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        assert_eq!(input.intent(), Vec2::X);

        let input = TickInput {
            up: true,
            down: true,
            ..Default::default()
        };
        assert_eq!(input.intent(), Vec2::ZERO);
    }

    #[test]
    fn test_intent_diagonal_normalised() {
        let input = TickInput {
            up: true,
            left: true,
            ..Default::default()
        };
        let v = input.intent();
        assert!((v.length() - 1.0).abs() < 1e-6);
        assert!(v.x < 0.0 && v.y < 0.0);
    }

    #[test]
    fn test_reward_tables() {
        let collect: Vec<u32> = (0..=6).map(collect_reward).collect();
        assert_eq!(collect, vec![5, 10, 20, 40, 80, 160, 160]);
        let clear: Vec<u32> = (0..=5).map(clear_reward).collect();
        assert_eq!(clear, vec![2, 4, 8, 16, 32, 64]);
    }

    #[test]
    fn test_pickup_awards_and_spawns() {
        let mut state = quiet_state();
        state.collectable.reset_position(state.player.body.pos);

        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.score, 5);
        assert_eq!(state.collectables_collected, 1);
        assert_eq!(state.player.charge_amount, 1);
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.particles.len(), PARTICLES_PER_BURST);
        assert!(state.score_text.is_some());

        let events = state.drain_events();
        assert_eq!(events[0], GameEvent::ScoreChanged { score: 5 });
        assert!(matches!(
            events[1],
            GameEvent::PowerChanged {
                transition_ms: POWER_TRANSITION_GAIN_MS,
                ..
            }
        ));
    }

    #[test]
    fn test_label_ages_after_first_draw() {
        let mut state = quiet_state();
        state.collectable.reset_position(state.player.body.pos);
        tick(&mut state, &TickInput::default(), DT);

        // Fresh for the frame that spawned it
        let label = state.score_text.clone().expect("label");
        assert_eq!(label.time_in_fade, TIME_TO_CHAIN);
        assert_eq!(label.size, label.start_size);

        tick(&mut state, &TickInput::default(), DT);
        let label = state.score_text.clone().expect("label");
        assert!((label.time_in_fade - (TIME_TO_CHAIN - DT)).abs() < 1e-6);

        // A label with time left is still shown; the tick that runs it out clears it
        if let Some(label) = &mut state.score_text {
            label.time_in_fade = DT * 1.5;
        }
        tick(&mut state, &TickInput::default(), DT);
        assert!(state.score_text.is_some());
        tick(&mut state, &TickInput::default(), DT);
        assert!(state.score_text.is_none());
    }

    #[test]
    fn test_powered_player_clears_obstacles() {
        let mut state = quiet_state();
        state.player.powerup_remaining = state.player.powerup_time;
        let id = state.next_entity_id();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut o = Obstacle::new(id, state.player.body.pos, &mut rng);
        o.spawn_remaining = 0.0;
        o.body.vel = Vec2::ZERO;
        state.obstacles.push(o);

        tick(&mut state, &TickInput::default(), DT);

        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.obstacles.is_empty());
        assert_eq!(state.score, clear_reward(0));
        assert_eq!(state.particles.len(), PARTICLES_PER_BURST);
        let label = state.score_text.as_ref().expect("label");
        assert_eq!(label.fill_colour, obstacle::COLOUR);

        // Powerup drain is reported every frame
        assert!(state.drain_events().iter().any(|e| matches!(
            e,
            GameEvent::PowerChanged {
                transition_ms: POWER_TRANSITION_DRAIN_MS,
                ..
            }
        )));
    }

    #[test]
    fn test_fading_obstacle_is_harmless() {
        let mut state = quiet_state();
        let id = state.next_entity_id();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut o = Obstacle::new(id, state.player.body.pos, &mut rng);
        o.body.vel = Vec2::ZERO;
        state.obstacles.push(o);

        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::Running);
    }

    #[test]
    fn test_ended_run_freezes_player_and_score() {
        let mut state = quiet_state();
        state.phase = GamePhase::Ended;
        let pos = state.player.body.pos;
        state.collectable.reset_position(pos);

        let input = TickInput {
            right: true,
            ..Default::default()
        };
        for _ in 0..10 {
            tick(&mut state, &input, DT);
        }
        assert_eq!(state.player.body.pos, pos);
        assert_eq!(state.score, 0);
        assert_eq!(state.elapsed, 0.0);
    }

    #[test]
    fn test_particles_removed_after_fade() {
        let mut state = quiet_state();
        let source = state.player.body.clone();
        burst(&mut state, &source);
        assert_eq!(state.particles.len(), PARTICLES_PER_BURST);

        // Plenty of time to fall and fade out
        for _ in 0..60 * 20 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_spawn_fallback_uses_far_corner() {
        let mut rng = Pcg32::seed_from_u64(1);
        // Every point in this tiny stage is inside the exclusion radius
        let stage = Stage::new(0.0, 100.0, 0.0, 100.0);
        let pos = random_spawn_position(&mut rng, &stage, Vec2::new(30.0, 80.0), 10.0);
        assert_eq!(pos, Vec2::new(90.0, 10.0));
    }

    proptest! {
        #[test]
        fn prop_spawn_respects_exclusion(
            seed in any::<u64>(),
            px in 4.0f32..1924.0,
            py in 4.0f32..907.0,
            radius in 10.0f32..50.0,
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let player = Vec2::new(px, py);
            let pos = random_spawn_position(&mut rng, &GAME_STAGE, player, radius);

            prop_assert!(pos.distance(player) >= MIN_SPAWN_DIST_FROM_PLAYER - SPAWN_DIST_EPSILON);
            let inner = GAME_STAGE.inset(radius);
            prop_assert_eq!(inner.clamp(pos), pos);
        }
    }
}
