//! Obstacles bounce around the stage along one axis and end the run on
//! contact, unless the player is powered up.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::colour::Colour;
use super::entity::{Body, Stage};
use super::lerp::Easing;

pub const RADIUS: f32 = 15.0;
pub const COLOUR: Colour = Colour::RED;
pub const BASE_SPEED: f32 = 130.0;
pub const SPEED_VARIANCE: f32 = 20.0;
/// Seconds spent fading in, during which the obstacle cannot collide
pub const SPAWN_TIME: f32 = 1.0;
pub const TRAIL_LIVE_TIME: f32 = 1.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub body: Body,
    pub spawn_remaining: f32,
}

impl Obstacle {
    /// Random speed around [`BASE_SPEED`], moving along one random axis
    pub fn new<R: Rng>(id: u32, pos: Vec2, rng: &mut R) -> Self {
        let sign = |rng: &mut R| if rng.random_bool(0.5) { -1.0 } else { 1.0 };

        let variance = (rng.random::<f32>() * SPEED_VARIANCE).floor();
        let speed = BASE_SPEED + sign(rng) * variance;

        let mut body = Body::new(id, pos, COLOUR.with_alpha(0.0), RADIUS, speed, TRAIL_LIVE_TIME);
        body.vel = if rng.random_bool(0.5) {
            Vec2::new(sign(rng), 0.0)
        } else {
            Vec2::new(0.0, sign(rng))
        };

        Self {
            body,
            spawn_remaining: SPAWN_TIME,
        }
    }

    pub fn next_frame(&mut self, dt: f32, stage: &Stage) {
        self.spawn_remaining = (self.spawn_remaining - dt).max(0.0);
        self.body.colour = Colour::lerp(
            COLOUR.with_alpha(0.0),
            COLOUR,
            1.0 - self.spawn_remaining / SPAWN_TIME,
            Easing::Ease,
        );

        // Both components flip regardless of which wall was hit
        if self.body.touching_wall(stage) {
            self.body.clamp_to_stage(stage);
            self.body.vel *= -1.0;
        }

        self.body.advance(dt, stage);
    }

    pub fn is_spawning(&self) -> bool {
        self.spawn_remaining > 0.0
    }

    /// Obstacle-initiated check; always false while fading in
    pub fn is_colliding_with(&self, other: &Body) -> bool {
        if self.is_spawning() {
            return false;
        }
        self.body.is_colliding_with(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const STAGE: Stage = Stage::new(0.0, 1000.0, 0.0, 500.0);

    #[test]
    fn test_spawn_along_single_axis() {
        let mut rng = Pcg32::seed_from_u64(3);
        for id in 0..50 {
            let o = Obstacle::new(id, Vec2::new(500.0, 250.0), &mut rng);
            let v = o.body.vel;
            assert!((v.x == 0.0) != (v.y == 0.0));
            assert_eq!(v.length(), 1.0);
            assert!((110.0..=150.0).contains(&o.body.speed));
            assert_eq!(o.body.speed.fract(), 0.0);
        }
    }

    #[test]
    fn test_immune_while_fading_in() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut o = Obstacle::new(1, Vec2::new(500.0, 250.0), &mut rng);
        let target = Body::new(2, o.body.pos, Colour::WHITE, 10.0, 0.0, 0.0);

        assert!(!o.is_colliding_with(&target));
        // The target's own check ignores the fade
        assert!(target.is_colliding_with(&o.body));

        o.body.vel = Vec2::ZERO;
        o.next_frame(0.5, &STAGE);
        assert!(!o.is_colliding_with(&target));
        assert!(o.body.colour.a() > 0.0 && o.body.colour.a() < 1.0);

        o.next_frame(0.6, &STAGE);
        assert!(!o.is_spawning());
        assert_eq!(o.body.colour, COLOUR);
        let target = Body::new(2, o.body.pos, Colour::WHITE, 10.0, 0.0, 0.0);
        assert!(o.is_colliding_with(&target));
    }

    #[test]
    fn test_bounce_negates_both_components() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut o = Obstacle::new(1, Vec2::new(RADIUS, 250.0), &mut rng);
        o.body.vel = Vec2::new(-1.0, 0.5);
        o.next_frame(0.01, &STAGE);
        assert_eq!(o.body.vel, Vec2::new(1.0, -0.5));
        assert!(o.body.pos.x > RADIUS);
    }

    #[test]
    fn test_no_bounce_in_open_space() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut o = Obstacle::new(1, Vec2::new(500.0, 250.0), &mut rng);
        let vel = o.body.vel;
        o.next_frame(0.01, &STAGE);
        assert_eq!(o.body.vel, vel);
    }
}
