//! Decorative debris thrown out by pickups, clears and deaths. Falls under
//! gravity, bounces softly off the walls and fades once it lands.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::colour::Colour;
use super::entity::{Body, Stage};
use super::lerp::Easing;

/// Seconds to fade after landing
pub const TIME_TO_FADE: f32 = 2.0;
/// Max spawn offset from the source on each axis
pub const POSITION_VARIANCE: f32 = 10.0;
/// Added to the vertical velocity every frame
pub const GRAVITY_FORCE: f32 = 0.2;
/// Velocity kept (and reversed) on a wall or ceiling bounce
pub const BOUNCE_MULTIPLIER: f32 = 0.25;
/// Velocity kept per frame while sliding along the floor
pub const FLOOR_FRICTION: f32 = 0.9;
pub const TRAIL_LIVE_TIME: f32 = 0.1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub body: Body,
    pub time_in_fade: f32,
}

impl Particle {
    /// Half the source radius, jittered around the source position and
    /// velocity
    pub fn new<R: Rng>(
        id: u32,
        source: &Body,
        speed: f32,
        start_vel: Vec2,
        rng: &mut R,
    ) -> Self {
        let mut jitter = |scale: f32| (rng.random::<f32>() - 0.5) * scale;

        let pos = source.pos
            + Vec2::new(
                jitter(POSITION_VARIANCE * 2.0),
                jitter(POSITION_VARIANCE * 2.0),
            );
        let vel = start_vel + Vec2::new(jitter(1.0), jitter(1.0));

        let mut body = Body::new(
            id,
            pos,
            source.colour,
            source.radius / 2.0,
            speed,
            TRAIL_LIVE_TIME,
        );
        body.vel = vel;

        Self {
            body,
            time_in_fade: TIME_TO_FADE,
        }
    }

    pub fn next_frame(&mut self, dt: f32, stage: &Stage) {
        self.body.vel.y += GRAVITY_FORCE;

        let inner = stage.inset(self.body.radius);
        let pos = self.body.pos;

        if pos.x <= inner.min_x || pos.x >= inner.max_x {
            self.body.vel.x *= -BOUNCE_MULTIPLIER;
        }

        if pos.y <= inner.min_y {
            self.body.vel.y *= -BOUNCE_MULTIPLIER;
        }

        if pos.y >= inner.max_y {
            self.body.vel *= FLOOR_FRICTION;

            self.time_in_fade = (self.time_in_fade - dt).max(0.0);
            let colour = self.body.colour;
            self.body.colour = Colour::lerp(
                colour.with_alpha(1.0),
                colour.with_alpha(0.0),
                1.0 - self.time_in_fade / TIME_TO_FADE,
                Easing::Linear,
            );
        }

        self.body.advance(dt, stage);
    }

    pub fn should_despawn(&self) -> bool {
        self.time_in_fade == 0.0
    }
}
