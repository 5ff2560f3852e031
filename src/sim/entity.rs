//! Shared entity record: motion integration, stage clamping, collision and
//! the fading trail every moving entity leaves behind.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::colour::Colour;
use super::lerp::{Easing, lerp};
use crate::clamp_axes;

/// Seconds between trail samples
pub const TRAIL_SAMPLE_INTERVAL: f32 = 0.01;
/// Opacity of a brand new trail point
pub const TRAIL_MAX_OPACITY: f32 = 0.8;

/// Axis-aligned rectangle entities are confined to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Stage {
    pub const fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// The stage shrunk by `inset` on every side
    pub fn inset(&self, inset: f32) -> Stage {
        Stage::new(
            self.min_x + inset,
            self.max_x - inset,
            self.min_y + inset,
            self.max_y - inset,
        )
    }

    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        clamp_axes(pos, self.min_x, self.max_x, Some(self.min_y), Some(self.max_y))
    }
}

/// One sample of an entity's past position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub time_alive: f32,
    pub opacity: f32,
}

/// State shared by every entity kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: u32,
    pub pos: Vec2,
    /// Direction scaled by drag, not a physical velocity; `speed` converts it
    pub vel: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub colour: Colour,
    /// Oldest first, newest last
    pub trail: Vec<TrailPoint>,
    /// Seconds a trail point lives; zero disables the trail
    pub trail_live_time: f32,
    time_to_next_trail_point: f32,
}

impl Body {
    pub fn new(
        id: u32,
        pos: Vec2,
        colour: Colour,
        radius: f32,
        speed: f32,
        trail_live_time: f32,
    ) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius,
            speed,
            colour,
            trail: Vec::new(),
            trail_live_time,
            time_to_next_trail_point: 0.0,
        }
    }

    /// Integrate, clamp inside the stage and age the trail
    pub fn advance(&mut self, dt: f32, stage: &Stage) {
        self.pos += self.vel * self.speed * dt;
        self.clamp_to_stage(stage);

        if self.trail_live_time <= 0.0 {
            return;
        }

        let live_time = self.trail_live_time;
        for point in &mut self.trail {
            point.time_alive = (point.time_alive + dt).min(live_time);
            point.opacity = lerp(
                0.0,
                TRAIL_MAX_OPACITY,
                1.0 - point.time_alive / live_time,
                Easing::Ease,
            );
        }
        self.trail.retain(|p| p.time_alive < live_time);

        self.time_to_next_trail_point = (self.time_to_next_trail_point - dt).max(0.0);
        if self.trail.is_empty() || self.time_to_next_trail_point == 0.0 {
            self.trail.push(TrailPoint {
                pos: self.pos,
                time_alive: 0.0,
                opacity: TRAIL_MAX_OPACITY,
            });
            self.time_to_next_trail_point = TRAIL_SAMPLE_INTERVAL;
        }
    }

    /// Keep the whole circle inside the stage
    pub fn clamp_to_stage(&mut self, stage: &Stage) {
        self.pos = stage.inset(self.radius).clamp(self.pos);
    }

    /// True if this body's circle is touching the stage edge (within one radius)
    pub fn touching_wall(&self, stage: &Stage) -> bool {
        !touches_none(self.pos, &stage.inset(self.radius))
    }

    /// Plain circle-circle test; fast bodies can tunnel through thin targets
    pub fn is_colliding_with(&self, other: &Body) -> bool {
        self.pos.distance(other.pos) <= self.radius + other.radius
    }

    pub fn clear_trail(&mut self) {
        self.trail.clear();
        self.time_to_next_trail_point = 0.0;
    }
}

fn touches_none(pos: Vec2, inner: &Stage) -> bool {
    pos.x > inner.min_x && pos.x < inner.max_x && pos.y > inner.min_y && pos.y < inner.max_y
}
