//! Stationary pickups. Touching one relocates it rather than removing it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::colour::Colour;
use super::entity::{Body, Stage};

pub const RADIUS: f32 = 10.0;
pub const COLOUR: Colour = Colour::opaque(144.0, 200.0, 0.0);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collectable {
    pub body: Body,
}

impl Collectable {
    pub fn new(id: u32, pos: Vec2) -> Self {
        // Zero trail lifetime: collectables never leave a trail
        Self {
            body: Body::new(id, pos, COLOUR, RADIUS, 0.0, 0.0),
        }
    }

    pub fn reset_position(&mut self, pos: Vec2) {
        self.body.pos = pos;
        self.body.clear_trail();
    }

    pub fn next_frame(&mut self, dt: f32, stage: &Stage) {
        self.body.advance(dt, stage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stays_put_without_trail() {
        let stage = Stage::new(0.0, 100.0, 0.0, 100.0);
        let mut c = Collectable::new(1, Vec2::new(40.0, 60.0));
        for _ in 0..30 {
            c.next_frame(0.016, &stage);
        }
        assert_eq!(c.body.pos, Vec2::new(40.0, 60.0));
        assert!(c.body.trail.is_empty());

        c.reset_position(Vec2::new(70.0, 20.0));
        assert_eq!(c.body.pos, Vec2::new(70.0, 20.0));
    }
}
