//! Floating "+N" label shown above the player after a scoring event.
//!
//! The label does not own a position. It stores the id of the entity it
//! floats above and is handed that entity's position when queried.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::colour::Colour;
use super::lerp::{Easing, lerp};

pub const MIN_DIST: f32 = 20.0;
pub const MAX_DIST: f32 = 35.0;
pub const MIN_SIZE: f32 = 15.0;
pub const MIN_START_SIZE: f32 = 40.0;
pub const MAX_START_SIZE: f32 = 75.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreText {
    pub parent_id: u32,
    pub text: String,
    pub start_size: f32,
    pub size: f32,
    pub time_in_fade: f32,
    pub time_to_fade: f32,
    pub fill_colour: Colour,
    pub outline_colour: Colour,
}

impl ScoreText {
    pub fn new(
        parent_id: u32,
        score: u32,
        max_score: u32,
        time_to_fade: f32,
        fill_colour: Colour,
        outline_colour: Colour,
    ) -> Self {
        let start_size = lerp(
            MIN_START_SIZE,
            MAX_START_SIZE,
            score as f32 / max_score as f32,
            Easing::Linear,
        );

        Self {
            parent_id,
            text: format!("+{score}"),
            start_size,
            size: start_size,
            time_in_fade: time_to_fade,
            time_to_fade,
            fill_colour,
            outline_colour,
        }
    }

    /// 0 when freshly spawned, 1 when fully faded
    fn progress(&self) -> f32 {
        1.0 - self.time_in_fade / self.time_to_fade
    }

    pub fn next_frame(&mut self, dt: f32) {
        self.time_in_fade = (self.time_in_fade - dt).max(0.0);
        self.size = lerp(self.start_size, MIN_SIZE, self.progress(), Easing::Square);
    }

    /// Where to draw the label given its parent's current position
    pub fn position(&self, parent_pos: Vec2) -> Vec2 {
        parent_pos - Vec2::new(0.0, lerp(MIN_DIST, MAX_DIST, self.progress(), Easing::Root))
    }

    pub fn opacity(&self) -> f32 {
        self.progress()
    }

    /// CSS font shorthand for the current size
    pub fn font(&self) -> String {
        format!("{}px Sans-serif", self.size)
    }

    pub fn should_despawn(&self) -> bool {
        self.time_in_fade == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(score: u32) -> ScoreText {
        ScoreText::new(1, score, 160, 1.85, Colour::RED, Colour::WHITE)
    }

    #[test]
    fn test_start_size_scales_with_score() {
        assert_eq!(label(0).start_size, MIN_START_SIZE);
        assert_eq!(label(160).start_size, MAX_START_SIZE);
        assert_eq!(label(5).text, "+5");
        assert!(label(80).start_size > label(10).start_size);
    }

    #[test]
    fn test_eases_over_lifetime() {
        let mut t = ScoreText::new(1, 40, 160, 2.0, Colour::RED, Colour::WHITE);
        let parent = Vec2::new(100.0, 100.0);
        assert_eq!(t.position(parent), Vec2::new(100.0, 80.0));
        assert_eq!(t.opacity(), 0.0);

        t.next_frame(1.0);
        // square easing at 0.5 -> a quarter of the way down
        assert!((t.size - lerp(t.start_size, MIN_SIZE, 0.25, Easing::Linear)).abs() < 1e-4);
        let rise = 100.0 - t.position(parent).y;
        assert!((rise - (20.0 + 15.0 * 0.5f32.sqrt())).abs() < 1e-4);
        assert_eq!(t.opacity(), 0.5);
        assert!(!t.should_despawn());

        t.next_frame(1.5);
        assert!(t.should_despawn());
        assert_eq!(t.size, MIN_SIZE);
        assert_eq!(t.position(parent), Vec2::new(100.0, 65.0));
    }

    #[test]
    fn test_font_string() {
        let t = ScoreText::new(1, 0, 160, 1.0, Colour::RED, Colour::WHITE);
        assert_eq!(t.font(), "40px Sans-serif");
    }
}
