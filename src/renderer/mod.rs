//! Rendering module
//!
//! Frames are drawn through the [`Surface`] trait in logical stage units.
//! [`Viewport`] maps those units onto whatever physical size the target has.

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;

use glam::Vec2;

use crate::consts::*;
use crate::sim::lerp::{Easing, lerp};
use crate::sim::{Body, Colour, GameState, PreviewState};

/// Stroke colour of the stage border (`#c022ff`)
pub const BORDER_COLOUR: Colour = Colour::opaque(192.0, 34.0, 255.0);
/// Thinnest a trail segment gets
pub const MIN_TRAIL_WIDTH: f32 = 2.0;
/// How far the background fill overshoots the stage on every side
const BACKGROUND_BLEED: f32 = 100.0;
/// Outline width of score labels
const LABEL_OUTLINE_WIDTH: f32 = 1.0;

/// Uniform scale-to-fit transform with letterbox padding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Physical size of the target
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    /// Image smoothing is wanted when scaling down
    pub smoothing: bool,
}

impl Viewport {
    /// Fit a `ref_width` x `ref_height` logical area into `width` x `height`
    pub fn fit(width: f32, height: f32, ref_width: f32, ref_height: f32) -> Self {
        let scale = (width / ref_width).min(height / ref_height);
        Self {
            width,
            height,
            scale,
            offset_x: (width - ref_width * scale) / 2.0,
            offset_y: (height - ref_height * scale) / 2.0,
            smoothing: scale < 1.0,
        }
    }

    pub fn fit_game(width: f32, height: f32) -> Self {
        Self::fit(width, height, GAME_REF_WIDTH, GAME_REF_HEIGHT)
    }

    pub fn fit_preview(width: f32, height: f32) -> Self {
        Self::fit(width, height, PREVIEW_REF_WIDTH, PREVIEW_REF_HEIGHT)
    }
}

/// Draw primitives a frame is built from. All coordinates are logical.
pub trait Surface {
    /// Replace the current transform with `viewport`'s scale and padding
    fn set_transform(&mut self, viewport: &Viewport);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, colour: Colour);
    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, line_width: f32, colour: Colour);
    fn fill_circle(&mut self, centre: Vec2, radius: f32, colour: Colour);
    fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, colour: Colour);
    /// Width of `text` when drawn in `font`
    fn measure_text(&mut self, text: &str, font: &str) -> f32;
    fn fill_text(&mut self, text: &str, font: &str, pos: Vec2, colour: Colour);
    fn stroke_text(&mut self, text: &str, font: &str, pos: Vec2, line_width: f32, colour: Colour);
}

/// Black out a stage of the given reference size, border region included
pub fn clear(surface: &mut impl Surface, ref_width: f32, ref_height: f32) {
    surface.fill_rect(
        -BACKGROUND_BLEED,
        -BACKGROUND_BLEED,
        ref_width + BACKGROUND_BLEED * 2.0,
        ref_height + BACKGROUND_BLEED * 2.0,
        Colour::BLACK,
    );
}

fn draw_frame(surface: &mut impl Surface, ref_width: f32, ref_height: f32, border: f32) {
    clear(surface, ref_width, ref_height);
    surface.stroke_rect(
        border / 2.0,
        border / 2.0,
        ref_width - border,
        ref_height - border,
        border,
        BORDER_COLOUR,
    );
}

/// Filled circle followed by its trail, newest segment first
pub fn draw_body(surface: &mut impl Surface, body: &Body) {
    surface.fill_circle(body.pos, body.radius, body.colour);

    let trail = &body.trail;
    let len = trail.len();
    let max_width = body.radius * 2.0;

    for i in (0..len).rev() {
        let width = lerp(
            max_width,
            MIN_TRAIL_WIDTH,
            (len - i) as f32 / len as f32,
            Easing::Ease,
        );
        let from = if i == len - 1 {
            body.pos
        } else {
            trail[i + 1].pos
        };
        let point = &trail[i];
        let colour = body
            .colour
            .with_alpha(point.opacity * body.colour.a());

        surface.stroke_line(from, point.pos, width, colour);
    }
}

/// Draw one main-stage frame from the current state
pub fn draw_game(surface: &mut impl Surface, state: &GameState) {
    draw_frame(surface, GAME_REF_WIDTH, GAME_REF_HEIGHT, BORDER_WIDTH);

    draw_body(surface, &state.collectable.body);
    for particle in &state.particles {
        draw_body(surface, &particle.body);
    }
    for obstacle in &state.obstacles {
        draw_body(surface, &obstacle.body);
    }

    if state.has_ended() {
        return;
    }
    draw_body(surface, &state.player.body);

    let Some(label) = &state.score_text else {
        return;
    };
    let Some(parent) = state.position_of(label.parent_id) else {
        return;
    };

    let font = label.font();
    let text_width = surface.measure_text(&label.text, &font);
    let pos = label.position(parent)
        - Vec2::new(text_width / 2.0, state.player.body.radius / 2.0);

    surface.stroke_text(
        &label.text,
        &font,
        pos,
        LABEL_OUTLINE_WIDTH,
        label.outline_colour,
    );
    surface.fill_text(&label.text, &font, pos, label.fill_colour);
}

/// Draw one preview-stage frame
pub fn draw_preview(surface: &mut impl Surface, preview: &PreviewState) {
    draw_frame(
        surface,
        PREVIEW_REF_WIDTH,
        PREVIEW_REF_HEIGHT,
        PREVIEW_BORDER_WIDTH,
    );

    draw_body(surface, &preview.player.body);

    for slot in preview.slots.iter().filter(|s| s.is_visible()) {
        let body = &slot.collectable.body;
        surface.fill_circle(body.pos, body.radius, body.colour);
    }

    for particle in &preview.particles {
        let body = &particle.body;
        surface.fill_circle(body.pos, body.radius, body.colour);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sim::{PlayerParams, TickInput, TrailPoint, tick};

    /// Surface that records what was drawn
    #[derive(Debug, Default)]
    pub(crate) struct Recorder {
        pub transforms: Vec<Viewport>,
        pub rects: Vec<(f32, f32, f32, f32, Colour)>,
        pub circles: Vec<(Vec2, f32, Colour)>,
        pub lines: Vec<(Vec2, Vec2, f32, Colour)>,
        pub texts: Vec<(String, Vec2, Colour)>,
    }

    impl Surface for Recorder {
        fn set_transform(&mut self, viewport: &Viewport) {
            self.transforms.push(*viewport);
        }

        fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, colour: Colour) {
            self.rects.push((x, y, w, h, colour));
        }

        fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, _: f32, colour: Colour) {
            self.rects.push((x, y, w, h, colour));
        }

        fn fill_circle(&mut self, centre: Vec2, radius: f32, colour: Colour) {
            self.circles.push((centre, radius, colour));
        }

        fn stroke_line(&mut self, from: Vec2, to: Vec2, width: f32, colour: Colour) {
            self.lines.push((from, to, width, colour));
        }

        fn measure_text(&mut self, text: &str, _: &str) -> f32 {
            text.len() as f32 * 10.0
        }

        fn fill_text(&mut self, text: &str, _: &str, pos: Vec2, colour: Colour) {
            self.texts.push((text.to_string(), pos, colour));
        }

        fn stroke_text(&mut self, text: &str, _: &str, pos: Vec2, _: f32, colour: Colour) {
            self.texts.push((text.to_string(), pos, colour));
        }
    }

    #[test]
    fn test_viewport_letterbox() {
        // Twice as wide as needed: pillarboxed
        let v = Viewport::fit(2000.0, 500.0, 1000.0, 500.0);
        assert_eq!(v.scale, 1.0);
        assert_eq!((v.offset_x, v.offset_y), (500.0, 0.0));
        assert!(!v.smoothing);

        let v = Viewport::fit(500.0, 500.0, 1000.0, 500.0);
        assert_eq!(v.scale, 0.5);
        assert_eq!((v.offset_x, v.offset_y), (0.0, 125.0));
        assert!(v.smoothing);
    }

    #[test]
    fn test_trail_segments_taper() {
        let mut body = Body::new(1, Vec2::new(50.0, 0.0), Colour::RED, 10.0, 0.0, 1.0);
        body.trail = (0..4)
            .map(|i| TrailPoint {
                pos: Vec2::new(i as f32 * 10.0, 0.0),
                time_alive: 0.0,
                opacity: 0.5,
            })
            .collect();

        let mut r = Recorder::default();
        draw_body(&mut r, &body);

        assert_eq!(r.circles.len(), 1);
        assert_eq!(r.lines.len(), 4);
        // First segment joins the centre to the newest point
        assert_eq!(r.lines[0].0, body.pos);
        assert_eq!(r.lines[0].1, Vec2::new(30.0, 0.0));
        assert_eq!(r.lines[1].0, Vec2::new(30.0, 0.0));
        assert_eq!(r.lines[0].3.a(), 0.5);

        let widths: Vec<f32> = r.lines.iter().map(|l| l.2).collect();
        assert!(widths.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(widths[3], MIN_TRAIL_WIDTH);
    }

    #[test]
    fn test_game_frame_layers() {
        let mut state = GameState::new(5, &PlayerParams::default());
        let mut r = Recorder::default();
        draw_game(&mut r, &state);

        // Background then border
        assert_eq!(r.rects[0].4, Colour::BLACK);
        assert_eq!(r.rects[1], (2.0, 2.0, 1924.0, 907.0, BORDER_COLOUR));
        // Collectable, obstacle, player
        assert_eq!(r.circles.len(), 3);
        assert!(r.texts.is_empty());

        state.collectable.reset_position(state.player.body.pos);
        tick(&mut state, &TickInput::default(), 0.0);
        let mut r = Recorder::default();
        draw_game(&mut r, &state);
        assert_eq!(r.texts.len(), 2);
        assert_eq!(r.texts[0].0, "+5");
        assert_eq!(r.texts[0].2, Colour::WHITE);
        assert_eq!(r.texts[1].2, crate::sim::collectable::COLOUR);
    }

    #[test]
    fn test_ended_game_hides_player() {
        let mut state = GameState::new(5, &PlayerParams::default());
        state.phase = crate::sim::GamePhase::Ended;
        let mut r = Recorder::default();
        draw_game(&mut r, &state);
        assert!(!r.circles.iter().any(|c| c.0 == state.player.body.pos));
    }

    #[test]
    fn test_preview_hides_respawning_slots() {
        let mut preview = PreviewState::new(1, &PlayerParams::default());
        preview.slots[2].respawn_remaining = 1.0;
        let mut r = Recorder::default();
        draw_preview(&mut r, &preview);
        // Player plus four visible collectables
        assert_eq!(r.circles.len(), 5);
        assert_eq!(r.rects[1], (0.5, 0.5, 1021.0, 509.0, BORDER_COLOUR));
    }
}
