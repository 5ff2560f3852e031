//! RGBA colour value used for entity fills, trails and labels

use std::fmt;

use serde::{Deserialize, Serialize};

use super::lerp::{Easing, lerp};

/// An RGBA colour. Channels are clamped on construction: `r`, `g`, `b` to
/// `[0, 255]` and `a` to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Colour {
    r: f32,
    g: f32,
    b: f32,
    a: f32,
}

impl Colour {
    pub const RED: Colour = Colour::opaque(255.0, 0.0, 0.0);
    pub const GREEN: Colour = Colour::opaque(0.0, 255.0, 0.0);
    pub const BLUE: Colour = Colour::opaque(0.0, 0.0, 255.0);
    pub const PINK: Colour = Colour::opaque(255.0, 0.0, 255.0);
    pub const YELLOW: Colour = Colour::opaque(255.0, 255.0, 0.0);
    pub const PURPLE: Colour = Colour::opaque(128.0, 0.0, 255.0);
    pub const TEAL: Colour = Colour::opaque(0.0, 255.0, 255.0);
    pub const ORANGE: Colour = Colour::opaque(255.0, 128.0, 0.0);
    pub const WHITE: Colour = Colour::opaque(255.0, 255.0, 255.0);
    pub const BLACK: Colour = Colour::opaque(0.0, 0.0, 0.0);

    /// Colours the powerup rainbow cycles through
    pub const POWERUP_PALETTE: [Colour; 8] = [
        Colour::RED,
        Colour::GREEN,
        Colour::BLUE,
        Colour::PINK,
        Colour::YELLOW,
        Colour::PURPLE,
        Colour::TEAL,
        Colour::ORANGE,
    ];

    /// Returned by [`Colour::from_hex`] when the input does not parse
    pub const HEX_FALLBACK: Colour = Colour::BLUE;

    /// In-range constants only
    pub(crate) const fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: r.clamp(0.0, 255.0),
            g: g.clamp(0.0, 255.0),
            b: b.clamp(0.0, 255.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    pub fn r(&self) -> f32 {
        self.r
    }

    pub fn g(&self) -> f32 {
        self.g
    }

    pub fn b(&self) -> f32 {
        self.b
    }

    pub fn a(&self) -> f32 {
        self.a
    }

    /// Same colour with a different alpha
    pub fn with_alpha(&self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Interpolate every channel independently through `easing`
    pub fn lerp(from: Colour, to: Colour, percent: f32, easing: Easing) -> Colour {
        Colour::new(
            lerp(from.r, to.r, percent, easing),
            lerp(from.g, to.g, percent, easing),
            lerp(from.b, to.b, percent, easing),
            lerp(from.a, to.a, percent, easing),
        )
    }

    /// Parse `#rgb`, `rgb`, `#rrggbb` or `rrggbb` (case-insensitive).
    ///
    /// Anything else yields [`Colour::HEX_FALLBACK`] rather than an error.
    pub fn from_hex(hex: &str) -> Colour {
        match parse_hex(hex) {
            Some((r, g, b)) => Colour::new(r as f32, g as f32, b as f32, 1.0),
            None => {
                log::warn!("Unparseable hex colour {:?}, using fallback", hex);
                Colour::HEX_FALLBACK
            }
        }
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };

    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Formats as `rgb(r, g, b, a)` with alpha as a 0-1 fraction, which canvas
/// style setters accept directly.
impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}
