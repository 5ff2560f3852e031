//! Scalar interpolation with easing curves

use serde::{Deserialize, Serialize};

/// Easing curve applied to the interpolation percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    /// `t`
    #[default]
    Linear,
    /// Ease-out quadratic: `1 - (1 - t)²`
    Ease,
    /// Ease-in quadratic: `t²`
    Square,
    /// `sqrt(t)`
    Root,
    /// `cbrt(t)`
    Croot,
}

impl Easing {
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::Ease => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::Square => t * t,
            Easing::Root => t.sqrt(),
            Easing::Croot => t.cbrt(),
        }
    }
}

/// Interpolate from `from` to `to`.
///
/// `percent` is not clamped: values outside `[0, 1]` extrapolate (or yield NaN
/// for `Root` with a negative percent).
#[inline]
pub fn lerp(from: f32, to: f32, percent: f32, easing: Easing) -> f32 {
    from + (to - from) * easing.apply(percent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::Ease,
            Easing::Square,
            Easing::Root,
            Easing::Croot,
        ] {
            assert!(close(lerp(10.0, 50.0, 0.0, easing), 10.0));
            assert!(close(lerp(10.0, 50.0, 1.0, easing), 50.0));
        }
    }

    #[test]
    fn test_curves_at_midpoint() {
        assert!(close(lerp(0.0, 1.0, 0.5, Easing::Linear), 0.5));
        assert!(close(lerp(0.0, 1.0, 0.5, Easing::Ease), 0.75));
        assert!(close(lerp(0.0, 1.0, 0.5, Easing::Square), 0.25));
        assert!(close(lerp(0.0, 1.0, 0.25, Easing::Root), 0.5));
        assert!(close(lerp(0.0, 1.0, 0.125, Easing::Croot), 0.5));
    }

    #[test]
    fn test_extrapolates() {
        assert!(close(lerp(0.0, 10.0, 1.5, Easing::Linear), 15.0));
        assert!(close(lerp(0.0, 10.0, -0.5, Easing::Linear), -5.0));
    }

    #[test]
    fn test_descending_range() {
        assert!(close(lerp(75.0, 15.0, 0.5, Easing::Square), 60.0));
    }
}
