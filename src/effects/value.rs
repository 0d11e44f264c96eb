//! Animated values

use serde::{Deserialize, Serialize};

use crate::core::Color;

/// Value an animation interpolates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AnimValue {
    /// Plain number (opacity, progress, ...)
    Scalar(f32),
    /// Color, interpolated in RGB
    Color(Color),
    /// Cell position, rounded to the nearest cell
    Position { x: i32, y: i32 },
}

/// Discriminant of an [`AnimValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Scalar,
    Color,
    Position,
}

impl AnimValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            AnimValue::Scalar(_) => ValueKind::Scalar,
            AnimValue::Color(_) => ValueKind::Color,
            AnimValue::Position { .. } => ValueKind::Position,
        }
    }

    /// Interpolate towards `end`. At `t >= 1` this returns `end` exactly and
    /// at `t <= 0` it returns `self`. Mismatched kinds jump to `end`.
    pub fn lerp(&self, end: &AnimValue, t: f32) -> AnimValue {
        if t >= 1.0 {
            return *end;
        }
        if t <= 0.0 {
            return *self;
        }
        match (self, end) {
            (AnimValue::Scalar(a), AnimValue::Scalar(b)) => AnimValue::Scalar(a + (b - a) * t),
            (AnimValue::Color(a), AnimValue::Color(b)) => AnimValue::Color(a.mix(*b, t, true)),
            (AnimValue::Position { x: x0, y: y0 }, AnimValue::Position { x: x1, y: y1 }) => {
                let step = |a: i32, b: i32| (a as f32 + (b - a) as f32 * t).round() as i32;
                AnimValue::Position {
                    x: step(*x0, *x1),
                    y: step(*y0, *y1),
                }
            },
            _ => *end,
        }
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            AnimValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            AnimValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_position(&self) -> Option<(i32, i32)> {
        match self {
            AnimValue::Position { x, y } => Some((*x, *y)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_lerp() {
        let a = AnimValue::Scalar(0.0);
        let b = AnimValue::Scalar(10.0);
        assert_eq!(a.lerp(&b, 0.5), AnimValue::Scalar(5.0));
        assert_eq!(a.lerp(&b, 1.0), b);
        assert_eq!(a.lerp(&b, 0.0), a);
    }

    #[test]
    fn test_end_value_is_exact() {
        // 0.1 + (0.7 - 0.1) * 1.0 is not 0.7 in f32
        let a = AnimValue::Scalar(0.1);
        let b = AnimValue::Scalar(0.7);
        assert_eq!(a.lerp(&b, 1.0), AnimValue::Scalar(0.7));
    }

    #[test]
    fn test_position_rounds() {
        let a = AnimValue::Position { x: 0, y: 10 };
        let b = AnimValue::Position { x: 3, y: 0 };
        assert_eq!(a.lerp(&b, 0.5), AnimValue::Position { x: 2, y: 5 });
    }

    #[test]
    fn test_color_lerp() {
        let a = AnimValue::Color(Color::Rgb(0, 0, 0));
        let b = AnimValue::Color(Color::Rgb(100, 200, 50));
        assert_eq!(a.lerp(&b, 0.5), AnimValue::Color(Color::Rgb(50, 100, 25)));
        assert_eq!(a.kind(), ValueKind::Color);
    }
}
