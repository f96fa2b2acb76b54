//! Centerline path model for linear features (roads, walls, water edges).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::CURVE_SEGMENTS;

/// One point on a feature's centerline. A control point on point `i` bends
/// the span from point `i` to point `i + 1` into a quadratic Bezier; absence
/// means a straight span. Coordinates are world-plane XZ; elevation is a
/// separate per-feature scalar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub position: Vec2,
    pub control: Option<Vec2>,
}

impl PathPoint {
    pub fn new(x: f32, z: f32) -> Self {
        Self {
            position: Vec2::new(x, z),
            control: None,
        }
    }

    pub fn with_control(x: f32, z: f32, cx: f32, cz: f32) -> Self {
        Self {
            position: Vec2::new(x, z),
            control: Some(Vec2::new(cx, cz)),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.control.is_none_or(|c| c.is_finite())
    }
}

/// Evaluate a quadratic Bezier through (p0, control, p1) at parameter t.
pub fn quadratic_point(p0: Vec2, control: Vec2, p1: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    u * u * p0 + 2.0 * u * t * control + t * t * p1
}

/// Round a world coordinate to two decimal places.
pub fn round2(v: Vec2) -> Vec2 {
    Vec2::new((v.x * 100.0).round() / 100.0, (v.y * 100.0).round() / 100.0)
}

/// Flatten path points into a dense polyline. Curved spans are sampled at
/// `CURVE_SEGMENTS` subdivisions; straight spans contribute their endpoints
/// directly.
pub fn expand_polyline(points: &[PathPoint]) -> Vec<Vec2> {
    let mut out = Vec::new();
    let Some(first) = points.first() else {
        return out;
    };
    out.push(first.position);
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        match a.control {
            Some(control) => {
                for i in 1..=CURVE_SEGMENTS {
                    let t = i as f32 / CURVE_SEGMENTS as f32;
                    out.push(quadratic_point(a.position, control, b.position, t));
                }
            }
            None => out.push(b.position),
        }
    }
    out
}

/// Total length of a polyline.
pub fn polyline_length(points: &[Vec2]) -> f32 {
    points.windows(2).map(|w| (w[1] - w[0]).length()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadratic_endpoints() {
        let p0 = Vec2::new(0.0, 0.0);
        let c = Vec2::new(5.0, 10.0);
        let p1 = Vec2::new(10.0, 0.0);
        assert!((quadratic_point(p0, c, p1, 0.0) - p0).length() < 0.01);
        assert!((quadratic_point(p0, c, p1, 1.0) - p1).length() < 0.01);
    }

    #[test]
    fn test_quadratic_midpoint_pulled_toward_control() {
        let p0 = Vec2::new(0.0, 0.0);
        let c = Vec2::new(5.0, 10.0);
        let p1 = Vec2::new(10.0, 0.0);
        let mid = quadratic_point(p0, c, p1, 0.5);
        // Quadratic at t=0.5 sits halfway between chord midpoint and control.
        assert!((mid - Vec2::new(5.0, 5.0)).length() < 0.01);
    }

    #[test]
    fn test_expand_straight_keeps_endpoints() {
        let points = vec![PathPoint::new(0.0, 0.0), PathPoint::new(10.0, 0.0)];
        let line = expand_polyline(&points);
        assert_eq!(line.len(), 2);
        assert!((line[0] - Vec2::new(0.0, 0.0)).length() < 0.01);
        assert!((line[1] - Vec2::new(10.0, 0.0)).length() < 0.01);
    }

    #[test]
    fn test_expand_curved_span_samples() {
        let points = vec![
            PathPoint::with_control(0.0, 0.0, 5.0, 5.0),
            PathPoint::new(10.0, 0.0),
        ];
        let line = expand_polyline(&points);
        assert_eq!(line.len(), 1 + CURVE_SEGMENTS);
        assert!((line[0] - Vec2::new(0.0, 0.0)).length() < 0.01);
        assert!((*line.last().unwrap() - Vec2::new(10.0, 0.0)).length() < 0.01);
    }

    #[test]
    fn test_expand_empty() {
        assert!(expand_polyline(&[]).is_empty());
    }

    #[test]
    fn test_round2() {
        let v = round2(Vec2::new(1.234_56, -7.891_23));
        assert_eq!(v, Vec2::new(1.23, -7.89));
    }

    #[test]
    fn test_non_finite_detected() {
        assert!(!PathPoint::new(f32::NAN, 0.0).is_finite());
        assert!(!PathPoint::new(0.0, f32::INFINITY).is_finite());
        assert!(!PathPoint::with_control(0.0, 0.0, f32::NAN, 0.0).is_finite());
        assert!(PathPoint::new(1.0, 2.0).is_finite());
    }

    #[test]
    fn test_polyline_length() {
        let line = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(3.0, 0.0),
            Vec2::new(3.0, 4.0),
        ];
        assert!((polyline_length(&line) - 7.0).abs() < 0.01);
    }
}
