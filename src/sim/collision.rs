//! Axis-aligned collision primitives
//!
//! Everything here is a pure function of its inputs. The shape mix is
//! deliberate: tanks block on obstacles as squares, bullets hit tanks as
//! circles and hit obstacles as bare points.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};

/// Axis-aligned rectangle, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of the given size centered on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::new(
            center.x - size.x / 2.0,
            center.y - size.y / 2.0,
            size.x,
            size.y,
        )
    }

    /// Strict overlap: both axis intervals intersect with positive width.
    /// Rectangles that merely share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    /// Strict interior test; boundary points do not count
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x > self.x && p.x < self.x + self.w && p.y > self.y && p.y < self.y + self.h
    }
}

/// True when two points lie closer than `radius`
#[inline]
pub fn within_radius(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) < radius * radius
}

/// True when `pos` lies inside the world, inset by `margin` on every side
#[inline]
pub fn in_world_bounds(pos: Vec2, margin: f32) -> bool {
    pos.x >= margin
        && pos.x <= WORLD_WIDTH - margin
        && pos.y >= margin
        && pos.y <= WORLD_HEIGHT - margin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(a.overlaps(&Rect::new(-5.0, -5.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(20.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_rect_overlap_shared_edge_is_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(0.0, 10.0, 10.0, 10.0)));
    }

    #[test]
    fn test_contains_point_is_strict() {
        let r = Rect::new(100.0, 100.0, 50.0, 50.0);
        assert!(r.contains_point(Vec2::new(125.0, 125.0)));
        assert!(!r.contains_point(Vec2::new(100.0, 125.0)));
        assert!(!r.contains_point(Vec2::new(150.0, 125.0)));
        assert!(!r.contains_point(Vec2::new(99.0, 125.0)));
    }

    #[test]
    fn test_centered() {
        let r = Rect::centered(Vec2::new(50.0, 50.0), Vec2::splat(30.0));
        assert_eq!(r, Rect::new(35.0, 35.0, 30.0, 30.0));
    }

    #[test]
    fn test_within_radius() {
        let a = Vec2::new(0.0, 0.0);
        assert!(within_radius(a, Vec2::new(3.0, 4.0), 5.1));
        assert!(!within_radius(a, Vec2::new(3.0, 4.0), 5.0)); // exactly 5 away
    }

    #[test]
    fn test_in_world_bounds_margins() {
        assert!(in_world_bounds(Vec2::new(15.0, 15.0), 15.0));
        assert!(in_world_bounds(Vec2::new(1185.0, 785.0), 15.0));
        assert!(!in_world_bounds(Vec2::new(14.0, 400.0), 15.0));
        assert!(!in_world_bounds(Vec2::new(600.0, 786.0), 15.0));
    }
}
