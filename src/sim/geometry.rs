//! Play-area geometry: Bezier travel paths and open-slot placement
//!
//! All positions are in canvas pixels with the origin at the top-left corner.
//! Circles are described by their center; player squares by their top-left
//! corner and [`PLAYER_SIZE`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::dice::Dice;
use crate::consts::{PLACEMENT_ANGLE_STEP, PLACEMENT_MAX_ITERATIONS, PLAYER_SIZE};

/// Canvas dimensions supplied by the rendering collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Whether a circle lies fully inside the canvas
    pub fn contains_circle(&self, center: Vec2, radius: f32) -> bool {
        center.x - radius >= 0.0
            && center.x + radius <= self.width
            && center.y - radius >= 0.0
            && center.y + radius <= self.height
    }

    /// Clamp the top-left corner of a square of side `size` into the canvas
    pub fn clamp_square(&self, top_left: Vec2, size: f32) -> Vec2 {
        Vec2::new(
            top_left.x.min(self.width - size).max(0.0),
            top_left.y.min(self.height - size).max(0.0),
        )
    }

    /// Top-left corner of a player square snapped to the edge nearest `point`
    ///
    /// Ties resolve top, bottom, left, right in that order.
    pub fn closest_edge_point(&self, point: Vec2) -> Vec2 {
        let top = point.y;
        let bottom = self.height - point.y;
        let left = point.x;
        let right = self.width - point.x;
        let min = top.min(bottom).min(left).min(right);

        let mut edge = point;
        if min == top {
            edge.y = 0.0;
        } else if min == bottom {
            edge.y = self.height - PLAYER_SIZE;
        } else if min == left {
            edge.x = 0.0;
        } else {
            edge.x = self.width - PLAYER_SIZE;
        }
        self.clamp_square(edge, PLAYER_SIZE)
    }
}

/// Anything that occupies a roughly circular footprint on the canvas
pub trait Placeable {
    /// Center of the footprint
    fn center(&self) -> Vec2;
    /// Distance from the center to the footprint's edge
    fn extent(&self) -> f32;
}

impl<T: Placeable> Placeable for &T {
    fn center(&self) -> Vec2 {
        (**self).center()
    }

    fn extent(&self) -> f32 {
        (**self).extent()
    }
}

/// Quadratic Bezier travel path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BezierPath {
    pub start: Vec2,
    pub control: Vec2,
    pub end: Vec2,
}

impl BezierPath {
    /// Point at parameter `t`; callers are responsible for keeping `t` in range
    #[inline]
    pub fn sample(&self, t: f32) -> Vec2 {
        sample_path(self, t)
    }
}

/// Build a curved path whose control point is the midpoint pushed by a random
/// offset of up to half the canvas in each axis
pub fn generate_random_path(start: Vec2, end: Vec2, bounds: Bounds, dice: &mut Dice) -> BezierPath {
    let mid = (start + end) * 0.5;
    let offset = Vec2::new(
        (dice.unit() - 0.5) * bounds.width,
        (dice.unit() - 0.5) * bounds.height,
    );
    BezierPath {
        start,
        control: mid + offset,
        end,
    }
}

/// Standard quadratic Bezier evaluation
#[inline]
pub fn sample_path(path: &BezierPath, t: f32) -> Vec2 {
    let u = 1.0 - t;
    path.start * (u * u) + path.control * (2.0 * u * t) + path.end * (t * t)
}

/// Circle-circle overlap using summed radii
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Strict containment of a point inside a square given by its top-left corner
#[inline]
pub fn point_in_square(point: Vec2, top_left: Vec2, size: f32) -> bool {
    point.x > top_left.x
        && point.x < top_left.x + size
        && point.y > top_left.y
        && point.y < top_left.y + size
}

/// Spiral outward from `owner` looking for a free spot for a circle of `radius`
///
/// Candidates outside the canvas or overlapping anything in `existing` are
/// rejected. Gives up after a fixed number of candidates and returns `None`,
/// which callers treat as "out of space".
pub fn find_open_position<T: Placeable>(
    owner: &impl Placeable,
    radius: f32,
    existing: &[T],
    bounds: Bounds,
    dice: &mut Dice,
) -> Option<Vec2> {
    let origin = owner.center();
    let mut distance = owner.extent() + radius;
    let mut angle = dice.angle();

    for i in 0..PLACEMENT_MAX_ITERATIONS {
        let candidate = origin + Vec2::new(angle.cos(), angle.sin()) * distance;

        if bounds.contains_circle(candidate, radius)
            && !existing
                .iter()
                .any(|e| circles_overlap(e.center(), e.extent(), candidate, radius))
        {
            return Some(candidate);
        }

        angle += PLACEMENT_ANGLE_STEP;
        if i > 0 && i % 100 == 0 {
            distance += radius * 0.5;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct Dot {
        pos: Vec2,
        r: f32,
    }

    impl Placeable for Dot {
        fn center(&self) -> Vec2 {
            self.pos
        }
        fn extent(&self) -> f32 {
            self.r
        }
    }

    #[test]
    fn test_sample_path_endpoints() {
        let path = BezierPath {
            start: Vec2::new(0.0, 0.0),
            control: Vec2::new(50.0, 100.0),
            end: Vec2::new(100.0, 0.0),
        };
        assert_eq!(sample_path(&path, 0.0), path.start);
        assert_eq!(sample_path(&path, 1.0), path.end);
        // Midpoint of a symmetric curve sits halfway to the control point
        let mid = sample_path(&path, 0.5);
        assert!((mid.x - 50.0).abs() < 1e-4);
        assert!((mid.y - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_random_path_keeps_endpoints() {
        let mut dice = Dice::new(1);
        let bounds = Bounds::new(800.0, 600.0);
        let start = Vec2::new(10.0, 20.0);
        let end = Vec2::new(700.0, 500.0);
        let path = generate_random_path(start, end, bounds, &mut dice);
        assert_eq!(path.start, start);
        assert_eq!(path.end, end);
        let mid = (start + end) * 0.5;
        assert!((path.control.x - mid.x).abs() <= 400.0);
        assert!((path.control.y - mid.y).abs() <= 300.0);
    }

    #[test]
    fn test_closest_edge_point() {
        let bounds = Bounds::new(800.0, 600.0);
        // Near the top
        assert_eq!(bounds.closest_edge_point(Vec2::new(400.0, 5.0)), Vec2::new(400.0, 0.0));
        // Near the bottom
        assert_eq!(
            bounds.closest_edge_point(Vec2::new(400.0, 590.0)),
            Vec2::new(400.0, 550.0)
        );
        // Near the left
        assert_eq!(bounds.closest_edge_point(Vec2::new(3.0, 300.0)), Vec2::new(0.0, 300.0));
        // Near the right, clamped so the square stays inside
        assert_eq!(
            bounds.closest_edge_point(Vec2::new(799.0, 300.0)),
            Vec2::new(750.0, 300.0)
        );
        // Near a corner the square is clamped on both axes
        assert_eq!(
            bounds.closest_edge_point(Vec2::new(795.0, 2.0)),
            Vec2::new(750.0, 0.0)
        );
    }

    #[test]
    fn test_point_in_square_is_strict() {
        let tl = Vec2::new(10.0, 10.0);
        assert!(point_in_square(Vec2::new(35.0, 35.0), tl, 50.0));
        assert!(!point_in_square(Vec2::new(10.0, 35.0), tl, 50.0));
        assert!(!point_in_square(Vec2::new(61.0, 35.0), tl, 50.0));
    }

    #[test]
    fn test_find_open_position_none_when_canvas_too_small() {
        let mut dice = Dice::new(3);
        let bounds = Bounds::new(10.0, 10.0);
        let owner = Dot { pos: Vec2::new(5.0, 5.0), r: 5.0 };
        let none: [Dot; 0] = [];
        assert!(find_open_position(&owner, 20.0, &none, bounds, &mut dice).is_none());
    }

    #[test]
    fn test_find_open_position_fills_up() {
        // Repeated placement eventually runs out of room but never overlaps
        let mut dice = Dice::new(11);
        let bounds = Bounds::new(120.0, 120.0);
        let owner = Dot { pos: Vec2::new(60.0, 60.0), r: 25.0 };
        let mut placed: Vec<Dot> = Vec::new();
        while let Some(pos) = find_open_position(&owner, 10.0, &placed, bounds, &mut dice) {
            placed.push(Dot { pos, r: 10.0 });
            assert!(placed.len() < 200, "placement never exhausted");
        }
        assert!(!placed.is_empty());
    }

    proptest! {
        #[test]
        fn prop_open_position_is_free_and_in_bounds(
            seed in any::<u64>(),
            ox in 0.0f32..750.0,
            oy in 0.0f32..550.0,
            radius in 2.0f32..20.0,
            others in prop::collection::vec((0.0f32..800.0, 0.0f32..600.0, 2.0f32..20.0), 0..40),
        ) {
            let mut dice = Dice::new(seed);
            let bounds = Bounds::new(800.0, 600.0);
            let owner = Dot { pos: Vec2::new(ox + 25.0, oy + 25.0), r: 25.0 };
            let existing: Vec<Dot> = others
                .into_iter()
                .map(|(x, y, r)| Dot { pos: Vec2::new(x, y), r })
                .collect();

            if let Some(pos) = find_open_position(&owner, radius, &existing, bounds, &mut dice) {
                prop_assert!(pos.x - radius >= 0.0);
                prop_assert!(pos.x + radius <= bounds.width);
                prop_assert!(pos.y - radius >= 0.0);
                prop_assert!(pos.y + radius <= bounds.height);
                for e in &existing {
                    prop_assert!(e.pos.distance(pos) >= e.r + radius);
                }
            }
        }
    }
}
