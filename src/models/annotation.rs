// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the bounding boxes drawn on an image, the class
//! identifiers they refer to, and the corner handles used to resize them.
//! All coordinates are in natural image pixels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// A 2D point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Identifier of a class in the class table.
///
/// Written as a plain non-negative integer both in annotation lines and as
/// the key of the persisted class table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(pub u32);

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClassId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(ClassId)
    }
}

/// One of the four corner handles of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Handle {
    pub const ALL: [Handle; 4] = [
        Handle::NorthWest,
        Handle::NorthEast,
        Handle::SouthWest,
        Handle::SouthEast,
    ];
}

/// An axis-aligned box tied to a class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub class_id: ClassId,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64, class_id: ClassId) -> Self {
        Self {
            x,
            y,
            width,
            height,
            class_id,
        }
    }

    /// Box spanning two arbitrary corners, normalized to a top-left origin.
    pub fn from_corners(a: Point, b: Point, class_id: ClassId) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
            class_id,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn has_positive_extent(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Both sides strictly larger than `min`.
    pub fn exceeds(&self, min: f64) -> bool {
        self.width > min && self.height > min
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn corner(&self, handle: Handle) -> Point {
        match handle {
            Handle::NorthWest => Point::new(self.x, self.y),
            Handle::NorthEast => Point::new(self.right(), self.y),
            Handle::SouthWest => Point::new(self.x, self.bottom()),
            Handle::SouthEast => Point::new(self.right(), self.bottom()),
        }
    }

    /// The same box with its origin moved to `origin`.
    pub fn moved_to(&self, origin: Point) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            ..*self
        }
    }

    /// Pull `handle` to `pointer`, keeping the opposite corner fixed.
    ///
    /// The result may have non-positive extent; callers decide whether to
    /// accept it.
    pub fn resized(&self, handle: Handle, pointer: Point) -> Self {
        match handle {
            Handle::NorthWest => Self {
                x: pointer.x,
                y: pointer.y,
                width: self.right() - pointer.x,
                height: self.bottom() - pointer.y,
                ..*self
            },
            Handle::NorthEast => Self {
                y: pointer.y,
                width: pointer.x - self.x,
                height: self.bottom() - pointer.y,
                ..*self
            },
            Handle::SouthWest => Self {
                x: pointer.x,
                width: self.right() - pointer.x,
                height: pointer.y - self.y,
                ..*self
            },
            Handle::SouthEast => Self {
                width: pointer.x - self.x,
                height: pointer.y - self.y,
                ..*self
            },
        }
    }
}

/// New list with `item` inserted at `index` (clamped to the end).
pub fn insert_at<T: Clone>(items: &[T], index: usize, item: T) -> Vec<T> {
    let index = index.min(items.len());
    let mut out = Vec::with_capacity(items.len() + 1);
    out.extend_from_slice(&items[..index]);
    out.push(item);
    out.extend_from_slice(&items[index..]);
    out
}

/// New list without the element at `index`; out of range returns a copy.
pub fn remove_at<T: Clone>(items: &[T], index: usize) -> Vec<T> {
    items
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, item)| item.clone())
        .collect()
}

/// New list with the element at `index` replaced; out of range returns a copy.
pub fn replace_at<T: Clone>(items: &[T], index: usize, item: T) -> Vec<T> {
    let mut out = items.to_vec();
    if let Some(slot) = out.get_mut(index) {
        *slot = item;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> BoundingBox {
        BoundingBox::new(10.0, 10.0, 50.0, 50.0, ClassId(0))
    }

    #[test]
    fn test_resize_southeast_shrinks() {
        let resized = square().resized(Handle::SouthEast, Point::new(40.0, 40.0));
        assert_eq!(resized, BoundingBox::new(10.0, 10.0, 30.0, 30.0, ClassId(0)));
    }

    #[test]
    fn test_resize_keeps_opposite_corner() {
        let b = square();
        for handle in Handle::ALL {
            let opposite = match handle {
                Handle::NorthWest => Handle::SouthEast,
                Handle::NorthEast => Handle::SouthWest,
                Handle::SouthWest => Handle::NorthEast,
                Handle::SouthEast => Handle::NorthWest,
            };
            let resized = b.resized(handle, Point::new(30.0, 35.0));
            assert_eq!(resized.corner(opposite), b.corner(opposite), "{:?}", handle);
            assert_eq!(resized.corner(handle), Point::new(30.0, 35.0), "{:?}", handle);
        }
    }

    #[test]
    fn test_resize_past_anchor_goes_negative() {
        let resized = square().resized(Handle::SouthEast, Point::new(5.0, 5.0));
        assert!(!resized.has_positive_extent());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let b = square();
        assert!(b.contains(Point::new(10.0, 10.0)));
        assert!(b.contains(Point::new(60.0, 60.0)));
        assert!(!b.contains(Point::new(60.1, 30.0)));
    }

    #[test]
    fn test_from_corners_normalizes() {
        let b =
            BoundingBox::from_corners(Point::new(50.0, 80.0), Point::new(20.0, 30.0), ClassId(2));
        assert_eq!(b, BoundingBox::new(20.0, 30.0, 30.0, 50.0, ClassId(2)));
    }

    #[test]
    fn test_list_helpers_leave_input_untouched() {
        let items = vec![1, 2, 3];
        assert_eq!(insert_at(&items, 1, 9), vec![1, 9, 2, 3]);
        assert_eq!(insert_at(&items, 10, 9), vec![1, 2, 3, 9]);
        assert_eq!(remove_at(&items, 0), vec![2, 3]);
        assert_eq!(remove_at(&items, 7), vec![1, 2, 3]);
        assert_eq!(replace_at(&items, 2, 0), vec![1, 2, 0]);
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn test_class_id_parses_integers_only() {
        assert_eq!("12".parse::<ClassId>(), Ok(ClassId(12)));
        assert!("-1".parse::<ClassId>().is_err());
        assert!("1.5".parse::<ClassId>().is_err());
    }
}
