// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the coordinate transformations between the
//! on-screen canvas and natural image pixels, the conversion between pixel
//! boxes and normalized center/size boxes, and hit-testing of boxes and
//! their corner handles.

use crate::models::annotation::{BoundingBox, ClassId, Handle, Point};

/// Width and height in some coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Largest size with the aspect ratio of `natural` that fits inside `bounds`.
pub fn fit_within(natural: Size, bounds: Size) -> Size {
    if natural.width <= 0.0
        || natural.height <= 0.0
        || bounds.width <= 0.0
        || bounds.height <= 0.0
    {
        return Size::new(0.0, 0.0);
    }
    let image_aspect = natural.width / natural.height;
    let bounds_aspect = bounds.width / bounds.height;
    if image_aspect > bounds_aspect {
        // Image is wider - width constrains
        Size::new(bounds.width, bounds.width / image_aspect)
    } else {
        Size::new(bounds.height * image_aspect, bounds.height)
    }
}

/// Placement of an image on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Top-left corner of the displayed image, in screen units.
    pub origin: Point,
    pub displayed: Size,
    pub natural: Size,
}

impl Viewport {
    /// Fit `natural` into `bounds` anchored at `bounds_origin`, centered.
    pub fn fit(natural: Size, bounds_origin: Point, bounds: Size) -> Self {
        let displayed = fit_within(natural, bounds);
        Self {
            origin: Point::new(
                bounds_origin.x + (bounds.width - displayed.width) / 2.0,
                bounds_origin.y + (bounds.height - displayed.height) / 2.0,
            ),
            displayed,
            natural,
        }
    }

    /// Screen units per image pixel.
    pub fn scale(&self) -> f64 {
        if self.natural.width > 0.0 {
            self.displayed.width / self.natural.width
        } else {
            0.0
        }
    }

    pub fn contains_screen(&self, screen: Point) -> bool {
        screen.x >= self.origin.x
            && screen.x <= self.origin.x + self.displayed.width
            && screen.y >= self.origin.y
            && screen.y <= self.origin.y + self.displayed.height
    }

    /// Screen position to image pixels, clamped to the image bounds.
    pub fn to_image(&self, screen: Point) -> Point {
        if self.displayed.width <= 0.0 || self.displayed.height <= 0.0 {
            return Point::default();
        }
        let scale_x = self.natural.width / self.displayed.width;
        let scale_y = self.natural.height / self.displayed.height;
        Point::new(
            ((screen.x - self.origin.x) * scale_x).clamp(0.0, self.natural.width),
            ((screen.y - self.origin.y) * scale_y).clamp(0.0, self.natural.height),
        )
    }

    /// Image pixels to screen position. Not clamped.
    pub fn to_screen(&self, image: Point) -> Point {
        let scale = self.scale();
        Point::new(self.origin.x + image.x * scale, self.origin.y + image.y * scale)
    }
}

/// A box as fractions of the image size, measured from its center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}

/// Convert a pixel box to normalized center/size coordinates.
pub fn normalize_box(b: &BoundingBox, width: u32, height: u32) -> NormalizedBox {
    let (w, h) = (width as f64, height as f64);
    NormalizedBox {
        x_center: (b.x + b.width / 2.0) / w,
        y_center: (b.y + b.height / 2.0) / h,
        width: b.width / w,
        height: b.height / h,
    }
}

/// Convert normalized center/size coordinates to a pixel box.
pub fn denormalize_box(
    n: &NormalizedBox,
    class_id: ClassId,
    width: u32,
    height: u32,
) -> BoundingBox {
    let (w, h) = (width as f64, height as f64);
    let box_width = n.width * w;
    let box_height = n.height * h;
    BoundingBox {
        x: n.x_center * w - box_width / 2.0,
        y: n.y_center * h - box_height / 2.0,
        width: box_width,
        height: box_height,
        class_id,
    }
}

/// What a pointer position landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Handle { index: usize, handle: Handle },
    Body { index: usize },
}

/// Find what lies under `p`.
///
/// Handles are only considered for the selected box, and win over bodies.
/// Bodies are searched last-drawn first so the topmost box wins.
pub fn hit_test(
    boxes: &[BoundingBox],
    handle_box: Option<usize>,
    p: Point,
    handle_radius: f64,
) -> Option<Hit> {
    if let Some((index, b)) = handle_box.and_then(|i| boxes.get(i).map(|b| (i, b))) {
        for handle in Handle::ALL {
            let corner = b.corner(handle);
            if (p.x - corner.x).abs() <= handle_radius && (p.y - corner.y).abs() <= handle_radius {
                return Some(Hit::Handle { index, handle });
            }
        }
    }

    boxes
        .iter()
        .enumerate()
        .rev()
        .find(|(_, b)| b.contains(p))
        .map(|(index, _)| Hit::Body { index })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_denormalize_roundtrip() {
        let b = BoundingBox::new(960.0, 540.0, 100.0, 50.0, ClassId(3));
        let normalized = normalize_box(&b, 1920, 1080);
        assert!((normalized.x_center - 0.526041).abs() < 1e-6);
        let back = denormalize_box(&normalized, ClassId(3), 1920, 1080);

        assert!((back.x - b.x).abs() < 0.0001);
        assert!((back.y - b.y).abs() < 0.0001);
        assert!((back.width - b.width).abs() < 0.0001);
        assert!((back.height - b.height).abs() < 0.0001);
    }

    #[test]
    fn test_normalize_full_image() {
        let n = normalize_box(&BoundingBox::new(0.0, 0.0, 1920.0, 1080.0, ClassId(0)), 1920, 1080);
        assert_eq!(n, NormalizedBox { x_center: 0.5, y_center: 0.5, width: 1.0, height: 1.0 });
    }

    #[test]
    fn test_fit_wide_and_tall() {
        let bounds = Size::new(800.0, 600.0);
        assert_eq!(fit_within(Size::new(1600.0, 400.0), bounds), Size::new(800.0, 200.0));
        assert_eq!(fit_within(Size::new(300.0, 1200.0), bounds), Size::new(150.0, 600.0));
        assert_eq!(fit_within(Size::new(0.0, 10.0), bounds), Size::new(0.0, 0.0));
    }

    #[test]
    fn test_screen_to_image_scales_and_clamps() {
        // 2000x1000 image shown at 400x200, letterboxed vertically in 400x400
        let vp = Viewport::fit(
            Size::new(2000.0, 1000.0),
            Point::new(10.0, 20.0),
            Size::new(400.0, 400.0),
        );
        assert_eq!(vp.origin, Point::new(10.0, 120.0));
        assert_eq!(vp.to_image(Point::new(110.0, 170.0)), Point::new(500.0, 250.0));
        assert_eq!(vp.to_image(Point::new(0.0, 0.0)), Point::new(0.0, 0.0));
        assert_eq!(vp.to_image(Point::new(999.0, 999.0)), Point::new(2000.0, 1000.0));
        assert_eq!(vp.to_screen(Point::new(500.0, 250.0)), Point::new(110.0, 170.0));
    }

    #[test]
    fn test_overlap_hits_last_inserted() {
        let boxes = [
            BoundingBox::new(0.0, 0.0, 100.0, 100.0, ClassId(0)),
            BoundingBox::new(50.0, 50.0, 100.0, 100.0, ClassId(1)),
        ];
        let hit = |x, y| hit_test(&boxes, None, Point::new(x, y), 10.0);
        assert_eq!(hit(75.0, 75.0), Some(Hit::Body { index: 1 }));
        assert_eq!(hit(25.0, 25.0), Some(Hit::Body { index: 0 }));
        assert_eq!(hit_test(&boxes, None, Point::new(175.0, 25.0), 10.0), None);
    }

    #[test]
    fn test_handles_only_on_selected_box_and_take_priority() {
        let boxes = [
            BoundingBox::new(0.0, 0.0, 100.0, 100.0, ClassId(0)),
            BoundingBox::new(95.0, 95.0, 50.0, 50.0, ClassId(0)),
        ];
        let p = Point::new(98.0, 98.0);
        assert_eq!(hit_test(&boxes, None, p, 10.0), Some(Hit::Body { index: 1 }));
        assert_eq!(
            hit_test(&boxes, Some(0), p, 10.0),
            Some(Hit::Handle { index: 0, handle: Handle::SouthEast })
        );
        // just outside the box but within the handle tolerance
        assert_eq!(
            hit_test(&boxes, Some(1), Point::new(150.0, 85.0), 10.0),
            Some(Hit::Handle { index: 1, handle: Handle::NorthEast })
        );
    }
}
