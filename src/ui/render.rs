// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scene composition for the canvas.
//!
//! The scene is rebuilt from scratch every frame from the current boxes,
//! class table and selection: outlines in the class color, corner handles
//! on the selected box, and a filled label above each box. Sizes are
//! relative to the image with a floor so thin lines and small text stay
//! visible on small images. Everything here is in image pixels; the
//! canvas maps it to the screen.

use crate::models::annotation::{BoundingBox, Handle, Point};
use crate::models::classes::{ClassColor, ClassTable};

/// Line, handle and text sizes for one image, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub line_width: f64,
    pub handle_size: f64,
    pub font_size: f64,
    pub label_padding: f64,
}

impl RenderStyle {
    pub fn for_surface(width: u32, height: u32) -> Self {
        let longest = width.max(height) as f64;
        let height = height as f64;
        Self {
            line_width: (longest * 0.004).max(2.0),
            handle_size: (longest * 0.016).max(8.0),
            font_size: (height * 0.03).max(14.0),
            label_padding: (height * 0.005).max(2.0),
        }
    }

    pub fn label_height(&self) -> f64 {
        self.font_size * 1.2
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<&BoundingBox> for Rect {
    fn from(b: &BoundingBox) -> Self {
        Self {
            x: b.x,
            y: b.y,
            width: b.width,
            height: b.height,
        }
    }
}

/// One drawing operation, in image pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    StrokeRect {
        rect: Rect,
        color: ClassColor,
        width: f64,
    },
    FillRect {
        rect: Rect,
        color: ClassColor,
    },
    /// Text on a filled background whose width is fitted to the text when painted.
    Label {
        /// Top-left corner of the background.
        origin: Point,
        height: f64,
        padding: f64,
        font_size: f64,
        text: String,
        background: ClassColor,
        text_color: ClassColor,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub primitives: Vec<Primitive>,
}

/// Build the scene for one image.
///
/// `preview` is the box being drawn, if any; it gets an outline only.
pub fn compose(
    width: u32,
    height: u32,
    boxes: &[BoundingBox],
    classes: &ClassTable,
    selected: Option<usize>,
    preview: Option<&BoundingBox>,
) -> Scene {
    let style = RenderStyle::for_surface(width, height);
    let mut primitives = Vec::with_capacity(boxes.len() * 2 + 5);

    for (index, b) in boxes.iter().enumerate() {
        let (name, color) = classes.resolve(b.class_id);

        primitives.push(Primitive::StrokeRect {
            rect: b.into(),
            color,
            width: style.line_width,
        });

        if selected == Some(index) {
            for handle in Handle::ALL {
                let c = b.corner(handle);
                primitives.push(Primitive::FillRect {
                    rect: Rect {
                        x: c.x - style.handle_size / 2.0,
                        y: c.y - style.handle_size / 2.0,
                        width: style.handle_size,
                        height: style.handle_size,
                    },
                    color,
                });
            }
        }

        if b.has_positive_extent() {
            primitives.push(label_for(b, name, color, &style));
        }
    }

    if let Some(p) = preview {
        let (_, color) = classes.resolve(p.class_id);
        primitives.push(Primitive::StrokeRect {
            rect: p.into(),
            color,
            width: style.line_width,
        });
    }

    Scene { primitives }
}

fn label_for(b: &BoundingBox, name: &str, color: ClassColor, style: &RenderStyle) -> Primitive {
    let height = style.label_height();
    let above = b.y - style.label_padding - height;
    // No room above the image top: tuck the label inside the box
    let y = if above < 0.0 { b.y } else { above };
    Primitive::Label {
        origin: Point::new(b.x - style.label_padding, y),
        height,
        padding: style.label_padding,
        font_size: style.font_size,
        text: name.to_string(),
        background: color,
        text_color: color.contrasting_text(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::ClassId;
    use crate::models::classes::{PALETTE, UNKNOWN_COLOR};

    fn boxes() -> Vec<BoundingBox> {
        vec![
            BoundingBox::new(100.0, 200.0, 50.0, 40.0, ClassId(0)),
            BoundingBox::new(10.0, 5.0, 30.0, 30.0, ClassId(9)),
        ]
    }

    #[test]
    fn test_style_has_floors() {
        let small = RenderStyle::for_surface(100, 100);
        assert_eq!(small.line_width, 2.0);
        assert_eq!(small.handle_size, 8.0);
        assert_eq!(small.font_size, 14.0);

        let large = RenderStyle::for_surface(4000, 2000);
        assert_eq!(large.line_width, 16.0);
        assert_eq!(large.font_size, 60.0);
    }

    #[test]
    fn test_outline_then_label_per_box() {
        let scene = compose(1000, 1000, &boxes(), &ClassTable::with_defaults(), None, None);
        assert_eq!(scene.primitives.len(), 4);
        assert!(matches!(
            scene.primitives[0],
            Primitive::StrokeRect { color, .. } if color == PALETTE[0]
        ));
        match &scene.primitives[1] {
            Primitive::Label { text, origin, height, .. } => {
                assert_eq!(text, "Class 0");
                assert!(origin.y + height < 200.0);
            }
            other => panic!("expected label, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_class_is_gray() {
        let scene = compose(1000, 1000, &boxes(), &ClassTable::with_defaults(), None, None);
        assert!(matches!(
            scene.primitives[2],
            Primitive::StrokeRect { color, .. } if color == UNKNOWN_COLOR
        ));
        match &scene.primitives[3] {
            Primitive::Label { text, origin, .. } => {
                assert_eq!(text, "Unknown");
                // too close to the top edge to fit above
                assert_eq!(origin.y, 5.0);
            }
            other => panic!("expected label, got {:?}", other),
        }
    }

    #[test]
    fn test_selected_box_gets_four_handles() {
        let scene = compose(1000, 1000, &boxes(), &ClassTable::with_defaults(), Some(0), None);
        let handles = scene
            .primitives
            .iter()
            .filter(|p| matches!(p, Primitive::FillRect { .. }))
            .count();
        assert_eq!(handles, 4);
    }

    #[test]
    fn test_preview_has_no_label() {
        let preview = BoundingBox::new(1.0, 1.0, 3.0, 3.0, ClassId(1));
        let scene = compose(1000, 1000, &[], &ClassTable::with_defaults(), None, Some(&preview));
        assert_eq!(scene.primitives.len(), 1);
        assert!(matches!(
            scene.primitives[0],
            Primitive::StrokeRect { color, .. } if color == PALETTE[1]
        ));
    }

    #[test]
    fn test_degenerate_box_has_no_label() {
        let flat = [BoundingBox::new(1.0, 1.0, 0.0, 3.0, ClassId(0))];
        let scene = compose(100, 100, &flat, &ClassTable::with_defaults(), None, None);
        assert_eq!(scene.primitives.len(), 1);
    }
}
