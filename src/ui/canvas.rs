// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for image display and box annotation.
//!
//! This module fits the active image into the viewport, paints the composed
//! scene on top of it, and turns raw pointer input into image-space pointer
//! events for the box editor.

use super::render::{Primitive, Scene};
use super::{color32, to_point, to_pos};
use crate::models::annotation::Point;
use crate::models::project::ImageRecord;
use crate::util::geometry::{Size, Viewport};

/// Pointer event in image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasAction {
    PointerDown(Point),
    PointerMove(Point),
    PointerUp(Point),
    PointerLeave,
}

pub struct CanvasResponse {
    /// Events of this frame, in the order they happened.
    pub actions: Vec<CanvasAction>,
    /// Pointer position over the image, in image pixels.
    pub hover: Option<Point>,
}

/// Display the canvas area and report pointer interaction.
pub fn show(
    ui: &mut egui::Ui,
    image: Option<&ImageRecord>,
    texture: Option<&egui::TextureHandle>,
    scene: &Scene,
    canvas_height: f32,
) -> CanvasResponse {
    let mut result = CanvasResponse {
        actions: Vec::new(),
        hover: None,
    };

    let height = canvas_height.min(ui.available_height()).max(100.0);
    let desired = egui::vec2(ui.available_width(), height);
    let (response, painter) = ui.allocate_painter(desired, egui::Sense::click_and_drag());
    let bounds = response.rect;
    painter.rect_filled(bounds, 0.0, egui::Color32::from_gray(40));

    let Some(image) = image else {
        painter.text(
            bounds.center(),
            egui::Align2::CENTER_CENTER,
            "Import images to begin annotating",
            egui::FontId::proportional(16.0),
            egui::Color32::from_gray(180),
        );
        return result;
    };

    let Some(texture) = texture else {
        // Not drawable until the texture exists; the next frame will retry
        painter.text(
            bounds.center(),
            egui::Align2::CENTER_CENTER,
            "Loading image...",
            egui::FontId::proportional(16.0),
            egui::Color32::WHITE,
        );
        return result;
    };

    let viewport = Viewport::fit(
        Size::new(image.width as f64, image.height as f64),
        to_point(bounds.min),
        Size::new(bounds.width() as f64, bounds.height() as f64),
    );
    let image_rect = egui::Rect::from_min_size(
        to_pos(viewport.origin),
        egui::vec2(viewport.displayed.width as f32, viewport.displayed.height as f32),
    );

    painter.image(
        texture.id(),
        image_rect,
        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
        egui::Color32::WHITE,
    );
    paint_scene(&painter.with_clip_rect(image_rect), scene, &viewport);

    let sample = ui.input(|i| {
        let pos = i.pointer.interact_pos().map(to_point);
        PointerSample {
            position: pos.map(|p| viewport.to_image(p)),
            inside: pos.is_some_and(|p| viewport.contains_screen(p)),
            hovered: response.hovered(),
            pressed: i.pointer.primary_pressed(),
            down: i.pointer.primary_down(),
            released: i.pointer.primary_released(),
        }
    });
    if sample.inside {
        result.hover = sample.position;
    }
    result.actions = pointer_actions(&sample);

    result
}

/// Primary button state for one frame, with the position in image pixels.
#[derive(Debug, Clone, Copy, Default)]
struct PointerSample {
    position: Option<Point>,
    /// Pointer is over the displayed image.
    inside: bool,
    /// Canvas widget is hovered (not covered by another window).
    hovered: bool,
    pressed: bool,
    down: bool,
    released: bool,
}

/// Translate one frame of button state into editor events.
///
/// A press and release within the same frame yields both events, so a quick
/// tap never leaves an interaction open.
fn pointer_actions(sample: &PointerSample) -> Vec<CanvasAction> {
    let Some(p) = sample.position else {
        return if sample.down {
            vec![CanvasAction::PointerLeave]
        } else {
            Vec::new()
        };
    };

    if sample.pressed && sample.inside && sample.hovered {
        let mut actions = vec![CanvasAction::PointerDown(p)];
        if sample.released {
            actions.push(CanvasAction::PointerUp(p));
        }
        actions
    } else if sample.released {
        vec![CanvasAction::PointerUp(p)]
    } else if sample.down && !sample.inside {
        vec![CanvasAction::PointerLeave]
    } else if sample.down {
        vec![CanvasAction::PointerMove(p)]
    } else {
        Vec::new()
    }
}

/// Paint `scene` with image coordinates mapped through `viewport`.
fn paint_scene(painter: &egui::Painter, scene: &Scene, viewport: &Viewport) {
    let scale = viewport.scale() as f32;
    let screen_rect = |x: f64, y: f64, w: f64, h: f64| {
        let min = to_pos(viewport.to_screen(Point::new(x, y)));
        egui::Rect::from_min_size(min, egui::vec2(w as f32 * scale, h as f32 * scale))
    };

    for primitive in &scene.primitives {
        match primitive {
            Primitive::StrokeRect { rect, color, width } => {
                painter.rect_stroke(
                    screen_rect(rect.x, rect.y, rect.width, rect.height),
                    0.0,
                    egui::Stroke::new((*width as f32 * scale).max(1.0), color32(*color)),
                );
            }
            Primitive::FillRect { rect, color } => {
                painter.rect_filled(
                    screen_rect(rect.x, rect.y, rect.width, rect.height),
                    0.0,
                    color32(*color),
                );
            }
            Primitive::Label {
                origin,
                height,
                padding,
                font_size,
                text,
                background,
                text_color,
            } => {
                let font = egui::FontId::proportional((*font_size as f32 * scale).max(8.0));
                let galley = painter.layout_no_wrap(text.clone(), font, color32(*text_color));
                let pad = *padding as f32 * scale;
                let bg_size = egui::vec2(
                    galley.size().x + pad * 2.0,
                    (*height as f32 * scale).max(galley.size().y),
                );
                let bg = egui::Rect::from_min_size(to_pos(viewport.to_screen(*origin)), bg_size);
                painter.rect_filled(bg, 0.0, color32(*background));
                let text_pos = egui::pos2(bg.min.x + pad, bg.center().y - galley.size().y / 2.0);
                painter.galley(text_pos, galley, color32(*text_color));
            }
        }
    }
}
