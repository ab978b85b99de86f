// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the labelling application.

pub mod canvas;
pub mod gallery;
pub mod properties;
pub mod render;
pub mod toolbar;

use crate::models::annotation::Point;
use crate::models::classes::ClassColor;

pub(crate) fn color32(color: ClassColor) -> egui::Color32 {
    let [r, g, b] = color.0;
    egui::Color32::from_rgb(r, g, b)
}

pub(crate) fn to_point(pos: egui::Pos2) -> Point {
    Point::new(pos.x as f64, pos.y as f64)
}

pub(crate) fn to_pos(point: Point) -> egui::Pos2 {
    egui::pos2(point.x as f32, point.y as f32)
}
