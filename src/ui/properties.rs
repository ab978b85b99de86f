// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Class and annotation side panel.
//!
//! This module provides the class list, with an edit mode for renaming,
//! recoloring, adding and removing classes, and the list of boxes on the
//! current image.

use super::color32;
use crate::models::annotation::ClassId;
use crate::models::classes::ClassColor;
use crate::models::project::Session;

/// Result of side panel interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertiesAction {
    None,
    SelectClass(ClassId),
    AddClass,
    RenameClass(ClassId, String),
    RecolorClass(ClassId, ClassColor),
    RemoveClass(ClassId),
    SelectBox(usize),
    DeleteBox(usize),
}

/// Display the side panel.
pub fn show(ui: &mut egui::Ui, session: &Session, edit_mode: &mut bool) -> PropertiesAction {
    let mut action = PropertiesAction::None;

    ui.horizontal(|ui| {
        ui.heading("Classes");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let label = if *edit_mode { "✔ Done" } else { "✏ Edit" };
            if ui.selectable_label(*edit_mode, label).clicked() {
                *edit_mode = !*edit_mode;
            }
        });
    });
    ui.separator();

    if session.classes().is_empty() {
        ui.label(egui::RichText::new("No classes, add one in edit mode").weak());
    }

    for (id, info) in session.classes().iter() {
        ui.horizontal(|ui| {
            if *edit_mode {
                let mut rgb = info.color.0;
                if ui.color_edit_button_srgb(&mut rgb).changed() {
                    action = PropertiesAction::RecolorClass(id, ClassColor(rgb));
                }
                let mut name = info.name.clone();
                if ui
                    .add(egui::TextEdit::singleline(&mut name).desired_width(130.0))
                    .changed()
                {
                    action = PropertiesAction::RenameClass(id, name);
                }
                if ui.small_button("🗑").on_hover_text("Remove class").clicked() {
                    action = PropertiesAction::RemoveClass(id);
                }
            } else {
                let (swatch, _) =
                    ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                ui.painter()
                    .circle_filled(swatch.center(), 6.0, color32(info.color));
                let active = session.active_class() == id;
                if ui
                    .selectable_label(active, format!("{}  ({})", info.name, id))
                    .clicked()
                {
                    action = PropertiesAction::SelectClass(id);
                }
            }
        });
    }

    if *edit_mode && ui.button("＋ Add Class").clicked() {
        action = PropertiesAction::AddClass;
    }

    ui.add_space(12.0);
    ui.heading("Annotations");
    ui.separator();

    let boxes = session.current_boxes();
    if boxes.is_empty() {
        ui.label(egui::RichText::new("No boxes on this image").weak());
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for (index, b) in boxes.iter().enumerate() {
            let (name, color) = session.classes().resolve(b.class_id);
            ui.horizontal(|ui| {
                let (swatch, _) =
                    ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                ui.painter().rect_filled(swatch, 2.0, color32(color));
                let selected = session.selected_box() == Some(index);
                let text = format!(
                    "{} {}: {:.0}x{:.0} at ({:.0}, {:.0})",
                    index + 1,
                    name,
                    b.width,
                    b.height,
                    b.x,
                    b.y
                );
                if ui.selectable_label(selected, text).clicked() {
                    action = PropertiesAction::SelectBox(index);
                }
                if ui.small_button("🗑").on_hover_text("Delete box").clicked() {
                    action = PropertiesAction::DeleteBox(index);
                }
            });
        }
    });

    action
}
