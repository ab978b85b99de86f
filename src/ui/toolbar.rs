// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar and tool selection UI.
//!
//! This module provides the toolbar for importing and exporting, switching
//! between drawing and editing, deleting boxes and images, and moving
//! between images.

use crate::models::project::{Session, Tool};

/// Result of toolbar interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    None,
    Import,
    Export,
    SetTool(Tool),
    DeleteSelectedBox,
    RemoveImage,
    PreviousImage,
    NextImage,
}

/// Display the toolbar.
pub fn show(ui: &mut egui::Ui, session: &Session) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let tool = session.tool();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.button("📂 Import").clicked() {
            action = ToolbarAction::Import;
        }

        if ui
            .add_enabled(session.has_images(), egui::Button::new("💾 Export"))
            .clicked()
        {
            action = ToolbarAction::Export;
        }

        ui.separator();

        ui.label("Tools:");

        if ui.selectable_label(tool == Tool::Draw, "▭ Draw Box (D)").clicked() {
            action = ToolbarAction::SetTool(Tool::Draw);
        }

        if ui.selectable_label(tool == Tool::Edit, "✏ Edit (E)").clicked() {
            action = ToolbarAction::SetTool(Tool::Edit);
        }

        ui.separator();

        if ui
            .add_enabled(session.selected_box().is_some(), egui::Button::new("🗑 Delete Box"))
            .clicked()
        {
            action = ToolbarAction::DeleteSelectedBox;
        }

        if ui
            .add_enabled(session.has_images(), egui::Button::new("Remove Image"))
            .clicked()
        {
            action = ToolbarAction::RemoveImage;
        }

        ui.separator();

        if ui
            .add_enabled(session.has_previous(), egui::Button::new("◀ Previous"))
            .clicked()
        {
            action = ToolbarAction::PreviousImage;
        }

        if ui.add_enabled(session.has_next(), egui::Button::new("Next ▶")).clicked() {
            action = ToolbarAction::NextImage;
        }

        ui.separator();

        let tool_text = match tool {
            Tool::Draw => "Drag on the image to draw a box with the active class",
            Tool::Edit => "Click a box to select it, drag to move, pull a corner to resize",
        };

        ui.label(egui::RichText::new(tool_text).italics().weak());
    });

    action
}
