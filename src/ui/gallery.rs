// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image strip for jumping between imported images.

use crate::models::project::Session;
use std::collections::HashMap;

const THUMBNAIL_SIZE: egui::Vec2 = egui::vec2(128.0, 96.0);

/// Display the strip. Returns the index of a clicked image.
pub fn show(
    ui: &mut egui::Ui,
    session: &Session,
    textures: &HashMap<u64, egui::TextureHandle>,
) -> Option<usize> {
    let current = session.current_index()?;
    let mut clicked = None;

    ui.label(format!("Image {} of {}", current + 1, session.images().len()));

    egui::ScrollArea::horizontal().show(ui, |ui| {
        ui.horizontal(|ui| {
            for (index, image) in session.images().iter().enumerate() {
                ui.vertical(|ui| {
                    let selected = index == current;
                    let response = match textures.get(&image.id) {
                        Some(texture) => {
                            let thumb = egui::Image::from_texture(egui::load::SizedTexture::new(
                                texture.id(),
                                THUMBNAIL_SIZE,
                            ))
                            .maintain_aspect_ratio(true)
                            .fit_to_exact_size(THUMBNAIL_SIZE);
                            ui.add(egui::ImageButton::new(thumb).selected(selected))
                        }
                        None => {
                            ui.add_sized(THUMBNAIL_SIZE, egui::SelectableLabel::new(selected, "…"))
                        }
                    };
                    if response.clicked() {
                        clicked = Some(index);
                    }

                    let mut caption = image.file_name.clone();
                    if !image.boxes.is_empty() {
                        caption.push_str(&format!(" · {} boxes", image.boxes.len()));
                    }
                    ui.add(egui::Label::new(egui::RichText::new(caption).small()).truncate());
                });
            }
        });
    });

    clicked
}
