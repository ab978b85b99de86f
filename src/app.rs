// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module contains the main application structure that implements
//! the eframe::App trait. It owns the session, the box editor and the GPU
//! textures, runs imports and exports on background threads, and routes
//! actions from the UI components back into the session.

use crate::config::AppConfig;
use crate::io::archive;
use crate::io::import::{self, ImportOutcome, ImportSource};
use crate::models::annotation::{Handle, Point};
use crate::models::interaction::{BoxEditor, EditorSettings, Interaction};
use crate::models::project::{Session, Tool};
use crate::ui::canvas::{self, CanvasAction};
use crate::ui::properties::{self, PropertiesAction};
use crate::ui::toolbar::{self, ToolbarAction};
use crate::ui::{gallery, render};
use crate::util::geometry::Hit;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};

const IMPORT_EXTENSIONS: [&str; 10] = [
    "jpg", "jpeg", "png", "bmp", "gif", "webp", "tif", "tiff", "tga", "txt",
];

/// Message shown in the status bar.
struct Status {
    text: String,
    is_error: bool,
}

/// Main application state.
pub struct BoxLabelApp {
    config: AppConfig,

    /// Images, boxes, classes and selection
    session: Session,

    /// Pointer interaction with the canvas
    editor: BoxEditor,

    /// Uploaded image textures by image id
    textures: HashMap<u64, egui::TextureHandle>,

    /// Receiver for background imports
    import_loader: Option<Receiver<ImportOutcome>>,

    /// Receiver for background exports
    export_task: Option<Receiver<anyhow::Result<PathBuf>>>,

    /// Loading state message
    loading_message: Option<String>,

    status: Option<Status>,

    /// Whether the class panel shows its editing controls
    class_edit_mode: bool,

    /// Close was requested with images loaded; waiting for the user
    confirm_close: bool,

    /// The user confirmed losing unsaved work
    allow_close: bool,

    /// Getting-started window is open
    show_welcome: bool,
}

impl BoxLabelApp {
    /// Create a new application instance.
    pub fn new(config: AppConfig, session: Session) -> Self {
        let show_welcome = config.show_welcome;
        let editor = BoxEditor::new(EditorSettings {
            handle_radius: config.handle_radius,
            min_box_size: config.min_box_size,
        });
        Self {
            config,
            session,
            editor,
            textures: HashMap::new(),
            import_loader: None,
            export_task: None,
            loading_message: None,
            status: None,
            class_edit_mode: false,
            confirm_close: false,
            allow_close: false,
            show_welcome,
        }
    }

    fn report_info(&mut self, text: impl Into<String>) {
        self.status = Some(Status {
            text: text.into(),
            is_error: false,
        });
    }

    fn report_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::error!("{}", text);
        self.status = Some(Status { text, is_error: true });
    }

    fn report_store<T>(&mut self, result: Result<T, crate::error::StoreError>) {
        if let Err(e) = result {
            self.report_error(format!("Classes not saved: {}", e));
        }
    }

    /// Import files on a background thread.
    fn start_import(&mut self, sources: Vec<ImportSource>) {
        if sources.is_empty() {
            return;
        }
        if self.import_loader.is_some() {
            self.report_error("An import is already running");
            return;
        }
        log::info!("Importing {} files", sources.len());
        self.loading_message = Some(format!("Importing {} files...", sources.len()));
        self.import_loader = Some(import::spawn_import(sources));
    }

    fn open_import_dialog(&mut self) {
        if let Some(paths) = rfd::FileDialog::new()
            .add_filter("Images & annotations", &IMPORT_EXTENSIONS)
            .pick_files()
        {
            self.start_import(paths.into_iter().map(ImportSource::Path).collect());
        }
    }

    /// Commit a finished import to the session.
    fn finish_import(&mut self, ctx: &egui::Context, outcome: ImportOutcome) {
        if let Some(classes) = outcome.classes {
            let result = self.session.replace_classes(classes);
            self.report_store(result);
        }

        let added = outcome.images.len();
        for image in outcome.images {
            let size = [image.pixels.width() as usize, image.pixels.height() as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, image.pixels.as_raw());
            let texture = ctx.load_texture(
                image.file_name.clone(),
                color_image,
                egui::TextureOptions::LINEAR,
            );
            let dimensions = (image.pixels.width(), image.pixels.height());
            let id = self
                .session
                .add_image(image.file_name, image.source, dimensions, image.boxes);
            self.textures.insert(id, texture);
        }

        if outcome.errors.is_empty() {
            self.report_info(format!("Imported {} images", added));
        } else {
            let details: Vec<String> = outcome.errors.iter().map(|e| e.to_string()).collect();
            self.report_error(format!(
                "Imported {} images, {} problems: {}",
                added,
                details.len(),
                details.join("; ")
            ));
        }
    }

    fn start_export(&mut self) {
        if !self.session.has_images() {
            return;
        }
        if self.export_task.is_some() {
            self.report_error("An export is already running");
            return;
        }
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Zip archive", &["zip"])
            .set_file_name(self.config.archive_name.as_str())
            .save_file()
        else {
            return;
        };
        self.loading_message = Some("Exporting dataset...".to_string());
        self.export_task = Some(archive::spawn_export(self.session.snapshot(), path));
    }

    fn poll_background(&mut self, ctx: &egui::Context) {
        if let Some(ref receiver) = self.import_loader {
            match receiver.try_recv() {
                Ok(outcome) => {
                    self.import_loader = None;
                    self.loading_message = None;
                    self.finish_import(ctx, outcome);
                }
                Err(TryRecvError::Disconnected) => {
                    self.import_loader = None;
                    self.loading_message = None;
                    self.report_error("Import stopped unexpectedly");
                }
                Err(TryRecvError::Empty) => {}
            }
        }

        if let Some(ref receiver) = self.export_task {
            let result = match receiver.try_recv() {
                Ok(result) => Some(result),
                Err(TryRecvError::Disconnected) => {
                    Some(Err(anyhow::anyhow!("export stopped unexpectedly")))
                }
                Err(TryRecvError::Empty) => None,
            };
            if let Some(result) = result {
                self.export_task = None;
                self.loading_message = None;
                match result {
                    Ok(path) => self.report_info(format!("Exported dataset to {}", path.display())),
                    Err(e) => self.report_error(format!("Export failed: {:#}", e)),
                }
            }
        }

        // Keep polling while work is in flight
        if self.loading_message.is_some() {
            ctx.request_repaint();
        }
    }

    fn remove_current_image(&mut self) {
        self.editor.reset();
        if let Some(removed) = self.session.remove_current_image() {
            self.textures.remove(&removed.id);
        }
    }

    fn apply_toolbar(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::Import => self.open_import_dialog(),
            ToolbarAction::Export => self.start_export(),
            ToolbarAction::SetTool(tool) => {
                self.editor.reset();
                self.session.set_tool(tool);
            }
            ToolbarAction::DeleteSelectedBox => self.session.delete_selected_box(),
            ToolbarAction::RemoveImage => self.remove_current_image(),
            ToolbarAction::PreviousImage => {
                self.editor.reset();
                self.session.previous_image();
            }
            ToolbarAction::NextImage => {
                self.editor.reset();
                self.session.next_image();
            }
            ToolbarAction::None => {}
        }
    }

    fn apply_properties(&mut self, action: PropertiesAction) {
        match action {
            PropertiesAction::SelectClass(id) => self.session.set_active_class(id),
            PropertiesAction::AddClass => {
                let result = self.session.add_class();
                self.report_store(result);
            }
            PropertiesAction::RenameClass(id, name) => {
                let result = self.session.rename_class(id, name);
                self.report_store(result);
            }
            PropertiesAction::RecolorClass(id, color) => {
                let result = self.session.recolor_class(id, color);
                self.report_store(result);
            }
            PropertiesAction::RemoveClass(id) => {
                let result = self.session.remove_class(id);
                self.report_store(result);
            }
            PropertiesAction::SelectBox(index) => self.session.select_box(Some(index)),
            PropertiesAction::DeleteBox(index) => {
                self.editor.reset();
                self.session.delete_box(index);
            }
            PropertiesAction::None => {}
        }
    }

    fn apply_canvas(&mut self, action: CanvasAction) {
        match action {
            CanvasAction::PointerDown(p) => self.editor.pointer_down(&mut self.session, p),
            CanvasAction::PointerMove(p) => self.editor.pointer_move(&mut self.session, p),
            CanvasAction::PointerUp(p) => self.editor.pointer_up(&mut self.session, p),
            CanvasAction::PointerLeave => self.editor.pointer_leave(&mut self.session),
        }
    }

    fn cursor_for(&self, hover: Option<Point>) -> egui::CursorIcon {
        match (self.editor.state(), self.session.tool()) {
            (Interaction::Dragging { .. }, _) => return egui::CursorIcon::Grabbing,
            (Interaction::Resizing { handle, .. }, _) => return resize_cursor(handle),
            (_, Tool::Draw) if hover.is_some() => return egui::CursorIcon::Crosshair,
            _ => {}
        }
        match hover.and_then(|p| self.editor.handle_at(&self.session, p)) {
            Some(Hit::Handle { handle, .. }) => resize_cursor(handle),
            Some(Hit::Body { .. }) => egui::CursorIcon::Grab,
            None => egui::CursorIcon::Default,
        }
    }

    fn handle_keyboard(&mut self, ctx: &egui::Context) {
        // Leave keys alone while a text field (class rename) has focus
        if ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.editor.pointer_leave(&mut self.session);
            self.session.select_box(None);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)) {
            self.editor.reset();
            self.session.delete_selected_box();
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowLeft)) {
            self.apply_toolbar(ToolbarAction::PreviousImage);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::ArrowRight)) {
            self.apply_toolbar(ToolbarAction::NextImage);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::D)) {
            self.apply_toolbar(ToolbarAction::SetTool(Tool::Draw));
        }
        if ctx.input(|i| i.key_pressed(egui::Key::E)) {
            self.apply_toolbar(ToolbarAction::SetTool(Tool::Edit));
        }
    }

    /// Ask before closing the window while images are loaded.
    fn handle_close_request(&mut self, ctx: &egui::Context) {
        let close_requested = ctx.input(|i| i.viewport().close_requested());
        if close_requested && self.session.has_images() && !self.allow_close {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.confirm_close = true;
        }

        if !self.confirm_close {
            return;
        }

        egui::Window::new("Unsaved changes")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(
                    "You have unsaved annotations. Export the dataset first, or they will be lost.",
                );
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("Quit without exporting").clicked() {
                        log::info!(
                            "Closing with {} unexported images",
                            self.session.images().len()
                        );
                        self.allow_close = true;
                        self.confirm_close = false;
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                    if ui.button("Cancel").clicked() {
                        self.confirm_close = false;
                    }
                });
            });
    }
}

impl BoxLabelApp {
    /// Three-step introduction shown at launch until dismissed.
    fn show_welcome_window(&mut self, ctx: &egui::Context) {
        if !self.show_welcome {
            return;
        }

        let steps = [
            (
                "1. Import your images",
                "Open images with File > Import or drop them on the window. \
                 Existing YOLO label files and a classes.txt can come along.",
            ),
            (
                "2. Draw and edit boxes",
                "Drag on the image to draw a box with the active class. \
                 Switch to Edit to select, move and resize boxes, and manage classes on the left.",
            ),
            (
                "3. Export your dataset",
                "Export writes a zip with every image, its label file and classes.txt.",
            ),
        ];

        let mut open = true;
        let mut dismissed = false;
        egui::Window::new("Welcome to BoxLabel")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Create and edit bounding box annotations for object detection:");
                ui.add_space(8.0);
                for (title, text) in steps {
                    ui.strong(title);
                    ui.label(text);
                    ui.add_space(6.0);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Get Started").clicked() {
                        dismissed = true;
                    }
                });
            });
        if !open || dismissed {
            self.show_welcome = false;
        }
    }
}

fn resize_cursor(handle: Handle) -> egui::CursorIcon {
    match handle {
        Handle::NorthWest | Handle::SouthEast => egui::CursorIcon::ResizeNwSe,
        Handle::NorthEast | Handle::SouthWest => egui::CursorIcon::ResizeNeSw,
    }
}

impl eframe::App for BoxLabelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_background(ctx);

        // Files dropped onto the window
        let dropped: Vec<ImportSource> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|f| match (&f.path, &f.bytes) {
                    (Some(path), _) => Some(ImportSource::Path(path.clone())),
                    (None, Some(bytes)) => Some(ImportSource::Bytes {
                        name: f.name.clone(),
                        bytes: bytes.clone(),
                    }),
                    (None, None) => None,
                })
                .collect()
        });
        self.start_import(dropped);

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Import Images & Annotations...").clicked() {
                        self.open_import_dialog();
                        ui.close_menu();
                    }
                    if ui
                        .add_enabled(
                            self.session.has_images(),
                            egui::Button::new("Export Dataset..."),
                        )
                        .clicked()
                    {
                        self.start_export();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        ui.close_menu();
                    }
                });
            });
        });

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, &self.session))
            .inner;
        self.apply_toolbar(toolbar_action);

        // Status line
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(ref message) = self.loading_message {
                    ui.spinner();
                    ui.label(message);
                    ui.separator();
                }
                match &self.status {
                    Some(status) if status.is_error => {
                        ui.colored_label(egui::Color32::from_rgb(239, 68, 68), &status.text);
                    }
                    Some(status) => {
                        ui.label(&status.text);
                    }
                    None => {
                        ui.label(format!("Tool: {:?}", self.session.tool()));
                    }
                }
            });
        });

        // Classes and annotations (left side)
        let properties_action = egui::SidePanel::left("properties")
            .default_width(260.0)
            .show(ctx, |ui| properties::show(ui, &self.session, &mut self.class_edit_mode))
            .inner;
        self.apply_properties(properties_action);

        self.handle_keyboard(ctx);

        // Main canvas (center)
        let response = egui::CentralPanel::default()
            .show(ctx, |ui| {
                let image = self.session.current_image();
                let texture = image.and_then(|img| self.textures.get(&img.id));
                let preview = self.editor.preview(&self.session);
                let scene = match image {
                    Some(img) => render::compose(
                        img.width,
                        img.height,
                        &img.boxes,
                        self.session.classes(),
                        self.session.selected_box(),
                        preview.as_ref(),
                    ),
                    None => render::Scene::default(),
                };
                let response = canvas::show(ui, image, texture, &scene, self.config.canvas_height);

                ui.add_space(8.0);
                let picked = gallery::show(ui, &self.session, &self.textures);
                (response, picked)
            })
            .inner;

        let (canvas_response, picked) = response;
        for action in canvas_response.actions {
            self.apply_canvas(action);
        }
        ctx.set_cursor_icon(self.cursor_for(canvas_response.hover));
        if let Some(index) = picked {
            self.editor.reset();
            self.session.select_image(index);
        }

        self.show_welcome_window(ctx);
        self.handle_close_request(ctx);
    }
}
