// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! BoxLabel - Bounding box annotation for object detection datasets
//!
//! A desktop application for drawing class-labelled boxes on a batch of
//! images and exporting them as a YOLO-format zip archive.

mod app;
mod config;
mod error;
mod io;
mod models;
mod ui;
mod util;

use anyhow::Result;
use app::BoxLabelApp;
use config::AppConfig;
use io::store::{FileStore, KeyValueStore, MemoryStore};
use models::project::Session;

/// Open the class cache, or fall back to one that lasts for this run only.
fn open_store(config: &AppConfig) -> Box<dyn KeyValueStore> {
    let Some(path) = config.resolved_store_path() else {
        log::warn!("No location for the class cache, classes will not persist");
        return Box::new(MemoryStore::new());
    };
    match FileStore::open(&path) {
        Ok(store) => {
            log::info!("Using class cache at {}", path.display());
            Box::new(store)
        }
        Err(e) => {
            log::warn!("Class cache unavailable, classes will not persist: {}", e);
            Box::new(MemoryStore::new())
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let config = AppConfig::load();
    let session = Session::new(open_store(&config));

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_drag_and_drop(true)
            .with_title("BoxLabel - Bounding Box Annotation"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "BoxLabel",
        options,
        Box::new(|_cc| Ok(Box::new(BoxLabelApp::new(config, session)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
