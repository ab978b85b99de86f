// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session state management.
//!
//! The session holds the ordered list of imported images with their boxes,
//! the active image, the class table and the current tool/selection. Every
//! mutation goes through here so the invariants hold in one place:
//! the active index is valid whenever images exist, and a selection never
//! outlives the image or box list it was made against.

use super::annotation::{insert_at, remove_at, replace_at, BoundingBox, ClassId};
use super::classes::{ClassColor, ClassTable};
use crate::error::StoreError;
use crate::io::store::{self, KeyValueStore};
use std::sync::Arc;

/// Current editing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Draw,
    Edit,
}

/// An imported image and its boxes.
pub struct ImageRecord {
    /// Session-unique id, stable across removals of other images.
    pub id: u64,
    pub file_name: String,
    /// Original file bytes, exported as-is.
    pub source: Arc<[u8]>,
    /// Natural size in pixels.
    pub width: u32,
    pub height: u32,
    pub boxes: Vec<BoundingBox>,
}

/// `foo.tar.jpg` -> `foo.tar`; names without a dot are returned whole.
pub fn base_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => &file_name[..dot],
        _ => file_name,
    }
}

/// Everything export needs, copied out at call time.
#[derive(Debug, Clone)]
pub struct DatasetSnapshot {
    pub classes: ClassTable,
    pub images: Vec<SnapshotImage>,
}

#[derive(Debug, Clone)]
pub struct SnapshotImage {
    pub file_name: String,
    pub source: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    pub boxes: Vec<BoundingBox>,
}

/// Single-owner state of one editing session.
pub struct Session {
    images: Vec<ImageRecord>,
    current: Option<usize>,
    classes: ClassTable,
    store: Box<dyn KeyValueStore>,
    tool: Tool,
    active_class: ClassId,
    selected_box: Option<usize>,
    next_image_id: u64,
}

impl Session {
    /// Start a session, loading the class table from `store`.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        let classes = store::load_classes(store.as_ref()).unwrap_or_else(ClassTable::with_defaults);
        let active_class = classes.first_id().unwrap_or(ClassId(0));
        log::info!("Session started with {} classes", classes.len());
        Self {
            images: Vec::new(),
            current: None,
            classes,
            store,
            tool: Tool::default(),
            active_class,
            selected_box: None,
            next_image_id: 0,
        }
    }

    // --- queries -----------------------------------------------------------

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_image(&self) -> Option<&ImageRecord> {
        self.current.and_then(|i| self.images.get(i))
    }

    /// Boxes of the active image; empty when no image is active.
    pub fn current_boxes(&self) -> &[BoundingBox] {
        self.current_image().map(|img| img.boxes.as_slice()).unwrap_or(&[])
    }

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn active_class(&self) -> ClassId {
        self.active_class
    }

    pub fn selected_box(&self) -> Option<usize> {
        self.selected_box
    }

    pub fn has_next(&self) -> bool {
        matches!(self.current, Some(i) if i + 1 < self.images.len())
    }

    pub fn has_previous(&self) -> bool {
        matches!(self.current, Some(i) if i > 0)
    }

    // --- images ------------------------------------------------------------

    /// Append a decoded image of the given natural size. The first image of an
    /// empty session becomes active.
    pub fn add_image(
        &mut self,
        file_name: String,
        source: Arc<[u8]>,
        (width, height): (u32, u32),
        boxes: Vec<BoundingBox>,
    ) -> u64 {
        let id = self.next_image_id;
        self.next_image_id += 1;
        log::info!("Added image {} ({}x{}, {} boxes)", file_name, width, height, boxes.len());
        self.images.push(ImageRecord {
            id,
            file_name,
            source,
            width,
            height,
            boxes,
        });
        if self.current.is_none() {
            self.current = Some(0);
        }
        id
    }

    /// Remove the active image, stepping back to the previous one.
    pub fn remove_current_image(&mut self) -> Option<ImageRecord> {
        let index = self.current?;
        let removed = self.images.remove(index);
        self.current = if self.images.is_empty() {
            None
        } else {
            Some(index.saturating_sub(1).min(self.images.len() - 1))
        };
        self.selected_box = None;
        log::info!("Removed image {}, {} remaining", removed.file_name, self.images.len());
        Some(removed)
    }

    pub fn next_image(&mut self) {
        if let Some(i) = self.current {
            if i + 1 < self.images.len() {
                self.current = Some(i + 1);
                self.selected_box = None;
            }
        }
    }

    pub fn previous_image(&mut self) {
        if let Some(i) = self.current {
            if i > 0 {
                self.current = Some(i - 1);
                self.selected_box = None;
            }
        }
    }

    pub fn select_image(&mut self, index: usize) {
        if index < self.images.len() && self.current != Some(index) {
            self.current = Some(index);
            self.selected_box = None;
        }
    }

    // --- boxes -------------------------------------------------------------

    /// Replace the box list of the active image.
    pub fn set_boxes(&mut self, boxes: Vec<BoundingBox>) {
        let Some(image) = self.current.and_then(|i| self.images.get_mut(i)) else {
            return;
        };
        image.boxes = boxes;
        if matches!(self.selected_box, Some(s) if s >= image.boxes.len()) {
            self.selected_box = None;
        }
    }

    pub fn push_box(&mut self, bbox: BoundingBox) {
        let boxes = self.current_boxes();
        let next = insert_at(boxes, boxes.len(), bbox);
        self.set_boxes(next);
    }

    pub fn replace_box(&mut self, index: usize, bbox: BoundingBox) {
        let next = replace_at(self.current_boxes(), index, bbox);
        self.set_boxes(next);
    }

    pub fn delete_box(&mut self, index: usize) {
        if index >= self.current_boxes().len() {
            return;
        }
        let next = remove_at(self.current_boxes(), index);
        self.set_boxes(next);
        self.selected_box = None;
    }

    pub fn delete_selected_box(&mut self) {
        if let Some(index) = self.selected_box {
            self.delete_box(index);
        }
    }

    /// Select a box of the active image. In Edit mode the active class follows it.
    pub fn select_box(&mut self, index: Option<usize>) {
        match index {
            Some(i) => {
                let Some(bbox) = self.current_boxes().get(i).copied() else {
                    return;
                };
                self.selected_box = Some(i);
                if self.tool == Tool::Edit {
                    self.active_class = bbox.class_id;
                }
            }
            None => self.selected_box = None,
        }
    }

    // --- tool & class selection ----------------------------------------------

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// Make `id` the class for new boxes; with a box selected, reassign it too.
    pub fn set_active_class(&mut self, id: ClassId) {
        self.active_class = id;
        if let Some(index) = self.selected_box {
            if let Some(bbox) = self.current_boxes().get(index).copied() {
                self.replace_box(index, BoundingBox { class_id: id, ..bbox });
            }
        }
    }

    // --- class table -------------------------------------------------------

    fn persist_classes(&mut self) -> Result<(), StoreError> {
        store::save_classes(self.store.as_mut(), &self.classes).map_err(|e| {
            log::warn!("Failed to persist classes: {}", e);
            e
        })
    }

    fn ensure_active_class(&mut self) {
        if !self.classes.contains(self.active_class) {
            if let Some(first) = self.classes.first_id() {
                self.active_class = first;
            }
        }
    }

    /// Replace the class table wholesale, e.g. from an imported `classes.txt`.
    pub fn replace_classes(&mut self, classes: ClassTable) -> Result<(), StoreError> {
        self.classes = classes;
        self.ensure_active_class();
        log::info!("Class table replaced, {} classes", self.classes.len());
        self.persist_classes()
    }

    pub fn add_class(&mut self) -> Result<ClassId, StoreError> {
        let id = self.classes.add();
        self.ensure_active_class();
        log::info!("Added class {}", id);
        self.persist_classes().map(|_| id)
    }

    pub fn rename_class(&mut self, id: ClassId, name: impl Into<String>) -> Result<(), StoreError> {
        if self.classes.rename(id, name) {
            self.persist_classes()?;
        }
        Ok(())
    }

    pub fn recolor_class(&mut self, id: ClassId, color: ClassColor) -> Result<(), StoreError> {
        if self.classes.recolor(id, color) {
            self.persist_classes()?;
        }
        Ok(())
    }

    /// Remove a class. Boxes using it keep the id and show as unknown.
    pub fn remove_class(&mut self, id: ClassId) -> Result<(), StoreError> {
        if self.classes.remove(id).is_some() {
            self.ensure_active_class();
            log::info!("Removed class {}", id);
            self.persist_classes()?;
        }
        Ok(())
    }

    // --- export ------------------------------------------------------------

    pub fn snapshot(&self) -> DatasetSnapshot {
        DatasetSnapshot {
            classes: self.classes.clone(),
            images: self
                .images
                .iter()
                .map(|img| SnapshotImage {
                    file_name: img.file_name.clone(),
                    source: Arc::clone(&img.source),
                    width: img.width,
                    height: img.height,
                    boxes: img.boxes.clone(),
                })
                .collect(),
        }
    }
}
