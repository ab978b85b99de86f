// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pointer-driven box editing.
//!
//! [`BoxEditor`] turns pointer events, already mapped to image pixels, into
//! drawing, moving and resizing of boxes on the session's active image.
//! Only one interaction can be active at a time.

use super::annotation::{BoundingBox, Handle, Point};
use super::project::{Session, Tool};
use crate::util::geometry::{hit_test, Hit};

/// Tolerances used while editing, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorSettings {
    pub handle_radius: f64,
    pub min_box_size: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            handle_radius: 10.0,
            min_box_size: 5.0,
        }
    }
}

/// The interaction in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    Idle,
    /// Rubber-banding a new box from `anchor`.
    Drawing { anchor: Point, current: Point },
    /// Moving box `index`; `grab_offset` is the pointer relative to its origin.
    Dragging {
        index: usize,
        grab_offset: Point,
        original: BoundingBox,
    },
    /// Pulling `handle` of box `index`.
    Resizing {
        index: usize,
        handle: Handle,
        original: BoundingBox,
    },
}

pub struct BoxEditor {
    state: Interaction,
    settings: EditorSettings,
}

impl BoxEditor {
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            state: Interaction::Idle,
            settings,
        }
    }

    pub fn state(&self) -> Interaction {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != Interaction::Idle
    }

    /// Handle under `p`, for cursor feedback.
    pub fn handle_at(&self, session: &Session, p: Point) -> Option<Hit> {
        if session.tool() != Tool::Edit {
            return None;
        }
        hit_test(session.current_boxes(), session.selected_box(), p, self.settings.handle_radius)
    }

    pub fn pointer_down(&mut self, session: &mut Session, p: Point) {
        if session.current_image().is_none() {
            return;
        }
        let tool = session.tool();
        let handle_box = if tool == Tool::Edit { session.selected_box() } else { None };
        let hit = hit_test(session.current_boxes(), handle_box, p, self.settings.handle_radius);

        match (hit, tool) {
            (None, _) => {
                session.select_box(None);
                if tool == Tool::Draw {
                    self.state = Interaction::Drawing { anchor: p, current: p };
                    log::debug!("Drawing from ({:.1}, {:.1})", p.x, p.y);
                }
            }
            (Some(Hit::Handle { index, handle }), Tool::Edit) => {
                let original = session.current_boxes()[index];
                session.select_box(Some(index));
                self.state = Interaction::Resizing {
                    index,
                    handle,
                    original,
                };
                log::debug!("Resizing box {} by {:?}", index, handle);
            }
            (Some(Hit::Body { index }), Tool::Edit) => {
                let original = session.current_boxes()[index];
                session.select_box(Some(index));
                self.state = Interaction::Dragging {
                    index,
                    grab_offset: p - original.origin(),
                    original,
                };
                log::debug!("Dragging box {}", index);
            }
            // Draw tool over an existing box does nothing
            (Some(_), _) => {}
        }
    }

    pub fn pointer_move(&mut self, session: &mut Session, p: Point) {
        match self.state {
            Interaction::Idle => {}
            Interaction::Drawing { anchor, .. } => {
                self.state = Interaction::Drawing { anchor, current: p };
            }
            Interaction::Dragging { index, grab_offset, .. } => {
                let Some(bbox) = session.current_boxes().get(index).copied() else {
                    self.state = Interaction::Idle;
                    return;
                };
                session.replace_box(index, bbox.moved_to(p - grab_offset));
            }
            Interaction::Resizing { index, handle, .. } => {
                let Some(bbox) = session.current_boxes().get(index).copied() else {
                    self.state = Interaction::Idle;
                    return;
                };
                let resized = bbox.resized(handle, p);
                if resized.exceeds(self.settings.min_box_size) {
                    session.replace_box(index, resized);
                }
            }
        }
    }

    pub fn pointer_up(&mut self, session: &mut Session, p: Point) {
        if let Interaction::Drawing { anchor, .. } = self.state {
            let bbox = BoundingBox::from_corners(anchor, p, session.active_class());
            if bbox.exceeds(self.settings.min_box_size) {
                session.push_box(bbox);
                log::info!(
                    "Committed box {:.0}x{:.0} at ({:.0}, {:.0}) as class {}",
                    bbox.width,
                    bbox.height,
                    bbox.x,
                    bbox.y,
                    bbox.class_id
                );
            } else {
                log::debug!("Discarded box below minimum size");
            }
        }
        self.state = Interaction::Idle;
    }

    /// Pointer left the surface: abort without committing.
    ///
    /// Moves and resizes are applied live, so the grabbed box is put back.
    pub fn pointer_leave(&mut self, session: &mut Session) {
        match self.state {
            Interaction::Dragging { index, original, .. }
            | Interaction::Resizing { index, original, .. } => {
                if index < session.current_boxes().len() {
                    session.replace_box(index, original);
                }
            }
            Interaction::Drawing { .. } | Interaction::Idle => {}
        }
        if self.is_active() {
            log::debug!("Interaction aborted");
        }
        self.state = Interaction::Idle;
    }

    /// Drop any interaction without touching the session, e.g. after the
    /// active image changed underneath it.
    pub fn reset(&mut self) {
        self.state = Interaction::Idle;
    }

    /// The box being drawn, for transient display.
    pub fn preview(&self, session: &Session) -> Option<BoundingBox> {
        match self.state {
            Interaction::Drawing { anchor, current } => {
                Some(BoundingBox::from_corners(anchor, current, session.active_class()))
            }
            _ => None,
        }
    }
}
