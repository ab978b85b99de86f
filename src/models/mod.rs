// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: boxes, classes, the session and the box editor.

pub mod annotation;
pub mod classes;
pub mod interaction;
pub mod project;
