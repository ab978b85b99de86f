// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for images, label files, dataset archives and the local
//! class cache.

pub mod archive;
pub mod import;
pub mod media;
pub mod store;
pub mod yolo;
