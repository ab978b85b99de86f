// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Dataset export as a zip archive.
//!
//! The archive holds `classes.txt`, every image under its original file
//! name, and a `<basename>.txt` label file next to each image. It is built
//! entirely in memory, so a failure never leaves a partial file behind.

use crate::io::yolo::{self, CLASSES_FILE};
use crate::models::project::{base_name, DatasetSnapshot};
use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Build the archive bytes for `snapshot`.
pub fn build_archive(snapshot: &DatasetSnapshot) -> Result<Vec<u8>> {
    let mut entries: Vec<(String, Vec<u8>, CompressionMethod)> =
        Vec::with_capacity(1 + 2 * snapshot.images.len());
    entries.push((
        CLASSES_FILE.to_string(),
        yolo::encode_classes(&snapshot.classes).into_bytes(),
        CompressionMethod::Deflated,
    ));
    for image in &snapshot.images {
        let labels = yolo::encode_boxes(&image.boxes, image.width, image.height);
        entries.push((
            format!("{}.txt", base_name(&image.file_name)),
            labels.into_bytes(),
            CompressionMethod::Deflated,
        ));
        // already compressed formats gain nothing from deflate
        entries.push((image.file_name.clone(), image.source.to_vec(), CompressionMethod::Stored));
    }

    let mut seen = HashSet::new();
    for (name, _, _) in &entries {
        if !seen.insert(name.as_str()) {
            bail!("two files in the dataset would be written as {:?}", name);
        }
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes, method) in entries {
        let options = SimpleFileOptions::default().compression_method(method);
        zip.start_file(name.as_str(), options)
            .with_context(|| format!("failed to add {} to archive", name))?;
        zip.write_all(&bytes)
            .with_context(|| format!("failed to write {} to archive", name))?;
    }
    let cursor = zip.finish().context("failed to finalize archive")?;
    Ok(cursor.into_inner())
}

/// Build the archive and write it to `path` in one step.
pub fn write_archive(snapshot: &DatasetSnapshot, path: &Path) -> Result<()> {
    let bytes = build_archive(snapshot)?;
    let partial = path.with_extension("zip.part");
    let written = std::fs::write(&partial, &bytes)
        .with_context(|| format!("failed to write {}", partial.display()))
        .and_then(|_| {
            std::fs::rename(&partial, path)
                .with_context(|| format!("failed to move archive to {}", path.display()))
        });
    if let Err(e) = written {
        // no half-written archive is left behind
        let _ = std::fs::remove_file(&partial);
        return Err(e);
    }
    log::info!(
        "Exported {} images ({} bytes) to {}",
        snapshot.images.len(),
        bytes.len(),
        path.display()
    );
    Ok(())
}

/// Export on a background thread; the snapshot is already detached from the session.
pub fn spawn_export(snapshot: DatasetSnapshot, path: PathBuf) -> Receiver<Result<PathBuf>> {
    let (sender, receiver) = channel();
    std::thread::spawn(move || {
        let result = write_archive(&snapshot, &path).map(|_| path);
        let _ = sender.send(result);
    });
    receiver
}
