// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Batch import of images, annotation files and class lists.
//!
//! Files are classified by name: `classes.txt` replaces the class table, other
//! `.txt` files are annotations matched to images by base name, and image
//! files become new session images. All text files of a batch are read
//! before any image is finalized, so ordering within a batch is irrelevant.

use crate::error::ImportError;
use crate::io::media;
use crate::io::yolo::{self, CLASSES_FILE};
use crate::models::annotation::BoundingBox;
use crate::models::classes::ClassTable;
use crate::models::project::base_name;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;

/// Where a file to import comes from.
#[derive(Debug, Clone)]
pub enum ImportSource {
    Path(PathBuf),
    Bytes { name: String, bytes: Arc<[u8]> },
}

/// A file with its contents loaded.
#[derive(Debug, Clone)]
pub struct ImportFile {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    ClassList,
    Annotation,
    Image,
    Other,
}

pub fn classify(name: &str) -> FileKind {
    if name == CLASSES_FILE {
        FileKind::ClassList
    } else if name.to_ascii_lowercase().ends_with(".txt") {
        FileKind::Annotation
    } else if media::is_image_file(name) {
        FileKind::Image
    } else {
        FileKind::Other
    }
}

/// A decoded image ready to enter the session.
pub struct ImportedImage {
    pub file_name: String,
    pub source: Arc<[u8]>,
    pub pixels: image::RgbaImage,
    pub boxes: Vec<BoundingBox>,
}

/// Result of importing one batch.
#[derive(Default)]
pub struct ImportOutcome {
    pub classes: Option<ClassTable>,
    pub images: Vec<ImportedImage>,
    pub errors: Vec<ImportError>,
}

/// Load the contents of every source. Unreadable files become errors.
pub fn read_sources(sources: Vec<ImportSource>) -> (Vec<ImportFile>, Vec<ImportError>) {
    let mut files = Vec::new();
    let mut errors = Vec::new();
    for source in sources {
        match source {
            ImportSource::Bytes { name, bytes } => files.push(ImportFile { name, bytes }),
            ImportSource::Path(path) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                match std::fs::read(&path) {
                    Ok(bytes) => files.push(ImportFile {
                        name,
                        bytes: Arc::from(bytes),
                    }),
                    Err(source) => errors.push(ImportError::Read { path, source }),
                }
            }
        }
    }
    (files, errors)
}

fn as_text(file: &ImportFile) -> Result<&str, ImportError> {
    std::str::from_utf8(&file.bytes).map_err(|_| ImportError::NotText {
        file: file.name.clone(),
    })
}

/// Classify, parse and decode a batch of loaded files.
pub fn import_files(files: Vec<ImportFile>) -> ImportOutcome {
    let mut outcome = ImportOutcome::default();
    let mut annotations: HashMap<String, ImportFile> = HashMap::new();
    let mut images = Vec::new();

    for file in files {
        match classify(&file.name) {
            FileKind::ClassList => match as_text(&file) {
                Ok(text) => {
                    let table = yolo::decode_classes(text);
                    log::info!("Read {} classes from {}", table.len(), file.name);
                    outcome.classes = Some(table);
                }
                Err(e) => outcome.errors.push(e),
            },
            FileKind::Annotation => {
                let key = file.name[..file.name.len() - 4].to_string();
                if annotations.insert(key, file).is_some() {
                    log::warn!("Duplicate annotation file in batch, keeping the last one");
                }
            }
            FileKind::Image => images.push(file),
            FileKind::Other => log::warn!("Skipping unsupported file {}", file.name),
        }
    }

    for file in images {
        let pixels = match media::decode_image(&file.bytes) {
            Ok(pixels) => pixels,
            Err(source) => {
                log::error!("Failed to decode {}: {}", file.name, source);
                outcome.errors.push(ImportError::Decode {
                    file: file.name,
                    source,
                });
                continue;
            }
        };

        let boxes = match annotations.remove(base_name(&file.name)) {
            Some(annotation) => {
                match parse_annotation(&annotation, pixels.width(), pixels.height()) {
                    Ok(boxes) => boxes,
                    Err(e) => {
                        log::warn!("{}", e);
                        outcome.errors.push(e);
                        Vec::new()
                    }
                }
            }
            None => Vec::new(),
        };

        outcome.images.push(ImportedImage {
            file_name: file.name,
            source: file.bytes,
            pixels,
            boxes,
        });
    }

    for name in annotations.keys() {
        log::warn!("No image in batch matches annotation {}.txt", name);
    }

    outcome
}

fn parse_annotation(
    file: &ImportFile,
    width: u32,
    height: u32,
) -> Result<Vec<BoundingBox>, ImportError> {
    let text = as_text(file)?;
    yolo::decode_boxes(text, width, height).map_err(|source| ImportError::Annotation {
        file: file.name.clone(),
        source,
    })
}

/// Read and decode `sources` on a background thread.
pub fn spawn_import(sources: Vec<ImportSource>) -> Receiver<ImportOutcome> {
    let (sender, receiver) = channel();
    std::thread::spawn(move || {
        let (files, mut errors) = read_sources(sources);
        let mut outcome = import_files(files);
        errors.append(&mut outcome.errors);
        outcome.errors = errors;
        let _ = sender.send(outcome);
    });
    receiver
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::media::tests::png_bytes;
    use crate::models::annotation::ClassId;

    fn file(name: &str, bytes: &[u8]) -> ImportFile {
        ImportFile {
            name: name.to_string(),
            bytes: Arc::from(bytes),
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("classes.txt"), FileKind::ClassList);
        assert_eq!(classify("foo.txt"), FileKind::Annotation);
        assert_eq!(classify("FOO.TXT"), FileKind::Annotation);
        assert_eq!(classify("foo.jpg"), FileKind::Image);
        assert_eq!(classify("notes.md"), FileKind::Other);
    }

    #[test]
    fn test_image_pairs_with_annotation_regardless_of_order() {
        let outcome = import_files(vec![
            file("foo.png", &png_bytes(100, 50)),
            file("foo.txt", b"0 0.5 0.5 0.25 0.25\n"),
        ]);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.images.len(), 1);
        let image = &outcome.images[0];
        assert_eq!((image.pixels.width(), image.pixels.height()), (100, 50));
        assert_eq!(image.boxes, vec![BoundingBox::new(37.5, 18.75, 25.0, 12.5, ClassId(0))]);
    }

    #[test]
    fn test_classes_file_replaces_table() {
        let outcome = import_files(vec![file("classes.txt", b"cat\ndog\n")]);
        let classes = outcome.classes.unwrap();
        assert_eq!(classes.get(ClassId(1)).unwrap().name, "dog");
        assert!(outcome.images.is_empty());
    }

    #[test]
    fn test_undecodable_image_is_reported_and_skipped() {
        let outcome = import_files(vec![
            file("broken.png", b"\x89PNG but not really"),
            file("ok.png", &png_bytes(4, 4)),
        ]);
        assert_eq!(outcome.images.len(), 1);
        assert_eq!(outcome.images[0].file_name, "ok.png");
        assert!(matches!(
            &outcome.errors[..],
            [ImportError::Decode { file, .. }] if file == "broken.png"
        ));
    }

    #[test]
    fn test_malformed_annotation_keeps_image_without_boxes() {
        let outcome = import_files(vec![
            file("a.png", &png_bytes(10, 10)),
            file("a.txt", b"0 0.5 0.5 0.2 0.2\n0 0.5 oops 0.2 0.2\n"),
        ]);
        assert_eq!(outcome.images.len(), 1);
        assert!(outcome.images[0].boxes.is_empty());
        match &outcome.errors[..] {
            [ImportError::Annotation { file, source }] => {
                assert_eq!(file, "a.txt");
                assert_eq!(source.line, 2);
            }
            other => panic!("unexpected errors: {:?}", other),
        }
    }

    #[test]
    fn test_read_sources_reports_missing_paths() {
        let missing = std::env::temp_dir().join("boxlabel-definitely-missing.png");
        let (files, errors) = read_sources(vec![
            ImportSource::Path(missing),
            ImportSource::Bytes {
                name: "x.png".into(),
                bytes: Arc::from(&b"abc"[..]),
            },
        ]);
        assert_eq!(files.len(), 1);
        assert!(matches!(&errors[..], [ImportError::Read { .. }]));
    }

    #[test]
    fn test_spawn_import_delivers_outcome() {
        let receiver = spawn_import(vec![ImportSource::Bytes {
            name: "bg.png".into(),
            bytes: Arc::from(png_bytes(3, 2)),
        }]);
        let outcome = receiver.recv().unwrap();
        assert_eq!(outcome.images.len(), 1);
    }
}
