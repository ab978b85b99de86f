// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types shared across the codec, import and persistence layers.

use std::path::PathBuf;
use thiserror::Error;

/// A rejected line in a normalized annotation file.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {message}")]
pub struct CodecError {
    /// 1-based line number within the annotation text.
    pub line: usize,
    pub message: String,
}

impl CodecError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Failure while bringing a file into the session.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file} is not valid UTF-8 text")]
    NotText { file: String },

    #[error("failed to decode image {file}: {source}")]
    Decode {
        file: String,
        #[source]
        source: image::ImageError,
    },

    #[error("annotation file {file} rejected, {source}")]
    Annotation {
        file: String,
        #[source]
        source: CodecError,
    },
}

/// Failure of the local key-value cache.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store contents are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
