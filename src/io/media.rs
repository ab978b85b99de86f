// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image loading.
//!
//! This module decodes image bytes into RGBA pixels suitable for display
//! in egui, and decides which file names look like images.

use image::{ImageFormat, RgbaImage};
use std::path::Path;

/// Whether the file extension names an image format we can decode.
pub fn is_image_file(name: &str) -> bool {
    ImageFormat::from_path(Path::new(name))
        .map(|format| format.reading_enabled())
        .unwrap_or(false)
}

/// Decode image bytes, guessing the format from the content.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    let rgba = img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(image::ImageError::Limits(image::error::LimitError::from_kind(
            image::error::LimitErrorKind::DimensionError,
        )));
    }
    Ok(rgba)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    /// PNG bytes of a solid `width` x `height` image.
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_reports_natural_size() {
        let rgba = decode_image(&png_bytes(7, 3)).unwrap();
        assert_eq!((rgba.width(), rgba.height()), (7, 3));
        assert_eq!(rgba.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_garbage_does_not_decode() {
        assert!(decode_image(b"definitely not an image").is_err());
    }

    #[test]
    fn test_image_extensions() {
        assert!(is_image_file("photo.JPG"));
        assert!(is_image_file("a.png"));
        assert!(!is_image_file("labels.txt"));
        assert!(!is_image_file("noext"));
    }
}
