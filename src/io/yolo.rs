// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Normalized box label format.
//!
//! One box per line: `class x_center y_center width height`, with the four
//! coordinates as fractions of the image size. Class names live in a
//! separate `classes.txt`, one name per line, the line index being the id.
//!
//! Decoding is strict: a file with any malformed line is rejected as a
//! whole rather than partially imported.

use crate::error::CodecError;
use crate::models::annotation::{BoundingBox, ClassId};
use crate::models::classes::{palette_color, ClassInfo, ClassTable};
use crate::util::geometry::{denormalize_box, normalize_box, NormalizedBox};

/// Name of the class list inside a dataset.
pub const CLASSES_FILE: &str = "classes.txt";

/// Parse annotation text into pixel boxes for a `width` x `height` image.
pub fn decode_boxes(
    content: &str,
    width: u32,
    height: u32,
) -> Result<Vec<BoundingBox>, CodecError> {
    let mut boxes = Vec::new();
    for (line_idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (class_id, normalized) = parse_line(line, line_idx + 1)?;
        boxes.push(denormalize_box(&normalized, class_id, width, height));
    }
    Ok(boxes)
}

fn parse_line(line: &str, line_num: usize) -> Result<(ClassId, NormalizedBox), CodecError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(CodecError::new(
            line_num,
            format!("expected 5 fields, found {}", fields.len()),
        ));
    }

    let class_id: ClassId = fields[0]
        .parse()
        .map_err(|_| {
            let message = format!("class id {:?} is not a non-negative integer", fields[0]);
            CodecError::new(line_num, message)
        })?;

    let mut values = [0.0f64; 4];
    for (slot, (field, name)) in values
        .iter_mut()
        .zip(fields[1..].iter().zip(["x_center", "y_center", "width", "height"]))
    {
        *slot = field
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                CodecError::new(line_num, format!("{} {:?} is not a finite number", name, field))
            })?;
    }

    let [x_center, y_center, width, height] = values;
    if width <= 0.0 || height <= 0.0 {
        return Err(CodecError::new(line_num, "width and height must be positive"));
    }

    Ok((
        class_id,
        NormalizedBox {
            x_center,
            y_center,
            width,
            height,
        },
    ))
}

/// Format boxes as annotation text, one line per box, six decimals.
pub fn encode_boxes(boxes: &[BoundingBox], width: u32, height: u32) -> String {
    boxes
        .iter()
        .map(|b| {
            let n = normalize_box(b, width, height);
            format!(
                "{} {:.6} {:.6} {:.6} {:.6}",
                b.class_id, n.x_center, n.y_center, n.width, n.height
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a class list; ids follow line order, colors follow the palette.
///
/// Names are kept as written. Only whitespace-only lines are dropped.
pub fn decode_classes(content: &str) -> ClassTable {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(index, name)| {
            (
                ClassId(index as u32),
                ClassInfo {
                    name: name.to_string(),
                    color: palette_color(index),
                },
            )
        })
        .collect()
}

/// Class names in ascending id order. Colors are not written.
pub fn encode_classes(classes: &ClassTable) -> String {
    classes
        .iter()
        .map(|(_, info)| info.name.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classes::{ClassColor, PALETTE};

    fn assert_close(a: &BoundingBox, b: &BoundingBox) {
        for (x, y) in [(a.x, b.x), (a.y, b.y), (a.width, b.width), (a.height, b.height)] {
            assert!((x - y).abs() < 1e-4, "{:?} != {:?}", a, b);
        }
        assert_eq!(a.class_id, b.class_id);
    }

    #[test]
    fn test_decode_line() {
        let boxes = decode_boxes("1 0.5 0.25 0.2 0.1\n", 1000, 800).unwrap();
        assert_eq!(boxes.len(), 1);
        assert_close(&boxes[0], &BoundingBox::new(400.0, 160.0, 200.0, 80.0, ClassId(1)));
    }

    #[test]
    fn test_encode_format() {
        let boxes = [
            BoundingBox::new(400.0, 160.0, 200.0, 80.0, ClassId(1)),
            BoundingBox::new(0.0, 0.0, 1000.0, 800.0, ClassId(0)),
        ];
        assert_eq!(
            encode_boxes(&boxes, 1000, 800),
            "1 0.500000 0.250000 0.200000 0.100000\n0 0.500000 0.500000 1.000000 1.000000"
        );
        assert_eq!(encode_boxes(&[], 1000, 800), "");
    }

    #[test]
    fn test_roundtrip_within_tolerance() {
        let (w, h) = (97, 64);
        let boxes = vec![
            BoundingBox::new(13.37, 7.5, 40.123, 20.6, ClassId(0)),
            BoundingBox::new(0.0, 0.0, 97.0, 64.0, ClassId(4)),
            BoundingBox::new(50.9, 30.25, 46.1, 33.75, ClassId(11)),
        ];
        let decoded = decode_boxes(&encode_boxes(&boxes, w, h), w, h).unwrap();
        assert_eq!(decoded.len(), boxes.len());
        for (a, b) in decoded.iter().zip(&boxes) {
            assert_close(a, b);
        }
    }

    #[test]
    fn test_roundtrip_error_scales_with_image_size() {
        let (w, h) = (4000, 3000);
        let original = BoundingBox::new(1234.567, 987.654, 321.123, 222.222, ClassId(1));
        let decoded = decode_boxes(&encode_boxes(&[original], w, h), w, h).unwrap();
        // six decimals of a normalized value is a millionth of the image size
        let tolerance = 4000.0 * 1e-6;
        assert!((decoded[0].x - original.x).abs() < tolerance);
        assert!((decoded[0].y - original.y).abs() < tolerance);
        assert!((decoded[0].width - original.width).abs() < tolerance);
        assert!((decoded[0].height - original.height).abs() < tolerance);
    }

    #[test]
    fn test_blank_lines_and_crlf_are_tolerated() {
        let content = "\n0 0.5 0.5 0.5 0.5\r\n\n  \n2\t0.1  0.1 0.1 0.1\n";
        let boxes = decode_boxes(content, 100, 100).unwrap();
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[1].class_id, ClassId(2));
    }

    #[test]
    fn test_malformed_lines_reject_with_line_number() {
        let cases = [
            ("0 0.5 0.5 0.5\n", "expected 5 fields"),
            ("0 0.5 0.5 0.5 0.5 0.5\n", "expected 5 fields"),
            ("x 0.5 0.5 0.5 0.5\n", "class id"),
            ("-1 0.5 0.5 0.5 0.5\n", "class id"),
            ("0 0.5 abc 0.5 0.5\n", "y_center"),
            ("0 0.5 0.5 NaN 0.5\n", "width"),
            ("0 0.5 0.5 0.5 0\n", "positive"),
        ];
        for (text, expected) in cases {
            let content = format!("0 0.5 0.5 0.5 0.5\n\n{}", text);
            let err = decode_boxes(&content, 100, 100).unwrap_err();
            assert_eq!(err.line, 3, "{}", text);
            assert!(err.message.contains(expected), "{}: {}", text, err.message);
        }
    }

    #[test]
    fn test_class_list_roundtrip() {
        let table = decode_classes("person\n\ncar\n   \nbicycle\n");
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(ClassId(2)).unwrap().name, "bicycle");
        assert_eq!(table.get(ClassId(1)).unwrap().color, PALETTE[1]);
        assert_eq!(encode_classes(&table), "person\ncar\nbicycle");
        assert_eq!(decode_classes(&encode_classes(&table)), table);
    }

    #[test]
    fn test_class_names_keep_inner_and_outer_spaces() {
        let table = decode_classes("traffic light\r\n  bicycle \r\n");
        assert_eq!(table.get(ClassId(0)).unwrap().name, "traffic light");
        assert_eq!(table.get(ClassId(1)).unwrap().name, "  bicycle ");
    }

    #[test]
    fn test_encode_classes_sorts_sparse_ids() {
        let mut table = ClassTable::new();
        for (id, name) in [(10, "ten"), (2, "two"), (7, "seven")] {
            table.insert(
                ClassId(id),
                ClassInfo {
                    name: name.into(),
                    color: ClassColor::rgb(0, 0, 0),
                },
            );
        }
        assert_eq!(encode_classes(&table), "two\nseven\nten");

        // re-import renumbers densely and recolors from the palette
        let back = decode_classes(&encode_classes(&table));
        assert_eq!(back.get(ClassId(0)).unwrap().name, "two");
        assert_eq!(back.get(ClassId(0)).unwrap().color, PALETTE[0]);
    }

    #[test]
    fn test_palette_cycles_past_twelve() {
        let names: Vec<String> = (0..14).map(|i| format!("c{}", i)).collect();
        let table = decode_classes(&names.join("\n"));
        assert_eq!(table.get(ClassId(13)).unwrap().color, PALETTE[1]);
    }
}
