// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Class table: the mapping from class id to display name and color.

use super::annotation::ClassId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// An opaque sRGB color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClassColor(pub [u8; 3]);

impl ClassColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b])
    }

    /// Relative luminance in `[0, 1]` (sRGB weights, no linearization).
    pub fn luminance(&self) -> f32 {
        let [r, g, b] = self.0;
        (0.2126 * r as f32 + 0.7152 * g as f32 + 0.0722 * b as f32) / 255.0
    }

    /// White or black, whichever reads better on top of this color.
    pub fn contrasting_text(&self) -> ClassColor {
        if self.luminance() > 0.6 {
            ClassColor::rgb(0, 0, 0)
        } else {
            ClassColor::rgb(255, 255, 255)
        }
    }
}

impl fmt::Display for ClassColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

impl FromStr for ClassColor {
    type Err = String;

    /// Accepts `#rrggbb` and `rgb(r, g, b)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(format!("invalid hex color {:?}", s));
            }
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16)
                    .map_err(|_| format!("invalid hex color {:?}", s))
            };
            return Ok(Self([channel(0)?, channel(2)?, channel(4)?]));
        }
        if let Some(body) = s.strip_prefix("rgb(").and_then(|rest| rest.strip_suffix(')')) {
            let channels: Vec<u8> = body
                .split(',')
                .map(|c| c.trim().parse::<u8>())
                .collect::<Result<_, _>>()
                .map_err(|_| format!("invalid rgb color {:?}", s))?;
            if let [r, g, b] = channels[..] {
                return Ok(Self([r, g, b]));
            }
        }
        Err(format!("unrecognized color {:?}", s))
    }
}

impl TryFrom<String> for ClassColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClassColor> for String {
    fn from(color: ClassColor) -> String {
        color.to_string()
    }
}

/// Colors assigned to classes in order, cycling.
pub const PALETTE: [ClassColor; 12] = [
    ClassColor::rgb(59, 130, 246),
    ClassColor::rgb(239, 68, 68),
    ClassColor::rgb(34, 197, 94),
    ClassColor::rgb(234, 179, 8),
    ClassColor::rgb(168, 85, 247),
    ClassColor::rgb(236, 72, 153),
    ClassColor::rgb(249, 115, 22),
    ClassColor::rgb(20, 184, 166),
    ClassColor::rgb(99, 102, 241),
    ClassColor::rgb(6, 182, 212),
    ClassColor::rgb(124, 58, 237),
    ClassColor::rgb(16, 185, 129),
];

pub const UNKNOWN_COLOR: ClassColor = ClassColor::rgb(128, 128, 128);
pub const UNKNOWN_NAME: &str = "Unknown";

pub fn palette_color(index: usize) -> ClassColor {
    PALETTE[index % PALETTE.len()]
}

/// Display properties of one class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub color: ClassColor,
}

/// Ordered mapping from class id to name and color.
///
/// Ids are usually dense from zero, but nothing here relies on it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassTable(BTreeMap<ClassId, ClassInfo>);

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Class 0` to `Class 2` with the first three palette colors.
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for _ in 0..3 {
            table.add();
        }
        table
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, id: ClassId) -> Option<&ClassInfo> {
        self.0.get(&id)
    }

    pub fn contains(&self, id: ClassId) -> bool {
        self.0.contains_key(&id)
    }

    /// Name and color for `id`, or the gray "Unknown" fallback.
    pub fn resolve(&self, id: ClassId) -> (&str, ClassColor) {
        match self.0.get(&id) {
            Some(info) => (info.name.as_str(), info.color),
            None => (UNKNOWN_NAME, UNKNOWN_COLOR),
        }
    }

    /// Entries in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &ClassInfo)> {
        self.0.iter().map(|(id, info)| (*id, info))
    }

    pub fn first_id(&self) -> Option<ClassId> {
        self.0.keys().next().copied()
    }

    /// One past the largest id in use.
    pub fn next_id(&self) -> ClassId {
        self.0
            .keys()
            .next_back()
            .map(|id| ClassId(id.0.saturating_add(1)))
            .unwrap_or(ClassId(0))
    }

    pub fn insert(&mut self, id: ClassId, info: ClassInfo) {
        self.0.insert(id, info);
    }

    /// Append a new class named after its id.
    pub fn add(&mut self) -> ClassId {
        let id = self.next_id();
        self.0.insert(
            id,
            ClassInfo {
                name: format!("Class {}", id),
                color: palette_color(id.0 as usize),
            },
        );
        id
    }

    pub fn rename(&mut self, id: ClassId, name: impl Into<String>) -> bool {
        match self.0.get_mut(&id) {
            Some(info) => {
                info.name = name.into();
                true
            }
            None => false,
        }
    }

    pub fn recolor(&mut self, id: ClassId, color: ClassColor) -> bool {
        match self.0.get_mut(&id) {
            Some(info) => {
                info.color = color;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: ClassId) -> Option<ClassInfo> {
        self.0.remove(&id)
    }
}

impl FromIterator<(ClassId, ClassInfo)> for ClassTable {
    fn from_iter<I: IntoIterator<Item = (ClassId, ClassInfo)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_formats() {
        let blue: ClassColor = "rgb(59, 130, 246)".parse().unwrap();
        assert_eq!(blue, PALETTE[0]);
        assert_eq!(blue.to_string(), "#3b82f6");
        assert_eq!("#3B82F6".parse::<ClassColor>().unwrap(), blue);
        assert!("#3b82f".parse::<ClassColor>().is_err());
        assert!("rgb(1, 2)".parse::<ClassColor>().is_err());
        assert!("blue".parse::<ClassColor>().is_err());
    }

    #[test]
    fn test_contrasting_text() {
        assert_eq!(PALETTE[0].contrasting_text(), ClassColor::rgb(255, 255, 255));
        assert_eq!(ClassColor::rgb(250, 250, 200).contrasting_text(), ClassColor::rgb(0, 0, 0));
    }

    #[test]
    fn test_add_after_removal_does_not_reuse_ids() {
        let mut table = ClassTable::with_defaults();
        table.remove(ClassId(1));
        let id = table.add();
        assert_eq!(id, ClassId(3));
        assert_eq!(table.get(id).unwrap().name, "Class 3");
        assert_eq!(table.get(id).unwrap().color, PALETTE[3]);
        assert_eq!(table.get(ClassId(2)).unwrap().name, "Class 2");
    }

    #[test]
    fn test_resolve_falls_back_to_unknown() {
        let table = ClassTable::with_defaults();
        assert_eq!(table.resolve(ClassId(0)), ("Class 0", PALETTE[0]));
        assert_eq!(table.resolve(ClassId(42)), (UNKNOWN_NAME, UNKNOWN_COLOR));
    }

    #[test]
    fn test_json_shape_uses_string_keys() {
        let mut table = ClassTable::new();
        table.insert(
            ClassId(4),
            ClassInfo {
                name: "dog".into(),
                color: ClassColor::rgb(255, 0, 0),
            },
        );
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r##"{"4":{"name":"dog","color":"#ff0000"}}"##);
        let back: ClassTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_palette_cycles() {
        assert_eq!(palette_color(12), PALETTE[0]);
        assert_eq!(palette_color(13), PALETTE[1]);
    }
}
