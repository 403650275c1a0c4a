//! file: core/src/layout.rs
//! description: fixed-shape record layouts.
//!
//! A record layout is a name plus an ordered list of `f64` fields. The parser
//! uses the registry to recognise record construction calls and to assign
//! field indices; lowering uses it to type allocations and bound-check field
//! addresses.

use std::collections::BTreeMap;

use serde::Serialize;

pub const POSE2D: &str = "Pose2D";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordLayout {
    pub name: String,
    pub fields: Vec<String>,
}

impl RecordLayout {
    pub fn new(name: &str, fields: &[&str]) -> Self {
        RecordLayout { name: name.to_string(), fields: fields.iter().map(|f| f.to_string()).collect() }
    }

    /// `Pose2D { x, y, theta }`.
    pub fn pose2d() -> Self {
        RecordLayout::new(POSE2D, &["x", "y", "theta"])
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field_index(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }
}

impl std::fmt::Display for RecordLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "record {} {{ {} }}", self.name, self.fields.join(", "))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordRegistry {
    layouts: BTreeMap<String, RecordLayout>,
}

impl RecordRegistry {
    pub fn new() -> Self {
        RecordRegistry { layouts: BTreeMap::new() }
    }

    /// Registry holding only `Pose2D`.
    pub fn with_builtins() -> Self {
        let mut reg = RecordRegistry::new();
        reg.register(RecordLayout::pose2d());
        reg
    }

    pub fn register(&mut self, layout: RecordLayout) {
        self.layouts.insert(layout.name.clone(), layout);
    }

    pub fn get(&self, name: &str) -> Option<&RecordLayout> {
        self.layouts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layouts.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecordLayout> {
        self.layouts.values()
    }
}
