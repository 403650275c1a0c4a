//! file: core/src/script.rs
//! description: source files handed to the compiler.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Level, PosecErrorExt};
use crate::location::Location;

/// Source text plus the name used in diagnostics (the file name, not the
/// full path).
#[derive(Debug, Clone)]
pub struct Script {
    pub name: String,
    pub path: PathBuf,
    pub content: String,
}

impl Script {
    /// Read `path` from disk.
    pub fn new(path: PathBuf) -> Result<Self, Box<dyn PosecErrorExt>> {
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Script { name: display_name(&path), path, content }),
            Err(e) => Err(Box::new(ScriptReadError { path, kind: e.kind() })),
        }
    }

    /// In-memory source; `name` doubles as the path.
    pub fn from_source(name: &str, content: &str) -> Self {
        Script { name: name.to_string(), path: PathBuf::from(name), content: content.to_string() }
    }

    pub fn is_empty(&self) -> bool {
        self.content.chars().all(char::is_whitespace)
    }
}

fn display_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.display().to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct ScriptReadError {
    path: PathBuf,
    kind: io::ErrorKind,
}

impl ScriptReadError {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Display for ScriptReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot read script '{}': {}", self.path.display(), self.kind)
    }
}

impl std::error::Error for ScriptReadError {}

impl PosecErrorExt for ScriptReadError {
    fn level(&self) -> Level {
        Level::Critical
    }

    fn message(&self) -> String {
        self.to_string()
    }

    fn issuer(&self) -> String {
        "posec.script".to_string()
    }

    fn location(&self) -> Option<Location> {
        None
    }
}
