//! file: core/src/config.rs
//! description: compiler configuration loaded from JSON.
//!
//! `CompilerConfig` carries the binary operator table, the record layouts the
//! parser recognises, and the executor limits. Every field has a default, so
//! `{}` is a valid configuration file.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ast::OperatorTable;
use crate::error::{Level, PosecErrorExt};
use crate::layout::{POSE2D, RecordLayout, RecordRegistry};
use crate::location::Location;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSpec {
    pub name: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    #[serde(default = "default_operators")]
    pub operators: BTreeMap<String, i32>,
    #[serde(default = "default_records")]
    pub records: Vec<RecordSpec>,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// Run each top-level expression after it is lowered.
    #[serde(default = "default_evaluate")]
    pub evaluate_top_level: bool,
}

fn default_operators() -> BTreeMap<String, i32> {
    OperatorTable::standard().iter().map(|(c, p)| (c.to_string(), p)).collect()
}

fn default_records() -> Vec<RecordSpec> {
    let pose = RecordLayout::pose2d();
    vec![RecordSpec { name: POSE2D.to_string(), fields: pose.fields }]
}

fn default_max_steps() -> usize {
    1_000_000
}

fn default_evaluate() -> bool {
    true
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            operators: default_operators(),
            records: default_records(),
            max_steps: default_max_steps(),
            evaluate_top_level: default_evaluate(),
        }
    }
}

impl CompilerConfig {
    /// Load and validate a configuration from a JSON file path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<CompilerConfig, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::new(format!("read config: {}", e), Some(path.to_path_buf())))?;
        let config: CompilerConfig = serde_json::from_str(&raw)
            .map_err(|e| ConfigError::new(format!("parse config: {}", e), Some(path.to_path_buf())))?;
        config.validate().map_err(|e| e.with_path(path))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (symbol, precedence) in self.operators.iter() {
            let mut chars = symbol.chars();
            let (Some(c), None) = (chars.next(), chars.next()) else {
                return Err(ConfigError::new(format!("operator '{}' must be a single character", symbol), None));
            };
            if c.is_ascii_alphanumeric() || c.is_whitespace() || "(),=;#".contains(c) {
                return Err(ConfigError::new(format!("'{}' cannot be used as a binary operator", c), None));
            }
            if *precedence <= 0 {
                return Err(ConfigError::new(
                    format!("operator '{}' has precedence {}, must be positive", c, precedence),
                    None,
                ));
            }
        }

        let mut seen = HashSet::new();
        for record in self.records.iter() {
            if record.name.trim().is_empty() {
                return Err(ConfigError::new("record name is empty", None));
            }
            if record.fields.is_empty() {
                return Err(ConfigError::new(format!("record '{}' has no fields", record.name), None));
            }
            if !seen.insert(record.name.clone()) {
                return Err(ConfigError::new(format!("duplicate record name '{}'", record.name), None));
            }
        }
        Ok(())
    }

    pub fn operator_table(&self) -> OperatorTable {
        let mut table = OperatorTable::empty();
        for (symbol, precedence) in self.operators.iter() {
            if let Some(c) = symbol.chars().next() {
                table.insert(c, *precedence);
            }
        }
        table
    }

    pub fn record_registry(&self) -> RecordRegistry {
        let mut registry = RecordRegistry::new();
        for record in self.records.iter() {
            let fields = record.fields.iter().map(String::as_str).collect::<Vec<_>>();
            registry.register(RecordLayout::new(&record.name, &fields));
        }
        registry
    }
}

#[derive(Debug, Clone)]
pub struct ConfigError {
    message: String,
    path: Option<PathBuf>,
}

impl ConfigError {
    pub fn new(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        ConfigError { message: message.into(), path }
    }

    fn with_path(mut self, path: &Path) -> Self {
        self.path.get_or_insert_with(|| path.to_path_buf());
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ConfigError {}

impl PosecErrorExt for ConfigError {
    fn level(&self) -> Level {
        Level::Critical
    }

    fn message(&self) -> String {
        match &self.path {
            Some(path) => format!("{} ({})", self.message, path.display()),
            None => self.message.clone(),
        }
    }

    fn issuer(&self) -> String {
        "posec.config".to_string()
    }

    fn location(&self) -> Option<Location> {
        None
    }
}
