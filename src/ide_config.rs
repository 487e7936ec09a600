//! # IDE Configuration
//!
//! Builds the `pyrightconfig.json` object that receives the translated
//! search paths.
//!
//! The object starts from the defaults. An existing file at the output path
//! may override scalar options (`venv`, `pythonVersion`, ...); its arrays and
//! objects are ignored so that paths from a previous run are not carried
//! over. The translated and copied paths are then appended to the configured
//! fields and the result is written back as pretty-printed JSON.

use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// A JSON object holding IDE options.
#[derive(Debug, Clone, PartialEq)]
pub struct IdeConfig {
    options: Map<String, Value>,
}

impl IdeConfig {
    pub fn new(options: Map<String, Value>) -> Self {
        Self { options }
    }

    /// Defaults overlaid with the scalar options of an existing file at
    /// `path`. A missing file leaves the defaults untouched.
    pub fn load(path: &Path, defaults: Map<String, Value>) -> Result<Self> {
        let mut config = Self::new(defaults);
        if !path.is_file() {
            return Ok(config);
        }

        let content = fs::read_to_string(path)?;
        let existing: Value = serde_json::from_str(&content).map_err(|e| Error::IdeConfig {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let Value::Object(existing) = existing else {
            return Err(Error::IdeConfig {
                path: path.display().to_string(),
                message: "expected a JSON object".to_string(),
            });
        };

        for (key, value) in existing {
            if !matches!(value, Value::Array(_) | Value::Object(_)) {
                config.options.insert(key, value);
            }
        }
        Ok(config)
    }

    /// Append `paths` to the array under `field`, creating it if needed.
    ///
    /// A non-array value under `field` is replaced.
    pub fn extend_paths<S: AsRef<str>>(&mut self, field: &str, paths: &[S]) {
        let entry = self
            .options
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !entry.is_array() {
            *entry = Value::Array(Vec::new());
        }
        if let Value::Array(items) = entry {
            items.extend(paths.iter().map(|p| Value::String(p.as_ref().to_string())));
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    /// Write the configuration as JSON with a two-space indent.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut json = serde_json::to_string_pretty(&self.options)?;
        json.push('\n');
        fs::write(path, json).map_err(|e| Error::IdeConfig {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}
