//! Persisted user settings: named custom functions and interpreter limits.

use std::{
    cell::RefCell,
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::evaluator::ScriptLimits;

/// A user-named, reusable `jsFunc` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFunction {
    pub name: String,
    pub code: String,
}

impl CustomFunction {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        CustomFunction {
            name: name.into(),
            code: code.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub custom_functions: Vec<CustomFunction>,
    /// Interpreter step budget for custom functions.
    pub script_max_steps: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            custom_functions: Vec::new(),
            script_max_steps: ScriptLimits::default().max_steps,
        }
    }
}

impl Settings {
    /// Adds a custom function unless one with the same name exists.
    ///
    /// Returns `false`, leaving the existing function untouched, on a
    /// duplicate name.
    pub fn save_function(&mut self, name: &str, code: &str) -> bool {
        if self.function(name).is_some() {
            return false;
        }
        self.custom_functions.push(CustomFunction::new(name, code));
        true
    }

    /// Removes a custom function, returning it if it existed.
    pub fn remove_function(&mut self, name: &str) -> Option<CustomFunction> {
        let index = self.custom_functions.iter().position(|f| f.name == name)?;
        Some(self.custom_functions.remove(index))
    }

    pub fn function(&self, name: &str) -> Option<&CustomFunction> {
        self.custom_functions.iter().find(|f| f.name == name)
    }

    pub fn function_names(&self) -> Vec<String> {
        self.custom_functions.iter().map(|f| f.name.clone()).collect()
    }

    pub fn script_limits(&self) -> ScriptLimits {
        ScriptLimits {
            max_steps: self.script_max_steps,
        }
    }
}

/// Errors that can occur while loading or saving settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("cannot access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where settings live between sessions.
pub trait SettingsStore {
    fn load(&self) -> Result<Settings, SettingsError>;
    fn save(&self, settings: &Settings) -> Result<(), SettingsError>;
}

/// Settings persisted as a pretty-printed JSON file.
///
/// A missing file loads as the default settings.
#[derive(Debug, Clone)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileSettingsStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> SettingsError {
        SettingsError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings file, using defaults");
                Ok(Settings::default())
            }
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let text = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, text).map_err(|e| self.io_error(e))
    }
}

/// Settings kept in memory, for tests and embedders with their own storage.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: RefCell<Settings>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        MemorySettingsStore {
            settings: RefCell::new(settings),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Settings, SettingsError> {
        Ok(self.settings.borrow().clone())
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        *self.settings.borrow_mut() = settings.clone();
        Ok(())
    }
}
