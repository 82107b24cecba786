//! Compilation-scoped state written by the companion loader.
//!
//! The loader discovers override source files while modules are built and
//! records two lookup tables on the compilation:
//!
//! - the **override map**, keyed by the original source file, then by override
//!   name, yielding the override source file;
//! - the **entry map**, keyed by chunk name, yielding the override applied to
//!   that chunk in single-output mode.
//!
//! Either table may be missing when the loader did not run. The engine treats
//! that as "override mode off" and leaves the build untouched. The engine never
//! writes to this state.
//!
//! # JSON format
//!
//! ```json
//! {
//!   "overridesMap": { "src/a.css": { "dark": "src/a.dark.css" } },
//!   "entryMap": { "main": "dark" }
//! }
//! ```

use crate::error::Result;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Original resource -> override name -> override resource.
pub type OverrideMap = HashMap<Utf8PathBuf, HashMap<String, Utf8PathBuf>>;

/// Chunk name -> override name.
pub type EntryMap = HashMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides_map: Option<OverrideMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_map: Option<EntryMap>,
}

impl OverrideState {
    /// Parse loader state from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load loader state from a file.
    ///
    /// Returns `Ok(None)` if the file doesn't exist.
    pub fn load(path: &Utf8Path) -> Result<Option<Self>> {
        if !path.as_std_path().exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path.as_std_path())?;
        Ok(Some(Self::from_json_str(&contents)?))
    }

    /// Record that `origin` is replaced by `resource` under `override_name`.
    ///
    /// Creates the override map if it is missing.
    pub fn insert_override(
        &mut self,
        origin: impl Into<Utf8PathBuf>,
        override_name: impl Into<String>,
        resource: impl Into<Utf8PathBuf>,
    ) {
        self.overrides_map
            .get_or_insert_with(HashMap::new)
            .entry(origin.into())
            .or_default()
            .insert(override_name.into(), resource.into());
    }

    /// Apply `override_name` to the chunk named `chunk_name` in single-output mode.
    ///
    /// Creates the entry map if it is missing.
    pub fn map_entry(&mut self, chunk_name: impl Into<String>, override_name: impl Into<String>) {
        self.entry_map
            .get_or_insert_with(HashMap::new)
            .insert(chunk_name.into(), override_name.into());
    }

    pub fn overrides_map(&self) -> Option<&OverrideMap> {
        self.overrides_map.as_ref()
    }

    /// Override resource for `origin` under `override_name`, if any.
    pub fn override_for(&self, origin: &Utf8Path, override_name: &str) -> Option<&Utf8Path> {
        self.overrides_map
            .as_ref()?
            .get(origin)?
            .get(override_name)
            .map(Utf8PathBuf::as_path)
    }

    /// Override applied to the chunk named `chunk_name`, if any.
    pub fn entry_override(&self, chunk_name: &str) -> Option<&str> {
        self.entry_map.as_ref()?.get(chunk_name).map(String::as_str)
    }
}
