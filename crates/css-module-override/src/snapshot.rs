//! JSON snapshot of a compiled module graph.
//!
//! Modules, chunks and chunk groups are plain arrays; every cross reference is
//! a position in one of them. A module's pre- and post-order index in a group
//! is its position in the group's `order` list.

use crate::errors::CliError;
use camino::Utf8PathBuf;
use cmo_engine::{Chunk, ChunkGroup, Compilation, ContentModule, ModuleKind, OverrideState};
use cmo_options::HashOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    #[serde(default)]
    pub modules: Vec<ModuleSnapshot>,
    #[serde(default)]
    pub chunks: Vec<ChunkSnapshot>,
    #[serde(default)]
    pub chunk_groups: Vec<ChunkGroupSnapshot>,
    /// State left by the override loader. Absent when the loader did not run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_state: Option<OverrideState>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSnapshot {
    pub kind: String,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Utf8PathBuf>,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChunkSnapshot {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub entry: bool,
    #[serde(default)]
    pub modules: Vec<usize>,
    #[serde(default)]
    pub groups: Vec<usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChunkGroupSnapshot {
    pub name: String,
    #[serde(default)]
    pub order: Vec<usize>,
}

impl GraphSnapshot {
    pub fn from_json_str(json: &str) -> Result<Self, CliError> {
        serde_json::from_str(json).map_err(|source| CliError::SnapshotParseError { source })
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            return Err(CliError::snapshot_not_found(path.to_path_buf()));
        }

        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Build the compilation the engine runs over.
    pub fn into_compilation(self, hash_options: HashOptions) -> Result<Compilation, CliError> {
        let mut compilation = Compilation::new(hash_options);

        let modules: Vec<_> = self
            .modules
            .into_iter()
            .map(|module| {
                compilation.add_module(ContentModule {
                    kind: ModuleKind::from(module.kind.as_str()),
                    identifier: module.identifier,
                    issuer: module.issuer,
                    content: module.content,
                    media: module.media,
                })
            })
            .collect();

        let module_at = |owner: &str, index: usize| {
            modules.get(index).copied().ok_or_else(|| {
                CliError::dangling_index(owner.to_string(), "module", index, modules.len())
            })
        };

        let mut groups = Vec::with_capacity(self.chunk_groups.len());
        for group in self.chunk_groups {
            let owner = format!("chunk group '{}'", group.name);
            let order = group
                .order
                .iter()
                .map(|&index| module_at(&owner, index))
                .collect::<Result<Vec<_>, _>>()?;
            groups.push(compilation.add_chunk_group(ChunkGroup::from_order(group.name, &order)));
        }

        for chunk in self.chunks {
            let owner = format!("chunk '{}'", chunk.id);
            let members = chunk
                .modules
                .iter()
                .map(|&index| module_at(&owner, index))
                .collect::<Result<Vec<_>, _>>()?;

            let mut built = Chunk::new(chunk.id).with_modules(members);
            if let Some(name) = chunk.name {
                built = built.with_name(name);
            }
            if chunk.entry {
                built = built.as_entry();
            }
            let id = compilation.add_chunk(built);

            for index in chunk.groups {
                let group = groups.get(index).copied().ok_or_else(|| {
                    CliError::dangling_index(owner.clone(), "chunk group", index, groups.len())
                })?;
                compilation.connect_chunk_and_group(id, group);
            }
        }

        if let Some(state) = self.override_state {
            compilation.set_override_state(state);
        }

        Ok(compilation)
    }
}
