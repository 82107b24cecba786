//! In-memory model of the host's compiled module graph.
//!
//! The host build tool owns everything in this module. The override engine only
//! reads modules, re-references them, and (in single-output mode) edits chunk
//! membership and chunk-group position indices. Handles ([`ModuleId`],
//! [`ChunkId`], [`ChunkGroupId`]) are indices into the arenas held by
//! [`Compilation`] and are only meaningful for the compilation that issued them.

use crate::hash::ContentDigest;
use crate::state::OverrideState;
use camino::{Utf8Path, Utf8PathBuf};
use cmo_options::HashOptions;
use std::collections::HashMap;
use std::fmt;

/// Module type tag of content modules produced by style extraction.
pub const STYLE_MODULE_TYPE: &str = "css/mini-extract";

/// Handle to a [`ContentModule`] owned by a [`Compilation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(usize);

/// Handle to a [`Chunk`] owned by a [`Compilation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(usize);

/// Handle to a [`ChunkGroup`] owned by a [`Compilation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkGroupId(usize);

macro_rules! impl_handle {
    ($ty:ident, $prefix:literal) => {
        impl $ty {
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

impl_handle!(ModuleId, "module");
impl_handle!(ChunkId, "chunk");
impl_handle!(ChunkGroupId, "chunk-group");

/// Kind tag of a content module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleKind {
    /// Output of the style extraction loader. The only kind that takes part in overrides.
    StyleExtract,
    /// Any other module type, kept verbatim.
    Other(String),
}

impl ModuleKind {
    pub fn as_str(&self) -> &str {
        match self {
            ModuleKind::StyleExtract => STYLE_MODULE_TYPE,
            ModuleKind::Other(kind) => kind,
        }
    }
}

impl From<&str> for ModuleKind {
    fn from(kind: &str) -> Self {
        if kind == STYLE_MODULE_TYPE {
            ModuleKind::StyleExtract
        } else {
            ModuleKind::Other(kind.to_string())
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of extracted content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentModule {
    pub kind: ModuleKind,
    /// Unique module identifier assigned by the host.
    pub identifier: String,
    /// Resource of the issuing module, i.e. the source file this content came from.
    pub issuer: Option<Utf8PathBuf>,
    /// Opaque content, never modified here.
    pub content: String,
    /// Media query the content is scoped to, if any.
    pub media: Option<String>,
}

impl ContentModule {
    /// A style-extraction module issued by `issuer`.
    pub fn style(
        identifier: impl Into<String>,
        issuer: impl Into<Utf8PathBuf>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            kind: ModuleKind::StyleExtract,
            identifier: identifier.into(),
            issuer: Some(issuer.into()),
            content: content.into(),
            media: None,
        }
    }

    pub fn with_media(mut self, media: impl Into<String>) -> Self {
        self.media = Some(media.into());
        self
    }

    pub fn is_style_extract(&self) -> bool {
        self.kind == ModuleKind::StyleExtract
    }

    /// Identity of the source file that produced this module.
    pub fn origin_resource(&self) -> Option<&Utf8Path> {
        self.issuer.as_deref()
    }

    /// Feed this module into a running content digest.
    pub fn update_hash(&self, digest: &mut ContentDigest) {
        digest.update_field(self.identifier.as_bytes());
        digest.update_field(self.content.as_bytes());
        digest.update_field(self.media.as_deref().unwrap_or("").as_bytes());
    }
}

/// An output unit: ordered module membership plus the groups it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    id: String,
    name: Option<String>,
    entry: bool,
    modules: Vec<ModuleId>,
    groups: Vec<ChunkGroupId>,
}

impl Chunk {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            entry: false,
            modules: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mark the chunk as an entry chunk, rendered through the main extension point.
    pub fn as_entry(mut self) -> Self {
        self.entry = true;
        self
    }

    pub fn with_modules(mut self, modules: impl IntoIterator<Item = ModuleId>) -> Self {
        for module in modules {
            self.add_module(module);
        }
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Append `suffix` to the chunk's identity token.
    pub fn append_to_id(&mut self, suffix: &str) {
        self.id.push_str(suffix);
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_entry(&self) -> bool {
        self.entry
    }

    pub fn modules(&self) -> &[ModuleId] {
        &self.modules
    }

    pub fn groups(&self) -> &[ChunkGroupId] {
        &self.groups
    }

    pub fn contains_module(&self, module: ModuleId) -> bool {
        self.modules.contains(&module)
    }

    /// Add a module at the end. Returns `false` if it was already a member.
    pub fn add_module(&mut self, module: ModuleId) -> bool {
        if self.contains_module(module) {
            return false;
        }
        self.modules.push(module);
        true
    }

    /// Returns `false` if the module was not a member.
    pub fn remove_module(&mut self, module: ModuleId) -> bool {
        let before = self.modules.len();
        self.modules.retain(|&m| m != module);
        self.modules.len() != before
    }

    /// Put `replacement` into the membership slot held by `original`.
    ///
    /// If `replacement` was already a member it moves to that slot.
    /// Returns `false` (and changes nothing) when `original` is not a member.
    pub fn replace_module(&mut self, original: ModuleId, replacement: ModuleId) -> bool {
        if original == replacement {
            return self.contains_module(original);
        }
        if !self.contains_module(original) {
            return false;
        }
        self.modules.retain(|&m| m != replacement);
        if let Some(slot) = self.modules.iter().position(|&m| m == original) {
            self.modules[slot] = replacement;
        }
        true
    }

    pub(crate) fn push_group(&mut self, group: ChunkGroupId) {
        if !self.groups.contains(&group) {
            self.groups.push(group);
        }
    }
}

/// Ordering tables for the modules of one chunk group.
///
/// The host emits modules in pre-/post-order index order. Indices are keyed by
/// module identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkGroup {
    name: String,
    pre_order: HashMap<ModuleId, u32>,
    post_order: HashMap<ModuleId, u32>,
}

impl ChunkGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A group whose pre- and post-order index of every module is its position in `order`.
    pub fn from_order(name: impl Into<String>, order: &[ModuleId]) -> Self {
        let mut group = Self::new(name);
        for (index, &module) in order.iter().enumerate() {
            group.set_module_pre_order_index(module, index as u32);
            group.set_module_post_order_index(module, index as u32);
        }
        group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module_pre_order_index(&self, module: ModuleId) -> Option<u32> {
        self.pre_order.get(&module).copied()
    }

    pub fn set_module_pre_order_index(&mut self, module: ModuleId, index: u32) {
        self.pre_order.insert(module, index);
    }

    pub fn module_post_order_index(&self, module: ModuleId) -> Option<u32> {
        self.post_order.get(&module).copied()
    }

    pub fn set_module_post_order_index(&mut self, module: ModuleId, index: u32) {
        self.post_order.insert(module, index);
    }

    /// Move every index held by `original` to `replacement`.
    ///
    /// Any index `replacement` held before is overwritten. Returns `true` if
    /// `original` was indexed by this group.
    pub fn replace_module_indices(&mut self, original: ModuleId, replacement: ModuleId) -> bool {
        if original == replacement {
            return self.pre_order.contains_key(&original)
                || self.post_order.contains_key(&original);
        }
        let mut indexed = false;
        for table in [&mut self.pre_order, &mut self.post_order] {
            if let Some(index) = table.remove(&original) {
                table.insert(replacement, index);
                indexed = true;
            }
        }
        indexed
    }
}

/// The host's compilation: module, chunk and chunk-group arenas plus the
/// state other collaborators attach to it.
#[derive(Debug, Default)]
pub struct Compilation {
    modules: Vec<ContentModule>,
    chunks: Vec<Chunk>,
    chunk_groups: Vec<ChunkGroup>,
    override_state: OverrideState,
    hash_options: HashOptions,
}

impl Compilation {
    pub fn new(hash_options: HashOptions) -> Self {
        Self {
            hash_options,
            ..Self::default()
        }
    }

    pub fn hash_options(&self) -> &HashOptions {
        &self.hash_options
    }

    pub fn add_module(&mut self, module: ContentModule) -> ModuleId {
        self.modules.push(module);
        ModuleId(self.modules.len() - 1)
    }

    pub fn module(&self, id: ModuleId) -> Option<&ContentModule> {
        self.modules.get(id.0)
    }

    pub fn modules(&self) -> impl Iterator<Item = (ModuleId, &ContentModule)> {
        self.modules
            .iter()
            .enumerate()
            .map(|(index, module)| (ModuleId(index), module))
    }

    pub fn add_chunk(&mut self, chunk: Chunk) -> ChunkId {
        self.chunks.push(chunk);
        ChunkId(self.chunks.len() - 1)
    }

    pub fn chunk(&self, id: ChunkId) -> Option<&Chunk> {
        self.chunks.get(id.0)
    }

    pub fn chunk_mut(&mut self, id: ChunkId) -> Option<&mut Chunk> {
        self.chunks.get_mut(id.0)
    }

    pub fn chunk_ids(&self) -> impl Iterator<Item = ChunkId> {
        (0..self.chunks.len()).map(ChunkId)
    }

    pub fn add_chunk_group(&mut self, group: ChunkGroup) -> ChunkGroupId {
        self.chunk_groups.push(group);
        ChunkGroupId(self.chunk_groups.len() - 1)
    }

    pub fn chunk_group(&self, id: ChunkGroupId) -> Option<&ChunkGroup> {
        self.chunk_groups.get(id.0)
    }

    pub fn chunk_group_mut(&mut self, id: ChunkGroupId) -> Option<&mut ChunkGroup> {
        self.chunk_groups.get_mut(id.0)
    }

    /// Record that `chunk` belongs to `group`. Unknown handles are ignored.
    pub fn connect_chunk_and_group(&mut self, chunk: ChunkId, group: ChunkGroupId) {
        if group.0 >= self.chunk_groups.len() {
            return;
        }
        if let Some(chunk) = self.chunks.get_mut(chunk.0) {
            chunk.push_group(group);
        }
    }

    pub fn override_state(&self) -> &OverrideState {
        &self.override_state
    }

    pub fn set_override_state(&mut self, state: OverrideState) {
        self.override_state = state;
    }

    /// First style-extraction module whose origin resource is `resource`.
    pub fn find_style_module(&self, resource: &Utf8Path) -> Option<ModuleId> {
        self.modules()
            .find(|(_, module)| {
                module.is_style_extract() && module.origin_resource() == Some(resource)
            })
            .map(|(id, _)| id)
    }

    /// Style-extraction modules of a chunk in emission order.
    ///
    /// Modules are ordered by their lowest post-order index across the chunk's
    /// groups. Modules no group indexes come last, in membership order.
    pub fn style_modules_in_order(&self, chunk: ChunkId) -> Vec<ModuleId> {
        let Some(chunk) = self.chunk(chunk) else {
            return Vec::new();
        };

        let mut ordered: Vec<(Option<u32>, ModuleId)> = chunk
            .modules()
            .iter()
            .copied()
            .filter(|&id| self.module(id).is_some_and(ContentModule::is_style_extract))
            .map(|id| {
                let index = chunk
                    .groups()
                    .iter()
                    .filter_map(|&g| self.chunk_group(g)?.module_post_order_index(id))
                    .min();
                (index, id)
            })
            .collect();

        ordered.sort_by_key(|(index, _)| (index.is_none(), *index));
        ordered.into_iter().map(|(_, id)| id).collect()
    }
}
