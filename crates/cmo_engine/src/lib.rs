//! Override variants for extracted style modules.
//!
//! This crate sits next to a style-extraction plugin and produces per-override
//! variants of its assets, using an override map left on the compilation by a
//! loader. It supports:
//!
//! - **Single output**: rewrite a mapped chunk in place, so the default asset
//!   is rendered from the override modules
//! - **Standalone output**: keep the default asset and emit one extra asset
//!   per configured override
//! - **Keep/drop policy**: modules without an override are either kept or left
//!   out of every variant
//! - **Content hashes**: stable digests over the exact module list of a variant
//!
//! # Example
//!
//! ```no_run
//! use cmo_engine::{Compilation, OverrideEngine, OverrideState};
//! use camino::Utf8Path;
//! use cmo_options::OverrideOptions;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = OverrideOptions::from_json_str(
//!     r#"{
//!         "overrides": ["dark", "light"],
//!         "keepOriginals": true,
//!         "standalone": true,
//!         "standaloneOverridesOutputPath": "styles.[override].css"
//!     }"#,
//! )?;
//!
//! let mut compilation = Compilation::new(options.output.clone());
//! // ... add modules, chunks and chunk groups ...
//! if let Some(state) = OverrideState::load(Utf8Path::new("build/overrides.json"))? {
//!     compilation.set_override_state(state);
//! }
//!
//! let engine = OverrideEngine::with_css_extract(options)?;
//! for entry in engine.run(&mut compilation)? {
//!     let source = entry.render.call(&compilation)?;
//!     println!("{} -> {} ({} bytes)", entry.identifier, entry.filename_template, source.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod extract;
pub mod graph;
pub mod hash;
pub mod manifest;
pub mod resolver;
pub mod rewriter;
pub mod standalone;
pub mod state;
pub mod template;

/// Name the engine registers its manifest taps under, and the prefix of every
/// asset identifier it produces.
pub const PLUGIN_NAME: &str = "css-module-override";

// Re-export main types
pub use engine::OverrideEngine;
pub use error::{Error, Result};
pub use extract::{ConcatRenderer, ContentRenderer, CssExtractPlugin, ExtractPlugin};
pub use graph::{
    Chunk, ChunkGroup, ChunkGroupId, ChunkId, Compilation, ContentModule, ModuleId, ModuleKind,
    STYLE_MODULE_TYPE,
};
pub use manifest::{Manifest, ManifestEntry, PathOptions, RenderManifestHooks, RenderThunk};
pub use resolver::{Substitution, VariantResolver};
pub use rewriter::{rewrite_chunk, RewriteSummary};
pub use standalone::StandaloneAssembler;
pub use state::OverrideState;
pub use template::resolve_output_path;
