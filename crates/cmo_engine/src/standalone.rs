//! Standalone mode: one extra asset per override, next to the default asset.
//!
//! The chunk is never modified. For every configured override the rendered
//! style modules of the chunk are run through the same substitution plan as
//! single-output rewriting, and the resulting list becomes its own manifest
//! entry with its own content hash and filename.

use crate::error::Result;
use crate::extract::ContentRenderer;
use crate::graph::{ChunkId, Compilation, ModuleId, STYLE_MODULE_TYPE};
use crate::hash::content_hash;
use crate::manifest::{ManifestEntry, PathOptions, RenderThunk};
use crate::resolver::{plan, variant_modules};
use crate::template::resolve_output_path;
use crate::PLUGIN_NAME;
use std::sync::Arc;

/// Builds variant manifest entries for one chunk at a time.
pub struct StandaloneAssembler<'a> {
    overrides: &'a [String],
    keep_originals: bool,
    output_path: &'a str,
    renderer: Arc<dyn ContentRenderer>,
}

impl<'a> StandaloneAssembler<'a> {
    /// `overrides` are emitted in the order given.
    /// `output_path` is the standalone filename template.
    pub fn new(
        overrides: &'a [String],
        keep_originals: bool,
        output_path: &'a str,
        renderer: Arc<dyn ContentRenderer>,
    ) -> Self {
        Self {
            overrides,
            keep_originals,
            output_path,
            renderer,
        }
    }

    /// Module list of `override_name` derived from `rendered`.
    pub fn variant_modules(
        &self,
        compilation: &Compilation,
        rendered: &[ModuleId],
        override_name: &str,
    ) -> Vec<ModuleId> {
        variant_modules(&plan(
            compilation,
            rendered,
            override_name,
            self.keep_originals,
        ))
    }

    /// One entry per override whose module list is not empty.
    ///
    /// `rendered` is the chunk's style modules in emission order. Without an
    /// override map on the compilation nothing is emitted.
    pub fn assemble(
        &self,
        compilation: &Compilation,
        chunk: ChunkId,
        rendered: &[ModuleId],
    ) -> Result<Vec<ManifestEntry>> {
        let Some(chunk_id) = compilation.chunk(chunk).map(|c| c.id().to_string()) else {
            return Err(crate::Error::UnknownChunk(chunk));
        };

        if compilation.override_state().overrides_map().is_none() {
            tracing::debug!(
                "No override map on compilation; no variant assets for chunk '{}'",
                chunk_id
            );
            return Ok(Vec::new());
        }

        let mut entries = Vec::with_capacity(self.overrides.len());
        for override_name in self.overrides {
            let modules = self.variant_modules(compilation, rendered, override_name);
            if modules.is_empty() {
                tracing::debug!(
                    "Override '{}' leaves chunk '{}' empty; skipping",
                    override_name,
                    chunk_id
                );
                continue;
            }

            let filename_template =
                resolve_output_path(self.output_path, Some(override_name.as_str()))?;
            let hash = content_hash(compilation, &modules, compilation.hash_options());
            let identifier = format!("{}.{}.{}", PLUGIN_NAME, override_name, chunk_id);

            tracing::debug!(
                "Variant asset '{}' modules={} file={} hash={}",
                identifier,
                modules.len(),
                filename_template,
                hash
            );

            entries.push(ManifestEntry {
                render: RenderThunk::new(self.renderer.clone(), modules),
                filename_template,
                path_options: PathOptions {
                    chunk,
                    content_hash_type: STYLE_MODULE_TYPE.to_string(),
                },
                identifier,
                hash,
            });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ConcatRenderer;
    use crate::graph::{Chunk, ChunkGroup, ContentModule};
    use crate::state::OverrideState;

    struct Fixture {
        compilation: Compilation,
        chunk: ChunkId,
        a: ModuleId,
        b: ModuleId,
        a_dark: ModuleId,
        b_light: ModuleId,
    }

    fn fixture() -> Fixture {
        let mut compilation = Compilation::default();
        let a = compilation.add_module(ContentModule::style("css ./a.css", "a.css", ".a{}"));
        let b = compilation.add_module(ContentModule::style("css ./b.css", "b.css", ".b{}"));
        let a_dark = compilation.add_module(ContentModule::style(
            "css ./a.dark.css",
            "a.dark.css",
            ".a{color:#fff}",
        ));
        let b_light = compilation.add_module(ContentModule::style(
            "css ./b.light.css",
            "b.light.css",
            ".b{color:#000}",
        ));

        let chunk = compilation.add_chunk(
            Chunk::new("main")
                .with_name("main")
                .as_entry()
                .with_modules([a, b]),
        );
        let group = compilation.add_chunk_group(ChunkGroup::from_order("main", &[a, b]));
        compilation.connect_chunk_and_group(chunk, group);

        let mut state = OverrideState::default();
        state.insert_override("a.css", "dark", "a.dark.css");
        state.insert_override("b.css", "light", "b.light.css");
        compilation.set_override_state(state);

        Fixture {
            compilation,
            chunk,
            a,
            b,
            a_dark,
            b_light,
        }
    }

    fn overrides(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_two_overrides_in_configuration_order() {
        let f = fixture();
        let names = overrides(&["dark", "light"]);
        let assembler =
            StandaloneAssembler::new(&names, true, "styles.[override].css", Arc::new(ConcatRenderer));

        let rendered = f.compilation.style_modules_in_order(f.chunk);
        let entries = assembler.assemble(&f.compilation, f.chunk, &rendered).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].identifier, "css-module-override.dark.main");
        assert_eq!(entries[1].identifier, "css-module-override.light.main");
        assert_eq!(entries[0].filename_template, "styles.dark.css");
        assert_eq!(entries[1].filename_template, "styles.light.css");
        assert_eq!(entries[0].render.modules(), &[f.a_dark, f.b]);
        assert_eq!(entries[1].render.modules(), &[f.a, f.b_light]);
        assert_ne!(entries[0].hash, entries[1].hash);
        assert_eq!(entries[0].path_options.chunk, f.chunk);
        assert_eq!(entries[0].path_options.content_hash_type, STYLE_MODULE_TYPE);
    }

    #[test]
    fn test_chunk_is_not_mutated() {
        let f = fixture();
        let names = overrides(&["dark"]);
        let assembler =
            StandaloneAssembler::new(&names, false, "[override].css", Arc::new(ConcatRenderer));

        let rendered = f.compilation.style_modules_in_order(f.chunk);
        assembler.assemble(&f.compilation, f.chunk, &rendered).unwrap();

        let chunk = f.compilation.chunk(f.chunk).unwrap();
        assert_eq!(chunk.id(), "main");
        assert_eq!(chunk.modules(), &[f.a, f.b]);
    }

    #[test]
    fn test_empty_variant_emits_nothing() {
        let f = fixture();
        let names = overrides(&["contrast"]);
        let assembler =
            StandaloneAssembler::new(&names, false, "[override].css", Arc::new(ConcatRenderer));

        let rendered = f.compilation.style_modules_in_order(f.chunk);
        let entries = assembler.assemble(&f.compilation, f.chunk, &rendered).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_drop_originals() {
        let f = fixture();
        let names = overrides(&["dark"]);
        let assembler =
            StandaloneAssembler::new(&names, false, "[override].css", Arc::new(ConcatRenderer));

        assert_eq!(
            assembler.variant_modules(&f.compilation, &[f.a, f.b], "dark"),
            vec![f.a_dark]
        );
    }

    #[test]
    fn test_identical_lists_hash_identically() {
        let f = fixture();
        let names = overrides(&["dark", "contrast"]);
        let assembler =
            StandaloneAssembler::new(&names, true, "[override].css", Arc::new(ConcatRenderer));

        let rendered = f.compilation.style_modules_in_order(f.chunk);
        let first = assembler.assemble(&f.compilation, f.chunk, &rendered).unwrap();
        let second = assembler.assemble(&f.compilation, f.chunk, &rendered).unwrap();

        let hashes = |entries: &[ManifestEntry]| {
            entries.iter().map(|e| e.hash.clone()).collect::<Vec<_>>()
        };
        assert_eq!(hashes(&first), hashes(&second));
        // "contrast" has no overrides, so with keepOriginals it equals the default list.
        assert_eq!(
            first[1].hash,
            content_hash(&f.compilation, &rendered, f.compilation.hash_options())
        );
    }

    #[test]
    fn test_without_override_map_emits_nothing() {
        let mut f = fixture();
        f.compilation.set_override_state(OverrideState::default());
        let names = overrides(&["dark"]);
        let assembler =
            StandaloneAssembler::new(&names, true, "[override].css", Arc::new(ConcatRenderer));

        let rendered = f.compilation.style_modules_in_order(f.chunk);
        let entries = assembler.assemble(&f.compilation, f.chunk, &rendered).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_render_thunk_renders_variant() {
        let f = fixture();
        let names = overrides(&["dark"]);
        let assembler =
            StandaloneAssembler::new(&names, true, "[override].css", Arc::new(ConcatRenderer));

        let rendered = f.compilation.style_modules_in_order(f.chunk);
        let entries = assembler.assemble(&f.compilation, f.chunk, &rendered).unwrap();
        let source = entries[0].render.call(&f.compilation).unwrap();

        assert_eq!(
            source,
            "/* css ./a.dark.css */\n.a{color:#fff}\n/* css ./b.css */\n.b{}\n"
        );
    }
}
