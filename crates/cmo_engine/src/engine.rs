//! The override engine: wires variant handling into the manifest-render hooks.
//!
//! [`OverrideEngine`] wraps a base [`ExtractPlugin`] and decides, once per
//! build, whether mapped chunks are rewritten before the base plugin renders
//! them or whether variant assets are appended after it.

use crate::error::Result;
use crate::extract::{ContentRenderer, CssExtractPlugin, ExtractPlugin};
use crate::manifest::{Manifest, RenderManifestContext, RenderManifestHooks};
use crate::rewriter::rewrite_chunk;
use crate::standalone::StandaloneAssembler;
use crate::template::has_override_placeholder;
use crate::PLUGIN_NAME;
use cmo_options::{OutputMode, OverrideOptions};
use std::sync::Arc;

struct EngineShared {
    options: OverrideOptions,
    renderer: Arc<dyn ContentRenderer>,
}

/// Coordinates override variants around a base extraction plugin.
///
/// The output mode is fixed at construction:
///
/// - [`OutputMode::SingleOutput`]: chunks whose name is mapped to an override
///   are rewritten before the base plugin renders them.
/// - [`OutputMode::Standalone`]: the base plugin renders every chunk as usual
///   and the engine appends one variant entry per override afterwards.
pub struct OverrideEngine {
    shared: Arc<EngineShared>,
    mode: OutputMode,
    base: Arc<dyn ExtractPlugin>,
}

impl OverrideEngine {
    /// Validate `options` and wrap `base`.
    pub fn new(options: OverrideOptions, base: Arc<dyn ExtractPlugin>) -> Result<Self> {
        options.validate()?;

        let mode = options.mode();
        if let Some(template) = &options.standalone_overrides_output_path {
            if mode == OutputMode::Standalone
                && options.overrides.len() > 1
                && !has_override_placeholder(template)
            {
                tracing::warn!(
                    "Standalone output path '{}' has no [override] placeholder; {} variants will share one filename",
                    template,
                    options.overrides.len()
                );
            }
        }

        tracing::debug!(
            "Override engine: mode={} overrides={:?} keepOriginals={}",
            mode,
            options.overrides,
            options.keep_originals
        );

        Ok(Self {
            shared: Arc::new(EngineShared {
                renderer: base.renderer(),
                options,
            }),
            mode,
            base,
        })
    }

    /// Engine over the stock [`CssExtractPlugin`].
    pub fn with_css_extract(options: OverrideOptions) -> Result<Self> {
        let base = Arc::new(CssExtractPlugin::new(&options));
        Self::new(options, base)
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn options(&self) -> &OverrideOptions {
        &self.shared.options
    }

    /// Register the engine's taps and the base plugin's taps on `hooks`.
    ///
    /// In single-output mode the rewrite taps go first so the base plugin
    /// renders the rewritten chunk. In standalone mode they go last so the
    /// default asset is rendered from the untouched chunk.
    pub fn apply(&self, hooks: &mut RenderManifestHooks) {
        match self.mode {
            OutputMode::SingleOutput => {
                let shared = self.shared.clone();
                hooks.tap_main(PLUGIN_NAME, move |_, context| rewrite_mapped_chunk(&shared, context));
                let shared = self.shared.clone();
                hooks.tap_chunk(PLUGIN_NAME, move |_, context| rewrite_mapped_chunk(&shared, context));

                self.base.apply(hooks);
            }
            OutputMode::Standalone => {
                self.base.apply(hooks);

                let shared = self.shared.clone();
                hooks.tap_main(PLUGIN_NAME, move |manifest, context| {
                    push_variant_entries(&shared, manifest, context)
                });
                let shared = self.shared.clone();
                hooks.tap_chunk(PLUGIN_NAME, move |manifest, context| {
                    push_variant_entries(&shared, manifest, context)
                });
            }
        }
    }

    /// Register on a fresh hook set and render every chunk of `compilation`.
    pub fn run(&self, compilation: &mut crate::graph::Compilation) -> Result<Manifest> {
        let mut hooks = RenderManifestHooks::new();
        self.apply(&mut hooks);
        hooks.run(compilation)
    }
}

fn rewrite_mapped_chunk(shared: &EngineShared, context: &mut RenderManifestContext<'_>) -> Result<()> {
    let chunk = context
        .compilation
        .chunk(context.chunk)
        .ok_or(crate::Error::UnknownChunk(context.chunk))?;

    let Some(override_name) = chunk
        .name()
        .and_then(|name| context.compilation.override_state().entry_override(name))
        .map(str::to_string)
    else {
        return Ok(());
    };

    rewrite_chunk(
        context.compilation,
        context.chunk,
        &override_name,
        shared.options.keep_originals,
    )?;
    Ok(())
}

fn push_variant_entries(
    shared: &EngineShared,
    manifest: &mut Manifest,
    context: &mut RenderManifestContext<'_>,
) -> Result<()> {
    let output_path = shared
        .options
        .standalone_overrides_output_path
        .as_deref()
        .unwrap_or_default();
    let assembler = StandaloneAssembler::new(
        &shared.options.overrides,
        shared.options.keep_originals,
        output_path,
        shared.renderer.clone(),
    );

    let compilation = &*context.compilation;
    let rendered = compilation.style_modules_in_order(context.chunk);
    if rendered.is_empty() {
        return Ok(());
    }

    manifest.extend(assembler.assemble(compilation, context.chunk, &rendered)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Chunk, ChunkGroup, ChunkId, Compilation, ContentModule, ModuleId};
    use crate::state::OverrideState;
    use crate::Error;
    use cmo_options::ConfigError;

    struct Fixture {
        compilation: Compilation,
        main: ChunkId,
        lazy: ChunkId,
        a: ModuleId,
        b: ModuleId,
        c: ModuleId,
        a_dark: ModuleId,
        c_dark: ModuleId,
    }

    fn fixture() -> Fixture {
        let mut compilation = Compilation::default();
        let a = compilation.add_module(ContentModule::style("css ./a.css", "a.css", ".a{}"));
        let b = compilation.add_module(ContentModule::style("css ./b.css", "b.css", ".b{}"));
        let c = compilation.add_module(ContentModule::style("css ./c.css", "c.css", ".c{}"));
        let a_dark = compilation.add_module(ContentModule::style(
            "css ./a.dark.css",
            "a.dark.css",
            ".a{color:#fff}",
        ));
        let c_dark = compilation.add_module(ContentModule::style(
            "css ./c.dark.css",
            "c.dark.css",
            ".c{color:#fff}",
        ));

        let main = compilation.add_chunk(
            Chunk::new("main")
                .with_name("main")
                .as_entry()
                .with_modules([a, b]),
        );
        let lazy = compilation.add_chunk(Chunk::new("7").with_modules([c]));
        let main_group = compilation.add_chunk_group(ChunkGroup::from_order("main", &[a, b]));
        let lazy_group = compilation.add_chunk_group(ChunkGroup::from_order("7", &[c]));
        compilation.connect_chunk_and_group(main, main_group);
        compilation.connect_chunk_and_group(lazy, lazy_group);

        let mut state = OverrideState::default();
        state.insert_override("a.css", "dark", "a.dark.css");
        state.insert_override("c.css", "dark", "c.dark.css");
        state.map_entry("main", "dark");
        compilation.set_override_state(state);

        Fixture {
            compilation,
            main,
            lazy,
            a,
            b,
            c,
            a_dark,
            c_dark,
        }
    }

    fn standalone_options(overrides: &[&str], template: &str) -> OverrideOptions {
        let mut options = OverrideOptions::new(overrides.iter().copied());
        options.standalone = true;
        options.keep_originals = true;
        options.standalone_overrides_output_path = Some(template.to_string());
        options
    }

    #[test]
    fn test_single_output_rewrites_mapped_entry() {
        let mut f = fixture();
        let mut options = OverrideOptions::new(["dark"]);
        options.keep_originals = true;
        let engine = OverrideEngine::with_css_extract(options).unwrap();
        assert_eq!(engine.mode(), OutputMode::SingleOutput);

        let manifest = engine.run(&mut f.compilation).unwrap();

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest[0].identifier, "css-module-override.maindark");
        assert_eq!(manifest[0].render.modules(), &[f.a_dark, f.b]);
        assert_eq!(f.compilation.chunk(f.main).unwrap().id(), "maindark");

        // The lazy chunk has no name, so no entry mapping applies to it.
        assert_eq!(manifest[1].identifier, "css-module-override.7");
        assert_eq!(manifest[1].render.modules(), &[f.c]);
        assert_eq!(f.compilation.chunk(f.lazy).unwrap().id(), "7");
    }

    #[test]
    fn test_single_output_without_loader_state() {
        let mut f = fixture();
        f.compilation.set_override_state(OverrideState::default());
        let engine = OverrideEngine::with_css_extract(OverrideOptions::new(["dark"])).unwrap();

        let manifest = engine.run(&mut f.compilation).unwrap();

        assert_eq!(manifest[0].identifier, "css-module-override.main");
        assert_eq!(manifest[0].render.modules(), &[f.a, f.b]);
    }

    #[test]
    fn test_standalone_keeps_default_and_appends_variants() {
        let mut f = fixture();
        let engine = OverrideEngine::with_css_extract(standalone_options(
            &["dark", "light"],
            "themes/[name].[override].css",
        ))
        .unwrap();
        assert_eq!(engine.mode(), OutputMode::Standalone);

        let manifest = engine.run(&mut f.compilation).unwrap();
        let identifiers: Vec<&str> = manifest.iter().map(|e| e.identifier.as_str()).collect();

        assert_eq!(
            identifiers,
            vec![
                "css-module-override.main",
                "css-module-override.dark.main",
                "css-module-override.light.main",
                "css-module-override.7",
                "css-module-override.dark.7",
                "css-module-override.light.7",
            ]
        );
        assert_eq!(manifest[0].render.modules(), &[f.a, f.b]);
        assert_eq!(manifest[1].render.modules(), &[f.a_dark, f.b]);
        assert_eq!(manifest[1].filename_template, "themes/[name].dark.css");
        assert_eq!(manifest[4].render.modules(), &[f.c_dark]);
        assert_eq!(f.compilation.chunk(f.main).unwrap().id(), "main");
    }

    #[test]
    fn test_standalone_drop_originals_skips_empty_variants() {
        let mut f = fixture();
        let mut options = standalone_options(&["dark", "light"], "[name].[override].css");
        options.keep_originals = false;
        let engine = OverrideEngine::with_css_extract(options).unwrap();

        let manifest = engine.run(&mut f.compilation).unwrap();
        let identifiers: Vec<&str> = manifest.iter().map(|e| e.identifier.as_str()).collect();

        assert_eq!(
            identifiers,
            vec![
                "css-module-override.main",
                "css-module-override.dark.main",
                "css-module-override.7",
                "css-module-override.dark.7",
            ]
        );
        assert_eq!(manifest[1].render.modules(), &[f.a_dark]);
    }

    #[test]
    fn test_standalone_without_loader_state_emits_defaults_only() {
        let mut f = fixture();
        f.compilation.set_override_state(OverrideState::default());
        let engine =
            OverrideEngine::with_css_extract(standalone_options(&["dark"], "[override].css"))
                .unwrap();

        let manifest = engine.run(&mut f.compilation).unwrap();
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let mut options = OverrideOptions::new(["dark"]);
        options.standalone = true;

        let err = OverrideEngine::with_css_extract(options).err().unwrap();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingStandaloneOutputPath)
        ));
    }

    #[test]
    fn test_template_without_placeholder_is_used_verbatim() {
        let mut f = fixture();
        let engine = OverrideEngine::with_css_extract(standalone_options(
            &["dark", "light"],
            "styles.css",
        ))
        .unwrap();
        assert_eq!(engine.options().overrides, vec!["dark", "light"]);

        let manifest = engine.run(&mut f.compilation).unwrap();
        assert_eq!(manifest[1].filename_template, "styles.css");
        assert_eq!(manifest[2].filename_template, "styles.css");
    }
}
