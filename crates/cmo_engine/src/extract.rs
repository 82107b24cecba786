//! Base style extraction: the collaborator the override engine wraps.
//!
//! The override engine never renders bytes itself. It hands module lists to a
//! [`ContentRenderer`] and lets an [`ExtractPlugin`] emit the default asset of
//! every chunk. [`CssExtractPlugin`] with [`ConcatRenderer`] is the stock
//! implementation; hosts with their own extraction pipeline implement the two
//! traits instead.

use crate::error::{Error, Result};
use crate::graph::{Compilation, ModuleId, STYLE_MODULE_TYPE};
use crate::hash::content_hash;
use crate::manifest::{
    Manifest, ManifestEntry, PathOptions, RenderManifestContext, RenderManifestHooks, RenderThunk,
};
use crate::PLUGIN_NAME;
use cmo_options::OverrideOptions;
use std::sync::Arc;

/// Turns an ordered module list into asset source.
pub trait ContentRenderer: Send + Sync {
    fn render(&self, compilation: &Compilation, modules: &[ModuleId]) -> Result<String>;
}

/// Extraction plugin that owns the default asset of each chunk.
pub trait ExtractPlugin: Send + Sync {
    /// Register the plugin's manifest taps.
    fn apply(&self, hooks: &mut RenderManifestHooks);

    /// Renderer used for the plugin's assets. Variant assets are rendered with it too.
    fn renderer(&self) -> Arc<dyn ContentRenderer>;
}

/// Concatenates style modules in list order.
///
/// Each module is preceded by a `/* identifier */` banner; modules with a
/// media query are wrapped in an `@media` block. Modules of other kinds are
/// skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatRenderer;

impl ContentRenderer for ConcatRenderer {
    fn render(&self, compilation: &Compilation, modules: &[ModuleId]) -> Result<String> {
        let mut source = String::new();

        for &id in modules {
            let module = compilation.module(id).ok_or(Error::UnknownModule(id))?;
            if !module.is_style_extract() {
                continue;
            }

            source.push_str(&format!("/* {} */\n", module.identifier));
            match &module.media {
                Some(media) => {
                    source.push_str(&format!("@media {} {{\n", media));
                    source.push_str(&module.content);
                    source.push_str("\n}\n");
                }
                None => {
                    source.push_str(&module.content);
                    source.push('\n');
                }
            }
        }

        Ok(source)
    }
}

struct ExtractShared {
    filename: String,
    chunk_filename: String,
    renderer: Arc<dyn ContentRenderer>,
}

/// Emits one default style asset per chunk that contains style modules.
pub struct CssExtractPlugin {
    shared: Arc<ExtractShared>,
}

impl CssExtractPlugin {
    pub fn new(options: &OverrideOptions) -> Self {
        Self::with_renderer(options, Arc::new(ConcatRenderer))
    }

    pub fn with_renderer(options: &OverrideOptions, renderer: Arc<dyn ContentRenderer>) -> Self {
        Self {
            shared: Arc::new(ExtractShared {
                filename: options.filename.clone(),
                chunk_filename: options.chunk_filename.clone(),
                renderer,
            }),
        }
    }
}

impl ExtractPlugin for CssExtractPlugin {
    fn apply(&self, hooks: &mut RenderManifestHooks) {
        let shared = self.shared.clone();
        hooks.tap_main(PLUGIN_NAME, move |manifest, context| {
            push_default_entry(&shared, &shared.filename, manifest, context)
        });

        let shared = self.shared.clone();
        hooks.tap_chunk(PLUGIN_NAME, move |manifest, context| {
            push_default_entry(&shared, &shared.chunk_filename, manifest, context)
        });
    }

    fn renderer(&self) -> Arc<dyn ContentRenderer> {
        self.shared.renderer.clone()
    }
}

fn push_default_entry(
    shared: &ExtractShared,
    filename_template: &str,
    manifest: &mut Manifest,
    context: &mut RenderManifestContext<'_>,
) -> Result<()> {
    let compilation = &*context.compilation;
    let chunk = compilation
        .chunk(context.chunk)
        .ok_or(Error::UnknownChunk(context.chunk))?;

    let modules = compilation.style_modules_in_order(context.chunk);
    if modules.is_empty() {
        return Ok(());
    }

    let hash = content_hash(compilation, &modules, compilation.hash_options());
    manifest.push(ManifestEntry {
        render: RenderThunk::new(shared.renderer.clone(), modules),
        filename_template: filename_template.to_string(),
        path_options: PathOptions {
            chunk: context.chunk,
            content_hash_type: STYLE_MODULE_TYPE.to_string(),
        },
        identifier: format!("{}.{}", PLUGIN_NAME, chunk.id()),
        hash,
    });

    Ok(())
}
