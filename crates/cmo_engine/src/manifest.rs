//! Render manifest entries and the host's manifest-render extension points.
//!
//! For every chunk the host runs one of two tap lists: the **main** taps for
//! entry chunks and the **chunk** taps for every other chunk. Each tap receives
//! the manifest being accumulated for that chunk and a context holding the
//! compilation and the chunk handle. Taps run synchronously in registration
//! order, so a tap registered before another sees the chunk first.

use crate::error::{Error, Result};
use crate::extract::ContentRenderer;
use crate::graph::{ChunkId, Compilation, ModuleId};
use std::fmt;
use std::sync::Arc;

/// Deferred rendering of a module list through a [`ContentRenderer`].
#[derive(Clone)]
pub struct RenderThunk {
    renderer: Arc<dyn ContentRenderer>,
    modules: Vec<ModuleId>,
}

impl RenderThunk {
    pub fn new(renderer: Arc<dyn ContentRenderer>, modules: Vec<ModuleId>) -> Self {
        Self { renderer, modules }
    }

    pub fn modules(&self) -> &[ModuleId] {
        &self.modules
    }

    /// Render the asset source.
    pub fn call(&self, compilation: &Compilation) -> Result<String> {
        self.renderer.render(compilation, &self.modules)
    }
}

impl fmt::Debug for RenderThunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderThunk")
            .field("modules", &self.modules)
            .finish_non_exhaustive()
    }
}

/// Options the host needs to interpolate an entry's filename template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathOptions {
    /// Chunk that owns the asset.
    pub chunk: ChunkId,
    /// Key of the content hash this entry provides (`[contenthash]`).
    pub content_hash_type: String,
}

/// One asset the host should emit.
#[derive(Debug, Clone)]
pub struct ManifestEntry {
    pub render: RenderThunk,
    pub filename_template: String,
    pub path_options: PathOptions,
    /// Unique across the manifest of one compilation.
    pub identifier: String,
    pub hash: String,
}

/// Entries accumulated while rendering a compilation.
pub type Manifest = Vec<ManifestEntry>;

/// What a tap sees of the build.
pub struct RenderManifestContext<'a> {
    pub compilation: &'a mut Compilation,
    pub chunk: ChunkId,
}

/// A manifest-render callback.
pub type ManifestTap =
    Box<dyn Fn(&mut Manifest, &mut RenderManifestContext<'_>) -> Result<()> + Send + Sync>;

/// The two manifest-render extension points.
#[derive(Default)]
pub struct RenderManifestHooks {
    main: Vec<(String, ManifestTap)>,
    chunk: Vec<(String, ManifestTap)>,
}

impl RenderManifestHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tap for entry chunks.
    pub fn tap_main<F>(&mut self, name: impl Into<String>, tap: F)
    where
        F: Fn(&mut Manifest, &mut RenderManifestContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.main.push((name.into(), Box::new(tap)));
    }

    /// Register a tap for non-entry chunks.
    pub fn tap_chunk<F>(&mut self, name: impl Into<String>, tap: F)
    where
        F: Fn(&mut Manifest, &mut RenderManifestContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        self.chunk.push((name.into(), Box::new(tap)));
    }

    pub fn call_main(
        &self,
        manifest: &mut Manifest,
        context: &mut RenderManifestContext<'_>,
    ) -> Result<()> {
        call_taps(&self.main, manifest, context)
    }

    pub fn call_chunk(
        &self,
        manifest: &mut Manifest,
        context: &mut RenderManifestContext<'_>,
    ) -> Result<()> {
        call_taps(&self.chunk, manifest, context)
    }

    /// Render the manifest of every chunk, in chunk order.
    ///
    /// Entry chunks go through the main taps, the rest through the chunk taps.
    pub fn run(&self, compilation: &mut Compilation) -> Result<Manifest> {
        let chunks: Vec<ChunkId> = compilation.chunk_ids().collect();
        let mut manifest = Manifest::new();

        for chunk in chunks {
            let entry = compilation
                .chunk(chunk)
                .ok_or(Error::UnknownChunk(chunk))?
                .is_entry();
            let mut context = RenderManifestContext {
                compilation: &mut *compilation,
                chunk,
            };
            if entry {
                self.call_main(&mut manifest, &mut context)?;
            } else {
                self.call_chunk(&mut manifest, &mut context)?;
            }
        }

        Ok(manifest)
    }
}

fn call_taps(
    taps: &[(String, ManifestTap)],
    manifest: &mut Manifest,
    context: &mut RenderManifestContext<'_>,
) -> Result<()> {
    for (name, tap) in taps {
        tracing::trace!("Calling manifest tap '{}' for {}", name, context.chunk);
        tap(manifest, context)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Chunk;
    use std::sync::Mutex;

    #[test]
    fn test_taps_run_in_registration_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = RenderManifestHooks::new();

        for name in ["first", "second"] {
            let calls = calls.clone();
            hooks.tap_main(name, move |_, context| {
                let id = context.compilation.chunk(context.chunk).unwrap().id().to_string();
                calls.lock().unwrap().push(format!("{name}:{id}"));
                Ok(())
            });
        }

        let mut compilation = Compilation::default();
        compilation.add_chunk(Chunk::new("main").as_entry());
        hooks.run(&mut compilation).unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["first:main", "second:main"]);
    }

    #[test]
    fn test_entry_and_non_entry_chunks_use_their_own_taps() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut hooks = RenderManifestHooks::new();

        let main_calls = calls.clone();
        hooks.tap_main("main", move |_, context| {
            main_calls.lock().unwrap().push(format!("main:{}", context.chunk));
            Ok(())
        });
        let chunk_calls = calls.clone();
        hooks.tap_chunk("chunk", move |_, context| {
            chunk_calls.lock().unwrap().push(format!("chunk:{}", context.chunk));
            Ok(())
        });

        let mut compilation = Compilation::default();
        compilation.add_chunk(Chunk::new("main").as_entry());
        compilation.add_chunk(Chunk::new("lazy"));
        hooks.run(&mut compilation).unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec!["main:chunk#0", "chunk:chunk#1"]
        );
    }

    #[test]
    fn test_tap_error_stops_the_run() {
        let mut hooks = RenderManifestHooks::new();
        hooks.tap_main("fails", |_, _| Err(Error::Other("boom".to_string())));
        hooks.tap_main("never", |_, _| panic!("tap after a failure must not run"));

        let mut compilation = Compilation::default();
        compilation.add_chunk(Chunk::new("main").as_entry());

        let err = hooks.run(&mut compilation).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }
}
