//! Host-side filename interpolation and asset writing.

use crate::errors::CliError;
use cmo_engine::{Chunk, Compilation, ManifestEntry};
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static PATH_VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(name|id|contenthash)(?::(\d+))?\]").expect("valid path variable regex")
});

/// Substitute `[name]`, `[id]` and `[contenthash]` in `template`.
///
/// `[name]` falls back to the chunk id for unnamed chunks. `[contenthash:N]`
/// keeps the first `N` characters of the hash. Unknown placeholders are left
/// as they are.
pub fn interpolate(template: &str, chunk: &Chunk, hash: &str) -> String {
    PATH_VARIABLE
        .replace_all(template, |caps: &Captures| {
            let value = match &caps[1] {
                "name" => chunk.name().unwrap_or(chunk.id()),
                "id" => chunk.id(),
                _ => hash,
            };
            match caps.get(2).and_then(|len| len.as_str().parse::<usize>().ok()) {
                Some(len) => value.chars().take(len).collect(),
                None => value.to_string(),
            }
        })
        .into_owned()
}

/// One asset written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedAsset {
    pub identifier: String,
    pub path: PathBuf,
    pub size: usize,
}

/// Render every entry and write it below `output_dir`.
pub fn write_manifest(
    compilation: &Compilation,
    manifest: &[ManifestEntry],
    output_dir: &Path,
) -> Result<Vec<EmittedAsset>, CliError> {
    let mut written = HashSet::new();
    let mut assets = Vec::with_capacity(manifest.len());

    for entry in manifest {
        let chunk = compilation
            .chunk(entry.path_options.chunk)
            .ok_or(cmo_engine::Error::UnknownChunk(entry.path_options.chunk))?;
        let filename = interpolate(&entry.filename_template, chunk, &entry.hash);
        let path = output_dir.join(&filename);

        if !written.insert(path.clone()) {
            tracing::warn!(
                "Asset '{}' overwrites an earlier asset at {}",
                entry.identifier,
                path.display()
            );
        }

        let source = entry.render.call(compilation)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CliError::directory_creation_failed(parent.to_path_buf(), e))?;
        }
        std::fs::write(&path, &source)?;

        tracing::debug!("Wrote '{}' to {}", entry.identifier, path.display());
        assets.push(EmittedAsset {
            identifier: entry.identifier.clone(),
            path,
            size: source.len(),
        });
    }

    Ok(assets)
}
