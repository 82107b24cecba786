//! Single-output mode: rewrite a chunk in place for one override.
//!
//! Runs before the base renderer sees the chunk, so the default asset of the
//! chunk is rendered from the rewritten module set. A replacement takes over
//! the original's membership slot and every position index the original held
//! in the chunk's groups, which keeps the emission order intact.

use crate::error::{Error, Result};
use crate::graph::{ChunkId, Compilation};
use crate::resolver::{plan, Substitution};

/// Counts of what a rewrite did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    pub replaced: usize,
    pub kept: usize,
    pub dropped: usize,
}

/// Rewrite `chunk` for `override_name`.
///
/// The override name is appended to the chunk id, so ids and every filename
/// derived from them are variant-specific. When the compilation carries no
/// override map the chunk is left untouched.
pub fn rewrite_chunk(
    compilation: &mut Compilation,
    chunk: ChunkId,
    override_name: &str,
    keep_originals: bool,
) -> Result<RewriteSummary> {
    let current = compilation.chunk(chunk).ok_or(Error::UnknownChunk(chunk))?;

    if compilation.override_state().overrides_map().is_none() {
        tracing::debug!(
            "No override map on compilation; leaving chunk '{}' untouched",
            current.id()
        );
        return Ok(RewriteSummary::default());
    }

    let groups = current.groups().to_vec();
    let decisions = plan(compilation, current.modules(), override_name, keep_originals);

    let mut summary = RewriteSummary::default();
    for (module, substitution) in decisions {
        match substitution {
            Substitution::Replace(replacement) => {
                for &group in &groups {
                    if let Some(group) = compilation.chunk_group_mut(group) {
                        group.replace_module_indices(module, replacement);
                    }
                }
                if let Some(target) = compilation.chunk_mut(chunk) {
                    target.replace_module(module, replacement);
                }
                summary.replaced += 1;
            }
            Substitution::Drop => {
                if let Some(target) = compilation.chunk_mut(chunk) {
                    target.remove_module(module);
                }
                summary.dropped += 1;
            }
            Substitution::Merge(_) => {
                if let Some(target) = compilation.chunk_mut(chunk) {
                    target.remove_module(module);
                }
                summary.replaced += 1;
            }
            Substitution::Keep => summary.kept += 1,
        }
    }

    let target = compilation.chunk_mut(chunk).ok_or(Error::UnknownChunk(chunk))?;
    target.append_to_id(override_name);

    tracing::info!(
        "Rewrote chunk '{}' for override '{}': replaced={} kept={} dropped={}",
        target.id(),
        override_name,
        summary.replaced,
        summary.kept,
        summary.dropped
    );

    Ok(summary)
}
