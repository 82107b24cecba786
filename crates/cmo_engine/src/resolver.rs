//! Override resolution and the per-module substitution decision.
//!
//! Resolution is a two-step lookup. The loader's override map only names
//! source files, so a hit yields an override *resource*, which is then matched
//! against the compilation's style-extraction modules by origin resource.
//!
//! Single-output rewriting and standalone assembly both go through [`plan`],
//! so the two modes always agree on which modules are replaced, kept or dropped.

use crate::graph::{Compilation, ModuleId};
use crate::state::OverrideState;
use std::collections::HashSet;

/// What happens to one content module in one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Substitution {
    /// The module is replaced by its compiled override.
    Replace(ModuleId),
    /// The module stays as it is.
    Keep,
    /// The module is left out of the variant.
    Drop,
    /// The module's override already replaced an earlier module of the list.
    /// The override keeps that earlier slot and this module is left out.
    Merge(ModuleId),
}

/// The keep/drop policy applied to a resolution result.
pub fn decide(replacement: Option<ModuleId>, keep_originals: bool) -> Substitution {
    match replacement {
        Some(module) => Substitution::Replace(module),
        None if keep_originals => Substitution::Keep,
        None => Substitution::Drop,
    }
}

/// Looks up compiled override modules through the loader's override map.
pub struct VariantResolver<'a> {
    compilation: &'a Compilation,
    state: &'a OverrideState,
}

impl<'a> VariantResolver<'a> {
    /// Returns `None` when the loader left no override map on the compilation.
    pub fn new(compilation: &'a Compilation) -> Option<Self> {
        let state = compilation.override_state();
        state.overrides_map()?;
        Some(Self { compilation, state })
    }

    /// The compiled module replacing `module` under `override_name`.
    ///
    /// `None` when the module is not a style-extraction module, has no origin,
    /// has no override entry, or its override source was never compiled.
    pub fn resolve(&self, module: ModuleId, override_name: &str) -> Option<ModuleId> {
        let module = self.compilation.module(module)?;
        if !module.is_style_extract() {
            return None;
        }
        let origin = module.origin_resource()?;
        let resource = self.state.override_for(origin, override_name)?;

        let found = self.compilation.find_style_module(resource);
        if found.is_none() {
            tracing::debug!(
                "Override '{}' of {} points at {}, which was not compiled",
                override_name,
                origin,
                resource
            );
        }
        found
    }
}

/// Decide the fate of every style-extraction module in `modules`.
///
/// Modules of other kinds are not part of the plan. A style module that is
/// itself the override of another module in the list is not planned either:
/// it takes the slot of the module it replaces. When several modules share one
/// override, the first of them keeps the slot and the rest become
/// [`Substitution::Merge`].
///
/// Without loader state every style module is kept, whatever `keep_originals` says.
pub fn plan(
    compilation: &Compilation,
    modules: &[ModuleId],
    override_name: &str,
    keep_originals: bool,
) -> Vec<(ModuleId, Substitution)> {
    let style_modules = modules.iter().copied().filter(|&id| {
        compilation
            .module(id)
            .is_some_and(|module| module.is_style_extract())
    });

    let Some(resolver) = VariantResolver::new(compilation) else {
        return style_modules.map(|id| (id, Substitution::Keep)).collect();
    };

    let resolved: Vec<(ModuleId, Option<ModuleId>)> = style_modules
        .map(|id| (id, resolver.resolve(id, override_name)))
        .collect();

    let absorbed: HashSet<ModuleId> = resolved
        .iter()
        .filter_map(|&(id, replacement)| replacement.filter(|&r| r != id))
        .collect();

    let mut placed = HashSet::new();
    resolved
        .into_iter()
        .filter(|(id, _)| !absorbed.contains(id))
        .map(|(id, replacement)| match decide(replacement, keep_originals) {
            Substitution::Replace(target) if !placed.insert(target) => {
                (id, Substitution::Merge(target))
            }
            substitution => (id, substitution),
        })
        .collect()
}

/// Apply a plan to produce a variant's ordered module list.
pub fn variant_modules(plan: &[(ModuleId, Substitution)]) -> Vec<ModuleId> {
    plan.iter()
        .filter_map(|&(id, substitution)| match substitution {
            Substitution::Replace(replacement) => Some(replacement),
            Substitution::Keep => Some(id),
            Substitution::Drop | Substitution::Merge(_) => None,
        })
        .collect()
}
