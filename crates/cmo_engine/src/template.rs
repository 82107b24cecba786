//! Override placeholder substitution in output path templates.
//!
//! Only `[override]` is handled here, case-insensitively. Every other
//! placeholder (`[name]`, `[id]`, `[contenthash]`, ...) is left for the host to
//! interpolate.

use crate::error::{Error, Result};
use regex::{NoExpand, Regex};
use std::sync::LazyLock;

static OVERRIDE_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[override\]").expect("valid override placeholder regex"));

/// Substitute `override_name` for every `[override]` in `template`.
///
/// Fails with [`Error::TemplateResolution`] when the template contains the
/// placeholder but no override name is given.
pub fn resolve_output_path(template: &str, override_name: Option<&str>) -> Result<String> {
    if let Some(name) = override_name {
        return Ok(OVERRIDE_PLACEHOLDER
            .replace_all(template, NoExpand(name))
            .into_owned());
    }

    match OVERRIDE_PLACEHOLDER.find(template) {
        Some(found) => Err(Error::TemplateResolution {
            placeholder: found.as_str().to_string(),
            template: template.to_string(),
        }),
        None => Ok(template.to_string()),
    }
}

/// Like [`resolve_output_path`], but a missing override name substitutes the
/// empty string instead of failing.
pub fn resolve_output_path_allow_empty(template: &str, override_name: Option<&str>) -> String {
    OVERRIDE_PLACEHOLDER
        .replace_all(template, NoExpand(override_name.unwrap_or("")))
        .into_owned()
}

/// Whether `template` contains the override placeholder.
pub fn has_override_placeholder(template: &str) -> bool {
    OVERRIDE_PLACEHOLDER.is_match(template)
}
