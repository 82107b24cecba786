//! Content hashing for variant module lists.
//!
//! A content hash covers exactly the style-extraction modules of a list, in
//! list order. Each module feeds its own fields into one running digest via
//! [`ContentModule::update_hash`](crate::graph::ContentModule::update_hash).
//! Every field is length-prefixed, so lists that differ only in order or in
//! how bytes are split between modules still produce different digests.

use crate::graph::{Compilation, ModuleId};
use cmo_options::{HashFunction, HashOptions};
use xxhash_rust::xxh3::Xxh3;
use xxhash_rust::xxh64::Xxh64;

/// Running digest over module contributions.
pub struct ContentDigest {
    state: DigestState,
}

enum DigestState {
    Xxh3(Box<Xxh3>),
    Xxh64(Xxh64),
}

impl ContentDigest {
    pub fn new(function: HashFunction) -> Self {
        let state = match function {
            HashFunction::Xxh3 => DigestState::Xxh3(Box::new(Xxh3::new())),
            HashFunction::Xxh64 => DigestState::Xxh64(Xxh64::new(0)),
        };
        Self { state }
    }

    /// Feed raw bytes.
    pub fn update(&mut self, bytes: &[u8]) {
        match &mut self.state {
            DigestState::Xxh3(hasher) => hasher.update(bytes),
            DigestState::Xxh64(hasher) => hasher.update(bytes),
        }
    }

    /// Feed one length-prefixed field.
    pub fn update_field(&mut self, bytes: &[u8]) {
        self.update(&(bytes.len() as u64).to_le_bytes());
        self.update(bytes);
    }

    /// Full-width lowercase hex digest.
    pub fn finish_hex(&self) -> String {
        match &self.state {
            DigestState::Xxh3(hasher) => format!("{:032x}", hasher.digest128()),
            DigestState::Xxh64(hasher) => format!("{:016x}", hasher.digest()),
        }
    }
}

/// Hash the style-extraction modules of `modules`, in order.
///
/// The result is truncated to `options.hash_digest_length` hex characters.
/// Handles that do not belong to `compilation` are skipped.
pub fn content_hash(compilation: &Compilation, modules: &[ModuleId], options: &HashOptions) -> String {
    let mut digest = ContentDigest::new(options.hash_function);

    if let Some(salt) = &options.hash_salt {
        digest.update_field(salt.as_bytes());
    }

    for &id in modules {
        let Some(module) = compilation.module(id) else {
            continue;
        };
        if module.is_style_extract() {
            module.update_hash(&mut digest);
        }
    }

    let mut hex = digest.finish_hex();
    hex.truncate(options.hash_digest_length);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ContentModule, ModuleKind};

    fn compilation_with(names: &[&str]) -> (Compilation, Vec<ModuleId>) {
        let mut compilation = Compilation::default();
        let ids = names
            .iter()
            .map(|name| {
                compilation.add_module(ContentModule::style(
                    format!("css ./{name}"),
                    format!("src/{name}"),
                    format!(".{name} {{ color: red }}"),
                ))
            })
            .collect();
        (compilation, ids)
    }

    #[test]
    fn test_hash_deterministic() {
        let (compilation, ids) = compilation_with(&["a.css", "b.css"]);
        let options = HashOptions::default();

        let first = content_hash(&compilation, &ids, &options);
        let second = content_hash(&compilation, &ids, &options);
        assert_eq!(first, second);
        assert_eq!(first.len(), 20);
    }

    #[test]
    fn test_hash_depends_on_order() {
        let (compilation, ids) = compilation_with(&["a.css", "b.css"]);
        let options = HashOptions::default();
        let reversed: Vec<ModuleId> = ids.iter().rev().copied().collect();

        assert_ne!(
            content_hash(&compilation, &ids, &options),
            content_hash(&compilation, &reversed, &options)
        );
    }

    #[test]
    fn test_hash_depends_on_membership() {
        let (compilation, ids) = compilation_with(&["a.css", "b.css", "c.css"]);
        let options = HashOptions::default();

        assert_ne!(
            content_hash(&compilation, &ids[..2], &options),
            content_hash(&compilation, &ids, &options)
        );
    }

    #[test]
    fn test_hash_ignores_other_module_kinds() {
        let (mut compilation, mut ids) = compilation_with(&["a.css"]);
        let options = HashOptions::default();
        let before = content_hash(&compilation, &ids, &options);

        ids.push(compilation.add_module(ContentModule {
            kind: ModuleKind::Other("javascript/auto".to_string()),
            identifier: "js ./a.js".to_string(),
            issuer: None,
            content: "export {}".to_string(),
            media: None,
        }));
        assert_eq!(content_hash(&compilation, &ids, &options), before);
    }

    #[test]
    fn test_hash_options() {
        let (compilation, ids) = compilation_with(&["a.css"]);

        let short = HashOptions {
            hash_function: HashFunction::Xxh64,
            hash_digest_length: 8,
            hash_salt: None,
        };
        assert_eq!(content_hash(&compilation, &ids, &short).len(), 8);

        let full = HashOptions {
            hash_function: HashFunction::Xxh3,
            hash_digest_length: 32,
            hash_salt: None,
        };
        let salted = HashOptions {
            hash_salt: Some("v2".to_string()),
            ..full.clone()
        };
        assert_eq!(content_hash(&compilation, &ids, &full).len(), 32);
        assert_ne!(
            content_hash(&compilation, &ids, &full),
            content_hash(&compilation, &ids, &salted)
        );
    }

    #[test]
    fn test_field_boundaries_matter() {
        let mut joined = ContentDigest::new(HashFunction::Xxh3);
        joined.update_field(b"ab");
        joined.update_field(b"c");

        let mut split = ContentDigest::new(HashFunction::Xxh3);
        split.update_field(b"a");
        split.update_field(b"bc");

        assert_ne!(joined.finish_hex(), split.finish_hex());
    }
}
