use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

mod error;

pub use error::ConfigError;

fn default_filename() -> String {
    "[name].css".to_string()
}

fn default_chunk_filename() -> String {
    "[id].css".to_string()
}

fn default_digest_length() -> usize {
    20
}

/// Options accepted by the override add-on.
///
/// Keys are camelCase in both JSON and TOML, so an options block written for
/// the JavaScript plugin can be reused verbatim.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OverrideOptions {
    /// Override names, in the order variant assets are emitted.
    ///
    /// Example: `["dark", "light"]`
    #[serde(default)]
    pub overrides: Vec<String>,

    /// Keep content modules that have no override for a variant.
    /// When false those modules are dropped from the variant.
    #[serde(default)]
    pub keep_originals: bool,

    /// Emit one extra asset per override next to the default asset instead of
    /// rewriting the default asset in place.
    #[serde(default)]
    pub standalone: bool,

    /// Filename template for standalone variant assets.
    /// Required when `standalone` is true.
    ///
    /// Example: `styles.[override].css`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standalone_overrides_output_path: Option<String>,

    /// Filename template of the default asset for entry chunks.
    #[serde(default = "default_filename")]
    pub filename: String,

    /// Filename template of the default asset for non-entry chunks.
    #[serde(default = "default_chunk_filename")]
    pub chunk_filename: String,

    /// Hash parameters taken from the host's output configuration.
    #[serde(default)]
    pub output: HashOptions,
}

/// Digest parameters used for content hashes.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HashOptions {
    #[serde(default)]
    pub hash_function: HashFunction,

    /// Number of hex characters kept from the digest.
    #[serde(default = "default_digest_length")]
    pub hash_digest_length: usize,

    /// Optional salt fed into every digest before any module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_salt: Option<String>,
}

impl Default for HashOptions {
    fn default() -> Self {
        Self {
            hash_function: HashFunction::default(),
            hash_digest_length: default_digest_length(),
            hash_salt: None,
        }
    }
}

/// Supported digest functions.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum HashFunction {
    /// 128-bit XXH3.
    #[default]
    Xxh3,
    /// 64-bit XXH64.
    Xxh64,
}

impl HashFunction {
    /// Length in hex characters of the untruncated digest.
    pub fn max_digest_length(self) -> usize {
        match self {
            HashFunction::Xxh3 => 32,
            HashFunction::Xxh64 => 16,
        }
    }
}

impl fmt::Display for HashFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashFunction::Xxh3 => f.write_str("xxh3"),
            HashFunction::Xxh64 => f.write_str("xxh64"),
        }
    }
}

/// How override variants are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// The default asset of a mapped chunk is rewritten for its override.
    SingleOutput,
    /// Every override gets its own asset next to the unmodified default asset.
    Standalone,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::SingleOutput => f.write_str("single-output"),
            OutputMode::Standalone => f.write_str("standalone"),
        }
    }
}

/// One named variant, derived from [`OverrideOptions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideVariant {
    pub name: String,
    pub keep_originals: bool,
    pub mode: OutputMode,
    /// Unresolved filename template; may still contain `[override]`.
    pub filename_template: String,
}

impl OverrideOptions {
    /// Create options for the given override names with every other field at its default.
    pub fn new<I, S>(overrides: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            overrides: overrides.into_iter().map(Into::into).collect(),
            keep_originals: false,
            standalone: false,
            standalone_overrides_output_path: None,
            filename: default_filename(),
            chunk_filename: default_chunk_filename(),
            output: HashOptions::default(),
        }
    }

    /// Parse and validate options from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Parse and validate options from a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let options: Self = toml::from_str(toml)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a `.json` or `.toml` file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("json") => Self::from_json_str(&std::fs::read_to_string(path)?),
            Some("toml") => Self::from_toml_str(&std::fs::read_to_string(path)?),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Check the options for problems the type system cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.overrides.is_empty() {
            return Err(ConfigError::MissingOverrides);
        }

        let mut seen = HashSet::new();
        for (index, name) in self.overrides.iter().enumerate() {
            if name.is_empty() {
                return Err(ConfigError::EmptyOverrideName { index });
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::DuplicateOverride(name.clone()));
            }
        }

        if self.standalone && self.standalone_overrides_output_path.is_none() {
            return Err(ConfigError::MissingStandaloneOutputPath);
        }

        let max = self.output.hash_function.max_digest_length();
        let length = self.output.hash_digest_length;
        if length == 0 || length > max {
            return Err(ConfigError::InvalidDigestLength {
                function: self.output.hash_function,
                length,
                max,
            });
        }

        Ok(())
    }

    pub fn mode(&self) -> OutputMode {
        if self.standalone {
            OutputMode::Standalone
        } else {
            OutputMode::SingleOutput
        }
    }

    /// The variants described by these options, in configuration order.
    pub fn variants(&self) -> Vec<OverrideVariant> {
        let mode = self.mode();
        let template = match mode {
            OutputMode::Standalone => self
                .standalone_overrides_output_path
                .clone()
                .unwrap_or_default(),
            OutputMode::SingleOutput => self.filename.clone(),
        };

        self.overrides
            .iter()
            .map(|name| OverrideVariant {
                name: name.clone(),
                keep_originals: self.keep_originals,
                mode,
                filename_template: template.clone(),
            })
            .collect()
    }
}
