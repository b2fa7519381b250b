use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_FILENAME, CONFIG_SECTION, DEFAULT_CANONICAL_NAMESPACE, DEFAULT_COMPANION_PHRASE,
    DEFAULT_COMPANION_WINDOW, DEFAULT_HOST_FUNCTION, DEFAULT_MARKER_QUALIFIER,
    DEFAULT_MARKER_TYPE, DEFAULT_MARKER_WINDOW, DEFAULT_PREFIX_ARGS, DEFAULT_RECORD_ALIAS_MARKERS,
    DEFAULT_REPLACEMENT_TYPE, DEFAULT_SCOPE_DENYLIST, DEFAULT_TYPES_FILE_SUFFIX,
};

#[derive(Debug, Deserialize, Default, Clone)]
/// Top-level configuration struct.
pub struct Config {
    #[serde(default, rename = "ttnn-tidy")]
    /// The main configuration section.
    pub tidy: TidyConfig,
    /// The path to the configuration file this was loaded from.
    /// Set during `load_from_path`, `None` if using defaults or programmatic config.
    #[serde(skip)]
    pub config_file_path: Option<PathBuf>,
}

/// A reserved struct name and the role word its replacement ends with.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StructNaming {
    /// Generic name, e.g. `operation_attributes_t`.
    pub name: String,
    /// Role word appended to the operation name, e.g. `Params`.
    pub suffix: String,
}

/// A reserved alias name and the canonical type it stands for.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AliasTarget {
    /// Alias name, e.g. `spec_return_value_t`.
    pub name: String,
    /// Canonical type, e.g. `TensorSpec`.
    pub canonical: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
/// Knobs consumed by the rules. The engine treats them as opaque data.
pub struct TidyConfig {
    /// Fully qualified name of the registration function whose calls are checked.
    pub host_function: String,
    /// Number of leading arguments before overload arguments begin.
    pub prefix_args: usize,
    /// Substring identifying the multi-overload wrapper type.
    pub marker_type: String,
    /// Single-overload replacement for the marker type.
    pub replacement_type: String,
    /// Qualifier carried over when written in front of the marker.
    pub marker_qualifier: String,
    /// Bytes scanned from the argument start when locating the marker.
    pub marker_window: usize,
    /// Phrase starting a companion declaration made unused by closure removal.
    pub companion_phrase: String,
    /// Bytes scanned backwards from the call for the companion declaration.
    pub companion_window: usize,
    /// File name suffix of operation types files.
    pub types_file_suffix: String,
    /// Scope names that never name an operation.
    pub scope_denylist: Vec<String>,
    /// Reserved struct names and their role words.
    pub structs: Vec<StructNaming>,
    /// Reserved alias names and their canonical types.
    pub aliases: Vec<AliasTarget>,
    /// Namespace allowed in front of a canonical alias target.
    pub canonical_namespace: String,
    /// Spellings that mark a type as a record member alias.
    pub record_alias_markers: Vec<String>,
    /// Rule ids disabled by default.
    pub ignore: Vec<String>,
}

impl Default for TidyConfig {
    fn default() -> Self {
        Self {
            host_function: DEFAULT_HOST_FUNCTION.to_owned(),
            prefix_args: DEFAULT_PREFIX_ARGS,
            marker_type: DEFAULT_MARKER_TYPE.to_owned(),
            replacement_type: DEFAULT_REPLACEMENT_TYPE.to_owned(),
            marker_qualifier: DEFAULT_MARKER_QUALIFIER.to_owned(),
            marker_window: DEFAULT_MARKER_WINDOW,
            companion_phrase: DEFAULT_COMPANION_PHRASE.to_owned(),
            companion_window: DEFAULT_COMPANION_WINDOW,
            types_file_suffix: DEFAULT_TYPES_FILE_SUFFIX.to_owned(),
            scope_denylist: DEFAULT_SCOPE_DENYLIST
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            structs: vec![
                StructNaming {
                    name: "operation_attributes_t".to_owned(),
                    suffix: "Params".to_owned(),
                },
                StructNaming {
                    name: "tensor_args_t".to_owned(),
                    suffix: "Inputs".to_owned(),
                },
            ],
            aliases: vec![
                AliasTarget {
                    name: "spec_return_value_t".to_owned(),
                    canonical: "TensorSpec".to_owned(),
                },
                AliasTarget {
                    name: "tensor_return_value_t".to_owned(),
                    canonical: "Tensor".to_owned(),
                },
            ],
            canonical_namespace: DEFAULT_CANONICAL_NAMESPACE.to_owned(),
            record_alias_markers: DEFAULT_RECORD_ALIAS_MARKERS
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            ignore: Vec::new(),
        }
    }
}

impl TidyConfig {
    /// Whether `file_name` follows the types file convention.
    #[must_use]
    pub fn is_types_file(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.types_file_suffix)
    }
}

/// Error raised for an explicitly requested configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid TOML for this schema.
    #[error("invalid config {path}: {source}")]
    Parse {
        /// Config path.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },
}

impl Config {
    /// Loads configuration from the default location (`.ttnn-tidy.toml` in current dir or above).
    #[must_use]
    pub fn load() -> Self {
        Self::load_from_path(Path::new("."))
    }

    /// Loads configuration starting from a specific path and traversing up.
    ///
    /// Unreadable or invalid files are skipped; defaults are used if nothing is found.
    #[must_use]
    pub fn load_from_path(path: &Path) -> Self {
        let mut current = path.to_path_buf();
        if current.is_file() {
            current.pop();
        }

        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                match Self::load_file(&candidate) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("ignoring {}: {e}", candidate.display()),
                }
            }

            if !current.pop() {
                break;
            }
        }

        Config::default()
    }

    /// Loads an explicit configuration file.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config =
            toml::from_str::<Config>(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.config_file_path = Some(path.to_path_buf());
        tracing::debug!(
            "loaded [{CONFIG_SECTION}] configuration from {}",
            path.display()
        );
        Ok(config)
    }
}
