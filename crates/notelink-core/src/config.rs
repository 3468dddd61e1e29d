use crate::error::ConfigError;
use crate::suggest::SuggestOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name looked up at the workspace root when no config path is given.
pub const CONFIG_FILE_NAME: &str = "notelink.yaml";

/// Top-level configuration for notelink
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotelinkConfig {
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub suggestions: SuggestionConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Workspace-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Name of the workspace
    #[serde(default = "default_workspace_name")]
    pub name: String,
    /// Directory names skipped while scanning (matched against each path segment)
    #[serde(default = "default_ignore_dirs")]
    pub ignore_dirs: Vec<String>,
}

/// Autocomplete settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionConfig {
    /// Maximum number of suggestions returned per query
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_true")]
    pub include_folders: bool,
}

/// Markdown preview settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// How many levels of `![[…]]` transclusion are expanded
    #[serde(default = "default_embed_depth")]
    pub max_embed_depth: usize,
    /// Keep `onclick` and friends on sanitized output
    #[serde(default)]
    pub allow_event_handlers: bool,
    #[serde(default = "default_true")]
    pub allow_iframes: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set
    #[serde(default = "default_level")]
    pub level: String,
    /// Whether to show indexing statistics after a rebuild
    #[serde(default = "default_true")]
    pub show_index_stats: bool,
}

fn default_workspace_name() -> String {
    "Notelink Workspace".to_string()
}

fn default_ignore_dirs() -> Vec<String> {
    vec![".git".to_string(), "node_modules".to_string()]
}

fn default_limit() -> usize {
    50
}

fn default_embed_depth() -> usize {
    3
}

fn default_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            name: default_workspace_name(),
            ignore_dirs: default_ignore_dirs(),
        }
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            include_folders: true,
        }
    }
}

impl SuggestionConfig {
    pub fn options(&self) -> SuggestOptions {
        SuggestOptions {
            limit: Some(self.limit),
            include_folders: self.include_folders,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_embed_depth: default_embed_depth(),
            allow_event_handlers: false,
            allow_iframes: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            show_index_stats: true,
        }
    }
}

impl NotelinkConfig {
    /// Parse config from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Load config from a specific path
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_yaml(&content)?)
    }

    /// Load `notelink.yaml` from the workspace root, or defaults when absent.
    pub fn discover(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            log::debug!("Loading config from {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}
