use std::path::PathBuf;
use thiserror::Error;

/// Failure inside the markdown pipeline. `MarkdownRenderer::render` turns it
/// into the escaped-source fallback; `try_render` hands it to the caller.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("markdown pipeline panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("vault root {0} is not a directory")]
    NotADirectory(PathBuf),
}
