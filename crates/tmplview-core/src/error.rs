//! Unified error types for tmplview.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by [`crate::loader::Loader`] implementations.
///
/// The core never inspects it; it is carried verbatim as the source of [`TmplviewError::Load`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// All errors that can occur while loading, parsing or rendering a view.
#[derive(Error, Debug)]
pub enum TmplviewError {
    // --- Resolution ---

    /// The logical path is empty, absolute, or climbs above the base path.
    #[error("invalid template path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },

    /// The loader could not produce bytes for the resolved path.
    #[error("failed to load template '{path}' from {}", .physical.display())]
    Load {
        path: String,
        physical: PathBuf,
        #[source]
        source: BoxError,
    },

    /// The template source is not valid UTF-8 or does not compile. `line`/`column` are
    /// 1-based and present whenever the engine reports a position.
    #[error("failed to parse template '{path}'{}: {reason}", position(.line, .column))]
    Parse {
        path: String,
        line: Option<usize>,
        column: Option<usize>,
        reason: String,
    },

    /// A fragment includes a reserved name that leads back to itself (content including
    /// `@layout` or `@content`, a layout including `@layout`).
    #[error("template '{path}' bound as {name} includes {includes}, which never terminates")]
    RecursiveInclude {
        path: String,
        name: &'static str,
        includes: &'static str,
    },

    // --- Rendering ---

    /// Rendering failed against the supplied data (missing field in strict mode,
    /// helper failure, unknown partial).
    #[error("failed to render '{root}'")]
    Execution {
        root: &'static str,
        #[source]
        source: handlebars::RenderError,
    },

    /// Writing the rendered output to the sink failed.
    #[error("failed to write rendered output")]
    Write(#[source] std::io::Error),

    // --- Configuration ---

    /// The configuration file could not be read, written or decoded.
    #[error("invalid config at {}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

impl TmplviewError {
    /// The logical path implicated in the failure, if the error is tied to one fragment.
    pub fn logical_path(&self) -> Option<&str> {
        match self {
            Self::InvalidPath { path, .. }
            | Self::Load { path, .. }
            | Self::Parse { path, .. }
            | Self::RecursiveInclude { path, .. } => Some(path),
            _ => None,
        }
    }
}

fn position(line: &Option<usize>, column: &Option<usize>) -> String {
    match (line, column) {
        (Some(line), Some(column)) => format!(" at line {line}, column {column}"),
        (Some(line), None) => format!(" at line {line}"),
        _ => String::new(),
    }
}

/// Alias for `Result<T, TmplviewError>`.
pub type Result<T> = std::result::Result<T, TmplviewError>;
