//! Error type shared by every stage of settings resolution.

use std::path::PathBuf;

/// Errors that can occur while resolving TypeScript settings.
///
/// Only failures on the project file itself ever reach the caller of
/// [`SettingsResolver::resolve`](crate::SettingsResolver::resolve); failures
/// around the defaults file are absorbed and replaced by the baseline table.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("XML error: {}: {source}", .path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Project file not found: {}: {source}", .path.display())]
    ProjectNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed project {}: {reason}", .path.display())]
    ProjectMalformed { path: PathBuf, reason: String },

    #[error("No TypeScript defaults file found for '{template}'")]
    DefaultsNotFound { template: String },

    #[error("Malformed defaults file {}: {reason}", .path.display())]
    DefaultsMalformed { path: PathBuf, reason: String },
}

/// Result alias for settings resolution.
pub type Result<T> = std::result::Result<T, Error>;
