//! Error taxonomy for the generation pipeline.
//!
//! Fatal conditions (missing or malformed IR, inheritance cycles) surface as
//! variants here; recoverable conditions (unresolved references, malformed
//! generics) degrade in place and are logged instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IR document not found at {0} (run `schemagen extract` first)")]
    MissingIr(PathBuf),

    #[error("malformed IR document at {path}: {reason}")]
    MalformedIr { path: PathBuf, reason: String },

    #[error("duplicate definition name `{0}` in IR document")]
    DuplicateName(String),

    #[error("invalid definition `{name}`: {reason}")]
    InvalidDefinition { name: String, reason: String },

    #[error("inheritance cycle detected through `{0}`")]
    InheritanceCycle(String),

    #[error("malformed config file at {path}: {reason}")]
    MalformedConfig { path: PathBuf, reason: String },

    #[error("unknown target `{0}` (expected pydantic, dataclass, or graphql)")]
    UnknownTarget(String),
}

impl GenError {
    /// Wrap an `std::io::Error` with the path that produced it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }
}
