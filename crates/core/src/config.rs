//! Generation configuration.
//!
//! Every field has a built-in default so the tool runs with no config file at
//! all; an optional JSON file overrides individual fields.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::GenError;

/// Field names that hold counts, indices, or durations. A `number` property
/// with one of these names maps to an integer type instead of a float.
const INTEGER_FIELD_NAMES: [&str; 12] = [
    "count",
    "duration",
    "durationSeconds",
    "index",
    "iterations",
    "limit",
    "maxIteration",
    "offset",
    "retries",
    "sequence",
    "timeout",
    "timeoutSeconds",
];

/// Branded identifier aliases that exist in the source model. Each becomes a
/// `NewType` alias in the pydantic target and a `scalar` declaration in SDL.
const NOMINAL_ID_NAMES: [&str; 8] = [
    "ApiKeyID",
    "ArrowID",
    "DiagramID",
    "ExecutionID",
    "HandleID",
    "HookID",
    "NodeID",
    "PersonID",
];

/// Record names eligible for the lightweight dataclass artifact.
const DATACLASS_ALLOWLIST: [&str; 4] = ["ApiJobNode", "CodeJobNode", "ConditionNode", "StartNode"];

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Reject unknown fields in generated pydantic models when true.
    pub strict_models: bool,
    /// Record names the dataclass emitter is allowed to render.
    pub dataclass_allowlist: BTreeSet<String>,
    /// Field names whose `number` type maps to an integer.
    pub integer_fields: BTreeSet<String>,
    /// Known nominal (branded) identifier aliases.
    pub nominal_ids: BTreeSet<String>,
    /// Directory scanned for `.ts` declaration sources.
    pub source_root: PathBuf,
    /// Directory receiving the IR document and all emitted artifacts.
    pub output_dir: PathBuf,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            strict_models: true,
            dataclass_allowlist: DATACLASS_ALLOWLIST.iter().map(ToString::to_string).collect(),
            integer_fields: INTEGER_FIELD_NAMES.iter().map(ToString::to_string).collect(),
            nominal_ids: NOMINAL_ID_NAMES.iter().map(ToString::to_string).collect(),
            source_root: PathBuf::from("src"),
            output_dir: PathBuf::from("generated"),
        }
    }
}

impl GenerationConfig {
    /// Load from a JSON file, or return defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, GenError> {
        let Some(path) = path else {
            return Ok(GenerationConfig::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|err| GenError::io(path, err))?;
        serde_json::from_str(&raw).map_err(|err| GenError::MalformedConfig {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    pub fn ir_path(&self) -> PathBuf {
        self.output_dir.join("ir.json")
    }

    pub fn pydantic_path(&self) -> PathBuf {
        self.output_dir.join("models.py")
    }

    pub fn dataclass_path(&self) -> PathBuf {
        self.output_dir.join("minimal_models.py")
    }

    pub fn graphql_path(&self) -> PathBuf {
        self.output_dir.join("domain.graphql")
    }
}
