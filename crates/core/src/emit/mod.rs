//! Artifact emission.
//!
//! Each target implements `Emitter` over the immutable IR document and owns
//! its private mapper and import state for the duration of one render.

use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use crate::config::GenerationConfig;
use crate::error::GenError;
use crate::ir::{DefinitionKind, IrDocument, PropertyInfo, SchemaDefinition};

pub mod dataclass;
pub mod graphql;
pub mod pydantic;

pub use dataclass::DataclassEmitter;
pub use graphql::GraphqlEmitter;
pub use pydantic::PydanticEmitter;

/// One output target of the generator.
pub trait Emitter {
    fn target_name(&self) -> &'static str;

    /// Render the complete artifact text, header and imports included.
    fn render(
        &self,
        document: &IrDocument,
        config: &GenerationConfig,
    ) -> Result<String, GenError>;

    /// Default artifact path under the configured output directory.
    fn output_path(&self, config: &GenerationConfig) -> std::path::PathBuf;
}

/// Look up an emitter by its CLI target name.
pub fn emitter_for(target: &str) -> Option<Box<dyn Emitter>> {
    match target {
        "pydantic" => Some(Box::new(PydanticEmitter)),
        "dataclass" => Some(Box::new(DataclassEmitter)),
        "graphql" => Some(Box::new(GraphqlEmitter)),
        _ => None,
    }
}

pub const ALL_TARGETS: [&str; 3] = ["pydantic", "dataclass", "graphql"];

/// Write an artifact, creating the parent directory first.
pub fn write_artifact(path: &Path, content: &str) -> Result<(), GenError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| GenError::io(parent, err))?;
    }
    std::fs::write(path, content).map_err(|err| GenError::io(path, err))?;
    debug!(
        path = %path.display(),
        content_len = content.len(),
        "Wrote artifact."
    );
    Ok(())
}

/// Generated-file marker in Python/SDL comment syntax.
pub(crate) const GENERATED_HEADER: &str =
    "# Auto-generated from TypeScript schema definitions. Do not edit by hand.";

/// A definition's own properties with all resolvable ancestor properties
/// inlined first. Targets without inheritance (SDL, dataclasses) render these
/// flattened members; the child wins on a name collision.
pub(crate) fn flattened_properties(
    document: &IrDocument,
    def: &SchemaDefinition,
) -> IndexMap<String, PropertyInfo> {
    let mut merged = IndexMap::new();
    for parent in &def.extends {
        if let Some(parent_def) = document.get(parent) {
            if parent_def.kind == DefinitionKind::Interface {
                for (name, property) in flattened_properties(document, parent_def) {
                    merged.insert(name, property);
                }
            }
        }
    }
    for (name, property) in &def.properties {
        merged.insert(name.clone(), property.clone());
    }
    merged
}

/// camelCase to snake_case for Python field names. An uppercase run counts as
/// one word, so `nodeID` becomes `node_id` and `HTTPServer` `http_server`.
pub(crate) fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut result = String::with_capacity(name.len());
    for (idx, &ch) in chars.iter().enumerate() {
        if ch.is_ascii_uppercase() {
            let after_lower = idx > 0
                && (chars[idx - 1].is_ascii_lowercase() || chars[idx - 1].is_ascii_digit());
            let run_ends = idx > 0
                && chars[idx - 1].is_ascii_uppercase()
                && chars.get(idx + 1).is_some_and(char::is_ascii_lowercase);
            if after_lower || run_ends {
                result.push('_');
            }
            result.push(ch.to_ascii_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

/// snake_case to camelCase for SDL field names. Already-camel names pass
/// through unchanged.
pub(crate) fn to_camel_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            result.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            result.push(ch);
        }
    }
    result
}

/// Normalize an enum value into a valid Python/SDL member identifier.
pub(crate) fn member_identifier(value: &str) -> String {
    let mut result: String = value
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect();
    if result
        .chars()
        .next()
        .is_some_and(|ch| ch.is_ascii_digit())
    {
        result.insert(0, '_');
    }
    if result.is_empty() {
        result.push('_');
    }
    result
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_case_conversions() {
        assert_eq!(to_snake_case("itemId"), "item_id");
        assert_eq!(to_snake_case("plain"), "plain");
        assert_eq!(to_camel_case("item_id"), "itemId");
        assert_eq!(to_camel_case("alreadyCamel"), "alreadyCamel");
    }

    #[test]
    fn test_snake_case_uppercase_runs() {
        assert_eq!(to_snake_case("nodeID"), "node_id");
        assert_eq!(to_snake_case("APIKey"), "api_key");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("ID"), "id");
    }

    #[test]
    fn test_member_identifier() {
        assert_eq!(member_identifier("RED"), "RED");
        assert_eq!(member_identifier("not-started"), "not_started");
        assert_eq!(member_identifier("2fast"), "_2fast");
    }

    #[test]
    fn test_flattened_properties_child_wins() {
        let mut base = SchemaDefinition::interface("Base");
        base.properties.insert(
            "id".to_string(),
            PropertyInfo {
                raw_type: "string".to_string(),
                optional: false,
                description: None,
            },
        );
        base.properties.insert(
            "label".to_string(),
            PropertyInfo {
                raw_type: "string".to_string(),
                optional: true,
                description: None,
            },
        );
        let mut leaf = SchemaDefinition::interface("Leaf");
        leaf.extends.push("Base".to_string());
        leaf.properties.insert(
            "label".to_string(),
            PropertyInfo {
                raw_type: "'a' | 'b'".to_string(),
                optional: false,
                description: None,
            },
        );

        let document = IrDocument::new(vec![base, leaf.clone()], Vec::new());
        let merged = flattened_properties(&document, &leaf);
        let keys: Vec<_> = merged.keys().collect();
        assert_eq!(keys, ["id", "label"]);
        assert_eq!(merged["label"].raw_type, "'a' | 'b'");
    }

    #[test]
    fn test_emitter_lookup() {
        assert!(emitter_for("pydantic").is_some());
        assert!(emitter_for("graphql").is_some());
        assert!(emitter_for("dataclass").is_some());
        assert!(emitter_for("typescript").is_none());
    }

    #[test]
    fn test_write_artifact_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.py");
        write_artifact(&path, "content\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content\n");
    }
}
