//! Language-neutral intermediate representation.
//!
//! The IR is a flat list of schema definitions extracted from TypeScript
//! declarations and persisted as a JSON document. Property types stay verbatim
//! raw strings here; interpretation happens later in `typeexpr`.

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::GenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionKind {
    Interface,
    Enum,
}

/// A single member of an interface definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    /// Verbatim type expression as written in the source.
    #[serde(rename = "type")]
    pub raw_type: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One extracted `interface` or `enum` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DefinitionKind,
    /// Interface members in declaration order. Empty for enums.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, PropertyInfo>,
    /// Enum member values in declaration order. Empty for interfaces.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SchemaDefinition {
    pub fn interface(name: impl Into<String>) -> Self {
        SchemaDefinition {
            name: name.into(),
            kind: DefinitionKind::Interface,
            properties: IndexMap::new(),
            values: Vec::new(),
            extends: Vec::new(),
            description: None,
        }
    }

    pub fn enumeration(name: impl Into<String>, values: Vec<String>) -> Self {
        SchemaDefinition {
            name: name.into(),
            kind: DefinitionKind::Enum,
            properties: IndexMap::new(),
            values,
            extends: Vec::new(),
            description: None,
        }
    }
}

/// The persisted IR document: definitions plus the nominal aliases discovered
/// during extraction. Immutable once loaded; emitters share it read-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IrDocument {
    pub definitions: Vec<SchemaDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nominals: Vec<String>,
}

impl IrDocument {
    pub fn new(definitions: Vec<SchemaDefinition>, nominals: Vec<String>) -> Self {
        IrDocument {
            definitions,
            nominals,
        }
    }

    /// Read and validate the IR document. A missing file and a document that
    /// fails validation are both fatal.
    pub fn load(path: &Path) -> Result<Self, GenError> {
        if !path.exists() {
            return Err(GenError::MissingIr(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path).map_err(|err| GenError::io(path, err))?;
        let document: IrDocument =
            serde_json::from_str(&raw).map_err(|err| GenError::MalformedIr {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
        document.validate()?;
        debug!(
            path = %path.display(),
            definitions = document.definitions.len(),
            "Loaded IR document."
        );
        Ok(document)
    }

    /// Serialize to pretty JSON and write, creating the parent directory.
    pub fn write(&self, path: &Path) -> Result<(), GenError> {
        self.validate()?;
        let json = serde_json::to_string_pretty(self).map_err(|err| GenError::MalformedIr {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| GenError::io(parent, err))?;
        }
        std::fs::write(path, json).map_err(|err| GenError::io(path, err))?;
        debug!(
            path = %path.display(),
            definitions = self.definitions.len(),
            "Wrote IR document."
        );
        Ok(())
    }

    /// Structural invariants. Unresolvable `extends` entries are not checked
    /// here; the sorter tolerates them with a warning.
    pub fn validate(&self) -> Result<(), GenError> {
        let mut seen = HashSet::new();
        for def in &self.definitions {
            if !seen.insert(def.name.as_str()) {
                return Err(GenError::DuplicateName(def.name.clone()));
            }
            match def.kind {
                DefinitionKind::Enum => {
                    if def.values.is_empty() {
                        return Err(GenError::InvalidDefinition {
                            name: def.name.clone(),
                            reason: "enum has no values".to_string(),
                        });
                    }
                    if !def.properties.is_empty() {
                        return Err(GenError::InvalidDefinition {
                            name: def.name.clone(),
                            reason: "enum carries interface properties".to_string(),
                        });
                    }
                }
                DefinitionKind::Interface => {
                    if !def.values.is_empty() {
                        return Err(GenError::InvalidDefinition {
                            name: def.name.clone(),
                            reason: "interface carries enum values".to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Option<&SchemaDefinition> {
        self.definitions.iter().find(|def| def.name == name)
    }

    /// All interface names, for reference resolution.
    pub fn known_names(&self) -> HashSet<&str> {
        self.definitions.iter().map(|def| def.name.as_str()).collect()
    }

    /// Report unresolvable `extends` entries. Not fatal; callers treat them as
    /// extending nothing.
    pub fn check_extends(&self) {
        let known = self.known_names();
        for def in &self.definitions {
            for parent in &def.extends {
                if !known.contains(parent.as_str()) {
                    warn!(
                        definition = %def.name,
                        parent = %parent,
                        "Unresolvable extends entry, treating as no parent."
                    );
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample_document() -> IrDocument {
        let mut item = SchemaDefinition::interface("Item");
        item.properties.insert(
            "id".to_string(),
            PropertyInfo {
                raw_type: "NodeID".to_string(),
                optional: false,
                description: None,
            },
        );
        item.properties.insert(
            "tags".to_string(),
            PropertyInfo {
                raw_type: "string[]".to_string(),
                optional: true,
                description: Some("Freeform labels.".to_string()),
            },
        );
        let color = SchemaDefinition::enumeration(
            "Color",
            vec!["RED".to_string(), "GREEN".to_string()],
        );
        IrDocument::new(vec![color, item], vec!["NodeID".to_string()])
    }

    #[test]
    fn test_round_trip_preserves_order_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ir.json");

        let document = sample_document();
        document.write(&path).unwrap();
        let loaded = IrDocument::load(&path).unwrap();

        assert_eq!(loaded.definitions, document.definitions);
        assert_eq!(loaded.nominals, document.nominals);
        let item = loaded.get("Item").unwrap();
        let keys: Vec<_> = item.properties.keys().collect();
        assert_eq!(keys, ["id", "tags"]);
    }

    #[test]
    fn test_wire_field_names() {
        let document = sample_document();
        let json = serde_json::to_string(&document).unwrap();
        assert!(json.contains(r#""type":"interface""#));
        assert!(json.contains(r#""type":"enum""#));
        assert!(json.contains(r#""type":"NodeID""#));
        // Absent optional flag defaults to required.
        assert!(!json.contains(r#""optional":false"#));
    }

    #[test]
    fn test_missing_document_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = IrDocument::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, GenError::MissingIr(_)));
    }

    #[test]
    fn test_malformed_document_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ir.json");
        std::fs::write(&path, "not json").unwrap();
        let err = IrDocument::load(&path).unwrap_err();
        assert!(matches!(err, GenError::MalformedIr { .. }));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let document = IrDocument::new(
            vec![
                SchemaDefinition::interface("Item"),
                SchemaDefinition::interface("Item"),
            ],
            Vec::new(),
        );
        let err = document.validate().unwrap_err();
        assert!(matches!(err, GenError::DuplicateName(name) if name == "Item"));
    }

    #[test]
    fn test_empty_enum_rejected() {
        let document = IrDocument::new(
            vec![SchemaDefinition::enumeration("Empty", Vec::new())],
            Vec::new(),
        );
        assert!(matches!(
            document.validate(),
            Err(GenError::InvalidDefinition { .. })
        ));
    }
}
