//! Lightweight dataclass emission.
//!
//! A standalone, dependency-free artifact: only the allow-listed record names
//! are rendered, as plain `@dataclass` classes with no base class. Parent
//! fields are inlined, required fields come before defaulted ones, and
//! optional sequence/mapping fields default via `field(default_factory=...)`.
//! Nominal aliases flatten to `str` so the file needs no alias declarations.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::config::GenerationConfig;
use crate::error::GenError;
use crate::ir::{DefinitionKind, IrDocument, SchemaDefinition};
use crate::mapper::{DataclassLang, TypeMapper};
use crate::sort::sort_definitions;
use crate::typeexpr::TypeExpr;

use super::{Emitter, GENERATED_HEADER, flattened_properties, member_identifier, to_snake_case};

#[derive(Debug, Clone, Copy, Default)]
pub struct DataclassEmitter;

impl Emitter for DataclassEmitter {
    fn target_name(&self) -> &'static str {
        "dataclass"
    }

    fn output_path(&self, config: &GenerationConfig) -> PathBuf {
        config.dataclass_path()
    }

    fn render(
        &self,
        document: &IrDocument,
        config: &GenerationConfig,
    ) -> Result<String, GenError> {
        let mut mapper = TypeMapper::new(DataclassLang, config, &document.nominals);
        let order = sort_definitions(document, mapper.nominals())?;

        let selected: Vec<&SchemaDefinition> = order
            .iter()
            .map(|&idx| &document.definitions[idx])
            .filter(|def| {
                def.kind == DefinitionKind::Interface
                    && config.dataclass_allowlist.contains(&def.name)
            })
            .collect();

        // Enums referenced by the selected records ride along so the artifact
        // stays importable on its own.
        let referenced = referenced_enums(document, &selected, &mapper);

        let mut sections = Vec::new();
        for def in &document.definitions {
            if def.kind == DefinitionKind::Enum && referenced.contains(&def.name) {
                mapper.imports_mut().add("enum", "Enum");
                sections.push(render_enum(def));
            }
        }
        for def in selected {
            sections.push(render_record(document, def, &mut mapper));
        }

        let mut artifact = String::from(GENERATED_HEADER);
        artifact.push_str("\n\n");
        let imports = mapper.imports().render();
        if !imports.is_empty() {
            artifact.push_str(&imports);
            artifact.push_str("\n\n");
        }
        artifact.push('\n');
        artifact.push_str(&sections.join("\n\n\n"));
        artifact.push('\n');
        Ok(artifact)
    }
}

fn referenced_enums(
    document: &IrDocument,
    selected: &[&SchemaDefinition],
    mapper: &TypeMapper<DataclassLang>,
) -> BTreeSet<String> {
    let mut referenced = BTreeSet::new();
    for def in selected {
        for property in flattened_properties(document, def).values() {
            collect_enum_refs(
                &TypeExpr::parse(&property.raw_type, mapper.nominals()),
                document,
                &mut referenced,
            );
        }
    }
    referenced
}

fn collect_enum_refs(expr: &TypeExpr, document: &IrDocument, out: &mut BTreeSet<String>) {
    match expr {
        TypeExpr::Reference(name) => {
            if document
                .get(name)
                .is_some_and(|def| def.kind == DefinitionKind::Enum)
            {
                out.insert(name.clone());
            }
        }
        TypeExpr::List(inner) | TypeExpr::Nullable(inner) => {
            collect_enum_refs(inner, document, out);
        }
        TypeExpr::Map { key, value } => {
            collect_enum_refs(key, document, out);
            collect_enum_refs(value, document, out);
        }
        TypeExpr::Union(branches) => {
            for branch in branches {
                collect_enum_refs(branch, document, out);
            }
        }
        TypeExpr::Primitive(_) | TypeExpr::Literals(_) | TypeExpr::Nominal(_) => {}
    }
}

fn render_enum(def: &SchemaDefinition) -> String {
    let mut lines = vec![format!("class {}(str, Enum):", def.name)];
    if let Some(description) = &def.description {
        lines.push(format!("    \"\"\"{description}\"\"\""));
        lines.push(String::new());
    }
    for value in &def.values {
        lines.push(format!("    {} = \"{value}\"", member_identifier(value)));
    }
    lines.join("\n")
}

fn render_record(
    document: &IrDocument,
    def: &SchemaDefinition,
    mapper: &mut TypeMapper<DataclassLang>,
) -> String {
    mapper.imports_mut().add("dataclasses", "dataclass");

    let properties = flattened_properties(document, def);
    let mut lines = vec!["@dataclass".to_string(), format!("class {}:", def.name)];
    if let Some(description) = &def.description {
        lines.push(format!("    \"\"\"{description}\"\"\""));
        lines.push(String::new());
    }
    if properties.is_empty() {
        lines.push("    pass".to_string());
        return lines.join("\n");
    }

    // Python requires defaulted fields after required ones; relative order is
    // preserved within each group.
    let mut required = Vec::new();
    let mut defaulted = Vec::new();
    for (name, property) in &properties {
        let py_name = to_snake_case(name);
        if !property.optional {
            let py_type = mapper.map(&property.raw_type, false, Some(name));
            required.push(format!("    {py_name}: {py_type}"));
            continue;
        }
        let bare = mapper.map(&property.raw_type, false, Some(name));
        let line = if bare.starts_with("List[") {
            mapper.imports_mut().add("dataclasses", "field");
            format!("    {py_name}: {bare} = field(default_factory=list)")
        } else if bare.starts_with("Dict[") {
            mapper.imports_mut().add("dataclasses", "field");
            format!("    {py_name}: {bare} = field(default_factory=dict)")
        } else {
            let wrapped = mapper.map(&property.raw_type, true, Some(name));
            format!("    {py_name}: {wrapped} = None")
        };
        defaulted.push(line);
    }
    lines.extend(required);
    lines.extend(defaulted);
    lines.join("\n")
}
