//! Validated-model emission (pydantic).
//!
//! Artifact layout: generated header, import block, `NewType` nominal
//! aliases, `(str, Enum)` enums, then model classes in dependency order.
//! Fields are snake_case with a wire-name alias whenever the conversion
//! changes the spelling.

use std::path::PathBuf;

use crate::config::GenerationConfig;
use crate::error::GenError;
use crate::ir::{DefinitionKind, IrDocument, SchemaDefinition};
use crate::mapper::{PydanticLang, TypeMapper};
use crate::sort::sort_definitions;

use super::{Emitter, GENERATED_HEADER, member_identifier, to_snake_case};

#[derive(Debug, Clone, Copy, Default)]
pub struct PydanticEmitter;

impl Emitter for PydanticEmitter {
    fn target_name(&self) -> &'static str {
        "pydantic"
    }

    fn output_path(&self, config: &GenerationConfig) -> PathBuf {
        config.pydantic_path()
    }

    fn render(
        &self,
        document: &IrDocument,
        config: &GenerationConfig,
    ) -> Result<String, GenError> {
        let mut mapper = TypeMapper::new(PydanticLang, config, &document.nominals);
        let order = sort_definitions(document, mapper.nominals())?;

        let mut sections = Vec::new();

        let nominals = mapper.nominals().clone();
        if !nominals.is_empty() {
            mapper.imports_mut().add("typing", "NewType");
            let aliases: Vec<String> = nominals
                .iter()
                .map(|name| format!("{name} = NewType(\"{name}\", str)"))
                .collect();
            sections.push(aliases.join("\n"));
        }

        for def in &document.definitions {
            if def.kind == DefinitionKind::Enum {
                sections.push(render_enum(def, &mut mapper));
            }
        }

        for &idx in &order {
            let def = &document.definitions[idx];
            if def.kind == DefinitionKind::Interface {
                sections.push(render_model(document, def, config, &mut mapper));
            }
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

fn render_enum(def: &SchemaDefinition, mapper: &mut TypeMapper<PydanticLang>) -> String {
    mapper.imports_mut().add("enum", "Enum");
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

fn render_model(
    document: &IrDocument,
    def: &SchemaDefinition,
    config: &GenerationConfig,
    mapper: &mut TypeMapper<PydanticLang>,
) -> String {
    mapper.imports_mut().add("pydantic", "BaseModel");
    mapper.imports_mut().add("pydantic", "ConfigDict");

    // Python inheritance carries the remaining parents' fields implicitly
    // through the first resolvable one; unresolvable parents were warned
    // about on load.
    let parent = def
        .extends
        .iter()
        .find(|name| {
            document
                .get(name)
                .is_some_and(|parent| parent.kind == DefinitionKind::Interface)
        })
        .cloned()
        .unwrap_or_else(|| "BaseModel".to_string());

    let extra = if config.strict_models { "forbid" } else { "allow" };

    let mut lines = vec![format!("class {}({parent}):", def.name)];
    if let Some(description) = &def.description {
        lines.push(format!("    \"\"\"{description}\"\"\""));
        lines.push(String::new());
    }
    lines.push(format!(
        "    model_config = ConfigDict(extra=\"{extra}\", populate_by_name=True)"
    ));
    if !def.properties.is_empty() {
        lines.push(String::new());
    }

    for (name, property) in &def.properties {
        let py_name = to_snake_case(name);
        let py_type = mapper.map(&property.raw_type, property.optional, Some(name));
        let needs_alias = py_name != *name;

        if let Some(description) = &property.description {
            lines.push(format!("    # {description}"));
        }

        let field_args = match (property.optional, needs_alias) {
            (true, true) => Some(format!("default=None, alias=\"{name}\"")),
            (true, false) => Some("default=None".to_string()),
            (false, true) => Some(format!("alias=\"{name}\"")),
            (false, false) => None,
        };
        match field_args {
            Some(args) => {
                mapper.imports_mut().add("pydantic", "Field");
                lines.push(format!("    {py_name}: {py_type} = Field({args})"));
            }
            None => lines.push(format!("    {py_name}: {py_type}")),
        }
    }

    lines.join("\n")
}
