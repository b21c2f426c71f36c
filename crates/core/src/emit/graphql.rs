//! GraphQL SDL emission.
//!
//! Artifact layout: generated header, scalar declarations (`JSONScalar` plus
//! one per nominal identifier), enums, type declarations in dependency order,
//! and the fixed operation root block appended verbatim. Names with a leading
//! underscore are internal and never reach the schema.

use std::path::PathBuf;

use tracing::warn;

use crate::config::GenerationConfig;
use crate::error::GenError;
use crate::ir::{DefinitionKind, IrDocument, SchemaDefinition};
use crate::mapper::{GraphqlLang, TypeMapper};
use crate::sort::sort_definitions;

use super::{Emitter, GENERATED_HEADER, flattened_properties, member_identifier, to_camel_case};

/// Operation roots are not derived from the schema sources; the server wires
/// its resolvers against these fixed entry points.
const ROOT_BLOCK: &str = "\
type Query {
  healthcheck: Boolean!
}

type Mutation {
  noop: Boolean!
}

type Subscription {
  heartbeat: Boolean!
}";

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphqlEmitter;

impl Emitter for GraphqlEmitter {
    fn target_name(&self) -> &'static str {
        "graphql"
    }

    fn output_path(&self, config: &GenerationConfig) -> PathBuf {
        config.graphql_path()
    }

    fn render(
        &self,
        document: &IrDocument,
        config: &GenerationConfig,
    ) -> Result<String, GenError> {
        let mut mapper = TypeMapper::new(GraphqlLang, config, &document.nominals);
        let order = sort_definitions(document, mapper.nominals())?;

        let mut blocks = vec![GENERATED_HEADER.to_string()];

        let mut scalars = vec!["scalar JSONScalar".to_string()];
        for nominal in mapper.nominals() {
            scalars.push(format!("scalar {nominal}"));
        }
        blocks.push(scalars.join("\n"));

        for def in &document.definitions {
            if def.kind == DefinitionKind::Enum && !def.name.starts_with('_') {
                blocks.push(render_enum(def));
            }
        }

        for &idx in &order {
            let def = &document.definitions[idx];
            if def.kind != DefinitionKind::Interface || def.name.starts_with('_') {
                continue;
            }
            if let Some(block) = render_type(document, def, &mut mapper) {
                blocks.push(block);
            }
        }

        blocks.push(ROOT_BLOCK.to_string());

        let mut artifact = blocks.join("\n\n");
        artifact.push('\n');
        Ok(artifact)
    }
}

fn render_enum(def: &SchemaDefinition) -> String {
    let mut lines = Vec::new();
    if let Some(description) = &def.description {
        lines.push(format!("\"\"\"{description}\"\"\""));
    }
    lines.push(format!("enum {} {{", def.name));
    for value in &def.values {
        lines.push(format!("  {}", member_identifier(value)));
    }
    lines.push("}".to_string());
    lines.join("\n")
}

fn render_type(
    document: &IrDocument,
    def: &SchemaDefinition,
    mapper: &mut TypeMapper<GraphqlLang>,
) -> Option<String> {
    let properties = flattened_properties(document, def);

    let mut fields = Vec::new();
    for (name, property) in &properties {
        if name.starts_with('_') {
            continue;
        }
        let sdl_type = mapper.map(&property.raw_type, property.optional, Some(name));
        fields.push(format!("  {}: {sdl_type}", to_camel_case(name)));
    }
    if fields.is_empty() {
        // SDL forbids empty type bodies.
        warn!(definition = %def.name, "Type has no emittable fields, skipping.");
        return None;
    }

    let mut lines = Vec::new();
    if let Some(description) = &def.description {
        lines.push(format!("\"\"\"{description}\"\"\""));
    }
    lines.push(format!("type {} {{", def.name));
    lines.extend(fields);
    lines.push("}".to_string());
    Some(lines.join("\n"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ir::PropertyInfo;

    fn prop(raw_type: &str, optional: bool) -> PropertyInfo {
        PropertyInfo {
            raw_type: raw_type.to_string(),
            optional,
            description: None,
        }
    }

    fn scenario_document() -> IrDocument {
        let color = SchemaDefinition::enumeration(
            "Color",
            vec!["RED".to_string(), "GREEN".to_string()],
        );
        let mut item = SchemaDefinition::interface("Item");
        item.properties.insert("id".to_string(), prop("NodeID", false));
        item.properties
            .insert("tags".to_string(), prop("string[]", true));
        item.properties
            .insert("color".to_string(), prop("Color", false));
        IrDocument::new(vec![color, item], vec!["NodeID".to_string()])
    }

    #[test]
    fn test_scenario_artifact() {
        let artifact = GraphqlEmitter
            .render(&scenario_document(), &GenerationConfig::default())
            .unwrap();

        assert!(artifact.starts_with(GENERATED_HEADER));
        assert!(artifact.contains("scalar JSONScalar"));
        assert!(artifact.contains("scalar NodeID"));
        assert!(artifact.contains("enum Color {\n  RED\n  GREEN\n}"));
        assert!(artifact.contains(
            "type Item {\n  id: NodeID!\n  tags: [String!]\n  color: Color!\n}"
        ));
        assert!(artifact.ends_with("type Subscription {\n  heartbeat: Boolean!\n}\n"));
    }

    #[test]
    fn test_underscore_names_skipped() {
        let mut internal = SchemaDefinition::interface("_Internal");
        internal
            .properties
            .insert("x".to_string(), prop("number", false));
        let mut item = SchemaDefinition::interface("Item");
        item.properties
            .insert("_private".to_string(), prop("string", false));
        item.properties
            .insert("label".to_string(), prop("string", false));
        let document = IrDocument::new(vec![internal, item], Vec::new());

        let artifact = GraphqlEmitter
            .render(&document, &GenerationConfig::default())
            .unwrap();
        assert!(!artifact.contains("_Internal"));
        assert!(!artifact.contains("_private"));
        assert!(artifact.contains("  label: String!"));
    }

    #[test]
    fn test_snake_fields_become_camel() {
        let mut item = SchemaDefinition::interface("Run");
        item.properties
            .insert("started_at".to_string(), prop("string", true));
        let document = IrDocument::new(vec![item], Vec::new());

        let artifact = GraphqlEmitter
            .render(&document, &GenerationConfig::default())
            .unwrap();
        assert!(artifact.contains("  startedAt: String\n"));
    }

    #[test]
    fn test_parent_fields_inlined() {
        let mut base = SchemaDefinition::interface("BaseNode");
        base.properties.insert("id".to_string(), prop("NodeID", false));
        let mut leaf = SchemaDefinition::interface("StartNode");
        leaf.extends.push("BaseNode".to_string());
        leaf.properties
            .insert("label".to_string(), prop("string", false));
        let document = IrDocument::new(vec![base, leaf], Vec::new());

        let artifact = GraphqlEmitter
            .render(&document, &GenerationConfig::default())
            .unwrap();
        assert!(artifact.contains("type StartNode {\n  id: NodeID!\n  label: String!\n}"));
    }

    #[test]
    fn test_empty_type_skipped() {
        let mut ghost = SchemaDefinition::interface("Ghost");
        ghost
            .properties
            .insert("_hidden".to_string(), prop("string", false));
        let document = IrDocument::new(vec![ghost], Vec::new());

        let artifact = GraphqlEmitter
            .render(&document, &GenerationConfig::default())
            .unwrap();
        assert!(!artifact.contains("type Ghost"));
    }

    #[test]
    fn test_lossy_shapes() {
        let mut item = SchemaDefinition::interface("Edge");
        item.properties
            .insert("meta".to_string(), prop("Record<string, any>", false));
        item.properties
            .insert("mode".to_string(), prop("'auto' | 'manual'", false));
        let document = IrDocument::new(vec![item], Vec::new());

        let artifact = GraphqlEmitter
            .render(&document, &GenerationConfig::default())
            .unwrap();
        assert!(artifact.contains("  meta: JSONScalar!"));
        assert!(artifact.contains("  mode: String!"));
    }
}
