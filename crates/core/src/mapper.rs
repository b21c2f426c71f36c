//! Target-language type mapping.
//!
//! One generic `TypeMapper` handles parsing, memoization, and single-shot
//! optionality for every target; a `TargetLang` implementation supplies the
//! per-target rendering of each `TypeExpr` shape.

use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::config::GenerationConfig;
use crate::imports::ImportSet;
use crate::typeexpr::{LiteralValue, Primitive, TypeExpr};

/// Rendering rules for one output language.
pub trait TargetLang {
    fn target_name(&self) -> &'static str;

    /// Render a type expression to the target's type syntax. `force_int`
    /// applies the integer field-name hint to `number` primitives.
    fn render(&self, expr: &TypeExpr, force_int: bool, imports: &mut ImportSet) -> String;

    /// Apply the target's optionality construct. Called exactly once per
    /// mapping; must never double-wrap.
    fn finish(&self, base: String, optional: bool, imports: &mut ImportSet) -> String;
}

/// Shared mapping driver. Owns a per-instance memo table and import set,
/// both discarded with the instance after an emitter run.
#[derive(Debug)]
pub struct TypeMapper<T: TargetLang> {
    lang: T,
    integer_fields: BTreeSet<String>,
    nominals: BTreeSet<String>,
    cache: HashMap<(String, bool, Option<String>), String>,
    imports: ImportSet,
}

impl<T: TargetLang> TypeMapper<T> {
    pub fn new(lang: T, config: &GenerationConfig, extra_nominals: &[String]) -> Self {
        let mut nominals = config.nominal_ids.clone();
        nominals.extend(extra_nominals.iter().cloned());
        TypeMapper {
            lang,
            integer_fields: config.integer_fields.clone(),
            nominals,
            cache: HashMap::new(),
            imports: ImportSet::new(),
        }
    }

    /// Map a raw type string to the target's type syntax. `field_name` feeds
    /// the integer hint; results are memoized by the full argument triple.
    pub fn map(&mut self, raw: &str, optional: bool, field_name: Option<&str>) -> String {
        let key = (raw.to_string(), optional, field_name.map(str::to_string));
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }

        let force_int = field_name.is_some_and(|name| self.integer_fields.contains(name));
        let expr = TypeExpr::parse(raw, &self.nominals);
        // `T | null` and an optional marker are the same thing; hoist the
        // null-ness so the optionality construct is applied exactly once.
        let (expr, nullable) = match expr {
            TypeExpr::Nullable(inner) => (*inner, true),
            other => (other, false),
        };
        let base = self.lang.render(&expr, force_int, &mut self.imports);
        let rendered = self.lang.finish(base, optional || nullable, &mut self.imports);

        self.cache.insert(key, rendered.clone());
        rendered
    }

    pub fn nominals(&self) -> &BTreeSet<String> {
        &self.nominals
    }

    pub fn imports(&self) -> &ImportSet {
        &self.imports
    }

    /// Emitters record non-type imports (base classes, decorators) here.
    pub fn imports_mut(&mut self) -> &mut ImportSet {
        &mut self.imports
    }

    pub fn target_name(&self) -> &'static str {
        self.lang.target_name()
    }
}

// =============================================================================
// Python rendering (shared by the pydantic and dataclass targets)
// =============================================================================

fn python_render(
    expr: &TypeExpr,
    force_int: bool,
    imports: &mut ImportSet,
    nominals_as_str: bool,
) -> String {
    match expr {
        TypeExpr::Primitive(primitive) => match primitive {
            Primitive::String => "str".to_string(),
            Primitive::Number => {
                if force_int {
                    "int".to_string()
                } else {
                    "float".to_string()
                }
            }
            Primitive::Boolean => "bool".to_string(),
            Primitive::Any | Primitive::Unknown => {
                imports.add("typing", "Any");
                "Any".to_string()
            }
            Primitive::Null | Primitive::Undefined | Primitive::Void => "None".to_string(),
            Primitive::Object => {
                imports.add("typing", "Any");
                imports.add("typing", "Dict");
                "Dict[str, Any]".to_string()
            }
        },
        TypeExpr::List(inner) => {
            imports.add("typing", "List");
            let inner = python_render(inner, force_int, imports, nominals_as_str);
            format!("List[{inner}]")
        }
        TypeExpr::Map { key, value } => {
            imports.add("typing", "Dict");
            // Nominal and reference keys serialize as plain strings.
            let key = match key.as_ref() {
                TypeExpr::Primitive(Primitive::String)
                | TypeExpr::Nominal(_)
                | TypeExpr::Reference(_) => "str".to_string(),
                other => python_render(other, force_int, imports, nominals_as_str),
            };
            let value = python_render(value, force_int, imports, nominals_as_str);
            format!("Dict[{key}, {value}]")
        }
        TypeExpr::Nullable(inner) => {
            imports.add("typing", "Optional");
            let inner = python_render(inner, force_int, imports, nominals_as_str);
            format!("Optional[{inner}]")
        }
        TypeExpr::Union(branches) => {
            imports.add("typing", "Union");
            let rendered: Vec<String> = branches
                .iter()
                .map(|branch| python_render(branch, force_int, imports, nominals_as_str))
                .collect();
            format!("Union[{}]", rendered.join(", "))
        }
        TypeExpr::Literals(values) => {
            imports.add("typing", "Literal");
            let rendered: Vec<String> = values
                .iter()
                .map(|value| match value {
                    LiteralValue::Str(s) => format!("\"{s}\""),
                    LiteralValue::Int(i) => i.to_string(),
                })
                .collect();
            format!("Literal[{}]", rendered.join(", "))
        }
        TypeExpr::Reference(name) => name.clone(),
        TypeExpr::Nominal(name) => {
            if nominals_as_str {
                "str".to_string()
            } else {
                name.clone()
            }
        }
    }
}

fn python_finish(base: String, optional: bool, imports: &mut ImportSet) -> String {
    if !optional || base.starts_with("Optional[") {
        return base;
    }
    imports.add("typing", "Optional");
    format!("Optional[{base}]")
}

/// Rendering for the validated pydantic model target.
#[derive(Debug, Clone, Copy, Default)]
pub struct PydanticLang;

impl TargetLang for PydanticLang {
    fn target_name(&self) -> &'static str {
        "pydantic"
    }

    fn render(&self, expr: &TypeExpr, force_int: bool, imports: &mut ImportSet) -> String {
        python_render(expr, force_int, imports, false)
    }

    fn finish(&self, base: String, optional: bool, imports: &mut ImportSet) -> String {
        python_finish(base, optional, imports)
    }
}

/// Rendering for the lightweight dataclass target. Identical to pydantic
/// rendering except nominal aliases flatten to their underlying `str`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataclassLang;

impl TargetLang for DataclassLang {
    fn target_name(&self) -> &'static str {
        "dataclass"
    }

    fn render(&self, expr: &TypeExpr, force_int: bool, imports: &mut ImportSet) -> String {
        python_render(expr, force_int, imports, true)
    }

    fn finish(&self, base: String, optional: bool, imports: &mut ImportSet) -> String {
        python_finish(base, optional, imports)
    }
}

// =============================================================================
// GraphQL SDL rendering
// =============================================================================

/// Rendering for the GraphQL SDL target. Maps and mixed unions are lossy in
/// SDL and degrade rather than fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphqlLang;

impl TargetLang for GraphqlLang {
    fn target_name(&self) -> &'static str {
        "graphql"
    }

    fn render(&self, expr: &TypeExpr, force_int: bool, imports: &mut ImportSet) -> String {
        match expr {
            TypeExpr::Primitive(primitive) => match primitive {
                Primitive::String => "String".to_string(),
                Primitive::Number => {
                    if force_int {
                        "Int".to_string()
                    } else {
                        "Float".to_string()
                    }
                }
                Primitive::Boolean | Primitive::Void => "Boolean".to_string(),
                Primitive::Any
                | Primitive::Unknown
                | Primitive::Null
                | Primitive::Undefined
                | Primitive::Object => "JSONScalar".to_string(),
            },
            TypeExpr::List(inner) => {
                let inner = self.render(inner, force_int, imports);
                format!("[{inner}!]")
            }
            // SDL has no map type.
            TypeExpr::Map { .. } => "JSONScalar".to_string(),
            TypeExpr::Nullable(inner) => self.render(inner, force_int, imports),
            TypeExpr::Union(branches) => {
                // SDL unions cannot mix scalars; take the first branch that
                // carries a concrete type.
                let chosen = branches
                    .iter()
                    .find(|branch| !matches!(branch, TypeExpr::Literals(_)));
                match chosen {
                    Some(branch) => {
                        let rendered = self.render(branch, force_int, imports);
                        warn!(
                            chosen = %rendered,
                            "Union type narrowed to its first concrete branch for SDL."
                        );
                        rendered
                    }
                    None => "String".to_string(),
                }
            }
            // Closed literal sets are plain strings on the wire.
            TypeExpr::Literals(_) => "String".to_string(),
            TypeExpr::Reference(name) | TypeExpr::Nominal(name) => name.clone(),
        }
    }

    fn finish(&self, base: String, optional: bool, _imports: &mut ImportSet) -> String {
        if optional {
            base
        } else {
            format!("{base}!")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn pydantic_mapper() -> TypeMapper<PydanticLang> {
        TypeMapper::new(PydanticLang, &GenerationConfig::default(), &[])
    }

    fn graphql_mapper() -> TypeMapper<GraphqlLang> {
        TypeMapper::new(GraphqlLang, &GenerationConfig::default(), &[])
    }

    #[test]
    fn test_python_primitive_tokens() {
        let mut mapper = pydantic_mapper();
        let cases = [
            ("string", "str"),
            ("number", "float"),
            ("boolean", "bool"),
            ("any", "Any"),
            ("unknown", "Any"),
            ("null", "None"),
            ("undefined", "None"),
            ("void", "None"),
            ("object", "Dict[str, Any]"),
        ];
        for (raw, expected) in cases {
            assert_eq!(mapper.map(raw, false, None), expected, "raw = {raw}");
        }
    }

    #[test]
    fn test_graphql_primitive_tokens() {
        let mut mapper = graphql_mapper();
        let cases = [
            ("string", "String!"),
            ("number", "Float!"),
            ("boolean", "Boolean!"),
            ("any", "JSONScalar!"),
            ("unknown", "JSONScalar!"),
            ("void", "Boolean!"),
            ("object", "JSONScalar!"),
        ];
        for (raw, expected) in cases {
            assert_eq!(mapper.map(raw, false, None), expected, "raw = {raw}");
        }
    }

    #[test]
    fn test_integer_field_hint() {
        let mut mapper = pydantic_mapper();
        assert_eq!(mapper.map("number", false, Some("count")), "int");
        assert_eq!(mapper.map("number", false, Some("ratio")), "float");
        assert_eq!(mapper.map("number", false, None), "float");

        let mut graphql = graphql_mapper();
        assert_eq!(graphql.map("number", false, Some("timeout")), "Int!");
        assert_eq!(graphql.map("number", false, Some("ratio")), "Float!");
    }

    #[test]
    fn test_optional_wrapped_exactly_once() {
        let mut mapper = pydantic_mapper();
        assert_eq!(mapper.map("string", true, None), "Optional[str]");
        // `T | null` with the optional marker set must not double-wrap.
        assert_eq!(mapper.map("string | null", true, None), "Optional[str]");
        assert_eq!(mapper.map("string | null", false, None), "Optional[str]");
    }

    #[test]
    fn test_graphql_optionality_markers() {
        let mut mapper = graphql_mapper();
        assert_eq!(mapper.map("string", false, None), "String!");
        assert_eq!(mapper.map("string", true, None), "String");
        assert_eq!(mapper.map("string | null", false, None), "String");
        assert_eq!(mapper.map("string[]", false, None), "[String!]!");
        assert_eq!(mapper.map("string[]", true, None), "[String!]");
    }

    #[test]
    fn test_containers() {
        let mut mapper = pydantic_mapper();
        assert_eq!(mapper.map("string[]", false, None), "List[str]");
        assert_eq!(mapper.map("Array<NodeID>", false, None), "List[NodeID]");
        assert_eq!(
            mapper.map("Record<string, number>", false, None),
            "Dict[str, float]"
        );
        assert_eq!(
            mapper.map("Map<NodeID, Vec2>", false, None),
            "Dict[str, Vec2]"
        );

        let mut graphql = graphql_mapper();
        assert_eq!(graphql.map("Record<string, number>", false, None), "JSONScalar!");
    }

    #[test]
    fn test_literal_unions() {
        let mut mapper = pydantic_mapper();
        assert_eq!(
            mapper.map("'red' | 'green'", false, None),
            "Literal[\"red\", \"green\"]"
        );
        assert_eq!(mapper.map("0 | 1", false, None), "Literal[0, 1]");

        let mut graphql = graphql_mapper();
        assert_eq!(graphql.map("'red' | 'green'", false, None), "String!");
    }

    #[test]
    fn test_mixed_unions() {
        let mut mapper = pydantic_mapper();
        assert_eq!(
            mapper.map("string | number", false, None),
            "Union[str, float]"
        );

        let mut graphql = graphql_mapper();
        assert_eq!(graphql.map("string | number", false, None), "String!");
        assert_eq!(graphql.map("'auto' | Vec2", false, None), "Vec2!");
    }

    #[test]
    fn test_brand_and_nominal() {
        let mut mapper = pydantic_mapper();
        assert_eq!(
            mapper.map("string & { readonly __brand: 'NodeID' }", false, None),
            "NodeID"
        );
        assert_eq!(mapper.map("NodeID", false, None), "NodeID");

        let mut dataclass = TypeMapper::new(DataclassLang, &GenerationConfig::default(), &[]);
        assert_eq!(dataclass.map("NodeID", false, None), "str");
        assert_eq!(dataclass.map("NodeID[]", false, None), "List[str]");

        let mut graphql = graphql_mapper();
        assert_eq!(graphql.map("NodeID", false, None), "NodeID!");
    }

    #[test]
    fn test_extra_nominals_extend_registry() {
        let config = GenerationConfig::default();
        let extras = vec!["WidgetID".to_string()];
        let mut mapper = TypeMapper::new(DataclassLang, &config, &extras);
        assert_eq!(mapper.map("WidgetID", false, None), "str");
    }

    #[test]
    fn test_memoization_is_stable() {
        let mut mapper = pydantic_mapper();
        let first = mapper.map("Record<string, number>", true, Some("count"));
        let second = mapper.map("Record<string, number>", true, Some("count"));
        assert_eq!(first, second);
        assert_eq!(first, "Optional[Dict[str, int]]");
    }

    #[test]
    fn test_imports_accumulate() {
        let mut mapper = pydantic_mapper();
        mapper.map("string[]", true, None);
        mapper.map("any", false, None);
        let rendered = mapper.imports().render();
        assert_eq!(rendered, "from typing import Any, List, Optional");
    }

    #[test]
    fn test_malformed_generic_degrades() {
        let mut mapper = pydantic_mapper();
        assert_eq!(mapper.map("Record<string", false, None), "Dict[str, Any]");
    }

    #[test]
    fn test_unknown_reference_passes_through() {
        let mut mapper = pydantic_mapper();
        assert_eq!(mapper.map("SomethingUndeclared", false, None), "SomethingUndeclared");
    }
}
