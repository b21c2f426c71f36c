//! End-to-end pipeline tests: TypeScript sources in, all artifacts out.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use schemagen_core::{GenError, GenerationConfig, generate_all, generate_target};

const SCHEMA_TS: &str = r"
export type NodeID = string & { readonly __brand: 'NodeID' };

/** Primary palette. */
export enum Color {
  RED = 'RED',
  GREEN = 'GREEN',
}

export interface Item {
  id: NodeID;
  tags?: string[];
  color: Color;
}

export interface StartNode {
  id: NodeID;
  tags?: string[];
  maxIteration: number;
}
";

fn workspace(schema: &str) -> (tempfile::TempDir, GenerationConfig) {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::write(src.join("diagram.ts"), schema).unwrap();
    let config = GenerationConfig {
        source_root: src,
        output_dir: dir.path().join("generated"),
        ..GenerationConfig::default()
    };
    (dir, config)
}

#[test]
fn full_pipeline_produces_expected_artifacts() {
    let (_dir, config) = workspace(SCHEMA_TS);
    let paths = generate_all(&config).unwrap();
    assert_eq!(paths.len(), 4);

    let ir = std::fs::read_to_string(config.ir_path()).unwrap();
    assert!(ir.contains(r#""name": "Color""#));
    assert!(ir.contains(r#""name": "Item""#));
    assert!(ir.contains(r#""type": "string[]""#));
    assert!(ir.contains(r#""NodeID""#));

    let models = std::fs::read_to_string(config.pydantic_path()).unwrap();
    assert!(models.contains("NodeID = NewType(\"NodeID\", str)"));
    assert!(models.contains("class Color(str, Enum):"));
    assert!(models.contains("    RED = \"RED\""));
    assert!(models.contains("    GREEN = \"GREEN\""));
    assert!(models.contains("class Item(BaseModel):"));
    assert!(models.contains("    id: NodeID"));
    assert!(models.contains("    tags: Optional[List[str]] = Field(default=None)"));
    assert!(models.contains("    color: Color"));

    let minimal = std::fs::read_to_string(config.dataclass_path()).unwrap();
    assert!(minimal.contains("@dataclass\nclass StartNode:"));
    assert!(minimal.contains("    id: str"));
    assert!(minimal.contains("    max_iteration: int"));
    assert!(minimal.contains("    tags: List[str] = field(default_factory=list)"));
    // Allow-list keeps everything else out of the lightweight artifact.
    assert!(!minimal.contains("class Item"));

    let schema = std::fs::read_to_string(config.graphql_path()).unwrap();
    assert!(schema.contains("scalar JSONScalar"));
    assert!(schema.contains("scalar NodeID"));
    assert!(schema.contains("enum Color {\n  RED\n  GREEN\n}"));
    assert!(schema.contains("type Item {\n  id: NodeID!\n  tags: [String!]\n  color: Color!\n}"));
    assert!(schema.contains("type Query {"));
}

#[test]
fn pipeline_is_idempotent() {
    let (_dir, config) = workspace(SCHEMA_TS);

    generate_all(&config).unwrap();
    let read_all = |config: &GenerationConfig| {
        [
            std::fs::read(config.ir_path()).unwrap(),
            std::fs::read(config.pydantic_path()).unwrap(),
            std::fs::read(config.dataclass_path()).unwrap(),
            std::fs::read(config.graphql_path()).unwrap(),
        ]
    };
    let first = read_all(&config);
    generate_all(&config).unwrap();
    let second = read_all(&config);
    assert_eq!(first, second);
}

#[test]
fn emit_requires_prior_extraction() {
    let (_dir, config) = workspace(SCHEMA_TS);
    let err = generate_target(&config, "graphql").unwrap_err();
    assert!(matches!(err, GenError::MissingIr(_)));
}

#[test]
fn inheritance_cycle_aborts_pipeline() {
    let cyclic = "
interface A extends B {
  a: string;
}
interface B extends A {
  b: string;
}
";
    let (_dir, config) = workspace(cyclic);
    // Extraction succeeds; the sorter inside emission rejects the cycle.
    let err = generate_all(&config).unwrap_err();
    assert!(matches!(err, GenError::InheritanceCycle(_)));
}
