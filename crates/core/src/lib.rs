//! Schema-driven, cross-language type generation.
//!
//! The pipeline extracts `interface` and `enum` declarations from TypeScript
//! sources into a JSON intermediate representation, then emits equivalent
//! type definitions for three targets: validated pydantic models, lightweight
//! dataclasses, and a GraphQL SDL schema.

pub mod config;
pub mod emit;
pub mod error;
pub mod extract;
pub mod generator;
pub mod imports;
pub mod ir;
pub mod mapper;
pub mod sort;
pub mod typeexpr;

pub use config::GenerationConfig;
pub use error::GenError;
pub use generator::{generate_all, generate_ir, generate_target};
pub use ir::IrDocument;
