//! Pipeline orchestration: extraction and artifact generation as single
//! entry points for the CLI.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::GenerationConfig;
use crate::emit;
use crate::error::GenError;
use crate::extract::extract_sources;
use crate::ir::IrDocument;

/// Scan the configured source root and write the IR document.
pub fn generate_ir(config: &GenerationConfig) -> Result<PathBuf, GenError> {
    debug!(
        source_root = %config.source_root.display(),
        "Extracting schema definitions."
    );
    let document = extract_sources(&config.source_root)?;
    let path = config.ir_path();
    document.write(&path)?;
    info!(
        path = %path.display(),
        definitions = document.definitions.len(),
        "IR document written."
    );
    Ok(path)
}

/// Load the IR document and emit one target's artifact.
pub fn generate_target(config: &GenerationConfig, target: &str) -> Result<PathBuf, GenError> {
    let emitter = emit::emitter_for(target)
        .ok_or_else(|| GenError::UnknownTarget(target.to_string()))?;
    let document = IrDocument::load(&config.ir_path())?;
    let artifact = emitter.render(&document, config)?;
    let path = emitter.output_path(config);
    emit::write_artifact(&path, &artifact)?;
    info!(
        target = emitter.target_name(),
        path = %path.display(),
        artifact_len = artifact.len(),
        "Artifact generated."
    );
    Ok(path)
}

/// Full pipeline: extract, then emit every target.
pub fn generate_all(config: &GenerationConfig) -> Result<Vec<PathBuf>, GenError> {
    let mut paths = vec![generate_ir(config)?];
    for target in emit::ALL_TARGETS {
        paths.push(generate_target(config, target)?);
    }
    Ok(paths)
}
