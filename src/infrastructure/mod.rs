// Infrastructure implementations for codeflow.

pub mod concurrency;

use crate::application::CodeFlowInputs;
use crate::error::{CodeflowError, Result};
use crate::ports::ArtifactWriter;
use std::fs;
use std::path::Path;

/// Writes artifacts to the local filesystem, creating parent directories.
pub struct FsArtifactWriter;

impl ArtifactWriter for FsArtifactWriter {
    fn write(&self, path: &Path, contents: &str) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }
}

/// Load a `{symbol_table, call_graph}` JSON document.
pub fn load_inputs(path: &Path) -> Result<CodeFlowInputs> {
    let content = fs::read_to_string(path).map_err(|e| CodeflowError::Input {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_inputs(&content).map_err(|e| CodeflowError::Input {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

pub fn parse_inputs(content: &str) -> serde_json::Result<CodeFlowInputs> {
    serde_json::from_str(content)
}
