use crate::domain::metadata::MetadataStore;
use crate::error::Result;
use std::path::Path;

/// A diagram body producer driven by
/// [`GenerationDriver`](crate::application::GenerationDriver).
///
/// Implementors supply input validation and the body lines; the driver owns
/// the header, footer, structural validation and writing.
pub trait DiagramGenerator {
    /// Fail fast if required inputs are absent or empty.
    fn validate_inputs(&self) -> Result<()>;

    /// Lines placed between the diagram type declaration and the closing fence.
    fn generate_body(&mut self) -> Result<Vec<String>>;

    /// Name used in errors and logs.
    fn name(&self) -> &str {
        "DiagramGenerator"
    }

    /// Side-table written next to the diagram, if any.
    fn metadata(&self) -> Option<&MetadataStore> {
        None
    }
}

/// Destination for generated artifacts.
pub trait ArtifactWriter {
    fn write(&self, path: &Path, contents: &str) -> std::io::Result<()>;
}
