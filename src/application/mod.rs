//! Generation driver
//!
//! Runs any [`DiagramGenerator`] through the fixed stage order
//! `validating -> header -> body -> footer -> diagram-validated -> written`.
//! Nothing is written unless the assembled text passes the
//! [`DiagramValidator`].

pub mod code_flow;

use crate::domain::metadata::MetadataStats;
use crate::domain::validator::{DiagramCounts, DiagramValidator};
use crate::error::{CodeflowError, Result};
use crate::ports::{ArtifactWriter, DiagramGenerator};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use code_flow::{CodeFlowGenerator, CodeFlowInputs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Validating,
    Header,
    Body,
    Footer,
    DiagramValidated,
    Written,
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationStage::Validating => "validating",
            GenerationStage::Header => "header",
            GenerationStage::Body => "body",
            GenerationStage::Footer => "footer",
            GenerationStage::DiagramValidated => "diagram-validated",
            GenerationStage::Written => "written",
        };
        f.write_str(name)
    }
}

/// An assembled, validated diagram that has not been written yet.
#[derive(Debug, Clone)]
pub struct RenderedDiagram {
    pub text: String,
    pub counts: DiagramCounts,
    pub stages: Vec<GenerationStage>,
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub output_path: PathBuf,
    /// Set only when the metadata document was written
    pub metadata_path: Option<PathBuf>,
    pub counts: DiagramCounts,
    pub stats: Option<MetadataStats>,
    pub stages: Vec<GenerationStage>,
}

pub struct GenerationDriver<'a> {
    validator: DiagramValidator,
    writer: &'a dyn ArtifactWriter,
    title: String,
    direction: String,
}

impl<'a> GenerationDriver<'a> {
    pub fn new(validator: DiagramValidator, writer: &'a dyn ArtifactWriter) -> Self {
        Self {
            validator,
            writer,
            title: "Code Flow".to_string(),
            direction: "TD".to_string(),
        }
    }

    /// Title for the `# ...` heading. Line breaks are folded into spaces so
    /// the fence stays inside the header window.
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title
            .split(['\r', '\n'])
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        self
    }

    pub fn with_direction(mut self, direction: &str) -> Self {
        self.direction = direction.to_string();
        self
    }

    /// Metadata document path for `output`: `<stem>.metadata.json` beside it.
    pub fn metadata_path(output: &Path) -> PathBuf {
        output.with_extension("metadata.json")
    }

    /// Assemble and validate without writing.
    pub fn render(&self, generator: &mut dyn DiagramGenerator) -> Result<RenderedDiagram> {
        let mut stages = Vec::new();

        enter(&mut stages, GenerationStage::Validating, generator.name());
        generator.validate_inputs()?;

        enter(&mut stages, GenerationStage::Header, generator.name());
        let mut lines = vec![
            format!("# {}", self.title),
            String::new(),
            "```mermaid".to_string(),
            format!("flowchart {}", self.direction),
        ];

        enter(&mut stages, GenerationStage::Body, generator.name());
        lines.extend(generator.generate_body()?);

        enter(&mut stages, GenerationStage::Footer, generator.name());
        lines.push("```".to_string());
        let mut text = lines.join("\n");
        text.push('\n');

        let counts = self.validator.validate(&text)?;
        enter(&mut stages, GenerationStage::DiagramValidated, generator.name());

        Ok(RenderedDiagram {
            text,
            counts,
            stages,
        })
    }

    /// Render, then write the diagram and its metadata document.
    pub fn run(
        &self,
        generator: &mut dyn DiagramGenerator,
        output: &Path,
    ) -> Result<GenerationReport> {
        let RenderedDiagram {
            text,
            counts,
            mut stages,
        } = self.render(generator)?;

        self.writer
            .write(output, &text)
            .map_err(|source| CodeflowError::Write {
                path: output.to_path_buf(),
                source,
            })?;

        let mut metadata_path = None;
        let mut stats = None;
        if let Some(metadata) = generator.metadata().filter(|m| !m.is_empty()) {
            stats = Some(metadata.get_stats_summary());
            let path = Self::metadata_path(output);
            let written = metadata
                .export_json()
                .map_err(std::io::Error::from)
                .and_then(|json| self.writer.write(&path, &json));
            match written {
                Ok(()) => metadata_path = Some(path),
                Err(e) => warn!("Failed to write metadata {}: {}", path.display(), e),
            }
        }

        enter(&mut stages, GenerationStage::Written, generator.name());
        info!(
            "{} wrote {} ({} nodes, {} edges, {} subgraphs)",
            generator.name(),
            output.display(),
            counts.nodes,
            counts.edges,
            counts.subgraphs_opened
        );

        Ok(GenerationReport {
            output_path: output.to_path_buf(),
            metadata_path,
            counts,
            stats,
            stages,
        })
    }
}

fn enter(stages: &mut Vec<GenerationStage>, stage: GenerationStage, generator: &str) {
    debug!("{}: {}", generator, stage);
    stages.push(stage);
}
