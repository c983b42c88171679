// Error taxonomy for codeflow.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, CodeflowError>;

#[derive(Debug, thiserror::Error)]
pub enum CodeflowError {
    /// A required input collection is absent or empty.
    #[error(
        "{generator}: required input '{field}' is missing or empty (present: [{}])",
        present.join(", ")
    )]
    MissingInput {
        field: String,
        generator: String,
        present: Vec<String>,
    },

    #[error("diagram is missing its opening ```mermaid fence near the top")]
    MissingOpeningFence,

    #[error("diagram is missing its closing ``` fence")]
    MissingClosingFence,

    #[error("unbalanced subgraph blocks: {opened} subgraph line(s) but {closed} end line(s)")]
    UnbalancedSubgraphs { opened: usize, closed: usize },

    #[error("diagram has no recognized diagram type declaration near the top")]
    MissingDiagramType,

    #[error("diagram {kind} count {count} exceeds limit {limit}")]
    LimitExceeded {
        kind: &'static str,
        count: usize,
        limit: usize,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load input {}: {message}", path.display())]
    Input { path: PathBuf, message: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl CodeflowError {
    /// True for errors raised by the structural checker after assembly.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            CodeflowError::MissingOpeningFence
                | CodeflowError::MissingClosingFence
                | CodeflowError::UnbalancedSubgraphs { .. }
                | CodeflowError::MissingDiagramType
                | CodeflowError::LimitExceeded { .. }
        )
    }
}
