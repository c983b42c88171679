//! Structural checks over assembled diagram text.
//!
//! Runs after the footer is written and before anything touches disk. Checks
//! run in a fixed order and the first failure is returned.

use crate::error::{CodeflowError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// How many leading lines may precede the fence / type declaration.
const HEADER_WINDOW: usize = 5;

const DIAGRAM_TYPES: &[&str] = &[
    "flowchart",
    "graph",
    "sequenceDiagram",
    "classDiagram",
    "stateDiagram",
    "stateDiagram-v2",
    "erDiagram",
    "gantt",
    "pie",
    "mindmap",
    "journey",
    "gitGraph",
];

static NODE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*[A-Za-z_][\w-]*\s*\["#).expect("valid node pattern"));
static EDGE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[A-Za-z_][\w-]*\s*(-->|-\.->|==>)").expect("valid edge pattern")
});

/// Ceilings enforced on an assembled diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramLimits {
    pub max_nodes: usize,
    pub max_edges: usize,
    pub max_subgraphs: usize,
    /// Maximum document size in characters
    pub max_size: usize,
}

impl Default for DiagramLimits {
    fn default() -> Self {
        Self {
            max_nodes: 500,
            max_edges: 1000,
            max_subgraphs: 200,
            max_size: 50_000,
        }
    }
}

/// Line counts gathered from a diagram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiagramCounts {
    pub nodes: usize,
    pub edges: usize,
    pub subgraphs_opened: usize,
    pub subgraphs_closed: usize,
    pub size: usize,
}

impl DiagramCounts {
    pub fn measure(text: &str) -> Self {
        let mut counts = DiagramCounts {
            size: text.chars().count(),
            ..Default::default()
        };
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with("subgraph ") || trimmed == "subgraph" {
                counts.subgraphs_opened += 1;
            } else if trimmed == "end" {
                counts.subgraphs_closed += 1;
            } else if EDGE_LINE.is_match(line) {
                counts.edges += 1;
            } else if NODE_LINE.is_match(line) {
                counts.nodes += 1;
            }
        }
        counts
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiagramValidator {
    limits: DiagramLimits,
}

impl DiagramValidator {
    pub fn new(limits: DiagramLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &DiagramLimits {
        &self.limits
    }

    /// Validate `text`, returning its counts on success.
    pub fn validate(&self, text: &str) -> Result<DiagramCounts> {
        let lines: Vec<&str> = text.lines().collect();

        let opening = lines
            .iter()
            .take(HEADER_WINDOW)
            .position(|l| l.trim_start().starts_with("```mermaid"))
            .ok_or(CodeflowError::MissingOpeningFence)?;

        if !lines[opening + 1..].iter().any(|l| l.trim() == "```") {
            return Err(CodeflowError::MissingClosingFence);
        }

        let counts = DiagramCounts::measure(text);
        if counts.subgraphs_opened != counts.subgraphs_closed {
            return Err(CodeflowError::UnbalancedSubgraphs {
                opened: counts.subgraphs_opened,
                closed: counts.subgraphs_closed,
            });
        }

        check_limit("node", counts.nodes, self.limits.max_nodes)?;
        check_limit("edge", counts.edges, self.limits.max_edges)?;
        check_limit("subgraph", counts.subgraphs_opened, self.limits.max_subgraphs)?;
        check_limit("size", counts.size, self.limits.max_size)?;

        let declared = lines
            .iter()
            .skip(opening + 1)
            .take(HEADER_WINDOW)
            .filter_map(|l| l.split_whitespace().next())
            .any(|word| DIAGRAM_TYPES.contains(&word));
        if !declared {
            return Err(CodeflowError::MissingDiagramType);
        }

        Ok(counts)
    }
}

fn check_limit(kind: &'static str, count: usize, limit: usize) -> Result<()> {
    if count > limit {
        return Err(CodeflowError::LimitExceeded { kind, count, limit });
    }
    Ok(())
}
