//! Node label formatting
//!
//! Turns a symbol into the short text shown inside a diagram node. The
//! amount of detail is chosen by [`LabelLevel`]; denser diagrams get terser
//! labels via [`LabelFormatter::get_recommended_format`].

use crate::domain::symbol::{is_synthetic_class, short_name, Symbol};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Line separator inside a node label.
const LINE_BREAK: &str = "<br/>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelLevel {
    /// Function name only
    Minimal,
    /// Class and function name
    Simple,
    /// Adds the file name
    Medium,
    /// Adds the start line
    Detailed,
    /// Adds the full line range
    Verbose,
}

impl LabelLevel {
    /// Parse a level name; unknown names fall back to `Minimal`.
    pub fn parse(s: &str) -> LabelLevel {
        match s.trim().to_lowercase().as_str() {
            "simple" => LabelLevel::Simple,
            "medium" => LabelLevel::Medium,
            "detailed" => LabelLevel::Detailed,
            "verbose" => LabelLevel::Verbose,
            _ => LabelLevel::Minimal,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LabelLevel::Minimal => "minimal",
            LabelLevel::Simple => "simple",
            LabelLevel::Medium => "medium",
            LabelLevel::Detailed => "detailed",
            LabelLevel::Verbose => "verbose",
        }
    }
}

impl fmt::Display for LabelLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct LabelFormatter;

impl LabelFormatter {
    /// Format the label for `qualified_name`. All source-derived parts are
    /// escaped; a missing symbol yields just the escaped short name.
    pub fn format(qualified_name: &str, symbol: Option<&Symbol>, level: LabelLevel) -> String {
        let name = escape_mermaid_text(
            symbol
                .map(Symbol::name)
                .unwrap_or_else(|| short_name(qualified_name)),
        );
        let Some(symbol) = symbol else {
            return name;
        };

        if level == LabelLevel::Minimal {
            return name;
        }

        let mut label = match Self::visible_class(symbol) {
            Some(class) => format!("{}.{}", escape_mermaid_text(class), name),
            None => name,
        };

        if level >= LabelLevel::Medium && !symbol.file_name().is_empty() {
            label.push_str(LINE_BREAK);
            label.push_str(&escape_mermaid_text(symbol.file_name()));
        }

        if level >= LabelLevel::Detailed && symbol.line > 0 {
            let token = if level == LabelLevel::Verbose && symbol.end > symbol.line {
                format!("L{}-{}", symbol.line, symbol.end)
            } else {
                format!("L{}", symbol.line)
            };
            label.push_str(if symbol.file_name().is_empty() { LINE_BREAK } else { ":" });
            label.push_str(&token);
        }

        label
    }

    /// Same as [`format`](Self::format) with a level given by name.
    pub fn format_named(qualified_name: &str, symbol: Option<&Symbol>, level: &str) -> String {
        Self::format(qualified_name, symbol, LabelLevel::parse(level))
    }

    /// Owning class, hidden for synthetic module classes.
    fn visible_class(symbol: &Symbol) -> Option<&str> {
        symbol
            .class
            .as_deref()
            .filter(|class| !class.is_empty() && !is_synthetic_class(class))
    }

    /// Pick a level from how full the diagram is relative to its node cap.
    pub fn get_recommended_format(node_count: usize, max_nodes: usize) -> LabelLevel {
        if max_nodes == 0 {
            return LabelLevel::Minimal;
        }
        let density = node_count as f64 / max_nodes as f64;
        if density > 0.8 {
            LabelLevel::Minimal
        } else if density > 0.5 {
            LabelLevel::Simple
        } else if density > 0.3 {
            LabelLevel::Medium
        } else {
            LabelLevel::Detailed
        }
    }
}

/// Replace characters that break Mermaid node text with entity codes.
pub fn escape_mermaid_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("#quot;"),
            '[' => out.push_str("#91;"),
            ']' => out.push_str("#93;"),
            '{' => out.push_str("#123;"),
            '}' => out.push_str("#125;"),
            '<' => out.push_str("#lt;"),
            '>' => out.push_str("#gt;"),
            '&' => out.push_str("#amp;"),
            _ => out.push(c),
        }
    }
    out
}
