//! Theme definitions for codeflow diagrams
//!
//! A [`ColorScheme`] is a named set of fill/stroke pairs; the
//! [`ThemeManager`] hands them out in rotation so the same input always
//! produces the same styles.

use crate::domain::subgraph::SubgraphKind;
use indexmap::IndexMap;

/// Fill and stroke colors for one style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    pub fill: &'static str,
    pub stroke: &'static str,
}

impl Swatch {
    const fn new(fill: &'static str, stroke: &'static str) -> Self {
        Self { fill, stroke }
    }
}

const DEFAULT_NODES: &[Swatch] = &[
    Swatch::new("#89b4fa", "#1e66f5"),
    Swatch::new("#f9e2af", "#df8e1d"),
    Swatch::new("#cba6f7", "#8839ef"),
    Swatch::new("#f38ba8", "#d20f39"),
    Swatch::new("#94e2d5", "#179299"),
    Swatch::new("#fab387", "#fe640b"),
];

const DEFAULT_DIRECTORIES: &[Swatch] = &[
    Swatch::new("#eff1f5", "#9ca0b0"),
    Swatch::new("#e6e9ef", "#8c8fa1"),
    Swatch::new("#dce0e8", "#7c7f93"),
];

const DARK_NODES: &[Swatch] = &[
    Swatch::new("#1e66f5", "#89b4fa"),
    Swatch::new("#8839ef", "#cba6f7"),
    Swatch::new("#179299", "#94e2d5"),
    Swatch::new("#d20f39", "#f38ba8"),
];

const DARK_DIRECTORIES: &[Swatch] = &[
    Swatch::new("#1e1e2e", "#585b70"),
    Swatch::new("#181825", "#45475a"),
];

const PASTEL_NODES: &[Swatch] = &[
    Swatch::new("#cde7f7", "#6baed6"),
    Swatch::new("#fde2e4", "#e07a8b"),
    Swatch::new("#fff1c1", "#d9b44a"),
    Swatch::new("#e2d9f3", "#9a82c9"),
];

const PASTEL_DIRECTORIES: &[Swatch] = &[Swatch::new("#fafafa", "#bdbdbd")];

const MONO_NODES: &[Swatch] = &[Swatch::new("#ffffff", "#333333")];

const MONO_DIRECTORIES: &[Swatch] = &[Swatch::new("#f7f7f7", "#666666")];

/// Complete color scheme for a diagram
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub name: &'static str,
    /// Entry point nodes
    pub entry: Swatch,
    /// Rotated through for regular nodes, one color per file
    pub nodes: &'static [Swatch],
    /// Rotated through for directory subgraphs by nesting level
    pub directories: &'static [Swatch],
    pub file: Swatch,
    pub class: Swatch,
    pub text: &'static str,
}

impl ColorScheme {
    pub const NAMES: &'static [&'static str] = &["default", "dark", "pastel", "mono"];

    /// Look up a scheme by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "default" => Some(Self::default_scheme()),
            "dark" => Some(Self::dark()),
            "pastel" => Some(Self::pastel()),
            "mono" => Some(Self::mono()),
            _ => None,
        }
    }

    /// Catppuccin-flavoured light scheme (default)
    pub fn default_scheme() -> Self {
        Self {
            name: "default",
            entry: Swatch::new("#a6e3a1", "#40a02b"),
            nodes: DEFAULT_NODES,
            directories: DEFAULT_DIRECTORIES,
            file: Swatch::new("#f5f5fa", "#6c7086"),
            class: Swatch::new("#fdfdfd", "#acb0be"),
            text: "#4c4f69",
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "dark",
            entry: Swatch::new("#40a02b", "#a6e3a1"),
            nodes: DARK_NODES,
            directories: DARK_DIRECTORIES,
            file: Swatch::new("#313244", "#6c7086"),
            class: Swatch::new("#45475a", "#7f849c"),
            text: "#cdd6f4",
        }
    }

    pub fn pastel() -> Self {
        Self {
            name: "pastel",
            entry: Swatch::new("#c1f0c1", "#5cb85c"),
            nodes: PASTEL_NODES,
            directories: PASTEL_DIRECTORIES,
            file: Swatch::new("#ffffff", "#cfcfcf"),
            class: Swatch::new("#ffffff", "#e0e0e0"),
            text: "#333333",
        }
    }

    pub fn mono() -> Self {
        Self {
            name: "mono",
            entry: Swatch::new("#d0d0d0", "#000000"),
            nodes: MONO_NODES,
            directories: MONO_DIRECTORIES,
            file: Swatch::new("#ffffff", "#888888"),
            class: Swatch::new("#ffffff", "#aaaaaa"),
            text: "#000000",
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_scheme()
    }
}

/// Deterministic style assignment for one generation run.
pub struct ThemeManager {
    scheme: ColorScheme,
    /// group key -> rotation slot, assigned on first sight
    slots: IndexMap<String, usize>,
}

impl ThemeManager {
    pub fn new(scheme: ColorScheme) -> Self {
        Self {
            scheme,
            slots: IndexMap::new(),
        }
    }

    pub fn scheme(&self) -> &ColorScheme {
        &self.scheme
    }

    /// Style line for a node. Nodes sharing `group` (usually the file path)
    /// share a color.
    pub fn node_style(&mut self, node_id: &str, group: &str, is_entry_point: bool) -> String {
        let swatch = if is_entry_point {
            self.scheme.entry
        } else {
            let next = self.slots.len();
            let slot = *self.slots.entry(group.to_string()).or_insert(next);
            self.scheme.nodes[slot % self.scheme.nodes.len()]
        };
        let width = if is_entry_point { 3 } else { 1 };
        format!(
            "style {} fill:{},stroke:{},stroke-width:{}px,color:{}",
            node_id, swatch.fill, swatch.stroke, width, self.scheme.text
        )
    }

    /// Style line for a subgraph at nesting `level`.
    pub fn subgraph_style(&self, subgraph_id: &str, kind: SubgraphKind, level: usize) -> String {
        let swatch = match kind {
            SubgraphKind::Directory => {
                self.scheme.directories[level % self.scheme.directories.len()]
            }
            SubgraphKind::File => self.scheme.file,
            SubgraphKind::Class => self.scheme.class,
        };
        let dash = if kind == SubgraphKind::Class {
            ",stroke-dasharray:4 2"
        } else {
            ""
        };
        format!(
            "style {} fill:{},stroke:{}{}",
            subgraph_id, swatch.fill, swatch.stroke, dash
        )
    }
}
