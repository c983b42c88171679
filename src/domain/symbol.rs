// Symbol table structures for codeflow.
// One record per function, keyed by qualified name, as produced upstream.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix of the placeholder class used for free functions.
pub const MODULE_CLASS_PREFIX: &str = "module_";

/// A function symbol collected by the upstream scanner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Unique key; filled from the symbol table key on load.
    #[serde(default)]
    pub qualified_name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Owning class, or None for free functions.
    #[serde(default, alias = "owning_class")]
    pub class: Option<String>,
    #[serde(default, alias = "file_path")]
    pub path: String,
    #[serde(default, alias = "line_start")]
    pub line: u32,
    #[serde(default, alias = "line_end")]
    pub end: u32,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub is_entry_point: bool,
}

impl Symbol {
    pub fn new(qualified_name: &str, path: &str, line: u32, end: u32) -> Self {
        Self {
            qualified_name: qualified_name.to_string(),
            path: path.to_string(),
            line,
            end,
            ..Default::default()
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = Some(class.to_string());
        self
    }

    pub fn entry(mut self) -> Self {
        self.is_entry_point = true;
        self
    }

    /// Last dotted (or `::`) segment of the qualified name.
    pub fn short_name(&self) -> &str {
        short_name(&self.qualified_name)
    }

    /// Display name, defaulting to the short name.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or_else(|| self.short_name())
    }

    /// File name without directory or extension.
    pub fn file_stem(&self) -> &str {
        Path::new(&self.path)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("unknown")
    }

    /// File base name including extension.
    pub fn file_name(&self) -> &str {
        Path::new(&self.path)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
    }

    /// Owning class, or the synthetic `module_<filestem>` class for free functions.
    pub fn grouping_class(&self) -> String {
        match self.class.as_deref() {
            Some(class) if !class.is_empty() => class.to_string(),
            _ => format!("{}{}", MODULE_CLASS_PREFIX, self.file_stem()),
        }
    }
}

/// Last segment of a dotted or `::`-separated name.
pub fn short_name(qualified_name: &str) -> &str {
    qualified_name
        .rsplit(['.', ':'])
        .find(|s| !s.is_empty())
        .unwrap_or(qualified_name)
}

pub fn is_synthetic_class(class: &str) -> bool {
    class.starts_with(MODULE_CLASS_PREFIX)
}

/// Ordered symbol table keyed by qualified name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "IndexMap<String, Symbol>", into = "IndexMap<String, Symbol>")]
pub struct SymbolTable {
    symbols: IndexMap<String, Symbol>,
}

impl From<IndexMap<String, Symbol>> for SymbolTable {
    fn from(mut symbols: IndexMap<String, Symbol>) -> Self {
        for (key, symbol) in symbols.iter_mut() {
            symbol.qualified_name = key.clone();
        }
        Self { symbols }
    }
}

impl From<SymbolTable> for IndexMap<String, Symbol> {
    fn from(table: SymbolTable) -> Self {
        table.symbols
    }
}

impl FromIterator<Symbol> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        let mut table = SymbolTable::default();
        for symbol in iter {
            table.insert(symbol);
        }
        table
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: Symbol) {
        self.symbols.insert(symbol.qualified_name.clone(), symbol);
    }

    pub fn get(&self, qualified_name: &str) -> Option<&Symbol> {
        self.symbols.get(qualified_name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }
}
