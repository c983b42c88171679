// Directory / file / class grouping tree for collected functions.

use crate::domain::symbol::Symbol;
use indexmap::IndexMap;
use serde::Serialize;
use std::path::{Component, Path};

/// class name -> functions in collection order
pub type ClassMap = IndexMap<String, Vec<String>>;

/// One directory level: `files` (file stem -> classes) and `subdirs`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DirectoryTree {
    pub files: IndexMap<String, ClassMap>,
    pub subdirs: IndexMap<String, DirectoryTree>,
}

impl DirectoryTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group symbols by the directories of their file paths. `root` is
    /// stripped from paths that start with it.
    pub fn from_symbols<'a, I>(symbols: I, root: Option<&Path>) -> Self
    where
        I: IntoIterator<Item = &'a Symbol>,
    {
        let mut tree = DirectoryTree::new();
        for symbol in symbols {
            tree.insert(symbol, root);
        }
        tree
    }

    pub fn insert(&mut self, symbol: &Symbol, root: Option<&Path>) {
        let path = Path::new(&symbol.path);
        let path = root
            .and_then(|r| path.strip_prefix(r).ok())
            .unwrap_or(path);

        let dirs: Vec<String> = path
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .filter_map(|c| match c {
                        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let mut node = self;
        for dir in dirs {
            node = node.subdirs.entry(dir).or_default();
        }

        node.files
            .entry(symbol.file_stem().to_string())
            .or_default()
            .entry(symbol.grouping_class())
            .or_default()
            .push(symbol.qualified_name.clone());
    }

    /// True if this level or any descendant holds at least one function.
    pub fn has_functions(&self) -> bool {
        self.files
            .values()
            .any(|classes| classes.values().any(|fns| !fns.is_empty()))
            || self.subdirs.values().any(DirectoryTree::has_functions)
    }

    pub fn function_count(&self) -> usize {
        let own: usize = self
            .files
            .values()
            .flat_map(|classes| classes.values())
            .map(Vec::len)
            .sum();
        own + self.subdirs.values().map(DirectoryTree::function_count).sum::<usize>()
    }
}
