// Domain model and diagram-building components for codeflow.

pub mod callgraph;
pub mod entry_point;
pub mod label;
pub mod metadata;
pub mod node_manager;
pub mod subgraph;
pub mod symbol;
pub mod theme;
pub mod tree;
pub mod validator;
