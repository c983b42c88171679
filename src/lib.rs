// Main library entry point for codeflow.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

pub use error::{CodeflowError, Result};
