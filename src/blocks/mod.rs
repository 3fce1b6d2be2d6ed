//! Block representation of Python-like source.
//!
//! This module handles:
//! - Splitting source text into logical lines
//! - Nesting them into a block tree by indentation
//! - Rendering the tree back to canonical text

mod parser;
mod render;
mod types;

pub use parser::{ParseError, parse};
pub use render::render;
pub use types::{Block, BlockKind, Workspace};
