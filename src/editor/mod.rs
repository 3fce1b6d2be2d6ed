//! Text side of the reference converter.
//!
//! Provides a rope-backed text buffer with revision tracking.

mod buffer;

pub use buffer::TextBuffer;
