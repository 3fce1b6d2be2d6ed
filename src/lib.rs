// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. blocks::BlockKind)
    clippy::module_name_repetitions
)]

//! # Mirrorcheck
//!
//! A round-trip verifier for editors that keep source code in two views at
//! once: a text view and a block view.
//!
//! Mirrorcheck drives a converter through a corpus of source snippets and
//! checks that text -> blocks -> text reproduces each snippet:
//! - along the direct path (set text, re-sync blocks, read text)
//! - along the change-notification path (signal a block change, re-sync,
//!   read text)
//!
//! The run stops at the first snippet that fails either path.
//!
//! ## Modules
//!
//! - [`converter`]: The capability any converter must provide
//! - [`verify`]: The verifier and its report
//! - [`fixtures`]: Corpus loading
//! - [`mirror`]: Reference converter
//! - [`blocks`]: Block tree import and export
//! - [`editor`]: Text buffer
//! - [`config`]: Saved CLI defaults
//! - [`perf`]: Timing and debug event log
//! - [`watcher`]: Corpus file watching

pub mod blocks;
pub mod config;
pub mod converter;
pub mod editor;
pub mod fixtures;
pub mod mirror;
pub mod perf;
pub mod verify;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::converter::{BidirectionalConverter, ConverterError};
    pub use crate::fixtures::{Fixture, FixtureSet};
    pub use crate::mirror::BlockMirror;
    pub use crate::verify::{VerificationReport, Verifier, run_verification, verify_set};
}
