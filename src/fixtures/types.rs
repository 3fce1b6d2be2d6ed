//! Fixture corpus types.

use serde::{Deserialize, Serialize};

/// A single source sample checked for round-trip stability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    /// Source text as written in the corpus
    pub code: String,
    /// Free-form remark shown in listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Excluded from runs when set
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skip: bool,
}

impl Fixture {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            note: None,
            skip: false,
        }
    }

    /// The text compared against converter output.
    pub fn expected(&self) -> &str {
        self.code.trim()
    }
}

impl From<&str> for Fixture {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// A corpus entry on disk: either a bare string or a full object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum FixtureEntry {
    Code(String),
    Full(Fixture),
}

impl FixtureEntry {
    pub(crate) fn into_fixture(self) -> Fixture {
        match self {
            Self::Code(code) => Fixture::new(code),
            Self::Full(fixture) => fixture,
        }
    }
}

/// Top-level corpus document: a bare list or `{ "fixtures": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CorpusFile {
    List(Vec<FixtureEntry>),
    Wrapped { fixtures: Vec<FixtureEntry> },
}

impl CorpusFile {
    pub(crate) fn into_entries(self) -> Vec<FixtureEntry> {
        match self {
            Self::List(entries) | Self::Wrapped { fixtures: entries } => entries,
        }
    }
}

/// A fixture paired with its position in the full corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedFixture<'a> {
    /// Zero-based position in the corpus, skipped entries included
    pub index: usize,
    pub fixture: &'a Fixture,
}
