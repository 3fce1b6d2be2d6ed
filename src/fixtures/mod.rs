//! Fixture corpus loading.
//!
//! A corpus is data, not code: it lives in `.json` or `.json5` files and is
//! parsed into an ordered [`FixtureSet`]. The default Python corpus ships
//! with the crate and goes through the same loader.

mod types;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use types::CorpusFile;
pub use types::{Fixture, IndexedFixture};

/// Name reported for the corpus compiled into the binary.
pub const BUNDLED_NAME: &str = "bundled:python_roundtrip";

const BUNDLED_CORPUS: &str = include_str!("../../fixtures/python_roundtrip.json5");

/// Errors raised while loading a fixture corpus.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixtures {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse fixtures {origin}: {message}")]
    Parse { origin: String, message: String },
    #[error("fixture corpus {origin} is empty")]
    Empty { origin: String },
}

/// Source syntax of a corpus document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorpusFormat {
    Json,
    Json5,
}

impl CorpusFormat {
    /// Pick the format from a file extension; anything but `.json` is read
    /// as JSON5, which accepts plain JSON too.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Json5,
        }
    }
}

/// An ordered, immutable fixture corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureSet {
    origin: String,
    fixtures: Vec<Fixture>,
}

impl FixtureSet {
    /// Build a corpus from in-memory fixtures.
    pub fn new(origin: impl Into<String>, fixtures: Vec<Fixture>) -> Self {
        Self {
            origin: origin.into(),
            fixtures,
        }
    }

    /// Load a corpus from a file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, does not parse, or
    /// holds no fixtures.
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let content = fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(
            &path.display().to_string(),
            &content,
            CorpusFormat::for_path(path),
        )
    }

    /// The Python corpus compiled into the crate.
    ///
    /// # Errors
    /// Returns an error only if the embedded data is malformed.
    pub fn bundled() -> Result<Self, FixtureError> {
        Self::parse(BUNDLED_NAME, BUNDLED_CORPUS, CorpusFormat::Json5)
    }

    /// Parse a corpus document.
    ///
    /// # Errors
    /// Returns an error if the content does not parse or holds no fixtures.
    pub fn parse(origin: &str, content: &str, format: CorpusFormat) -> Result<Self, FixtureError> {
        let file: CorpusFile = match format {
            CorpusFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            CorpusFormat::Json5 => json5::from_str(content).map_err(|e| e.to_string()),
        }
        .map_err(|message| FixtureError::Parse {
            origin: origin.to_string(),
            message,
        })?;

        let fixtures: Vec<Fixture> = file
            .into_entries()
            .into_iter()
            .map(types::FixtureEntry::into_fixture)
            .collect();
        if fixtures.is_empty() {
            return Err(FixtureError::Empty {
                origin: origin.to_string(),
            });
        }
        Ok(Self::new(origin, fixtures))
    }

    /// Where the corpus came from (a path or [`BUNDLED_NAME`]).
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// All fixtures, skipped ones included.
    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    /// Fixtures that take part in a run, with their corpus positions.
    pub fn active(&self) -> impl Iterator<Item = IndexedFixture<'_>> {
        self.fixtures
            .iter()
            .enumerate()
            .filter(|(_, fixture)| !fixture.skip)
            .map(|(index, fixture)| IndexedFixture { index, fixture })
    }

    /// Fixtures excluded from runs, with their corpus positions.
    pub fn skipped(&self) -> impl Iterator<Item = IndexedFixture<'_>> {
        self.fixtures
            .iter()
            .enumerate()
            .filter(|(_, fixture)| fixture.skip)
            .map(|(index, fixture)| IndexedFixture { index, fixture })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_bundled_corpus_loads() {
        let set = FixtureSet::bundled().unwrap();
        assert_eq!(set.origin(), BUNDLED_NAME);
        assert_eq!(set.len(), 84);
        assert_eq!(set.fixtures()[0].code, "for ___ in ___:\n    pass");
        assert_eq!(set.fixtures()[83].code, "'''\ntest'''");
    }

    #[test]
    fn test_bundled_corpus_keeps_escapes() {
        let set = FixtureSet::bundled().unwrap();
        assert!(set.fixtures().iter().any(|f| f.code == "'\\n'"));
        assert!(set.fixtures().iter().any(|f| f.code == "\"Hello 'world.'\""));
    }

    #[test]
    fn test_parse_accepts_bare_strings_and_objects() {
        let content = r#"["0", { "code": "1 + 1", "note": "sum" }, { "code": "x", "skip": true }]"#;
        let set = FixtureSet::parse("inline", content, CorpusFormat::Json).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.fixtures()[1].note.as_deref(), Some("sum"));
        assert!(set.fixtures()[2].skip);
    }

    #[test]
    fn test_parse_accepts_wrapped_document() {
        let content = "{ fixtures: ['0', '1'] } // trailing comment";
        let set = FixtureSet::parse("inline", content, CorpusFormat::Json5).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_active_skips_but_keeps_indices() {
        let mut skipped = Fixture::new("broken");
        skipped.skip = true;
        let set = FixtureSet::new("t", vec![Fixture::new("0"), skipped, Fixture::new("1")]);
        let active: Vec<usize> = set.active().map(|f| f.index).collect();
        assert_eq!(active, vec![0, 2]);
        let skipped: Vec<usize> = set.skipped().map(|f| f.index).collect();
        assert_eq!(skipped, vec![1]);
    }

    #[test]
    fn test_empty_corpus_is_rejected() {
        let err = FixtureSet::parse("inline", "[]", CorpusFormat::Json).unwrap_err();
        assert!(matches!(err, FixtureError::Empty { .. }));
    }

    #[test]
    fn test_malformed_corpus_names_origin() {
        let err = FixtureSet::parse("broken.json", "[1, 2", CorpusFormat::Json).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_load_reads_by_extension() {
        let dir = tempdir().unwrap();
        let json = dir.path().join("corpus.json");
        std::fs::write(&json, r#"["a = 0"]"#).unwrap();
        let json5 = dir.path().join("corpus.json5");
        std::fs::write(&json5, "// comment\n['a = 0',]").unwrap();

        assert_eq!(FixtureSet::load(&json).unwrap().len(), 1);
        assert_eq!(FixtureSet::load(&json5).unwrap().len(), 1);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = FixtureSet::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, FixtureError::Io { .. }));
    }

    #[test]
    fn test_expected_trims_boundary_whitespace() {
        assert_eq!(Fixture::new("\n a = 0\n\n").expected(), "a = 0");
    }
}
