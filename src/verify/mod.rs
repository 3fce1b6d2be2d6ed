//! Round-trip verification.
//!
//! For each fixture the converter is driven along two paths and the text it
//! ends up with must match the fixture once boundary whitespace is trimmed:
//!
//! 1. **direct**: set the text, re-synchronize blocks from it, read it back
//! 2. **change-notification**: signal a block change, re-synchronize blocks
//!    from the current text, read it back
//!
//! The run halts at the first fixture that fails either path.

mod report;

use thiserror::Error;

use crate::converter::{BidirectionalConverter, ConverterError};
use crate::fixtures::FixtureSet;
use crate::perf;

pub use report::{CheckPath, Failure, FailureKind, FixtureOutcome, VerificationReport};

/// Errors that prevent a run from starting.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("fixture corpus is empty")]
    EmptyCorpus,
    #[error("verification cannot start: {0}")]
    ConverterUnavailable(#[source] ConverterError),
}

/// Trimmed equality used for every comparison.
pub fn texts_match(expected: &str, actual: &str) -> bool {
    expected.trim() == actual.trim()
}

/// Drives one converter through a corpus.
#[derive(Debug)]
pub struct Verifier<'c, C: BidirectionalConverter + ?Sized> {
    converter: &'c mut C,
}

impl<'c, C: BidirectionalConverter + ?Sized> Verifier<'c, C> {
    /// Take exclusive use of `converter` for the run.
    pub const fn new(converter: &'c mut C) -> Self {
        Self { converter }
    }

    /// Check `(index, code)` cases in order, stopping at the first failure.
    ///
    /// `index` is only used for reporting; callers running a filtered corpus
    /// pass the unfiltered corpus positions.
    ///
    /// # Errors
    /// Returns [`VerifyError::EmptyCorpus`] for an empty case list and
    /// [`VerifyError::ConverterUnavailable`] if the converter is not ready.
    pub fn run<'f>(
        &mut self,
        cases: impl IntoIterator<Item = (usize, &'f str)>,
    ) -> Result<VerificationReport, VerifyError> {
        let cases: Vec<(usize, &str)> = cases.into_iter().collect();
        if cases.is_empty() {
            return Err(VerifyError::EmptyCorpus);
        }
        self.converter
            .ready()
            .map_err(VerifyError::ConverterUnavailable)?;

        let _scope = perf::scope("verify.run");
        let mut report = VerificationReport {
            origin: None,
            total: cases.len(),
            outcomes: Vec::with_capacity(cases.len()),
            failure: None,
        };

        for (index, code) in cases {
            match self.check(index, code) {
                Ok(()) => report.outcomes.push(FixtureOutcome { index, passed: true }),
                Err(failure) => {
                    tracing::error!(index, path = %failure.path, "{}", failure.diagnostic());
                    report.outcomes.push(FixtureOutcome { index, passed: false });
                    report.failure = Some(failure);
                    break;
                }
            }
        }

        perf::log_event(
            "verify.done",
            format!(
                "evaluated={} total={} failed_at={:?}",
                report.evaluated(),
                report.total,
                report.failure.as_ref().map(|f| f.index)
            ),
        );
        Ok(report)
    }

    fn check(&mut self, index: usize, code: &str) -> Result<(), Failure> {
        let expected = code.trim();
        for path in [CheckPath::Direct, CheckPath::ChangeNotification] {
            let actual = self.drive(path, code).map_err(|err| Failure {
                index,
                path,
                kind: FailureKind::ConverterFault {
                    expected: expected.to_string(),
                    message: err.to_string(),
                },
            })?;
            let actual = actual.trim();
            tracing::debug!(index, %path, expected, actual, "round-trip check");
            perf::log_event("verify.check", format!("index={index} path={path}"));
            if !texts_match(expected, actual) {
                return Err(Failure {
                    index,
                    path,
                    kind: FailureKind::Mismatch {
                        expected: expected.to_string(),
                        actual: actual.to_string(),
                    },
                });
            }
        }
        Ok(())
    }

    fn drive(&mut self, path: CheckPath, code: &str) -> Result<String, ConverterError> {
        match path {
            CheckPath::Direct => self.converter.set_text(code, true)?,
            CheckPath::ChangeNotification => self.converter.notify_blocks_changed()?,
        }
        let current = self.converter.text()?;
        self.converter.sync_blocks_from_text(&current, true)?;
        self.converter.text()
    }
}

/// Verify an ordered list of fixture strings against `converter`.
///
/// Failure indices are positions in `fixtures`.
///
/// # Errors
/// See [`Verifier::run`].
pub fn run_verification<S, C>(
    fixtures: &[S],
    converter: &mut C,
) -> Result<VerificationReport, VerifyError>
where
    S: AsRef<str>,
    C: BidirectionalConverter + ?Sized,
{
    Verifier::new(converter).run(fixtures.iter().map(S::as_ref).enumerate())
}

/// Verify the active fixtures of a loaded corpus.
///
/// Skipped fixtures are never handed to the converter; failure indices are
/// positions in the full corpus.
///
/// # Errors
/// See [`Verifier::run`]; a corpus whose fixtures are all skipped is empty.
pub fn verify_set<C>(set: &FixtureSet, converter: &mut C) -> Result<VerificationReport, VerifyError>
where
    C: BidirectionalConverter + ?Sized,
{
    for skipped in set.skipped() {
        tracing::info!(index = skipped.index, note = ?skipped.fixture.note, "fixture skipped");
    }
    let mut report = Verifier::new(converter)
        .run(set.active().map(|f| (f.index, f.fixture.code.as_str())))?;
    report.origin = Some(set.origin().to_string());
    Ok(report)
}
