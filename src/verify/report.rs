//! Verification results.

use std::fmt;

use serde::Serialize;

/// The two routes by which a converter can reach a stable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckPath {
    /// Text set, blocks re-synchronized, text read back
    Direct,
    /// Block change signalled, blocks re-synchronized, text read back
    ChangeNotification,
}

impl CheckPath {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::ChangeNotification => "change-notification",
        }
    }
}

impl fmt::Display for CheckPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a fixture failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    /// Converter output differs from the fixture after trimming
    Mismatch { expected: String, actual: String },
    /// The converter returned an error while being driven
    ConverterFault { expected: String, message: String },
}

/// The fixture a run halted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Corpus position of the failing fixture
    pub index: usize,
    pub path: CheckPath,
    #[serde(flatten)]
    pub kind: FailureKind,
}

impl Failure {
    /// The trimmed fixture text the converter had to reproduce.
    pub fn expected(&self) -> &str {
        match &self.kind {
            FailureKind::Mismatch { expected, .. } | FailureKind::ConverterFault { expected, .. } => {
                expected
            }
        }
    }

    /// The trimmed converter output, if the converter produced any.
    pub fn actual(&self) -> Option<&str> {
        match &self.kind {
            FailureKind::Mismatch { actual, .. } => Some(actual),
            FailureKind::ConverterFault { .. } => None,
        }
    }

    /// Multi-line assertion message with expected and actual text.
    pub fn diagnostic(&self) -> String {
        match &self.kind {
            FailureKind::Mismatch { expected, actual } => format!(
                "fixture #{} failed on the {} path\nexpected:\n{expected}\n\nactual:\n{actual}\n",
                self.index, self.path
            ),
            FailureKind::ConverterFault { expected, message } => format!(
                "fixture #{} failed on the {} path\nexpected:\n{expected}\n\nconverter error: {message}\n",
                self.index, self.path
            ),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.diagnostic())
    }
}

/// Per-fixture result for every fixture the run reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FixtureOutcome {
    pub index: usize,
    pub passed: bool,
}

/// Result of one verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    /// Corpus name, when run from a loaded set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Fixtures handed to the run
    pub total: usize,
    /// Fixtures evaluated, in order; stops at the failure
    pub outcomes: Vec<FixtureOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
}

impl VerificationReport {
    /// True when every fixture passed both paths.
    pub const fn passed(&self) -> bool {
        self.failure.is_none()
    }

    pub const fn failure(&self) -> Option<&Failure> {
        self.failure.as_ref()
    }

    pub fn evaluated(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    /// Whether the fixture at corpus position `index` was run.
    pub fn was_evaluated(&self, index: usize) -> bool {
        self.outcomes.iter().any(|o| o.index == index)
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = self.origin.as_deref().unwrap_or("fixtures");
        match &self.failure {
            None => write!(f, "{origin}: {}/{} fixtures passed", self.passed_count(), self.total),
            Some(failure) => {
                writeln!(
                    f,
                    "{origin}: {}/{} fixtures passed before failure",
                    self.passed_count(),
                    self.total
                )?;
                write!(f, "{failure}")
            }
        }
    }
}
