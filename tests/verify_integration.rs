use mirrorcheck::converter::{BidirectionalConverter, ConverterError};
use mirrorcheck::mirror::BlockMirror;
use mirrorcheck::verify::{CheckPath, FailureKind, VerifyError, run_verification};

/// Stores text verbatim and lets each test decide how blocks export.
struct Stub {
    text: String,
    blocks: String,
    /// Every fixture handed to `set_text`, in order
    seen: Vec<String>,
    export: fn(&str) -> String,
    corrupt: Option<&'static str>,
}

impl Stub {
    fn new(export: fn(&str) -> String) -> Self {
        Self {
            text: String::new(),
            blocks: String::new(),
            seen: Vec::new(),
            export,
            corrupt: None,
        }
    }

    fn identity() -> Self {
        Self::new(|blocks| blocks.to_string())
    }
}

impl BidirectionalConverter for Stub {
    fn set_text(&mut self, code: &str, _suppress_events: bool) -> Result<(), ConverterError> {
        self.seen.push(code.to_string());
        self.text = if self.corrupt == Some(code) {
            format!("{code}_CORRUPTED")
        } else {
            code.to_string()
        };
        Ok(())
    }

    fn text(&self) -> Result<String, ConverterError> {
        Ok(self.text.clone())
    }

    fn sync_blocks_from_text(
        &mut self,
        code: &str,
        _suppress_events: bool,
    ) -> Result<(), ConverterError> {
        self.blocks = code.to_string();
        Ok(())
    }

    fn notify_blocks_changed(&mut self) -> Result<(), ConverterError> {
        self.text = (self.export)(&self.blocks);
        Ok(())
    }
}

#[test]
fn test_single_literal_passes_both_paths() {
    let mut stub = Stub::identity();
    let report = run_verification(&["0"], &mut stub).unwrap();
    assert!(report.passed());
    assert_eq!(report.evaluated(), 1);
    assert_eq!(report.passed_count(), 1);
}

#[test]
fn test_loop_structure_roundtrips_through_mirror() {
    let mut mirror = BlockMirror::new();
    let report = run_verification(&["for ___ in ___:\n    pass"], &mut mirror).unwrap();
    assert!(report.passed(), "{report}");
}

#[test]
fn test_fail_fast_at_corrupted_fixture() {
    let mut stub = Stub::identity();
    stub.corrupt = Some("BAD_FIXTURE_THAT_FAILS");
    let fixtures = ["0", "BAD_FIXTURE_THAT_FAILS", "1 + 1"];

    let report = run_verification(&fixtures, &mut stub).unwrap();

    let failure = report.failure().expect("corrupted fixture must fail");
    assert_eq!(failure.index, 1);
    assert_eq!(failure.path, CheckPath::Direct);
    assert_eq!(failure.expected(), "BAD_FIXTURE_THAT_FAILS");
    assert_eq!(failure.actual(), Some("BAD_FIXTURE_THAT_FAILS_CORRUPTED"));
    assert!(!report.was_evaluated(2));
    assert_eq!(stub.seen, vec!["0", "BAD_FIXTURE_THAT_FAILS"]);
    assert_eq!(report.total, 3);
}

#[test]
fn test_triple_quoted_string_keeps_embedded_newline() {
    let mut mirror = BlockMirror::new();
    let report = run_verification(&["'''\ntest'''"], &mut mirror).unwrap();
    assert!(report.passed(), "{report}");
}

#[test]
fn test_change_notification_path_catches_event_route_regression() {
    // Exports collapse runs of spaces, so only the second path diverges.
    let mut stub = Stub::new(|blocks| {
        blocks
            .split(' ')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    });
    let report = run_verification(&["a = 0", "a  = 0", "b = 1"], &mut stub).unwrap();

    let failure = report.failure().unwrap();
    assert_eq!(failure.index, 1);
    assert_eq!(failure.path, CheckPath::ChangeNotification);
    assert_eq!(
        failure.kind,
        FailureKind::Mismatch {
            expected: "a  = 0".to_string(),
            actual: "a = 0".to_string(),
        }
    );
    assert!(failure.diagnostic().contains("change-notification"));
}

#[test]
fn test_boundary_whitespace_is_ignored() {
    let mut stub = Stub::new(|blocks| blocks.trim_end().to_string());
    let report = run_verification(&["a = 0\n", "\n\nb = 1  "], &mut stub).unwrap();
    assert!(report.passed());
}

#[test]
fn test_internal_whitespace_is_significant() {
    let mut stub = Stub::new(|blocks| blocks.replacen(' ', "  ", 1));
    let report = run_verification(&["a = 0"], &mut stub).unwrap();
    let failure = report.failure().unwrap();
    assert_eq!(failure.actual(), Some("a  = 0"));
}

#[test]
fn test_rerun_is_idempotent() {
    let fixtures = ["for x in y:\n    break\n    continue", "a += 1\nb *= 4"];
    let mut mirror = BlockMirror::new();
    let first = run_verification(&fixtures, &mut mirror).unwrap();
    let second = run_verification(&fixtures, &mut mirror).unwrap();
    assert!(first.passed());
    assert_eq!(first, second);
}

#[test]
fn test_unloaded_converter_never_reports_a_pass() {
    let mut mirror = BlockMirror::unloaded();
    let err = run_verification(&["0"], &mut mirror).unwrap_err();
    assert!(matches!(
        err,
        VerifyError::ConverterUnavailable(ConverterError::Unavailable(_))
    ));
}

#[test]
fn test_converter_error_halts_run() {
    let mut mirror = BlockMirror::new();
    let fixtures = ["x = 1", "s = '''never closed", "y = 2"];
    let report = run_verification(&fixtures, &mut mirror).unwrap();
    let failure = report.failure().unwrap();
    assert_eq!(failure.index, 1);
    assert_eq!(failure.path, CheckPath::Direct);
    assert!(matches!(failure.kind, FailureKind::ConverterFault { .. }));
    assert!(!report.was_evaluated(2));
}

#[test]
fn test_mirror_normalises_indentation_and_fails_non_canonical_fixture() {
    let mut mirror = BlockMirror::new();
    let report = run_verification(&["if x:\n  pass"], &mut mirror).unwrap();
    let failure = report.failure().unwrap();
    assert_eq!(failure.path, CheckPath::ChangeNotification);
    assert_eq!(failure.actual(), Some("if x:\n    pass"));
}

#[test]
fn test_mirror_exports_lf_so_crlf_fixture_fails_change_notification() {
    let mut mirror = BlockMirror::new();
    let report = run_verification(&["a = 1\r\nb = 2"], &mut mirror).unwrap();
    let failure = report.failure().unwrap();
    assert_eq!(failure.path, CheckPath::ChangeNotification);
    assert_eq!(failure.expected(), "a = 1\r\nb = 2");
    assert_eq!(failure.actual(), Some("a = 1\nb = 2"));
}
