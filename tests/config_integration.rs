use std::path::PathBuf;

use mirrorcheck::config::{ConfigFlags, OutputFormat, load_config_flags, parse_flag_tokens};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".mirrorcheckrc");
    let content = r#"
# comment
--watch

--format json

--debug-log=verify.log
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert!(flags.watch);
    assert_eq!(flags.format, Some(OutputFormat::Json));
    assert_eq!(flags.debug_log, Some(PathBuf::from("verify.log")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".mirrorcheckrc");
    let content = "--watch\n--format json\n--debug-log file.log\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "mirrorcheck".to_string(),
        "--format".to_string(),
        "text".to_string(),
        "--perf".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert!(effective.watch, "file flags should remain enabled");
    assert!(effective.perf, "cli flags should be applied");
    assert_eq!(
        effective.format,
        Some(OutputFormat::Text),
        "cli should override format"
    );
    assert_eq!(
        effective.debug_log,
        Some(PathBuf::from("file.log")),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_config_union_merges_booleans() {
    let file = ConfigFlags {
        watch: true,
        ..ConfigFlags::default()
    };
    let cli = ConfigFlags {
        perf: true,
        verbose: true,
        ..ConfigFlags::default()
    };
    let merged = file.union(&cli);
    assert!(merged.watch);
    assert!(merged.perf);
    assert!(merged.verbose);
}
