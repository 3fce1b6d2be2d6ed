//! Mirrorcheck - round-trip verifier for text/block editors.
//!
//! # Usage
//!
//! ```bash
//! mirrorcheck
//! mirrorcheck corpus.json5
//! mirrorcheck --watch --format json corpus.json5
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use mirrorcheck::config::{
    ConfigFlags, ConfigPaths, OutputFormat, clear_config_flags, save_config_flags,
};
use mirrorcheck::fixtures::FixtureSet;
use mirrorcheck::mirror::BlockMirror;
use mirrorcheck::perf;
use mirrorcheck::verify::{VerificationReport, verify_set};
use mirrorcheck::watcher::{CorpusWatcher, RerunReason};

const WATCH_DEBOUNCE: Duration = Duration::from_millis(200);
const WATCH_POLL: Duration = Duration::from_millis(250);

/// Check that text -> blocks -> text is stable for every fixture
#[derive(Parser, Debug)]
#[command(name = "mirrorcheck", version, about, long_about = None)]
struct Cli {
    /// Fixture corpus (.json or .json5); defaults to the bundled Python corpus
    #[arg(value_name = "FIXTURES")]
    fixtures: Option<PathBuf>,

    /// Re-run whenever the fixture file changes
    #[arg(short, long)]
    watch: bool,

    /// Report format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Print timing for the run
    #[arg(long)]
    perf: bool,

    /// Log every check at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Write per-check debug events to a file
    #[arg(long, value_name = "PATH")]
    debug_log: Option<PathBuf>,

    /// List the corpus and exit
    #[arg(long)]
    list: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

impl Cli {
    fn flags(&self) -> ConfigFlags {
        ConfigFlags {
            watch: self.watch,
            perf: self.perf,
            verbose: self.verbose,
            format: self.format,
            debug_log: self.debug_log.clone(),
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn load_corpus(path: Option<&Path>) -> Result<FixtureSet> {
    match path {
        Some(path) => FixtureSet::load(path)
            .with_context(|| format!("Failed to load fixture corpus {}", path.display())),
        None => FixtureSet::bundled().context("Bundled corpus is malformed"),
    }
}

fn list_corpus(set: &FixtureSet) {
    println!("{} ({} fixtures)", set.origin(), set.len());
    for (index, fixture) in set.fixtures().iter().enumerate() {
        let marker = if fixture.skip { " [skip]" } else { "" };
        println!("#{index}{marker} {:?}", fixture.code);
        if let Some(note) = &fixture.note {
            println!("    note: {note}");
        }
    }
}

fn print_report(report: &VerificationReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{report}"),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(report).context("Failed to serialize report")?
        ),
    }
    Ok(())
}

/// Load the corpus, verify it against a fresh mirror, print the report.
fn run_once(path: Option<&Path>, format: OutputFormat) -> Result<bool> {
    let set = load_corpus(path)?;
    let mut mirror = BlockMirror::new();
    mirror.add_change_listener(|event| {
        tracing::debug!(
            origin = ?event.origin,
            revision = event.revision,
            blocks = event.block_count,
            in_sync = event.in_sync,
            "workspace changed"
        );
    });
    let report = verify_set(&set, &mut mirror).context("Verification error")?;
    print_report(&report, format)?;
    Ok(report.passed())
}

fn watch_loop(
    path: &Path,
    paths: &ConfigPaths,
    cli_flags: &ConfigFlags,
    mut format: OutputFormat,
) -> Result<()> {
    let mut watcher = CorpusWatcher::new(path, Some(&paths.local), WATCH_DEBOUNCE)
        .with_context(|| format!("Failed to watch {}", path.display()))?;
    eprintln!("watching {} (ctrl-c to stop)", watcher.corpus_path().display());
    loop {
        if let Some(reason) = watcher.take_rerun() {
            eprintln!("[rerun] {}", reason.label());
            if reason == RerunReason::Defaults {
                match paths.effective(cli_flags) {
                    Ok(flags) => format = flags.format.unwrap_or(OutputFormat::Text),
                    Err(err) => eprintln!("[error] {err:#}"),
                }
            }
            // A half-written corpus is reported and the watch goes on.
            if let Err(err) = run_once(Some(path), format) {
                eprintln!("[error] {err:#}");
            }
        }
        std::thread::sleep(WATCH_POLL);
    }
}

/// The corpus to watch, if watching applies.
///
/// The bundled corpus never changes, so `--watch` without a fixture file
/// (typically a saved default) falls back to a single run.
fn watch_target(watch: bool, fixtures: Option<&Path>) -> Option<&Path> {
    match (watch, fixtures) {
        (true, Some(path)) => Some(path),
        (true, None) => {
            tracing::warn!("--watch needs a fixture file; running the bundled corpus once");
            None
        }
        (false, _) => None,
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let paths = ConfigPaths::discover();
    let cli_flags = cli.flags();

    if cli.clear {
        clear_config_flags(&paths.global)?;
    }
    if cli.save {
        save_config_flags(&paths.global, &cli_flags)?;
    }

    let effective = if cli.clear {
        cli_flags.clone()
    } else {
        paths.effective(&cli_flags)?
    };

    init_logging(effective.verbose);
    perf::set_enabled(effective.perf);
    let debug_log_path = effective
        .debug_log
        .clone()
        .or_else(|| std::env::var_os("MIRRORCHECK_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(debug_log_path.as_deref()) {
        tracing::warn!(
            path = ?debug_log_path,
            %err,
            "failed to initialize debug log"
        );
    }

    let path = cli.fixtures.as_deref();
    if cli.list {
        list_corpus(&load_corpus(path)?);
        return Ok(ExitCode::SUCCESS);
    }

    let format = effective.format.unwrap_or(OutputFormat::Text);
    if let Some(path) = watch_target(effective.watch, path) {
        // The first run's outcome does not end the watch.
        if let Err(err) = run_once(Some(path), format) {
            eprintln!("[error] {err:#}");
        }
        watch_loop(path, &paths, &cli_flags, format)?;
        return Ok(ExitCode::SUCCESS);
    }

    if run_once(path, format)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
