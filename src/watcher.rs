//! Re-run trigger for `--watch`.
//!
//! A watched run depends on two files: the fixture corpus and the local
//! `.mirrorcheckrc` holding saved defaults. Either may change while the
//! watch is running; the watcher says which one did once the burst of file
//! events has settled.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// What changed since the last run.
///
/// Ordered so that a defaults change outranks a corpus change when both
/// land in the same debounce window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RerunReason {
    /// The fixture corpus was edited
    Corpus,
    /// The local flag file was edited; flags must be reloaded
    Defaults,
}

impl RerunReason {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Corpus => "corpus changed",
            Self::Defaults => "saved defaults changed",
        }
    }
}

#[derive(Debug)]
struct Target {
    path: PathBuf,
    reason: RerunReason,
}

/// Collapses bursts of changes into one re-run.
#[derive(Debug)]
struct Debounce {
    quiet: Duration,
    pending: Option<(Instant, RerunReason)>,
}

impl Debounce {
    const fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    fn record(&mut self, reason: RerunReason, at: Instant) {
        let reason = self.pending.map_or(reason, |(_, prev)| prev.max(reason));
        self.pending = Some((at, reason));
    }

    fn settle(&mut self, now: Instant) -> Option<RerunReason> {
        let (since, reason) = self.pending?;
        if now.saturating_duration_since(since) < self.quiet {
            return None;
        }
        self.pending = None;
        Some(reason)
    }
}

pub struct CorpusWatcher {
    _watcher: RecommendedWatcher,
    rx: Receiver<notify::Result<Event>>,
    targets: Vec<Target>,
    debounce: Debounce,
}

impl CorpusWatcher {
    /// Watch `corpus`, and `defaults` if given. The defaults file need not
    /// exist yet.
    ///
    /// # Errors
    /// Returns an error if the watcher cannot be created or a containing
    /// directory cannot be watched.
    pub fn new(corpus: &Path, defaults: Option<&Path>, debounce: Duration) -> notify::Result<Self> {
        let mut targets = vec![Target {
            path: resolve(corpus),
            reason: RerunReason::Corpus,
        }];
        if let Some(defaults) = defaults {
            targets.push(Target {
                path: resolve(defaults),
                reason: RerunReason::Defaults,
            });
        }

        let (tx, rx) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        let dirs: BTreeSet<&Path> = targets.iter().filter_map(|t| t.path.parent()).collect();
        for dir in dirs {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
            tracing::debug!(dir = %dir.display(), "watching directory");
        }

        Ok(Self {
            _watcher: watcher,
            rx,
            targets,
            debounce: Debounce::new(debounce),
        })
    }

    /// The resolved corpus path.
    pub fn corpus_path(&self) -> &Path {
        &self.targets[0].path
    }

    /// Drain pending events and return the reason for a re-run once the
    /// changes have been quiet for the debounce interval.
    pub fn take_rerun(&mut self) -> Option<RerunReason> {
        let now = Instant::now();
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Ok(ev) => {
                    if let Some(reason) = self.reason_for(&ev) {
                        crate::perf::log_event("watcher.change", format!("reason={reason:?}"));
                        self.debounce.record(reason, now);
                    }
                }
                Err(err) => tracing::warn!(%err, "corpus watcher error"),
            }
        }
        self.debounce.settle(Instant::now())
    }

    fn reason_for(&self, event: &Event) -> Option<RerunReason> {
        self.targets
            .iter()
            .filter(|target| event.paths.iter().any(|path| path == &target.path))
            .map(|target| target.reason)
            .max()
    }
}

/// Absolute form of `path` matching what the OS reports in events.
///
/// Only the directory is canonicalized, so a file that does not exist yet
/// still resolves.
fn resolve(path: &Path) -> PathBuf {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    match path.file_name() {
        Some(name) => dir.join(name),
        None => dir,
    }
}
