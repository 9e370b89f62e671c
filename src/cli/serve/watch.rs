//! File watcher that rebuilds the bundle on source changes.
//!
//! notify delivers raw events into a std channel. The [`Debouncer`] collects
//! them until no new event has arrived for [`DEBOUNCE_MS`], then a single
//! rebuild runs with a freshly loaded config.

use super::lifecycle::is_shutdown;
use crate::{
    cli::{Cli, build::build_project},
    config::ProjectConfig,
    debug, log,
    logger::{status_error, status_success},
    utils::{path::normalize_path, plural_count},
};
use anyhow::{Context, Result};
use notify::{EventKind, RecursiveMode, Watcher, event::ModifyKind};
use rustc_hash::FxHashSet;
use std::{
    path::{Path, PathBuf},
    sync::mpsc::{self, RecvTimeoutError},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

/// Quiet period before a rebuild starts.
const DEBOUNCE_MS: u64 = 300;

/// Poll interval for the shutdown flag while idle.
const IDLE_POLL: Duration = Duration::from_millis(500);

/// Editor swap files and backups.
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Which paths count as sources: exact files plus everything under a directory.
#[derive(Debug, Default)]
struct WatchSet {
    files: FxHashSet<PathBuf>,
    dirs: Vec<PathBuf>,
}

impl WatchSet {
    fn from_config(config: &ProjectConfig) -> Self {
        let mut set = Self::default();
        for path in config.watch_paths() {
            let path = normalize_path(&path);
            if path.is_dir() {
                set.dirs.push(path);
            } else {
                set.files.insert(path);
            }
        }
        set
    }

    fn contains(&self, path: &Path) -> bool {
        self.files.contains(path) || self.dirs.iter().any(|dir| path.starts_with(dir))
    }

    /// Directories handed to notify. Files are watched through their parent
    /// so editors that replace files on save are still seen.
    fn roots(&self) -> Vec<(PathBuf, RecursiveMode)> {
        let mut roots: Vec<(PathBuf, RecursiveMode)> = self
            .dirs
            .iter()
            .map(|dir| (dir.clone(), RecursiveMode::Recursive))
            .collect();

        for file in &self.files {
            if let Some(parent) = file.parent()
                && parent.is_dir()
                && !roots.iter().any(|(root, _)| root == parent)
            {
                roots.push((parent.to_path_buf(), RecursiveMode::NonRecursive));
            }
        }
        roots
    }
}

/// Collects relevant changes until the quiet period has passed.
struct Debouncer {
    changes: FxHashSet<PathBuf>,
    last_event: Option<Instant>,
}

impl Debouncer {
    fn new() -> Self {
        Self {
            changes: FxHashSet::default(),
            last_event: None,
        }
    }

    fn add_event(&mut self, event: &notify::Event, watch: &WatchSet) {
        match event.kind {
            EventKind::Create(_) | EventKind::Remove(_) => {}
            // metadata-only writes would retrigger on our own copies
            EventKind::Modify(ModifyKind::Metadata(_)) => return,
            EventKind::Modify(_) => {}
            _ => return,
        }

        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }
            let path = normalize_path(path);
            if !watch.contains(&path) {
                continue;
            }
            debug!("watch"; "{:?}: {}", event.kind, path.display());
            self.changes.insert(path);
            self.last_event = Some(Instant::now());
        }
    }

    fn is_ready(&self, now: Instant) -> bool {
        self.last_event.is_some_and(|last| {
            now.duration_since(last) >= Duration::from_millis(DEBOUNCE_MS)
        })
    }

    fn take_if_ready(&mut self, now: Instant) -> Option<Vec<PathBuf>> {
        if !self.is_ready(now) || self.changes.is_empty() {
            return None;
        }
        self.last_event = None;
        let mut changes: Vec<_> = self.changes.drain().collect();
        changes.sort();
        Some(changes)
    }

    fn sleep_duration(&self, now: Instant) -> Duration {
        let Some(last) = self.last_event else {
            return IDLE_POLL;
        };
        Duration::from_millis(DEBOUNCE_MS)
            .saturating_sub(now.duration_since(last))
            .max(Duration::from_millis(1))
    }
}

/// Start watching the project sources on a background thread.
pub fn spawn_watcher(cli: &'static Cli, config: &ProjectConfig) -> Result<JoinHandle<()>> {
    let watch = WatchSet::from_config(config);
    let (tx, rx) = mpsc::channel::<notify::Result<notify::Event>>();

    let mut watcher = notify::recommended_watcher(tx).context("Failed to create file watcher")?;
    for (root, mode) in watch.roots() {
        watcher
            .watch(&root, mode)
            .with_context(|| format!("Failed to watch '{}'", root.display()))?;
        debug!("watch"; "{}", root.display());
    }
    log!("watch"; "watching for changes...");

    let handle = thread::spawn(move || {
        // keep the watcher alive for the thread's lifetime
        let _watcher = watcher;
        let mut debouncer = Debouncer::new();

        while !is_shutdown() {
            match rx.recv_timeout(debouncer.sleep_duration(Instant::now())) {
                Ok(Ok(event)) => debouncer.add_event(&event, &watch),
                Ok(Err(e)) => log!("watch"; "watcher error: {e}"),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if let Some(changes) = debouncer.take_if_ready(Instant::now()) {
                rebuild(cli, &changes);
            }
        }
    });

    Ok(handle)
}

/// Reload the config and rebuild, reporting through the watch status line.
fn rebuild(cli: &Cli, changes: &[PathBuf]) {
    let start = Instant::now();
    let result = ProjectConfig::load(cli).and_then(|mut config| {
        // only the first build cleans
        config.build.clean = false;
        build_project(&config)
    });

    match result {
        Ok(report) => status_success(&format!(
            "{} changed, {} in {}ms",
            plural_count(changes.len(), "file"),
            report.summary(),
            start.elapsed().as_millis()
        )),
        Err(e) => status_error("rebuild failed", &format!("{e:#}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, MetadataKind};

    fn watch_set() -> WatchSet {
        WatchSet {
            files: [PathBuf::from("/p/src/index.html")].into_iter().collect(),
            dirs: vec![PathBuf::from("/p/czml_files")],
        }
    }

    fn event(kind: EventKind, path: &str) -> notify::Event {
        notify::Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_temp_files() {
        assert!(is_temp_file(Path::new("/p/src/.index.html.swp")));
        assert!(is_temp_file(Path::new("/p/src/index.html~")));
        assert!(is_temp_file(Path::new("/p/czml_files/a.czml.bak")));
        assert!(!is_temp_file(Path::new("/p/czml_files/a.czml")));
    }

    #[test]
    fn test_watch_set_contains() {
        let set = watch_set();
        assert!(set.contains(Path::new("/p/src/index.html")));
        assert!(set.contains(Path::new("/p/czml_files/new.czml")));
        assert!(!set.contains(Path::new("/p/src/other.html")));
        assert!(!set.contains(Path::new("/p/dist/index.html")));
    }

    #[test]
    fn test_watch_roots_use_parent_of_files() {
        let roots = watch_set().roots();
        assert!(roots.contains(&(PathBuf::from("/p/czml_files"), RecursiveMode::Recursive)));
        // "/p/src" does not exist on disk, so it is not watched
        assert_eq!(roots.len(), 1);
    }

    #[test]
    fn test_debounce_waits_for_quiet_period() {
        let set = watch_set();
        let mut debouncer = Debouncer::new();
        debouncer.add_event(&event(EventKind::Create(CreateKind::File), "/p/czml_files/a.czml"), &set);

        let last = debouncer.last_event.unwrap();
        assert_eq!(debouncer.take_if_ready(last), None);

        let later = last + Duration::from_millis(DEBOUNCE_MS);
        assert_eq!(
            debouncer.take_if_ready(later),
            Some(vec![PathBuf::from("/p/czml_files/a.czml")])
        );
        assert_eq!(debouncer.take_if_ready(later), None);
    }

    #[test]
    fn test_debounce_dedups_and_filters() {
        let set = watch_set();
        let mut debouncer = Debouncer::new();
        let modify = EventKind::Modify(ModifyKind::Data(DataChange::Content));

        debouncer.add_event(&event(modify, "/p/src/index.html"), &set);
        debouncer.add_event(&event(modify, "/p/src/index.html"), &set);
        debouncer.add_event(&event(modify, "/p/dist/index.html"), &set);
        debouncer.add_event(
            &event(EventKind::Modify(ModifyKind::Metadata(MetadataKind::Any)), "/p/czml_files/a.czml"),
            &set,
        );
        debouncer.add_event(&event(modify, "/p/czml_files/.a.czml.swp"), &set);

        let later = Instant::now() + Duration::from_secs(1);
        assert_eq!(
            debouncer.take_if_ready(later),
            Some(vec![PathBuf::from("/p/src/index.html")])
        );
    }

    #[test]
    fn test_idle_sleep() {
        let debouncer = Debouncer::new();
        assert_eq!(debouncer.sleep_duration(Instant::now()), IDLE_POLL);
    }
}
