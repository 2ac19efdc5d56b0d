//! Process-wide settings provider with file-watch reload.
//!
//! Readers take an `Arc<Settings>` snapshot and keep it for the duration of
//! an operation. A reload builds a complete new `Settings` and swaps the
//! pointer, so nobody ever observes a half-applied change.

use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, RwLock},
    time::Duration,
};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};

use crate::config::{ConfigError, Settings};

/// Shared handle to the current settings snapshot.
#[derive(Debug, Clone)]
pub struct SettingsProvider {
    current: Arc<RwLock<Arc<Settings>>>,
}

impl SettingsProvider {
    pub fn new(settings: Settings) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(settings))),
        }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<Settings> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Publishes a new snapshot, returning the one it replaced.
    pub fn replace(&self, settings: Settings) -> Arc<Settings> {
        let next = Arc::new(settings);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }

    /// Re-reads `path` (plus environment overrides) and publishes the result.
    ///
    /// On error the current snapshot stays in place.
    pub fn reload_from(&self, path: &Path) -> Result<Arc<Settings>, ConfigError> {
        let settings = Settings::load(Some(path))?;
        self.replace(settings);
        Ok(self.snapshot())
    }
}

/// Keeps the file watcher alive. Dropping it stops reloads.
pub struct SettingsWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
}

/// Reload `provider` whenever `path` changes on disk.
///
/// The parent directory is watched rather than the file, so editors that
/// save by renaming a temp file over the original are still picked up.
pub fn watch_settings(
    provider: SettingsProvider,
    path: impl Into<PathBuf>,
    debounce: Duration,
) -> Result<SettingsWatcher, ConfigError> {
    let path: PathBuf = path.into();
    let file_name = path.file_name().map(|name| name.to_os_string());
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let (sync_tx, sync_rx) = mpsc::channel::<DebounceEventResult>();
    let mut debouncer = new_debouncer(debounce, sync_tx)?;
    debouncer
        .watcher()
        .watch(&dir, RecursiveMode::NonRecursive)?;
    tracing::debug!(path = %path.display(), "Watching settings file");

    // The thread exits when the debouncer, and with it the sender, is dropped.
    std::thread::spawn(move || {
        while let Ok(result) = sync_rx.recv() {
            let events = match result {
                Ok(events) => events,
                Err(err) => {
                    tracing::warn!(error = %err, "Config watcher error");
                    continue;
                }
            };

            let touched = events
                .iter()
                .any(|event| event.path.file_name().map(|n| n.to_os_string()) == file_name);
            if !touched {
                continue;
            }

            match provider.reload_from(&path) {
                Ok(settings) => tracing::info!(
                    path = %path.display(),
                    ttl_base_secs = settings.cache.ttl_base_secs,
                    ttl_jitter_secs = settings.cache.ttl_jitter_secs,
                    "Settings reloaded"
                ),
                Err(err) => tracing::error!(
                    path = %path.display(),
                    error = %err,
                    "Failed to reload settings, keeping previous values"
                ),
            }
        }
    });

    Ok(SettingsWatcher {
        _debouncer: debouncer,
    })
}
