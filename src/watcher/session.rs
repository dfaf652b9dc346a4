//! Watch loop for one `pen` session.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};

use crate::pipeline::{EventKind, FilePipeline};

use super::debouncer::Debouncer;
use super::error::WatchError;

/// Recursive watcher on the session's watched root.
///
/// Feeds debounced add/change events to the pipeline, one task per event.
pub struct SessionWatcher {
    pipeline: Arc<FilePipeline>,
    debouncer: Debouncer,
    event_rx: mpsc::Receiver<notify::Result<Event>>,
    _watcher: notify::RecommendedWatcher,
}

impl SessionWatcher {
    /// Start watching the pipeline's watched root.
    pub fn new(pipeline: Arc<FilePipeline>, debounce_ms: u64) -> Result<Self, WatchError> {
        let (tx, rx) = mpsc::channel(256);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.blocking_send(res);
        })?;

        let root = pipeline.target().watched_root().to_path_buf();
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| WatchError::PathWatchFailed {
                path: root.clone(),
                reason: e.to_string(),
            })?;

        crate::log_event!("watcher", "watching", "{}", root.display());

        Ok(Self {
            pipeline,
            debouncer: Debouncer::new(debounce_ms),
            event_rx: rx,
            _watcher: watcher,
        })
    }

    /// Run until Ctrl-C.
    pub async fn watch(self) -> Result<(), WatchError> {
        self.watch_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("[watcher] cannot listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run until `shutdown` completes. In-flight pipeline tasks are not awaited.
    pub async fn watch_until<F>(mut self, shutdown: F) -> Result<(), WatchError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let tick = (self.debouncer.duration() / 2).max(Duration::from_millis(10));

        loop {
            let timeout = sleep(tick);
            tokio::pin!(timeout);

            tokio::select! {
                _ = &mut shutdown => {
                    crate::log_event!(
                        "watcher",
                        "stopped",
                        "{} pending events dropped",
                        self.debouncer.pending_count()
                    );
                    return Ok(());
                }

                res = self.event_rx.recv() => {
                    match res {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(e)) => tracing::error!("[watcher] file watch error: {e}"),
                        None => return Err(WatchError::ChannelClosed),
                    }
                }

                _ = &mut timeout => {
                    if !self.debouncer.has_pending() {
                        continue;
                    }
                    for event in self.debouncer.take_ready() {
                        // Directories and files deleted during the quiet period.
                        if !event.path.is_file() {
                            continue;
                        }
                        self.pipeline.spawn(event);
                    }
                }
            }
        }
    }

    fn handle_event(&mut self, event: Event) {
        let kind = match event.kind {
            notify::EventKind::Create(_)
            | notify::EventKind::Modify(ModifyKind::Name(RenameMode::To)) => Some(EventKind::Add),
            notify::EventKind::Modify(ModifyKind::Name(_)) => None,
            notify::EventKind::Modify(_) => Some(EventKind::Change),
            notify::EventKind::Remove(_) => None,
            _ => return,
        };

        for path in event.paths {
            if self.is_ignored(&path) {
                continue;
            }
            match kind {
                Some(kind) => self.debouncer.record(path, kind),
                None => self.debouncer.remove(&path),
            }
        }
    }

    fn is_ignored(&self, path: &Path) -> bool {
        let target = self.pipeline.target();
        match target.relative(path) {
            Some(relative) => target.is_ignored(&relative),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::CompileService;
    use crate::pipeline::WatchTarget;
    use crate::registry::ExtensionIndex;
    use crate::reload::Reloader;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingReloader {
        paths: Mutex<Vec<PathBuf>>,
    }

    impl Reloader for RecordingReloader {
        fn reload(&self, path: &Path) {
            self.paths.lock().unwrap().push(path.to_path_buf());
        }
    }

    #[tokio::test]
    async fn test_new_file_reaches_pipeline() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let target = WatchTarget::new(&root, None, None, vec![PathBuf::from("skip")]).unwrap();
        let reloader = Arc::new(RecordingReloader::default());
        let pipeline = Arc::new(FilePipeline::new(
            target,
            ExtensionIndex::default(),
            CompileService::new(),
            reloader.clone(),
        ));

        let watcher = SessionWatcher::new(pipeline, 20).unwrap();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let session = tokio::spawn(watcher.watch_until(async move {
            let _ = stop_rx.await;
        }));

        // Give the backend a moment to register the watch.
        sleep(Duration::from_millis(100)).await;
        std::fs::create_dir(root.join("skip")).unwrap();
        std::fs::write(root.join("skip/hidden.txt"), "no").unwrap();
        std::fs::write(root.join("notes.txt"), "hello").unwrap();

        let expected = root.join("notes.txt");
        let mut seen = false;
        for _ in 0..100 {
            if reloader.paths.lock().unwrap().contains(&expected) {
                seen = true;
                break;
            }
            sleep(Duration::from_millis(50)).await;
        }

        stop_tx.send(()).unwrap();
        session.await.unwrap().unwrap();

        assert!(seen, "no reload for {}", expected.display());
        assert!(
            !reloader
                .paths
                .lock()
                .unwrap()
                .iter()
                .any(|p| p.starts_with(root.join("skip")))
        );
    }
}
