//! Per-path debouncing of file events.
//!
//! Editors often write a file several times per save (truncate, write,
//! chmod). Only the last event in a burst should reach the pipeline.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::pipeline::{EventKind, WatchEvent};

#[derive(Debug, Clone, Copy)]
struct Pending {
    kind: EventKind,
    last_change: Instant,
}

/// Holds events until their path has been quiet for the configured duration.
#[derive(Debug)]
pub struct Debouncer {
    pending: HashMap<PathBuf, Pending>,
    duration: Duration,
}

impl Debouncer {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            pending: HashMap::new(),
            duration: Duration::from_millis(debounce_ms),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Record an event, restarting the quiet period for its path.
    ///
    /// An `Add` followed by `Change`s within one burst stays an `Add`.
    pub fn record(&mut self, path: PathBuf, kind: EventKind) {
        let now = Instant::now();
        self.pending
            .entry(path)
            .and_modify(|p| {
                if p.kind != EventKind::Add {
                    p.kind = kind;
                }
                p.last_change = now;
            })
            .or_insert(Pending {
                kind,
                last_change: now,
            });
    }

    /// Drop a pending path, e.g. after it was deleted.
    pub fn remove(&mut self, path: &Path) {
        self.pending.remove(path);
    }

    /// Take the events whose path has been quiet long enough, ordered by path.
    pub fn take_ready(&mut self) -> Vec<WatchEvent> {
        let now = Instant::now();
        let mut ready = Vec::new();

        self.pending.retain(|path, pending| {
            if now.duration_since(pending.last_change) >= self.duration {
                ready.push(WatchEvent::new(pending.kind, path.clone()));
                false
            } else {
                true
            }
        });

        ready.sort_by(|a, b| a.path.cmp(&b.path));
        ready
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}
