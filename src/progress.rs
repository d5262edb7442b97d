// src/progress.rs
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Searching,
    Processing,
    SendingEmail,
    Complete,
    Error,
}

/// Point-in-time view of a run. Observers may see slightly stale values,
/// never values from a different run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
    pub phase: Phase,
}

impl ProgressSnapshot {
    pub fn percentage(&self) -> u8 {
        if self.total == 0 {
            0
        } else {
            (self.completed * 100 / self.total) as u8
        }
    }
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            completed: 0,
            total: 0,
            phase: Phase::Searching,
        }
    }
}

/// Single-writer progress state over a watch channel. The coordinator holds
/// the tracker; any number of observers hold receivers.
#[derive(Debug)]
pub struct ProgressTracker {
    tx: watch::Sender<ProgressSnapshot>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProgressSnapshot::default());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        *self.tx.borrow()
    }

    /// Enters a phase and resets the completion counter.
    pub fn begin_phase(&self, phase: Phase, total: usize) {
        self.tx.send_replace(ProgressSnapshot {
            completed: 0,
            total,
            phase,
        });
    }

    pub fn record_completion(&self) {
        self.tx.send_modify(|snapshot| snapshot.completed += 1);
    }

    /// Marks the current phase finished without touching the counters.
    pub fn finish(&self, phase: Phase) {
        self.tx.send_modify(|snapshot| snapshot.phase = phase);
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
