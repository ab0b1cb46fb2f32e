//! Janitor Task
//!
//! Background task that periodically purges expired entries from a store.

use std::sync::Weak;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::cache::Store;
use crate::error::{CacheError, Result};

/// Lifecycle of a janitor. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JanitorState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Running(JoinHandle<()>),
    Stopped,
}

// == Janitor ==
/// Owns the background sweep for one store.
///
/// The task only holds a weak reference to the store, and dropping the
/// janitor aborts it, so a forgotten janitor cannot keep a store alive.
#[derive(Debug)]
pub struct Janitor {
    interval: Duration,
    phase: Mutex<Phase>,
}

impl Janitor {
    /// Creates an idle janitor that will sweep every `interval` once started.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            phase: Mutex::new(Phase::Idle),
        }
    }

    /// Returns the sweep interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    // == Start ==
    /// Spawns the sweep loop on `runtime`.
    ///
    /// The loop sleeps for the interval, purges with the current time, and
    /// repeats until stopped or until the store has been dropped.
    ///
    /// # Errors
    /// `JanitorUnavailable` if this janitor is already running or stopped.
    pub fn start<V>(&self, runtime: &Handle, store: Weak<Store<V>>) -> Result<()>
    where
        V: Clone + Send + Sync + 'static,
    {
        let mut phase = self.phase.lock();
        if !matches!(*phase, Phase::Idle) {
            return Err(CacheError::JanitorUnavailable);
        }

        let interval = self.interval;
        let handle = runtime.spawn(async move {
            debug!("Janitor started with interval of {:?}", interval);

            loop {
                tokio::time::sleep(interval).await;

                let Some(store) = store.upgrade() else {
                    debug!("Janitor exiting: store is no longer reachable");
                    break;
                };

                let removed = store.purge(Instant::now());

                if removed > 0 {
                    info!("Janitor: purged {} expired entries", removed);
                } else {
                    debug!("Janitor: no expired entries found");
                }
            }
        });

        *phase = Phase::Running(handle);
        Ok(())
    }

    // == Stop ==
    /// Stops the sweep loop. Idempotent; a stopped janitor cannot restart.
    ///
    /// Returns true if this call stopped a running task.
    pub fn stop(&self) -> bool {
        match std::mem::replace(&mut *self.phase.lock(), Phase::Stopped) {
            Phase::Running(handle) => {
                handle.abort();
                debug!("Janitor stopped");
                true
            }
            Phase::Idle | Phase::Stopped => false,
        }
    }

    // == State ==
    /// Reports the current state. A task that exited on its own counts as
    /// stopped.
    pub fn state(&self) -> JanitorState {
        match &*self.phase.lock() {
            Phase::Idle => JanitorState::Idle,
            Phase::Running(handle) if !handle.is_finished() => JanitorState::Running,
            Phase::Running(_) | Phase::Stopped => JanitorState::Stopped,
        }
    }
}

impl Drop for Janitor {
    fn drop(&mut self) {
        self.stop();
    }
}
