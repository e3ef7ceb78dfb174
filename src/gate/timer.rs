//! Cancelable one-second countdown

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

const TICK: Duration = Duration::from_secs(1);

/// Event emitted by a countdown run, tagged with the run's generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Tick { generation: u64, remaining: u64 },
    Expired { generation: u64 },
}

impl TimerEvent {
    pub fn generation(&self) -> u64 {
        match self {
            TimerEvent::Tick { generation, .. } | TimerEvent::Expired { generation } => *generation,
        }
    }
}

/// A countdown with at most one run in flight
///
/// Each run is a tokio task; starting a new run aborts the previous one.
/// Because an aborted task may already have queued an event, every run gets
/// a generation number and consumers compare it with [`CountdownTimer::generation`].
#[derive(Debug, Default)]
pub struct CountdownTimer {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl CountdownTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting down from `duration_secs`, cancelling any current run
    ///
    /// `on_tick` receives the remaining seconds once per second, down to and
    /// including 0; `on_expire` fires once, right after the final tick.
    /// Returns the generation of the new run. Must be called within a tokio runtime.
    pub fn start<T, E>(&mut self, duration_secs: u64, mut on_tick: T, on_expire: E) -> u64
    where
        T: FnMut(u64) + Send + 'static,
        E: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.generation += 1;

        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK, TICK);
            let mut remaining = duration_secs;
            loop {
                interval.tick().await;
                remaining = remaining.saturating_sub(1);
                on_tick(remaining);
                if remaining == 0 {
                    on_expire();
                    break;
                }
            }
        });
        self.handle = Some(handle);
        self.generation
    }

    /// Stop the current run, if any. Safe to call repeatedly.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Generation of the most recent run (0 before the first start)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation && self.handle.is_some()
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
