//! Repeating tick sources with deterministic cancellation.
//!
//! Each [`TickSlot`] is backed by at most one spawned tokio interval task.
//! Arming a slot again, cancelling it, or dropping the scheduler aborts the
//! task. Every task is tagged with a generation; ticks it queued before it
//! was aborted are discarded by [`TickScheduler::next`], so a cancelled
//! countdown can never fire late.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSlot {
    /// Refreshes the elapsed session duration.
    SessionClock,
    /// Drives the rest countdown.
    Rest,
}

#[derive(Debug, Clone, Copy)]
struct Tick {
    slot: TickSlot,
    generation: u64,
}

struct Armed {
    generation: u64,
    task: JoinHandle<()>,
}

pub struct TickScheduler {
    period: Duration,
    tx: mpsc::UnboundedSender<Tick>,
    rx: mpsc::UnboundedReceiver<Tick>,
    slots: HashMap<TickSlot, Armed>,
    next_generation: u64,
}

impl TickScheduler {
    pub fn new(period: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            period,
            tx,
            rx,
            slots: HashMap::new(),
            next_generation: 0,
        }
    }

    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    pub fn is_armed(&self, slot: TickSlot) -> bool {
        self.slots.contains_key(&slot)
    }

    /// Start (or restart) a slot. The first tick arrives one period from now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(&mut self, slot: TickSlot) {
        self.cancel(slot);
        self.next_generation += 1;
        let generation = self.next_generation;
        let period = self.period;
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                if tx.send(Tick { slot, generation }).is_err() {
                    break;
                }
            }
        });
        tracing::debug!(?slot, generation, "tick slot armed");
        self.slots.insert(slot, Armed { generation, task });
    }

    /// Arm the slot only if it is not already running.
    pub fn ensure_armed(&mut self, slot: TickSlot) {
        if !self.is_armed(slot) {
            self.arm(slot);
        }
    }

    /// Arm or cancel so that the slot's state matches `wanted`.
    pub fn sync(&mut self, slot: TickSlot, wanted: bool) {
        if wanted {
            self.ensure_armed(slot);
        } else {
            self.cancel(slot);
        }
    }

    /// Returns `true` if the slot was armed.
    pub fn cancel(&mut self, slot: TickSlot) -> bool {
        match self.slots.remove(&slot) {
            Some(armed) => {
                armed.task.abort();
                tracing::debug!(?slot, generation = armed.generation, "tick slot cancelled");
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for (_, armed) in self.slots.drain() {
            armed.task.abort();
        }
    }

    /// Wait for the next live tick. Pends forever while nothing is armed,
    /// which makes it safe to use as a `tokio::select!` branch.
    pub async fn next(&mut self) -> TickSlot {
        loop {
            let Some(tick) = self.rx.recv().await else {
                // Unreachable while `self.tx` is alive.
                return std::future::pending().await;
            };
            match self.slots.get(&tick.slot) {
                Some(armed) if armed.generation == tick.generation => return tick.slot,
                _ => {
                    tracing::trace!(slot = ?tick.slot, generation = tick.generation, "stale tick dropped");
                }
            }
        }
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
