//! Tick-based task scheduler.
//!
//! Tasks run on the first `tick()` at or after their due tick, in submission order.
//! `spawn` drives the clock at the server rate of 20 ticks per second.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::host::{ScheduledTask, Scheduler};

pub const TICK_DURATION: Duration = Duration::from_millis(50);

#[derive(Default)]
struct Queue {
    current_tick: u64,
    next_seq: u64,
    /// Keyed by (due tick, submission sequence).
    tasks: BTreeMap<(u64, u64), ScheduledTask>,
}

#[derive(Default)]
pub struct TickScheduler {
    queue: Mutex<Queue>,
}

impl TickScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tasks
            .len()
    }

    /// Advance the clock by one tick and run every task that is now due.
    ///
    /// Returns the number of tasks run. Tasks are run outside the lock, so they
    /// may schedule further work.
    pub fn tick(&self) -> usize {
        let due = {
            let mut guard = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
            let queue = &mut *guard;
            queue.current_tick += 1;
            let later = queue.tasks.split_off(&(queue.current_tick + 1, 0));
            std::mem::replace(&mut queue.tasks, later)
        };
        let count = due.len();
        for task in due.into_values() {
            task();
        }
        count
    }

    /// Drive the scheduler from a tokio interval until the handle is aborted.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK_DURATION);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                scheduler.tick();
            }
        })
    }
}

impl Scheduler for TickScheduler {
    /// A delay of 0 still waits for the next tick.
    fn schedule(&self, delay_ticks: u32, task: ScheduledTask) {
        let mut guard = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        let queue = &mut *guard;
        let due = queue.current_tick + u64::from(delay_ticks.max(1));
        let seq = queue.next_seq;
        queue.next_seq += 1;
        queue.tasks.insert((due, seq), task);
    }
}
