//! Cancellable periodic and delayed tasks.
//!
//! Tasks never touch timer state. They post an event into the owner's
//! channel and the owner applies it on its own turn. A [`TaskHandle`] is the
//! only way to stop a task, and dropping it stops the task, so replacing the
//! handle stored in a field cancels whatever was there before.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Single owner of a spawned task.
#[derive(Debug)]
pub struct TaskHandle {
    task: JoinHandle<()>,
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns tasks that feed events of type `E` back to their owner.
///
/// Must be used from inside a tokio runtime.
#[derive(Debug, Clone)]
pub struct Scheduler<E> {
    tx: UnboundedSender<E>,
}

impl<E: Send + 'static> Scheduler<E> {
    pub fn new(tx: UnboundedSender<E>) -> Self {
        Self { tx }
    }

    /// Posts `make()` every `period`, first after one full period.
    pub fn every<F>(&self, period: Duration, make: F) -> TaskHandle
    where
        F: Fn() -> E + Send + 'static,
    {
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(make()).is_err() {
                    break;
                }
            }
        });
        TaskHandle { task }
    }

    /// Posts `event` once after `delay`.
    pub fn after(&self, delay: Duration, event: E) -> TaskHandle {
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = tx.send(event);
        });
        TaskHandle { task }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn every_posts_once_per_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx);
        let _handle = scheduler.every(Duration::from_secs(1), || 7u32);

        let start = Instant::now();
        for _ in 0..3 {
            assert_eq!(rx.recv().await, Some(7));
        }
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_the_task() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx);
        let handle = scheduler.every(Duration::from_secs(1), || ());
        assert_eq!(rx.recv().await, Some(()));
        drop(handle);

        time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn after_fires_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx);
        let _handle = scheduler.after(Duration::from_secs(1), "advance");

        let start = Instant::now();
        assert_eq!(rx.recv().await, Some("advance"));
        assert_eq!(start.elapsed(), Duration::from_secs(1));

        time::sleep(Duration::from_secs(3)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_delay_never_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(tx);
        drop(scheduler.after(Duration::from_secs(1), ()));

        time::sleep(Duration::from_secs(3)).await;
        assert!(rx.try_recv().is_err());
    }
}
