use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;
use tracing::debug;

/// Counts whole seconds while a game is in progress.
///
/// `start` spawns a tokio task ticking once per second into a shared counter.
/// `stop` aborts the task and freezes the elapsed value, so no tick can land
/// after the session leaves `Playing`. Dropping a running timer aborts the
/// task as well.
#[derive(Debug, Default)]
pub struct GameTimer {
    elapsed: Arc<AtomicU64>,
    frozen: Option<u64>,
    task: Option<JoinHandle<()>>,
}

impl GameTimer {
    pub fn start(&mut self) {
        if self.task.is_some() {
            debug!("timer already running, ignoring start");
            return;
        }

        self.frozen = None;
        self.elapsed.store(0, Ordering::Relaxed);

        let elapsed = self.elapsed.clone();
        self.task = Some(tokio::spawn(async move {
            let period = Duration::from_secs(1);
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            loop {
                interval.tick().await;
                elapsed.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }

    /// Stops ticking and returns the final elapsed value. Subsequent calls to
    /// [`GameTimer::elapsed_seconds`] report this frozen value.
    pub fn stop(&mut self) -> u64 {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        let elapsed = self.elapsed.load(Ordering::Relaxed);
        self.frozen = Some(elapsed);
        elapsed
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.frozen
            .unwrap_or_else(|| self.elapsed.load(Ordering::Relaxed))
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for GameTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::task::yield_now;

    #[tokio::test(start_paused = true)]
    async fn counts_whole_seconds_while_running() {
        let mut timer = GameTimer::default();
        timer.start();
        yield_now().await;

        time::advance(Duration::from_secs(3)).await;
        yield_now().await;

        assert_eq!(timer.elapsed_seconds(), 3);
        assert!(timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_freezes_the_elapsed_value() {
        let mut timer = GameTimer::default();
        timer.start();
        yield_now().await;

        time::advance(Duration::from_secs(2)).await;
        yield_now().await;

        assert_eq!(timer.stop(), 2);
        assert!(!timer.is_running());

        time::advance(Duration::from_secs(5)).await;
        yield_now().await;

        assert_eq!(timer.elapsed_seconds(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn start_does_not_restart_a_running_timer() {
        let mut timer = GameTimer::default();
        timer.start();
        yield_now().await;

        time::advance(Duration::from_secs(1)).await;
        yield_now().await;

        timer.start();

        time::advance(Duration::from_secs(1)).await;
        yield_now().await;

        assert_eq!(timer.elapsed_seconds(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_aborts_the_ticking_task() {
        let mut timer = GameTimer::default();
        timer.start();
        yield_now().await;

        time::advance(Duration::from_secs(1)).await;
        yield_now().await;

        let elapsed = timer.elapsed.clone();
        assert_eq!(elapsed.load(Ordering::Relaxed), 1);

        drop(timer);
        yield_now().await;

        time::advance(Duration::from_secs(5)).await;
        yield_now().await;

        assert_eq!(elapsed.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn never_started_timer_reports_zero() {
        let mut timer = GameTimer::default();
        assert_eq!(timer.elapsed_seconds(), 0);
        assert_eq!(timer.stop(), 0);
    }
}
