//! Fixed-interval scheduling.
//!
//! A job runs once immediately and then every `period`, one run at a time.
//! When a run takes longer than the period the next one starts as soon as
//! it finishes; missed ticks are not replayed.

use std::future::Future;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tracing::info;

/// Run `job` now and then every `period` until `shutdown` resolves.
///
/// Shutdown is only observed between runs; a run in progress always
/// completes. Returns the number of runs started.
pub async fn run_every<F, Fut, S>(period: Duration, shutdown: S, mut job: F) -> u64
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
    S: Future<Output = ()>,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut runs = 0u64;
    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!(runs, "Shutdown requested; stopping scheduler");
                break;
            }
            _ = ticker.tick() => {
                runs += 1;
                job().await;
            }
        }
    }
    runs
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl-C received"),
        _ = terminate => info!("SIGTERM received"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use tokio::time::{Instant, sleep};

    #[tokio::test(start_paused = true)]
    async fn test_runs_immediately_then_every_period() {
        let start = Instant::now();
        let ticks = RefCell::new(Vec::new());

        let runs = run_every(Duration::from_secs(60), sleep(Duration::from_secs(150)), || {
            ticks.borrow_mut().push(start.elapsed().as_secs());
            async {}
        })
        .await;

        assert_eq!(runs, 3);
        assert_eq!(*ticks.borrow(), vec![0, 60, 120]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_runs_do_not_overlap_or_burst() {
        let active = Cell::new(false);
        let overlapped = Cell::new(false);

        let runs = run_every(Duration::from_secs(10), sleep(Duration::from_secs(95)), || {
            let (active, overlapped) = (&active, &overlapped);
            async move {
                if active.replace(true) {
                    overlapped.set(true);
                }
                sleep(Duration::from_secs(25)).await;
                active.set(false);
            }
        })
        .await;

        assert!(!overlapped.get());
        // Runs start at 0, 25, 50, 75; the one at 100 is preempted by shutdown.
        assert_eq!(runs, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_shutdown_still_stops() {
        let runs = run_every(Duration::from_secs(60), async {}, || async {}).await;
        assert_eq!(runs, 0);
    }
}
