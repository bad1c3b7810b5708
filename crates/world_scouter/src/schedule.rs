//! Periodic background jobs and their cancellation.
//!
//! Both refresh timers run on the tokio worker pool. Cancelling stops further
//! iterations; an iteration already running is left to finish.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error};

/// Broadcast stop signal shared by every background job.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Signals every subscriber. Calling it again has no further effect.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `job` after `initial_delay` and then every `period` until `shutdown`
/// fires.
///
/// The job runs on the blocking pool so it may call synchronous host APIs.
/// Missed ticks are delayed rather than replayed in a burst.
pub fn spawn_periodic<F>(
    handle: &Handle,
    name: &'static str,
    initial_delay: Duration,
    period: Duration,
    shutdown: &Shutdown,
    job: F,
) -> JoinHandle<()>
where
    F: Fn() + Send + Sync + 'static,
{
    let job = Arc::new(job);
    let mut stop = shutdown.subscribe();

    handle.spawn(async move {
        let mut ticker = interval_at(Instant::now() + initial_delay, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = stop.wait_for(|stopped| *stopped) => break,
                _ = ticker.tick() => {}
            }

            let job = Arc::clone(&job);
            if let Err(e) = tokio::task::spawn_blocking(move || job()).await {
                error!("Periodic job {} failed: {}", name, e);
            }
        }

        debug!("Periodic job {} stopped", name);
    })
}
