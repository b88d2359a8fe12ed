//! Timer-driven passive degradation for hosts that run a tokio runtime.

use super::DreamSession;
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

/// A session shared between the host and its background tasks.
pub type SharedSession = Arc<Mutex<DreamSession>>;

#[must_use]
pub fn shared(session: DreamSession) -> SharedSession {
    Arc::new(Mutex::new(session))
}

/// Background task ticking degradation at the session's configured cadence.
///
/// The task exits on its own at the first tick after the dream has ended.
#[derive(Debug)]
pub struct DegradationTask {
    stop: watch::Sender<bool>,
    handle: JoinHandle<u64>,
}

impl DegradationTask {
    /// Start ticking. The first tick lands one full period after spawning.
    pub async fn spawn(session: SharedSession) -> Self {
        let period = session.lock().await.config().degradation_period();
        let (stop, mut stopped) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            let mut ticks = 0_u64;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let mut guard = session.lock().await;
                        if guard.tick_degradation().is_none() {
                            break;
                        }
                        ticks += 1;
                    }
                    changed = stopped.changed() => {
                        if changed.is_err() || *stopped.borrow() {
                            break;
                        }
                    }
                }
            }
            log::debug!("degradation task finished after {ticks} ticks");
            ticks
        });
        Self { stop, handle }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the task and return how many ticks it applied.
    pub async fn stop(self) -> u64 {
        let _ = self.stop.send(true);
        match self.handle.await {
            Ok(ticks) => ticks,
            Err(err) => {
                log::warn!("degradation task failed: {err}");
                0
            }
        }
    }
}
