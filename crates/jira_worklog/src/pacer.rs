//! Request pacing so sequential work-log fetches stay gentle on the host server.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::time::sleep;

/// Enforces a minimum gap between consecutive requests sharing the same pacer.
#[derive(Clone, Debug)]
pub struct RequestPacer {
    cooldown: Duration,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl RequestPacer {
    /// Creates a pacer that keeps at least `cooldown` between requests.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Sleeps out whatever is left of the cooldown, then stamps the new request.
    pub async fn wait_turn(&self) {
        let mut guard = self.last_request.lock().await;
        let wait = remaining_cooldown(*guard, Instant::now(), self.cooldown);
        if !wait.is_zero() {
            sleep(wait).await;
        }
        *guard = Some(Instant::now());
    }

    /// Minimum gap enforced between requests.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

fn remaining_cooldown(last: Option<Instant>, now: Instant, cooldown: Duration) -> Duration {
    match last {
        Some(last) => cooldown.saturating_sub(now.saturating_duration_since(last)),
        None => Duration::ZERO,
    }
}
