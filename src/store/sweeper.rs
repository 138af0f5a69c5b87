use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::SharedSecretStore;

/// Spawn a task that purges expired secrets every `every`.
///
/// Lazy expiry in `take` already guarantees nothing expired is delivered;
/// this only reclaims memory held by secrets nobody came back for.
pub fn spawn_sweeper(store: SharedSecretStore, every: Duration) -> JoinHandle<()> {
    info!(interval_secs = every.as_secs(), "Starting expired-secret sweeper");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick fires immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = store.purge_expired();
            if removed > 0 {
                debug!(removed, remaining = store.len(), "Purged expired secrets");
            }
        }
    })
}
