use actix_web::web;
use tokio::time::interval;

use crate::{constants::PURGE_INTERVAL, AppState};

/// Periodically drops sign-out revocations whose tokens have expired and
/// login throttles that have gone idle.
pub async fn start_purge_task(state: web::Data<AppState>) {
    let mut interval = interval(PURGE_INTERVAL);
    // The first tick fires immediately; nothing has accumulated yet.
    interval.tick().await;

    loop {
        interval.tick().await;

        let (revocations, throttles) = state.auth_handler.purge_expired();
        if revocations + throttles > 0 {
            tracing::info!(revocations, throttles, "Purged expired session state");
        } else {
            tracing::debug!("Nothing to purge");
        }
    }
}
