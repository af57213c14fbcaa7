use tokio::{time, time::Duration};
use tracing::{error, info};

use crate::{
    configuration::{AppState, State},
    error::Error,
};

/// Periodic market sync owned by the composition root. Failures are logged
/// and swallowed; the task itself never stops.
pub async fn market_sync_task(app_state: AppState<State>) -> Result<(), Error> {
    let interval = app_state.config.sync_interval;

    let mut interval = time::interval(Duration::from_secs(interval));
    tokio::spawn(async move {
        // the eager sync already ran from main
        interval.tick().await;
        loop {
            interval.tick().await;
            match app_state.market.refresh().await {
                Ok(outcome) if outcome.performed => {
                    info!(
                        "background sync stored {} of {} assets",
                        outcome.inserted, outcome.received
                    );
                },
                Ok(outcome) => {
                    info!("background sync skipped: {}", outcome.message);
                },
                Err(err) => {
                    error!("background sync failed: {}", err);
                },
            }
        }
    })
    .await?
}
