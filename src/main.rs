use tracing::{error, info, warn, Level};

use coindash::{
    configuration::{
        get_configuration, set_configuration, AppState, Config, State,
    },
    error::Error,
    handler::market_sync,
    provider::{CoinMarketCap, DatabasePool},
    server,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let result = app_main().await;

    if let Err(err) = &result {
        error!("{}", err);
    }

    result
}

async fn app_main() -> Result<(), Error> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level(Level::INFO)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let (config, database) = match init() {
        Ok((config, database)) => (config, database),
        Err(e) => return Err(Error::ConfigurationError(e.to_string())),
    };

    let client = CoinMarketCap::new(&config)?;
    let state = State::new(config, database, client).await?;
    let app_state = AppState::new(state);

    match app_state.market.refresh().await {
        Ok(outcome) if outcome.performed => {
            info!(
                "initial sync stored {} of {} assets",
                outcome.inserted, outcome.received
            );
        },
        Ok(outcome) => {
            info!("initial sync skipped: {}", outcome.message);
        },
        Err(err) => {
            warn!("initial sync failed: {}", err);
        },
    }

    let (_, _) = tokio::try_join!(
        market_sync::market_sync_task(app_state.clone()),
        server::server_task(&app_state),
    )?;

    Ok(())
}

fn init() -> Result<(Config, DatabasePool), Error> {
    set_configuration()?;
    let config = get_configuration()?;
    let database = DatabasePool::new(&config)?;
    Ok((config, database))
}
