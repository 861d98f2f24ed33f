use std::error::Error;
use std::sync::Arc;

use pocket_ledger::config::AppConfig;
use pocket_ledger::db::SqliteStore;
use pocket_ledger::telemetry;

#[rocket::main]
async fn main() -> Result<(), Box<dyn Error>> {
    telemetry::init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        address = %config.address,
        port = config.port,
        database = %config.database_url,
        "starting pocket ledger"
    );
    let store = SqliteStore::open(&config.database_url)?;

    pocket_ledger::build(config.rocket_figment(), Arc::new(store))
        .launch()
        .await?;
    Ok(())
}
