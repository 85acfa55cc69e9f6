use anyhow::Context;
use chrono::Utc;
use sbanken_connector::{sensor::AccountSensor, AccountConnector, AccountTracker, ConnectorConfig};

fn read_config() -> anyhow::Result<ConnectorConfig> {
    let config: ConnectorConfig = config::Config::builder()
        .add_source(config::File::with_name("sbanken").required(false))
        .add_source(config::Environment::with_prefix("SBANKEN"))
        .build()?
        .try_deserialize()
        .context("Failed to assemble the required configuration")?;

    config.validate()?;
    Ok(config)
}

async fn run() -> anyhow::Result<()> {
    let config = read_config()?;
    let connector = AccountConnector::from_config(&config)?;

    // Discovery failures are fatal, there is nothing to poll without accounts
    let session = connector.authenticate().await?;
    let accounts = connector
        .list_accounts(&session)
        .await
        .context("Failed to discover accounts")?;
    for account in &accounts {
        tracing::info!(
            "Tracking account {} ({}) {}",
            account.identity.name,
            account.identity.account_number,
            account.identity.account_id
        );
    }

    let mut tracker = AccountTracker::new(accounts, config.scan_interval());
    let mut interval = tokio::time::interval(config.scan_interval());

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let cycle = async {
            interval.tick().await;
            tracker.refresh_due(&connector, Utc::now()).await
        };

        // Dropping an unfinished cycle aborts its refreshes
        tokio::select! {
            _ = cycle => {}
            _ = &mut shutdown => {
                tracing::info!("Shutting down");
                return Ok(());
            }
        }

        for tracked in tracker.accounts() {
            let sensor = AccountSensor::from(tracked);
            println!("{}", serde_json::to_string(&sensor)?);
        }
    }
}

#[tokio::main]
async fn main() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Setting default subscriber failed");

    if let Err(e) = run().await {
        tracing::error!("Fatal error: {:?}", e);
        std::process::exit(1);
    }
}
