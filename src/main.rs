use anyhow::{anyhow, Result};
use is_terminal::IsTerminal;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zonecraft::{Config, SharedConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let mut first_args = std::env::args().take(2);
    let (program_name, config_file) = (
        first_args.next().unwrap_or("zonecraft".to_string()),
        first_args.next(),
    );

    let config = config_init(&program_name, config_file)?;
    let zone_store = config.zone_store()?;
    let records = config.record_service(zone_store.clone())?;

    if let Some(every) = config.reap_interval {
        tracing::info!(
            "deleting zones unchanged for {} days, checking every {}s",
            config.retention_days,
            every.as_secs()
        );
        let base_zone = records.normalizer().base_domain();
        tokio::spawn(zonecraft::reaper::run(
            zone_store,
            base_zone,
            config.retention(),
            every,
        ));
    }

    tracing::info!("API listening on {}", &config.api_bind_addr);
    let api_server = zonecraft::api::new(config.clone(), records);
    let api_handle = tokio::spawn(api_server);

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
        },
        Ok(api_res) = api_handle => {
            if let Err(err) = api_res {
                return Err(err.into())
            }
        }
    }
    tracing::info!("goodbye");
    Ok(())
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stdout().is_terminal()))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zonecraft=info".into()),
        )
        .init();
}

fn config_init(program_name: &str, config_file: Option<String>) -> Result<SharedConfig> {
    match config_file {
        None => Err(anyhow!("usage: {program_name} /path/to/config.json")),
        Some(config_file) => {
            tracing::debug!("loaded config from {config_file}");
            let config = Config::try_from_file(&config_file)?;
            Ok(Arc::new(config))
        }
    }
}
