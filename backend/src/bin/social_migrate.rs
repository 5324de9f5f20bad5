//! Apply pending schema migrations, then prove PostgreSQL and Redis answer.
//!
//! Reads `SOCIAL_*` settings, so the same environment that drives the
//! service drives this binary.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use social_backend::config::Settings;
use social_backend::outbound::connections::Connections;
use social_backend::outbound::persistence::run_pending_migrations;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build migration runtime")?;
    runtime.block_on(run())
}

async fn run() -> Result<()> {
    let settings = Settings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;

    let applied = run_pending_migrations(settings.database_url())
        .await
        .wrap_err("migrations failed")?;
    for version in &applied {
        info!(%version, "migration applied");
    }

    let connections = Connections::open(&settings)
        .await
        .wrap_err("backends did not respond")?;
    connections.close();
    Ok(())
}
