//! Backend entry-point: loads settings, prepares the store, and serves the
//! comment endpoints.

mod server;

use std::ffi::OsString;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use polls_backend::inbound::http::health::HealthState;
use polls_backend::outbound::persistence::{DbPool, run_migrations};
use polls_backend::settings::AppSettings;
use server::{ServerConfig, create_server};

fn init_tracing() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

fn load_settings(args: impl IntoIterator<Item = OsString>) -> std::io::Result<AppSettings> {
    AppSettings::load_from_iter(args)
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))
}

async fn build_server_config(settings: &AppSettings) -> std::io::Result<ServerConfig> {
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let token_header = settings.token_header().map_err(std::io::Error::other)?;
    let policy = settings.comment_policy().map_err(std::io::Error::other)?;
    info!(
        token_header = %token_header,
        publish_by_default = policy.publish_by_default,
        reply_policy = %policy.reply_policy,
        "comment settings loaded"
    );

    let config = ServerConfig::new(bind_addr, token_header, policy);
    let config = match settings.pool_config() {
        Some(pool_config) => {
            run_migrations(pool_config.database_url())
                .await
                .map_err(std::io::Error::other)?;
            let pool = DbPool::new(pool_config)
                .await
                .map_err(std::io::Error::other)?;
            config.with_db_pool(pool)
        }
        None => config,
    };

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(server::make_metrics());

    Ok(config)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let settings = load_settings(std::env::args_os())?;
    let config = build_server_config(&settings).await?;

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await
}
