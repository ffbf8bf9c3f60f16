use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use videotube_service::app_state::AppState;
use videotube_service::config::Config;
use videotube_service::routes;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🔧 Starting videotube-service");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "✅ Configuration loaded: env={}, http_port={}",
        config.app.env, config.app.http_port
    );

    let http_addr = format!("{}:{}", config.app.host, config.app.http_port);
    let state = AppState::initialize(config).await?;
    info!("✅ Database pool ready, migrations applied");

    let app_state = web::Data::new(state);

    info!("🚀 HTTP server listening on http://{}", http_addr);

    HttpServer::new(move || {
        let jwt_secret = app_state.config.auth.jwt_secret.clone();
        App::new()
            .app_data(app_state.clone())
            .wrap(TracingLogger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .configure(|cfg| routes::configure_routes(cfg, &jwt_secret))
    })
    .bind(&http_addr)
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")?;

    info!("🛑 videotube-service shutting down");
    Ok(())
}
