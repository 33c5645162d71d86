use account_service::application::service::AccountService;
use account_service::data::mysql::MySqlAccountRepository;
use account_service::data::user_client::HttpUserDirectory;
use account_service::infrastructure::config::AppConfig;
use account_service::infrastructure::logging::init_logging;
use account_service::presentation::handlers::{AppState, configure};
use account_service::presentation::middleware::{RequestIdMiddleware, TimingMiddleware};
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let config = AppConfig::load().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;
    info!(
        db_host = %config.database.host,
        db_port = config.database.port,
        db_name = %config.database.name,
        user_service = %config.user_service.url,
        "Configuration loaded"
    );

    let repository = MySqlAccountRepository::connect(
        config.database.connect_options(),
        config.database.max_connections,
    )
    .await
    .map_err(|e| {
        error!(error = %e, "MySQL error during startup");
        e
    })?;
    repository.ping().await.map_err(|e| {
        error!(error = %e, "MySQL error during startup");
        e
    })?;
    info!("Database connection successful");

    let users = HttpUserDirectory::new(&config.user_service.url, config.user_service.timeout())
        .context("Failed to build user service client")?;

    let service = AccountService::new(Arc::new(repository), Arc::new(users));
    let state = web::Data::new(AppState { service });

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .configure(configure)
    });

    let bind_addr = (config.server.host.clone(), config.server.port);
    let server = server
        .bind(bind_addr.clone())
        .with_context(|| format!("Failed to bind {}:{}", bind_addr.0, bind_addr.1))?;
    info!(
        host = %bind_addr.0,
        port = bind_addr.1,
        routes = %"GET /v1/account/healthcheck, POST /v1/account/create_account, DELETE /v1/account/delete_account, POST /v1/account/get_account",
        "Starting HTTP server"
    );
    server.run().await?;
    Ok(())
}
