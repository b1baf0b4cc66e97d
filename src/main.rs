use actix_web::{middleware, web, App, HttpServer};

use quotrak::config;
use quotrak::db;
use quotrak::models;
use quotrak::routes;
use quotrak::services::AdminTokenService;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load configuration
    let config = config::Config::from_env().map_err(|e| {
        log::error!("Configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!("Starting Quotrak server on {}:{}", config.host, config.port);

    // Create database pool
    let db_pool = db::create_pool(&config.database).await.map_err(|e| {
        log::error!("Database pool error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    // Run migrations
    db::run_migrations(&db_pool).await.map_err(|e| {
        log::error!("Migration error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    // Bootstrap: create initial admin token if none exist
    bootstrap_token(&db_pool).await;

    let host = config.host.clone();
    let port = config.port;

    let server = HttpServer::new(move || {
        App::new()
            // Share database pool and config with all handlers
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(config.clone()))
            // Middleware
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            // Health check routes (no auth required)
            .service(
                web::scope("/health")
                    .route("", web::get().to(routes::health::liveness))
                    .route("/ready", web::get().to(routes::health::readiness)),
            )
            // API routes (Bearer token auth handled by the AdminAuth extractor)
            .configure(routes::query::configure)
            .configure(routes::subscriptions::configure)
            .configure(routes::keys::configure)
            .configure(routes::limits::configure)
            .configure(routes::usage::configure)
            .configure(routes::users::configure)
            .configure(routes::tokens::configure)
    })
    .bind((host.as_str(), port))?
    .shutdown_timeout(30)
    .run();

    // Spawn graceful shutdown handler
    let server_handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("Shutdown signal received, stopping server...");
        server_handle.stop(true).await;
    });

    server.await
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                log::error!("Failed to install Ctrl+C handler: {}", e);
                // Wait forever if signal handler fails
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Bootstrap: create initial token if none exist and QUOTRAK_BOOTSTRAP_TOKEN is set
async fn bootstrap_token(pool: &db::DbPool) {
    // Check if bootstrap is requested via env var
    if std::env::var("QUOTRAK_BOOTSTRAP_TOKEN").is_err() {
        return;
    }

    // Check if any tokens exist
    match AdminTokenService::has_any_token(pool).await {
        Ok(true) => {
            log::info!("Admin tokens already exist, skipping bootstrap");
        }
        Ok(false) => {
            // Create bootstrap token
            let input = models::CreateAdminToken {
                description: Some("Bootstrap token (created automatically)".to_string()),
            };

            match AdminTokenService::create(pool, input).await {
                Ok(token) => {
                    // Print to stderr directly (not logs) to avoid token in log aggregators
                    eprintln!();
                    eprintln!("==============================================");
                    eprintln!("BOOTSTRAP TOKEN CREATED - SAVE THIS NOW!");
                    eprintln!("Token: {}", token.token);
                    eprintln!("This token will NOT be shown again.");
                    eprintln!("==============================================");
                    eprintln!();
                    log::info!("Bootstrap token created successfully");
                }
                Err(e) => {
                    log::error!("Failed to create bootstrap token: {}", e);
                }
            }
        }
        Err(e) => {
            log::error!("Failed to check for existing tokens: {}", e);
        }
    }
}
