//! Opsdesk - Multi-tenant service desk backend
//!
//! Serves the HTTP API for tickets, assets, inventory, change requests,
//! projects, and per-tenant settings.

use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use config::LogFormat;
use opsdesk::{api, config, db, middleware, AppConfig, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        println!("Opsdesk {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Load configuration first (before logging, so we know log format)
    let config = AppConfig::load().context("Failed to load configuration")?;

    // The guard must be kept alive for the duration of the program
    // to ensure log messages are flushed to files
    let _log_guard = init_logging(&config);

    info!("Opsdesk starting up");
    info!("Configuration loaded successfully");

    ensure_data_directory(&config)?;

    info!("Initializing database connection");
    let db = db::init_pool(&config.database)
        .await
        .context("Failed to initialize database")?;

    let state = AppState {
        config: config.clone(),
        db,
    };

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address configuration")?;

    info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("HTTP server is ready to accept connections");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("HTTP server error")?;

    Ok(())
}

/// Initialize the logging/tracing infrastructure
fn init_logging(config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use config::LogTarget;
    use tracing_subscriber::{prelude::*, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let log_config = &config.logging;

    match &log_config.target {
        LogTarget::Console => {
            let subscriber = tracing_subscriber::registry().with(env_filter);
            init_console_logging(subscriber, &log_config.format);
            None
        }
        LogTarget::File => {
            let (writer, guard) = create_file_writer(log_config);
            let subscriber = tracing_subscriber::registry().with(env_filter);
            init_file_logging(subscriber, &log_config.format, writer);
            Some(guard)
        }
        LogTarget::Both => {
            let (writer, guard) = create_file_writer(log_config);
            let subscriber = tracing_subscriber::registry().with(env_filter);
            init_both_logging(subscriber, &log_config.format, writer);
            Some(guard)
        }
    }
}

/// Create a file writer with optional daily rotation
fn create_file_writer(
    log_config: &config::LoggingConfig,
) -> (
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
) {
    if let Err(e) = std::fs::create_dir_all(&log_config.log_dir) {
        eprintln!(
            "Warning: Failed to create log directory {:?}: {}",
            log_config.log_dir, e
        );
    }

    let file_appender = if log_config.daily_rotation {
        tracing_appender::rolling::daily(&log_config.log_dir, &log_config.log_prefix)
    } else {
        tracing_appender::rolling::never(&log_config.log_dir, &log_config.log_prefix)
    };

    tracing_appender::non_blocking(file_appender)
}

/// Initialize console-only logging
fn init_console_logging<S>(subscriber: S, format: &LogFormat)
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    use tracing_subscriber::{fmt, prelude::*};

    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true))
                .init();
        }
        LogFormat::Compact => {
            subscriber
                .with(fmt::layer().compact().with_target(false))
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false),
                )
                .init();
        }
    }
}

/// Initialize file-only logging
fn init_file_logging<S>(
    subscriber: S,
    format: &LogFormat,
    writer: tracing_appender::non_blocking::NonBlocking,
) where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    use tracing_subscriber::{fmt, prelude::*};

    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true).with_writer(writer))
                .init();
        }
        LogFormat::Compact => {
            subscriber
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(writer),
                )
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .with_writer(writer),
                )
                .init();
        }
    }
}

/// Initialize both console and file logging
fn init_both_logging<S>(
    subscriber: S,
    format: &LogFormat,
    writer: tracing_appender::non_blocking::NonBlocking,
) where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + Send + Sync,
{
    use tracing_subscriber::{fmt, prelude::*};

    match format {
        LogFormat::Json => {
            subscriber
                .with(fmt::layer().json().with_target(true))
                .with(fmt::layer().json().with_target(true).with_writer(writer))
                .init();
        }
        LogFormat::Compact => {
            subscriber
                .with(fmt::layer().compact().with_target(false))
                .with(
                    fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(writer),
                )
                .init();
        }
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false),
                )
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(false)
                        .with_file(false)
                        .with_line_number(false)
                        .with_writer(writer),
                )
                .init();
        }
    }
}

/// Ensure the data directory exists
fn ensure_data_directory(config: &AppConfig) -> Result<()> {
    // Extract directory from database URL
    if let Some(path) = config.database.url.strip_prefix("sqlite://") {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).context("Failed to create data directory")?;
                info!("Created data directory: {:?}", parent);
            }
        }
    }
    Ok(())
}

/// Create the application router with all routes and middleware
fn create_router(state: AppState) -> Router {
    // CORS is only needed when a frontend is served from a different origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    // Authentication must not be applied globally, otherwise public endpoints
    // like `/api/v1/auth/login` become unusable. Public routes stay
    // unauthenticated and the auth middleware wraps only protected routes.
    let api_router = Router::new()
        .nest("/api/v1", api::public_routes())
        .nest(
            "/api/v1",
            api::protected_routes().layer(axum::middleware::from_fn_with_state(
                state.clone(),
                middleware::auth::auth_middleware,
            )),
        )
        .with_state(state);

    api_router
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(trace_layer)
        .layer(cors)
}

/// Print help message
fn print_help() {
    println!(
        r#"Opsdesk {}

USAGE:
    opsdesk [OPTIONS]

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information

ENVIRONMENT:
    OPSDESK_CONFIG      Path to configuration file (default: config.yaml)
    OPSDESK_HOST        Override the server bind host
    OPSDESK_PORT        Override the server bind port
    DATABASE_URL        Override the database URL
    JWT_SECRET          Override the JWT signing secret
"#,
        env!("CARGO_PKG_VERSION")
    );
}
