//! ShopEasy storefront server.
//!
//! # Architecture
//!
//! - Axum web framework with a JSON API driven by `static/app.js`
//! - Askama templates for the catalog, order history and dashboard shells
//! - `PostgreSQL` for catalog, orders, reviews, wishlists and sessions
//! - Stripe payment intents and SMTP email, both optional
//!
//! Migrations are not run here; use `shopeasy migrate`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::process::ExitCode;
use std::time::Duration;

use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

use shopeasy_storefront::config::StorefrontConfig;
use shopeasy_storefront::services::email::EmailService;
use shopeasy_storefront::services::notifications::NotificationQueue;
use shopeasy_storefront::services::payments::PaymentClient;
use shopeasy_storefront::state::AppState;
use shopeasy_storefront::{app, db};

/// Upper bound on waiting for queued emails at shutdown.
const NOTIFICATION_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Initialize tracing. `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopeasy_storefront=info,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let fmt_layer = if json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Failed to load configuration: {e}");
            }
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    let pool = match db::create_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create database pool");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("Database pool created");

    let mailer = match config.email.as_ref() {
        Some(email) => match EmailService::new(email, &config.app_name, &config.base_url) {
            Ok(mailer) => Some(mailer),
            Err(e) => {
                tracing::error!(error = %e, "Invalid SMTP configuration, email disabled");
                None
            }
        },
        None => {
            tracing::info!("MAIL_USERNAME not set, email disabled");
            None
        }
    };

    let payments = config
        .payments
        .clone()
        .map(|payments| PaymentClient::new(payments, config.external_timeout));
    if payments.is_none() {
        tracing::info!("STRIPE_SECRET_KEY not set, orders record offline payments");
    }

    let (notifications, notification_worker) =
        NotificationQueue::spawn(mailer, config.external_timeout);

    let state = AppState::new(config.clone(), pool, payments, notifications);

    let app = app(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "Failed to bind");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!("storefront listening on {}", addr);

    let served = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    // Dropping the router closed every queue sender; let queued mail drain
    match tokio::time::timeout(NOTIFICATION_DRAIN_TIMEOUT, notification_worker).await {
        Ok(Ok(())) => tracing::info!("Notification queue drained"),
        Ok(Err(e)) => tracing::error!(error = %e, "Notification worker panicked"),
        Err(_) => tracing::warn!("Notification queue not drained before shutdown"),
    }

    match served {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
