//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::notifications::NotificationQueue;
use crate::services::payments::PaymentClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    payments: Option<PaymentClient>,
    notifications: NotificationQueue,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    /// * `payments` - Payment provider client, `None` for offline payments
    /// * `notifications` - Queue for out-of-band emails
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        pool: PgPool,
        payments: Option<PaymentClient>,
        notifications: NotificationQueue,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                payments,
                notifications,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get the payment provider client, if configured.
    #[must_use]
    pub fn payments(&self) -> Option<&PaymentClient> {
        self.inner.payments.as_ref()
    }

    /// Get the notification queue.
    #[must_use]
    pub fn notifications(&self) -> &NotificationQueue {
        &self.inner.notifications
    }
}
