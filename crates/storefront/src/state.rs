//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::uploads::ImageStore;
use crate::services::xmpp::XmppClient;

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
    images: ImageStore,
    xmpp: Option<XmppClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The XMPP client is only built when the notifier is configured.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let images = ImageStore::new(config.uploads_dir.clone());
        let xmpp = config.xmpp.clone().map(XmppClient::new);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                images,
                xmpp,
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

    /// Get a reference to the uploaded image store.
    #[must_use]
    pub fn images(&self) -> &ImageStore {
        &self.inner.images
    }

    /// Get the XMPP client, if notifications are configured.
    #[must_use]
    pub fn xmpp(&self) -> Option<&XmppClient> {
        self.inner.xmpp.as_ref()
    }
}
