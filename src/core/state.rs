use std::sync::Arc;

use sqlx::PgPool;
use time::UtcOffset;

use crate::core::{config::Settings, redis::RedisHandle};
use crate::services::external_api::ExternalApiClient;

/// Cheap to clone; handlers receive it through `State`.
#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    redis: RedisHandle,
    external_api: ExternalApiClient,
}

impl AppState {
    pub(crate) fn new(
        settings: Settings,
        db: PgPool,
        redis: RedisHandle,
        external_api: ExternalApiClient,
    ) -> Self {
        Self { inner: Arc::new(InnerState { settings, db, redis, external_api }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn redis(&self) -> &RedisHandle {
        &self.inner.redis
    }

    pub(crate) fn external_api(&self) -> &ExternalApiClient {
        &self.inner.external_api
    }

    /// Offset used to render and interpret campus wall-clock times.
    pub(crate) fn local_offset(&self) -> UtcOffset {
        self.inner.settings.local_offset()
    }
}
