//! l10-sessions library interface
//!
//! Meeting-session timing service: session store, lifecycle, per-section
//! timing with pace classification, stale cleanup and the HTTP API.

pub mod agenda;
pub mod api;
pub mod cleanup;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod pace;
pub mod sections;

pub use crate::error::{ApiError, ApiResult};
pub use crate::lifecycle::{EndOutcome, SessionLifecycle};
pub use crate::sections::SectionTracker;

use axum::Router;
use chrono::{DateTime, Utc};
use l10_common::config::{CleanupConfig, TomlConfig};
use l10_common::events::EventBus;
use l10_common::time::{Clock, SystemClock};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::agenda::AgendaConfig;

/// Event bus capacity; slow SSE clients beyond this lag and skip events
pub const EVENT_BUS_CAPACITY: usize = 256;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub event_bus: EventBus,
    pub lifecycle: SessionLifecycle,
    pub tracker: SectionTracker,
    /// Stale/stuck limits shared by the background sweep and the admin routes
    pub cleanup: CleanupConfig,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, config: &TomlConfig) -> Self {
        Self::with_clock(db, config, Arc::new(SystemClock))
    }

    /// State driven by an explicit clock (tests use a `ManualClock`)
    pub fn with_clock(db: SqlitePool, config: &TomlConfig, clock: Arc<dyn Clock>) -> Self {
        let event_bus = EventBus::new(EVENT_BUS_CAPACITY);
        let agenda = Arc::new(AgendaConfig::new(config.agenda.clone()));
        let tracker = SectionTracker::new(
            db.clone(),
            clock.clone(),
            event_bus.clone(),
            agenda,
            config.pace,
        );
        let lifecycle = SessionLifecycle::new(db.clone(), clock, event_bus.clone(), tracker.clone());

        Self {
            db,
            event_bus,
            lifecycle,
            tracker,
            cleanup: config.cleanup,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let v1 = Router::new()
        .merge(api::session_routes())
        .merge(api::section_routes())
        .merge(api::agenda_routes())
        .merge(api::admin_routes());

    Router::new()
        .nest("/api/v1", v1)
        .route("/events", get(api::event_stream))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
