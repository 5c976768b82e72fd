//! HTTP API handlers for l10-sessions
//!
//! REST endpoints under `/api/v1` (including the `/admin` maintenance routes),
//! plus `/health` and the `/events` SSE stream.

pub mod admin;
pub mod agenda;
pub mod health;
pub mod sections;
pub mod sessions;
pub mod sse;

pub use admin::admin_routes;
pub use agenda::agenda_routes;
pub use health::health_routes;
pub use sections::section_routes;
pub use sessions::session_routes;
pub use sse::event_stream;
