//! API module for shared HTTP API types
//!
//! Contains only plain data types (no HTTP framework dependencies) so the
//! facade can depend on it without pulling in the service's web stack.

pub mod types;

pub use types::{
    ActiveSessionQuery, ActiveSessionResponse, AgendaQuery, AgendaResponse, AgendaSection,
    EndSessionResponse, ErrorDetail, ErrorResponse, Pace, PauseEventView, PauseRequest,
    ResumeRequest, SaveStateRequest, SectionRequest, SectionResponse, SectionTimingView,
    SectionsResponse, SessionResponse, SessionStatusResponse, SessionView, StartSessionRequest,
    UpdateSectionRequest, DEFAULT_MEETING_TYPE,
};
