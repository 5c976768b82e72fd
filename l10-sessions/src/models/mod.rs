//! Session, pause and section timing models

pub mod pause_event;
pub mod section_timing;
pub mod session;

pub use pause_event::PauseEvent;
pub use section_timing::SectionTiming;
pub use session::MeetingSession;
