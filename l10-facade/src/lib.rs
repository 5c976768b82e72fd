//! l10-facade - client orchestration for meeting sessions
//!
//! Embedded by meeting UIs. Talks to `l10-sessions` through [`SessionApi`]
//! and to other participants through a [`Relay`].

pub mod error;
pub mod facade;
pub mod relay;
pub mod timer;
pub mod transport;

pub use error::{FacadeError, FacadeResult};
pub use facade::{FacadeConfig, MeetingFacade};
pub use relay::{LocalRelay, Relay};
pub use timer::DisplayTimer;
pub use transport::{HttpSessionApi, MeetingScope, SessionApi};
