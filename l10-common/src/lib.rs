//! # L10 Common Library
//!
//! Shared code for the L10 meeting-session service and its client facade:
//! - Error type shared by the service and the facade
//! - Event types (`MeetingEvent`) and the in-process `EventBus`
//! - API wire types (session, pause history, section timing, pace)
//! - Configuration loading and root folder resolution
//! - Clock abstraction used for all duration arithmetic

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod time;

pub use error::{Error, Result};
