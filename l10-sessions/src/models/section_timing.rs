//! Per-section time attribution
//!
//! A section accumulates time only while a visit is in progress and its
//! interval clock is running. Pausing the session folds the running interval
//! into `cumulative_seconds` (freeze); resuming starts a fresh interval (thaw).

use chrono::{DateTime, Utc};
use l10_common::api::SectionTimingView;
use l10_common::time::seconds_between;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct SectionTiming {
    pub session_id: Uuid,
    pub section_id: String,
    pub allocated_seconds: i64,
    /// Start of the most recent visit
    pub started_at: Option<DateTime<Utc>>,
    /// End of the most recent visit; `None` while the visit is in progress
    pub ended_at: Option<DateTime<Utc>>,
    /// Start of the running interval; `None` while frozen or not visiting
    pub interval_start: Option<DateTime<Utc>>,
    pub cumulative_seconds: i64,
    pub overrun_seconds: i64,
    pub visits: i64,
}

impl SectionTiming {
    pub fn new(session_id: Uuid, section_id: &str, allocated_seconds: i64) -> Self {
        Self {
            session_id,
            section_id: section_id.to_string(),
            allocated_seconds,
            started_at: None,
            ended_at: None,
            interval_start: None,
            cumulative_seconds: 0,
            overrun_seconds: 0,
            visits: 0,
        }
    }

    pub fn in_progress(&self) -> bool {
        self.started_at.is_some() && self.ended_at.is_none()
    }

    pub fn running(&self) -> bool {
        self.in_progress() && self.interval_start.is_some()
    }

    /// Cumulative seconds including the running interval
    pub fn live_cumulative_seconds(&self, now: DateTime<Utc>) -> i64 {
        let running = match self.interval_start {
            Some(start) if self.in_progress() => seconds_between(start, now),
            _ => 0,
        };
        self.cumulative_seconds + running
    }

    /// Start a new visit; cumulative time from earlier visits is kept
    ///
    /// When the session is paused the visit opens frozen and the clock starts
    /// at the next thaw.
    pub fn begin_visit(&mut self, now: DateTime<Utc>, session_paused: bool) {
        self.started_at = Some(now);
        self.ended_at = None;
        self.interval_start = if session_paused { None } else { Some(now) };
        self.visits += 1;
    }

    /// Fold the running interval into the cumulative total
    ///
    /// Returns the seconds added.
    pub fn freeze(&mut self, now: DateTime<Utc>) -> i64 {
        match self.interval_start.take() {
            Some(start) => {
                let added = seconds_between(start, now);
                self.cumulative_seconds += added;
                added
            }
            None => 0,
        }
    }

    /// Restart the interval clock of an in-progress visit
    pub fn thaw(&mut self, now: DateTime<Utc>) {
        if self.in_progress() && self.interval_start.is_none() {
            self.interval_start = Some(now);
        }
    }

    /// Close the current visit and record the overrun
    ///
    /// Returns the seconds added by this call.
    pub fn finish_visit(&mut self, now: DateTime<Utc>) -> i64 {
        let added = self.freeze(now);
        self.ended_at = Some(now);
        self.overrun_seconds = (self.cumulative_seconds - self.allocated_seconds).max(0);
        added
    }

    pub fn to_view(&self, now: DateTime<Utc>) -> SectionTimingView {
        SectionTimingView {
            section_id: self.section_id.clone(),
            allocated_seconds: self.allocated_seconds,
            started_at: self.started_at,
            ended_at: self.ended_at,
            cumulative_seconds: self.live_cumulative_seconds(now),
            overrun_seconds: self.overrun_seconds,
            visits: self.visits,
            in_progress: self.in_progress(),
            running: self.running(),
        }
    }
}
