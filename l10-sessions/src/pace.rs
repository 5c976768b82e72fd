//! Pace classification
//!
//! Compares the meeting's active duration with where the agenda says it
//! should be. Expected time is the allocation of every section before the
//! current one plus the time spent in the current section, capped at its
//! allocation. The deviation is expressed in percent of total planned time.

use l10_common::api::Pace;
use l10_common::config::PaceThresholds;

use crate::agenda::Agenda;

/// Signed deviation from plan in percent of total planned time
///
/// `None` when there is no current section or nothing is planned.
pub fn deviation_pct(
    agenda: &Agenda,
    current_section: Option<&str>,
    current_section_seconds: i64,
    active_duration_seconds: i64,
) -> Option<f64> {
    let total = agenda.total_planned_seconds();
    if total <= 0 {
        return None;
    }
    let index = agenda.position(current_section?)?;

    let prior: i64 = agenda.sections()[..index]
        .iter()
        .map(|s| s.allocated_seconds())
        .sum();
    let current_allocation = agenda.sections()[index].allocated_seconds();
    let expected = prior + current_section_seconds.clamp(0, current_allocation);

    Some((active_duration_seconds - expected) as f64 / total as f64 * 100.0)
}

pub fn classify(
    agenda: &Agenda,
    current_section: Option<&str>,
    current_section_seconds: i64,
    active_duration_seconds: i64,
    thresholds: &PaceThresholds,
) -> Pace {
    match deviation_pct(
        agenda,
        current_section,
        current_section_seconds,
        active_duration_seconds,
    ) {
        Some(pct) if pct > thresholds.critical_pct => Pace::Critical,
        Some(pct) if pct > thresholds.behind_pct => Pace::Behind,
        Some(pct) if pct < -thresholds.ahead_pct => Pace::Ahead,
        _ => Pace::OnTrack,
    }
}
