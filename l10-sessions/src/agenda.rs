//! Agenda configuration
//!
//! Each meeting type has an ordered list of sections with planned durations.
//! Section identifiers coming from clients are resolved against the agenda:
//! exact id first, then the alias table.

use l10_common::api::AgendaSection;
use std::collections::HashMap;

/// Client-side section names and the canonical ids they map to
const SECTION_ALIASES: &[(&str, &str)] = &[
    ("good-news", "segue"),
    ("good_news", "segue"),
    ("priorities", "rock_review"),
    ("priority", "rock_review"),
    ("rocks", "rock_review"),
    ("rock", "rock_review"),
    ("todo-list", "todos"),
    ("todo_list", "todos"),
    ("todo", "todos"),
    ("issues", "ids"),
    ("issue", "ids"),
    ("problems", "ids"),
    ("problem", "ids"),
];

/// The standard Level 10 agenda (90 minutes)
pub fn default_level_10_sections() -> Vec<AgendaSection> {
    vec![
        AgendaSection::new("segue", "Segue", 5),
        AgendaSection::new("scorecard", "Scorecard", 5),
        AgendaSection::new("rock_review", "Rock Review", 5),
        AgendaSection::new("headlines", "Customer/Employee Headlines", 5),
        AgendaSection::new("todos", "To-Do List", 5),
        AgendaSection::new("ids", "IDS", 60),
        AgendaSection::new("conclude", "Conclude", 5),
    ]
}

/// Ordered sections of one meeting type
#[derive(Debug, Clone, PartialEq)]
pub struct Agenda {
    sections: Vec<AgendaSection>,
}

impl Agenda {
    pub fn new(sections: Vec<AgendaSection>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[AgendaSection] {
        &self.sections
    }

    /// Resolve a client-supplied section identifier to its agenda entry
    pub fn resolve(&self, raw: &str) -> Option<&AgendaSection> {
        let key = raw.trim();
        if let Some(section) = self.sections.iter().find(|s| s.id == key) {
            return Some(section);
        }

        let lowered = key.to_ascii_lowercase();
        let canonical = SECTION_ALIASES
            .iter()
            .find(|(alias, _)| *alias == lowered)
            .map(|(_, id)| *id)
            .unwrap_or(lowered.as_str());
        self.sections.iter().find(|s| s.id == canonical)
    }

    /// Position of a canonical section id in the agenda
    pub fn position(&self, section_id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == section_id)
    }

    pub fn total_planned_seconds(&self) -> i64 {
        self.sections.iter().map(AgendaSection::allocated_seconds).sum()
    }
}

impl Default for Agenda {
    fn default() -> Self {
        Self::new(default_level_10_sections())
    }
}

/// Agendas by meeting type, falling back to the Level 10 default
#[derive(Debug, Clone, Default)]
pub struct AgendaConfig {
    overrides: HashMap<String, Agenda>,
    default: Agenda,
}

impl AgendaConfig {
    pub fn new(overrides: HashMap<String, Vec<AgendaSection>>) -> Self {
        Self {
            overrides: overrides
                .into_iter()
                .map(|(meeting_type, sections)| (meeting_type, Agenda::new(sections)))
                .collect(),
            default: Agenda::default(),
        }
    }

    pub fn for_meeting_type(&self, meeting_type: &str) -> &Agenda {
        self.overrides.get(meeting_type).unwrap_or(&self.default)
    }
}
