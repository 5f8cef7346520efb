//! Append-only activity timeline.

use super::event::ActivityEvent;
use serde::{Deserialize, Serialize};

/// Ordered narration of one assistant turn.
///
/// Insertion order is the backend's emission order. Entries are never
/// reordered, deduplicated or removed individually; the only way to shrink a
/// timeline is `reset`, which empties it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    events: Vec<ActivityEvent>,
}

impl Timeline {
    /// Creates an empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one event to the end of the timeline.
    pub fn append(&mut self, event: ActivityEvent) {
        self.events.push(event);
    }

    /// Clears the timeline.
    pub fn reset(&mut self) {
        self.events.clear();
    }

    /// Returns an owned copy suitable for archiving.
    pub fn snapshot(&self) -> Timeline {
        self.clone()
    }

    pub fn events(&self) -> &[ActivityEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ActivityEvent> {
        self.events.iter()
    }

    pub fn last(&self) -> Option<&ActivityEvent> {
        self.events.last()
    }
}

impl From<Vec<ActivityEvent>> for Timeline {
    fn from(events: Vec<ActivityEvent>) -> Self {
        Self { events }
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a ActivityEvent;
    type IntoIter = std::slice::Iter<'a, ActivityEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityTitle, classify_value};
    use serde_json::json;

    #[test]
    fn test_order_and_length_follow_recognized_events() {
        let raw = vec![
            json!({"generate_query": {"query_list": ["q1"]}}),
            json!({"__interrupt__": {}}),
            json!({"web_research": {"sources_gathered": [{"label": "A"}]}}),
            json!({"evaluate_research": "web_research"}),
            json!({"reflection": {"is_sufficient": true}}),
            json!({"finalize_answer": {}}),
        ];

        let mut timeline = Timeline::new();
        for value in &raw {
            if let Some(event) = classify_value(value).event {
                timeline.append(event);
            }
        }

        let titles: Vec<&ActivityTitle> = timeline.iter().map(|e| &e.title).collect();
        assert_eq!(timeline.len(), 4);
        assert_eq!(
            titles,
            vec![
                &ActivityTitle::GeneratingSearchQueries,
                &ActivityTitle::WebResearch,
                &ActivityTitle::Reflection,
                &ActivityTitle::FinalizingAnswer,
            ]
        );
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut timeline = Timeline::new();
        let event = ActivityEvent::new(ActivityTitle::WebResearch, "same");
        timeline.append(event.clone());
        timeline.append(event);

        assert_eq!(timeline.len(), 2);
    }

    #[test]
    fn test_reset_empties_timeline() {
        let mut timeline = Timeline::new();
        for i in 0..5 {
            timeline.append(ActivityEvent::new(
                ActivityTitle::Other("step".into()),
                format!("{}", i),
            ));
        }

        timeline.reset();
        assert!(timeline.is_empty());

        // Resetting an empty timeline is fine too.
        timeline.reset();
        assert_eq!(timeline.len(), 0);
    }

    #[test]
    fn test_snapshot_is_independent() {
        let mut timeline = Timeline::new();
        timeline.append(ActivityEvent::new(ActivityTitle::Reflection, "first"));

        let snapshot = timeline.snapshot();
        timeline.append(ActivityEvent::new(ActivityTitle::Reflection, "second"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(timeline.len(), 2);
    }
}
