use crate::source::Properties;

/// Detects property changes of the active document.
///
/// Holds the last seen snapshot of the document's properties. The first
/// observation after a [`reset`](ChangeTracker::reset) only records the
/// snapshot, since there is nothing to compare it with yet.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    previous: Option<Properties>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking another document, forgetting the previous snapshot.
    pub fn reset(&mut self, snapshot: Option<Properties>) {
        self.previous = snapshot;
    }

    /// Records `current` and reports whether it differs from the last snapshot.
    pub fn observe(&mut self, current: &Properties) -> bool {
        match &self.previous {
            None => {
                self.previous = Some(current.clone());
                false
            }
            Some(previous) if previous == current => false,
            Some(_) => {
                self.previous = Some(current.clone());
                true
            }
        }
    }

    pub fn snapshot(&self) -> Option<&Properties> {
        self.previous.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::json_to_value;
    use crate::value::Value;
    use serde_json::json;

    fn props(value: serde_json::Value) -> Properties {
        match json_to_value(value) {
            Value::Object(map) => map,
            _ => Properties::new(),
        }
    }

    #[test]
    fn first_observation_only_seeds() {
        let mut tracker = ChangeTracker::new();
        assert!(!tracker.observe(&props(json!({"a": 1}))));
        assert!(!tracker.observe(&props(json!({"a": 1}))));
        assert!(tracker.observe(&props(json!({"a": 2}))));
        assert!(!tracker.observe(&props(json!({"a": 2}))));
    }

    #[test]
    fn nested_changes_are_detected() {
        let mut tracker = ChangeTracker::new();
        tracker.reset(Some(props(json!({"list": [1, 2]}))));
        assert!(tracker.observe(&props(json!({"list": [1, 3]}))));
        assert_eq!(tracker.snapshot(), Some(&props(json!({"list": [1, 3]}))));
    }

    #[test]
    fn reset_forgets_the_previous_document() {
        let mut tracker = ChangeTracker::new();
        tracker.observe(&props(json!({"a": 1})));
        tracker.reset(None);
        assert!(!tracker.observe(&props(json!({"b": 1}))));
    }
}
