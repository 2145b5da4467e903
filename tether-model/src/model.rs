//! In-memory attribute model.
//!
//! # Design
//! A [`Model`] owns a JSON attribute mapping behind a lock and publishes
//! [`ChangeEvent`]s for every observable mutation. Mutating calls compare
//! against the current values first, so listeners only ever see attributes
//! that actually changed. Every mutating operation has a `_silent` variant
//! that skips event publication entirely.

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::debug;

use crate::events::{ChangeEvent, Emitter};

/// In-memory attribute model with change notification.
#[derive(Debug, Default)]
pub struct Model {
    attributes: RwLock<Map<String, Value>>,
    events: Emitter<ChangeEvent>,
}

impl Model {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a model seeded with the given attributes. No events fire.
    pub fn with_attributes(attributes: Map<String, Value>) -> Self {
        Self {
            attributes: RwLock::new(attributes),
            events: Emitter::new(),
        }
    }

    /// Get a clone of an attribute value.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.attributes.read().get(key).cloned()
    }

    /// Whether an attribute is present.
    pub fn contains(&self, key: &str) -> bool {
        self.attributes.read().contains_key(key)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.read().len()
    }

    /// Whether the model holds no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.read().is_empty()
    }

    /// Attribute keys, in map order.
    pub fn keys(&self) -> Vec<String> {
        self.attributes.read().keys().cloned().collect()
    }

    /// Set a single attribute, publishing change events if the value differs.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        let mut incoming = Map::new();
        incoming.insert(key.into(), value.into());
        self.apply_set(incoming, false);
    }

    /// Set a single attribute without publishing events.
    pub fn set_silent(&self, key: impl Into<String>, value: impl Into<Value>) {
        let mut incoming = Map::new();
        incoming.insert(key.into(), value.into());
        self.apply_set(incoming, true);
    }

    /// Merge a mapping of attributes, publishing one aggregate change event
    /// plus one keyed event per attribute whose value differs.
    pub fn set_many(&self, attributes: Map<String, Value>) {
        self.apply_set(attributes, false);
    }

    /// Merge a mapping of attributes without publishing events.
    pub fn set_many_silent(&self, attributes: Map<String, Value>) {
        self.apply_set(attributes, true);
    }

    /// Remove an attribute. Missing keys are a no-op and publish nothing.
    pub fn unset(&self, key: &str) {
        self.apply_unset(&[key], false);
    }

    /// Remove an attribute without publishing events.
    pub fn unset_silent(&self, key: &str) {
        self.apply_unset(&[key], true);
    }

    /// Remove several attributes at once.
    pub fn unset_many(&self, keys: &[&str]) {
        self.apply_unset(keys, false);
    }

    /// Remove several attributes without publishing events.
    pub fn unset_many_silent(&self, keys: &[&str]) {
        self.apply_unset(keys, true);
    }

    /// Clear all attributes, publishing one keyed event per removed
    /// attribute followed by [`ChangeEvent::Reset`].
    pub fn reset(&self) {
        self.apply_reset(false);
    }

    /// Clear all attributes without publishing events.
    pub fn reset_silent(&self) {
        self.apply_reset(true);
    }

    /// Add 1 to a numeric attribute. Missing or non-numeric values count
    /// from zero. Routed through [`Model::set`], so change events fire.
    pub fn increment(&self, key: &str) {
        self.increment_by(key, 1);
    }

    /// Add `amount` to a numeric attribute. Integer arithmetic is preserved
    /// when the current value is an integer.
    pub fn increment_by(&self, key: &str, amount: i64) {
        let current = self.get(key);
        let next = match current.as_ref().and_then(Value::as_i64) {
            Some(n) => Value::from(n + amount),
            None => match current.as_ref().and_then(Value::as_f64) {
                Some(f) => Value::from(f + amount as f64),
                None => Value::from(amount),
            },
        };
        self.set(key, next);
    }

    /// The attribute mapping as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(self.attributes.read().clone())
    }

    /// Subscribe to all change events on this model.
    pub fn on_change<F>(&self, listener: F)
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        self.events.on(listener);
    }

    /// Subscribe to changes of a single attribute. The listener receives
    /// the new value and the previous value, if any.
    pub fn on_change_key<F>(&self, key: impl Into<String>, listener: F)
    where
        F: Fn(&Value, Option<&Value>) + Send + Sync + 'static,
    {
        let key = key.into();
        self.events.on(move |event| {
            if let ChangeEvent::ChangedKey {
                key: changed,
                new,
                old,
            } = event
            {
                if *changed == key {
                    listener(new, old.as_ref());
                }
            }
        });
    }

    fn apply_set(&self, incoming: Map<String, Value>, silent: bool) {
        let mut changed: Vec<(String, Value, Option<Value>)> = Vec::new();
        {
            let mut attributes = self.attributes.write();
            for (key, value) in incoming {
                let old = attributes.get(&key).cloned();
                if old.as_ref() == Some(&value) {
                    continue;
                }
                attributes.insert(key.clone(), value.clone());
                changed.push((key, value, old));
            }
        }
        if silent || changed.is_empty() {
            return;
        }

        debug!(target: "tether::model", changed = changed.len(), "attributes changed");
        for (key, new, old) in &changed {
            self.events.emit(&ChangeEvent::ChangedKey {
                key: key.clone(),
                new: new.clone(),
                old: old.clone(),
            });
        }
        let changes: Map<String, Value> =
            changed.into_iter().map(|(key, new, _)| (key, new)).collect();
        self.events.emit(&ChangeEvent::Changed { changes });
    }

    fn apply_unset(&self, keys: &[&str], silent: bool) {
        let mut removed: Vec<(String, Value)> = Vec::new();
        {
            let mut attributes = self.attributes.write();
            for key in keys {
                if let Some(old) = attributes.remove(*key) {
                    removed.push(((*key).to_string(), old));
                }
            }
        }
        if silent || removed.is_empty() {
            return;
        }

        for (key, old) in &removed {
            self.events.emit(&ChangeEvent::ChangedKey {
                key: key.clone(),
                new: Value::Null,
                old: Some(old.clone()),
            });
        }
        let changes: Map<String, Value> = removed
            .into_iter()
            .map(|(key, _)| (key, Value::Null))
            .collect();
        self.events.emit(&ChangeEvent::Changed { changes });
    }

    fn apply_reset(&self, silent: bool) {
        let drained = std::mem::take(&mut *self.attributes.write());
        if silent {
            return;
        }

        debug!(target: "tether::model", removed = drained.len(), "attributes reset");
        for (key, old) in drained {
            self.events.emit(&ChangeEvent::ChangedKey {
                key,
                new: Value::Null,
                old: Some(old),
            });
        }
        self.events.emit(&ChangeEvent::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    fn collect_events(model: &Model) -> Arc<RwLock<Vec<ChangeEvent>>> {
        let seen = Arc::new(RwLock::new(Vec::new()));
        let sink = seen.clone();
        model.on_change(move |event| sink.write().push(event.clone()));
        seen
    }

    #[test]
    fn get_returns_set_value() {
        let model = Model::new();
        model.set("name", "Test name");
        assert_eq!(model.get("name"), Some(json!("Test name")));
        assert_eq!(model.get("missing"), None);
    }

    #[test]
    fn set_many_merges_into_existing_attributes() {
        let model = Model::new();
        model.set("name", "Test name");
        model.set_many(
            json!({ "placeOfBirth": "London" })
                .as_object()
                .unwrap()
                .clone(),
        );
        assert_eq!(
            model.to_json(),
            json!({ "name": "Test name", "placeOfBirth": "London" })
        );
    }

    #[test]
    fn change_event_carries_only_changed_attributes() {
        let model = Model::new();
        model.set_many(json!({ "foo": "bar", "bar": "baz" }).as_object().unwrap().clone());

        let seen = collect_events(&model);
        model.set_many(json!({ "foo": "bar", "bar": "changed" }).as_object().unwrap().clone());

        let events = seen.read();
        let aggregate = events
            .iter()
            .find_map(|e| match e {
                ChangeEvent::Changed { changes } => Some(changes.clone()),
                _ => None,
            })
            .expect("aggregate change event");
        assert_eq!(Value::Object(aggregate), json!({ "bar": "changed" }));
    }

    #[test]
    fn keyed_event_reports_new_and_old_values() {
        let model = Model::new();
        let seen = Arc::new(RwLock::new(Vec::new()));
        let sink = seen.clone();
        model.on_change_key("prop", move |new, old| {
            sink.write().push((new.clone(), old.cloned()));
        });

        model.set("prop", "value");
        model.set("prop", "newvalue");
        model.set("prop", "newvalue");

        assert_eq!(
            *seen.read(),
            vec![
                (json!("value"), None),
                (json!("newvalue"), Some(json!("value"))),
            ]
        );
    }

    #[test]
    fn setting_an_identical_value_publishes_nothing() {
        let model = Model::new();
        model.set("prop", "value");
        let seen = collect_events(&model);
        model.set("prop", "value");
        assert!(seen.read().is_empty());
    }

    #[test]
    fn silent_set_publishes_nothing() {
        let model = Model::new();
        let seen = collect_events(&model);
        model.set_silent("prop", "value");
        model.set_many_silent(json!({ "other": 1 }).as_object().unwrap().clone());
        assert!(seen.read().is_empty());
        assert_eq!(model.get("prop"), Some(json!("value")));
    }

    #[test]
    fn unset_removes_attributes() {
        let model = Model::new();
        model.set_many(json!({ "a": 1, "b": 2, "c": 3 }).as_object().unwrap().clone());

        model.unset("a");
        assert_eq!(model.to_json(), json!({ "b": 2, "c": 3 }));

        model.unset_many(&["b", "c"]);
        assert_eq!(model.to_json(), json!({}));
    }

    #[test]
    fn unset_of_missing_key_is_a_silent_no_op() {
        let model = Model::new();
        model.set("a", 1);
        let seen = collect_events(&model);
        model.unset("missing");
        assert!(seen.read().is_empty());
        assert_eq!(model.to_json(), json!({ "a": 1 }));
    }

    #[test]
    fn unset_publishes_removal_events() {
        let model = Model::new();
        model.set("a", 1);
        let seen = collect_events(&model);

        model.unset("a");

        let events = seen.read();
        assert!(events.iter().any(|e| matches!(
            e,
            ChangeEvent::ChangedKey { key, new: Value::Null, old: Some(old) }
                if key == "a" && *old == json!(1)
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            ChangeEvent::Changed { changes } if changes.get("a") == Some(&Value::Null)
        )));
    }

    #[test]
    fn reset_clears_attributes_and_publishes_reset() {
        let model = Model::new();
        model.set_many_silent(json!({ "name": "John", "age": 30 }).as_object().unwrap().clone());
        let seen = collect_events(&model);

        model.reset();

        assert_eq!(model.to_json(), json!({}));
        assert_eq!(model.get("name"), None);

        let events = seen.read();
        let keyed: Vec<&str> = events
            .iter()
            .filter_map(|e| match e {
                ChangeEvent::ChangedKey { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(keyed, vec!["age", "name"]);
        assert!(matches!(events.last(), Some(ChangeEvent::Reset)));
    }

    #[test]
    fn silent_reset_publishes_nothing() {
        let model = Model::new();
        model.set_silent("name", "John");
        let seen = collect_events(&model);
        model.reset_silent();
        assert!(seen.read().is_empty());
        assert!(model.is_empty());
    }

    #[test]
    fn increment_counts_from_zero_when_absent() {
        let model = Model::new();
        model.increment("value");
        assert_eq!(model.get("value"), Some(json!(1)));
    }

    #[test]
    fn increment_adds_to_existing_values() {
        let model = Model::new();
        model.set("value", 1);
        model.increment("value");
        assert_eq!(model.get("value"), Some(json!(2)));

        model.set("value", 10);
        model.increment_by("value", 10);
        assert_eq!(model.get("value"), Some(json!(20)));
    }

    #[test]
    fn increment_preserves_float_arithmetic() {
        let model = Model::new();
        model.set("value", 1.5);
        model.increment("value");
        assert_eq!(model.get("value"), Some(json!(2.5)));
    }

    #[test]
    fn to_json_matches_attributes() {
        let model = Model::with_attributes(
            json!({ "name": "Test name" }).as_object().unwrap().clone(),
        );
        assert_eq!(model.to_json(), json!({ "name": "Test name" }));
    }
}
