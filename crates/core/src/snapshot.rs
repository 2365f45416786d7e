//! Dashboard snapshots.
//!
//! A [`DashboardSnapshot`] is the labelled summary the persistence layer
//! hands over with every question (total spent, per-category totals,
//! recent transactions). The assistant only ever sees it as text.

use serde_json::Value;

use crate::error::{AssistantError, Result};

/// Ordered label → value pairs. Iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSnapshot {
    entries: Vec<(String, String)>,
}

impl DashboardSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value. Re-inserting a label replaces its value in place.
    pub fn insert(&mut self, label: impl Into<String>, value: impl std::fmt::Display) {
        let label = label.into();
        let value = value.to_string();
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((label, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, label: impl Into<String>, value: impl std::fmt::Display) -> Self {
        self.insert(label, value);
        self
    }

    /// Build a snapshot from a JSON object, keeping document order.
    ///
    /// Nested objects render as `key: value` pairs joined by `, ` and
    /// arrays as items joined by `; `, so per-category totals and recent
    /// transactions stay readable on one line each.
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(AssistantError::invalid(
                "dashboard snapshot must be a JSON object of label/value pairs",
            ));
        };

        let entries = map
            .iter()
            .map(|(label, value)| (label.clone(), render_value(value)))
            .collect();
        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<L: Into<String>, V: std::fmt::Display> FromIterator<(L, V)> for DashboardSnapshot {
    fn from_iter<I: IntoIterator<Item = (L, V)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (label, value) in iter {
            snapshot.insert(label, value);
        }
        snapshot
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "n/a".into(),
        Value::String(s) => s.clone(),
        Value::Bool(_) | Value::Number(_) => value.to_string(),
        Value::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join("; "),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| format!("{k}: {}", render_value(v)))
            .collect::<Vec<_>>()
            .join(", "),
    }
}
