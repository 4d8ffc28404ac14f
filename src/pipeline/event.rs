use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One event flowing through the pipeline: a flat mapping from field name
/// to string value. Absence is explicit — `get` on an unset field returns
/// `None`, which is distinct from a present-but-empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct EventRecord {
    fields: BTreeMap<String, String>,
}

impl EventRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of field `name`, or `None` if unset. No side effects.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Upserts the field, overwriting any prior value. Visible to all
    /// subsequent `get` calls on this record.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
