//! One managed record (e.g. a player) as read from the database.
//!
//! The scanner only ever reads subjects. Fields are kept as the raw document
//! so that historical spellings of the same field survive until alias
//! resolution.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A read-only snapshot of one subject record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
  pub id:     String,
  #[serde(default)]
  pub fields: Map<String, Value>,
}

impl Subject {
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id:     id.into(),
      fields: Map::new(),
    }
  }

  /// Builder-style field setter, mostly for seeding and tests.
  pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
    self.fields.insert(name.to_owned(), value.into());
    self
  }

  pub fn field(&self, name: &str) -> Option<&Value> { self.fields.get(name) }

  /// Human-facing label: `full_name`, then `name`, then the id.
  pub fn display_name(&self) -> &str {
    ["full_name", "name"]
      .iter()
      .filter_map(|key| self.fields.get(*key).and_then(Value::as_str))
      .find(|s| !s.trim().is_empty())
      .unwrap_or(&self.id)
  }
}
