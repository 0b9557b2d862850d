//! Classification of subjects into placement categories.
//!
//! Classification runs in two steps. Alias resolution first collapses every
//! historical spelling of an affiliation field into a set of [`Affiliation`]s.
//! [`classify_affiliations`] then picks the highest-precedence one. Both steps
//! are pure functions of the subject snapshot.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::subject::Subject;

// ─── Affiliations ────────────────────────────────────────────────────────────

/// A kind of owning organisation a subject may reference.
///
/// Variants are declared in precedence order, highest first; the derived
/// `Ord` is the precedence.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Affiliation {
  Trainer,
  Club,
  Agent,
  Academy,
}

/// Every spelling under which each affiliation has been stored.
pub const AFFILIATION_ALIASES: &[(Affiliation, &[&str])] = &[
  (Affiliation::Trainer, &["trainer_id", "trainerId"]),
  (Affiliation::Club, &["club_id", "clubId"]),
  (Affiliation::Agent, &["agent_id", "agentId"]),
  (Affiliation::Academy, &["academy_id", "academyId"]),
];

// ─── Categories ──────────────────────────────────────────────────────────────

/// The placement bucket a subject belongs to.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Category {
  Independent,
  Trainer,
  Club,
  Agent,
  Academy,
}

impl From<Affiliation> for Category {
  fn from(a: Affiliation) -> Self {
    match a {
      Affiliation::Trainer => Self::Trainer,
      Affiliation::Club => Self::Club,
      Affiliation::Agent => Self::Agent,
      Affiliation::Academy => Self::Academy,
    }
  }
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// Whether a raw field value counts as a reference.
///
/// `null`, `false`, `0` and `""` are unset; any other string, number, `true`,
/// array or object is set.
pub fn is_set(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
    Value::String(s) => !s.is_empty(),
    Value::Array(_) | Value::Object(_) => true,
  }
}

/// Collapse all alias spellings into the set of affiliations present.
pub fn resolve_affiliations(subject: &Subject) -> BTreeSet<Affiliation> {
  AFFILIATION_ALIASES
    .iter()
    .filter(|(_, aliases)| {
      aliases
        .iter()
        .any(|alias| subject.field(alias).is_some_and(is_set))
    })
    .map(|(affiliation, _)| *affiliation)
    .collect()
}

/// Pick the category for an already-resolved affiliation set.
pub fn classify_affiliations(affiliations: &BTreeSet<Affiliation>) -> Category {
  affiliations
    .first()
    .copied()
    .map(Category::from)
    .unwrap_or(Category::Independent)
}

/// Derive the category of a subject. Total; never fails.
pub fn classify(subject: &Subject) -> Category {
  classify_affiliations(&resolve_affiliations(subject))
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use strum::IntoEnumIterator;

  use super::*;

  fn aliases_of(a: Affiliation) -> &'static [&'static str] {
    AFFILIATION_ALIASES
      .iter()
      .find(|(aff, _)| *aff == a)
      .map(|(_, aliases)| *aliases)
      .unwrap()
  }

  #[test]
  fn no_affiliation_is_independent() {
    assert_eq!(classify(&Subject::new("p")), Category::Independent);
  }

  #[test]
  fn every_alias_is_recognised() {
    for (affiliation, aliases) in AFFILIATION_ALIASES {
      for alias in *aliases {
        let s = Subject::new("p").with_field(alias, "org-1");
        assert_eq!(classify(&s), Category::from(*affiliation), "alias {alias}");
      }
    }
  }

  #[test]
  fn higher_precedence_wins_for_every_pair() {
    for high in Affiliation::iter() {
      for low in Affiliation::iter().filter(|low| *low > high) {
        for high_alias in aliases_of(high) {
          for low_alias in aliases_of(low) {
            let s = Subject::new("p")
              .with_field(low_alias, "low-org")
              .with_field(high_alias, "high-org");
            assert_eq!(
              classify(&s),
              Category::from(high),
              "{high_alias} vs {low_alias}"
            );
          }
        }
      }
    }
  }

  #[test]
  fn falsy_values_do_not_count() {
    for value in [json!(null), json!(""), json!(0), json!(false)] {
      let s = Subject::new("p")
        .with_field("trainer_id", value.clone())
        .with_field("clubId", "club-9");
      assert_eq!(classify(&s), Category::Club, "value {value}");
    }
  }

  #[test]
  fn truthy_non_strings_count() {
    for value in [json!(42), json!(true), json!({"ref": "x"}), json!([])] {
      let s = Subject::new("p").with_field("academyId", value.clone());
      assert_eq!(classify(&s), Category::Academy, "value {value}");
    }
  }

  #[test]
  fn classification_is_deterministic() {
    let s = Subject::new("p")
      .with_field("agent_id", "a")
      .with_field("academyId", "b")
      .with_field("full_name", "Someone");
    let first = classify(&s);
    for _ in 0..10 {
      assert_eq!(classify(&s), first);
    }
    assert_eq!(first, Category::Agent);
  }

  #[test]
  fn category_names_parse_back() {
    for c in Category::iter() {
      let name: &'static str = c.into();
      assert_eq!(name.parse::<Category>().unwrap(), c);
    }
  }
}
