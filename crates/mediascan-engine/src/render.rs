//! Rendering a [`ScanReport`] for people and for machines.
//!
//! [`render`] is a pure function: it reads the report and nothing else.
//! The result serialises to JSON and implements [`fmt::Display`] for the
//! console.

use std::fmt;

use chrono::{DateTime, Utc};
use mediascan_core::{
  classify::Category,
  location::Location,
  report::{Counts, RunStatus, ScanReport},
};
use serde::Serialize;

const RULE_WIDTH: usize = 80;

// ─── Structured output ───────────────────────────────────────────────────────

/// Counts and expected location for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
  pub category:          Category,
  pub expected_location: Location,
  pub total:             usize,
  #[serde(flatten)]
  pub counts:            Counts,
}

/// One previewed misplaced subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MisplacedPreview {
  pub subject_id:        String,
  pub display_name:      String,
  pub actual_location:   Location,
  pub expected_location: Location,
}

/// One previewed subject whose placement is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndeterminatePreview {
  pub subject_id:   String,
  pub display_name: String,
  pub unreachable:  Vec<Location>,
}

/// Rows of one category, capped at the preview limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group<T> {
  pub category: Category,
  pub count:    usize,
  pub preview:  Vec<T>,
  /// Rows left out of `preview`.
  pub more:     usize,
}

/// The rendered form of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedReport {
  pub status:         RunStatus,
  pub started_at:     DateTime<Utc>,
  pub finished_at:    Option<DateTime<Utc>>,
  pub total_subjects: usize,
  pub scanned:        usize,
  pub categories:     Vec<CategorySummary>,
  pub totals:         Counts,
  pub misplaced:      Vec<Group<MisplacedPreview>>,
  pub indeterminate:  Vec<Group<IndeterminatePreview>>,
}

/// Render `report`, showing at most `preview_limit` rows per category group.
pub fn render(report: &ScanReport, preview_limit: usize) -> RenderedReport {
  let categories = report
    .categories
    .iter()
    .map(|(category, tally)| CategorySummary {
      category:          *category,
      expected_location: tally.expected_location.clone(),
      total:             tally.counts.total(),
      counts:            tally.counts,
    })
    .collect();

  let misplaced = group(
    report.categories.keys().copied(),
    &report.misplaced,
    |row| row.category,
    preview_limit,
    |row| MisplacedPreview {
      subject_id:        row.subject_id.clone(),
      display_name:      row.display_name.clone(),
      actual_location:   row.actual_location.clone(),
      expected_location: row.expected_location.clone(),
    },
  );

  let indeterminate = group(
    report.categories.keys().copied(),
    &report.indeterminate,
    |row| row.category,
    preview_limit,
    |row| IndeterminatePreview {
      subject_id:   row.subject_id.clone(),
      display_name: row.display_name.clone(),
      unreachable:  row.unreachable.clone(),
    },
  );

  RenderedReport {
    status: report.status,
    started_at: report.started_at,
    finished_at: report.finished_at,
    total_subjects: report.total_subjects,
    scanned: report.scanned,
    categories,
    totals: report.totals(),
    misplaced,
    indeterminate,
  }
}

/// Split `rows` by category (in `order`), dropping empty groups.
fn group<R, T>(
  order: impl Iterator<Item = Category>,
  rows: &[R],
  category_of: impl Fn(&R) -> Category,
  limit: usize,
  preview: impl Fn(&R) -> T,
) -> Vec<Group<T>> {
  order
    .filter_map(|category| {
      let members: Vec<&R> = rows.iter().filter(|r| category_of(r) == category).collect();
      if members.is_empty() {
        return None;
      }
      let shown: Vec<T> = members.iter().take(limit).map(|r| preview(r)).collect();
      Some(Group {
        category,
        count: members.len(),
        more: members.len() - shown.len(),
        preview: shown,
      })
    })
    .collect()
}

// ─── Console output ──────────────────────────────────────────────────────────

fn upper(category: Category) -> String { category.to_string().to_uppercase() }

impl fmt::Display for RenderedReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let rule = "=".repeat(RULE_WIDTH);
    let status = match self.status {
      RunStatus::Running => "in progress",
      RunStatus::Complete => "complete",
      RunStatus::Cancelled => "cancelled, partial results",
    };

    writeln!(f, "{rule}")?;
    writeln!(f, "Media placement report ({status})")?;
    writeln!(f, "{rule}")?;
    writeln!(f, "Started:  {}", self.started_at.to_rfc3339())?;
    if let Some(at) = self.finished_at {
      writeln!(f, "Finished: {}", at.to_rfc3339())?;
    }
    writeln!(f, "Subjects: {} scanned of {}", self.scanned, self.total_subjects)?;

    writeln!(f)?;
    writeln!(f, "By category:")?;
    for c in &self.categories {
      writeln!(f, "  {} (expected location: {})", upper(c.category), c.expected_location)?;
      writeln!(
        f,
        "    total: {}  correct: {}  misplaced: {}  absent: {}  indeterminate: {}",
        c.total, c.counts.correct, c.counts.misplaced, c.counts.absent, c.counts.indeterminate,
      )?;
    }

    writeln!(f)?;
    writeln!(f, "Totals:")?;
    writeln!(
      f,
      "  correct: {}  misplaced: {}  absent: {}  indeterminate: {}",
      self.totals.correct, self.totals.misplaced, self.totals.absent, self.totals.indeterminate,
    )?;

    if !self.misplaced.is_empty() {
      writeln!(f)?;
      writeln!(f, "Misplaced ({}):", self.totals.misplaced)?;
      for g in &self.misplaced {
        writeln!(f, "  {} ({})", upper(g.category), g.count)?;
        for (i, row) in g.preview.iter().enumerate() {
          writeln!(f, "    {}. {} [{}]", i + 1, row.display_name, row.subject_id)?;
          writeln!(f, "       actual:   {}", row.actual_location)?;
          writeln!(f, "       expected: {}", row.expected_location)?;
        }
        if g.more > 0 {
          writeln!(f, "    ... +{} more", g.more)?;
        }
      }
    }

    if !self.indeterminate.is_empty() {
      writeln!(f)?;
      writeln!(f, "Could not determine ({}):", self.totals.indeterminate)?;
      for g in &self.indeterminate {
        writeln!(f, "  {} ({})", upper(g.category), g.count)?;
        for (i, row) in g.preview.iter().enumerate() {
          let unreachable: Vec<&str> = row.unreachable.iter().map(Location::as_str).collect();
          writeln!(f, "    {}. {} [{}]", i + 1, row.display_name, row.subject_id)?;
          writeln!(f, "       unreachable: {}", unreachable.join(", "))?;
        }
        if g.more > 0 {
          writeln!(f, "    ... +{} more", g.more)?;
        }
      }
    }

    if self.misplaced.is_empty() && self.indeterminate.is_empty() {
      writeln!(f)?;
      writeln!(f, "Every artifact found is in its expected location.")?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use mediascan_core::{
    finding::{Placement, ScanFinding},
    location::LocationTable,
    storage::Descriptor,
  };

  use super::*;
  use crate::Aggregator;

  fn misplaced(id: &str, category: Category, actual: &str) -> ScanFinding {
    let table = LocationTable::standard();
    ScanFinding {
      subject_id: id.into(),
      display_name: format!("Player {id}"),
      category,
      expected_location: table.expected_location(category).clone(),
      placement: Placement::Misplaced {
        actual_location: Location::from(actual),
        variant:         "jpg".into(),
        descriptor:      Descriptor::new(format!("{actual}/{id}.jpg")),
      },
    }
  }

  fn report_with(findings: Vec<ScanFinding>) -> ScanReport {
    let agg = Aggregator::new(&LocationTable::standard(), findings.len());
    for f in findings {
      agg.record(f);
    }
    agg.finish(RunStatus::Complete)
  }

  #[test]
  fn preview_is_capped_with_more_indicator() {
    let findings = (0..5)
      .map(|i| misplaced(&format!("t{i}"), Category::Trainer, "avatars"))
      .chain([misplaced("c0", Category::Club, "avatars")])
      .collect();
    let rendered = render(&report_with(findings), 3);

    assert_eq!(rendered.misplaced.len(), 2);
    let trainer = &rendered.misplaced[0];
    assert_eq!(trainer.category, Category::Trainer);
    assert_eq!(trainer.count, 5);
    assert_eq!(trainer.preview.len(), 3);
    assert_eq!(trainer.more, 2);
    assert_eq!(trainer.preview[0].subject_id, "t0");
    assert_eq!(trainer.preview[0].expected_location.as_str(), "playertrainer");

    let club = &rendered.misplaced[1];
    assert_eq!(club.count, 1);
    assert_eq!(club.more, 0);

    let text = rendered.to_string();
    assert!(text.contains("... +2 more"));
    assert!(text.contains("TRAINER (5)"));
    assert!(!text.contains("Every artifact found"));
  }

  #[test]
  fn totals_and_every_category_are_shown() {
    let rendered = render(&report_with(vec![misplaced("a", Category::Agent, "avatars")]), 3);
    assert_eq!(rendered.categories.len(), 5);
    assert_eq!(rendered.totals.misplaced, 1);
    assert_eq!(rendered.totals.total(), rendered.scanned);

    let agent = rendered
      .categories
      .iter()
      .find(|c| c.category == Category::Agent)
      .unwrap();
    assert_eq!(agent.expected_location.as_str(), "playeragent");
    assert_eq!(agent.total, 1);

    let text = rendered.to_string();
    assert!(text.contains("AGENT (expected location: playeragent)"));
    assert!(text.contains("Totals:"));
  }

  #[test]
  fn clean_report_says_so() {
    let rendered = render(&report_with(vec![]), 3);
    assert!(rendered.misplaced.is_empty());
    assert!(rendered.to_string().contains("Every artifact found is in its expected location."));
  }

  #[test]
  fn rendering_is_pure() {
    let report = report_with(vec![misplaced("x", Category::Club, "avatars")]);
    assert_eq!(render(&report, 2), render(&report, 2));
  }

  #[test]
  fn structured_output_serialises() {
    let report = report_with(vec![misplaced("x", Category::Club, "avatars")]);
    let json = serde_json::to_value(render(&report, 3)).unwrap();
    assert_eq!(json["status"], "complete");
    assert_eq!(json["misplaced"][0]["category"], "club");
    assert_eq!(json["misplaced"][0]["preview"][0]["actual_location"], "avatars");
    assert_eq!(json["totals"]["misplaced"], 1);
  }
}
