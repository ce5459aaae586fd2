//! Merge/Dedup Engine — combine a reconciled baseline with
//! supplementary datasets.
//!
//! Code is the primary key. Anything already in the baseline stays
//! exactly as it is; a supplement never overwrites a baseline record on
//! the default path (an explicit operator merge mode would be a separate
//! feature). Supplement-only codes are added and reported.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::{
  code::GeographicCode,
  entity::{Entity, Level},
};

/// How many added codes [`MergeReport`]'s `Display` prints before
/// eliding the rest. The report itself always carries the full list.
const PREVIEW_LIMIT: usize = 20;

// ─── Report ──────────────────────────────────────────────────────────────────

/// One supplement-only entity admitted into the merged set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddedCode {
  pub level: Level,
  pub code:  GeographicCode,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
  /// Count of additions per level.
  pub added:    BTreeMap<Level, usize>,
  /// Every code that was missing in the baseline, uncapped.
  pub missing_in_baseline: Vec<AddedCode>,
  /// Supplement records discarded because the baseline already had the
  /// code.
  pub overlaps: usize,
}

impl fmt::Display for MergeReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(
      f,
      "merge: {} added, {} overlapping (baseline kept)",
      self.missing_in_baseline.len(),
      self.overlaps
    )?;
    for (level, count) in &self.added {
      writeln!(f, "  {level}: {count} added")?;
    }
    for added in self.missing_in_baseline.iter().take(PREVIEW_LIMIT) {
      writeln!(f, "  + {} ({})", added.code, added.level)?;
    }
    let hidden = self.missing_in_baseline.len().saturating_sub(PREVIEW_LIMIT);
    if hidden > 0 {
      writeln!(f, "  … and {hidden} more")?;
    }
    Ok(())
  }
}

/// The merged entity set plus its report.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
  /// Dependency-ordered, like reconciler output.
  pub entities: Vec<Entity>,
  pub report:   MergeReport,
}

// ─── Merge ───────────────────────────────────────────────────────────────────

/// Combine `baseline` with zero or more `supplements`, baseline winning
/// on every overlapping code. Both inputs are expected to be reconciled
/// already; merging preserves their invariants because it never mutates
/// an entity, only selects between them.
pub fn merge(
  baseline: Vec<Entity>,
  supplements: Vec<Vec<Entity>>,
) -> MergeOutcome {
  let mut by_code: BTreeMap<GeographicCode, Entity> = baseline
    .into_iter()
    .map(|e| (e.code().clone(), e))
    .collect();

  let mut report = MergeReport::default();

  for supplement in supplements {
    for entity in supplement {
      let code = entity.code().clone();
      if by_code.contains_key(&code) {
        report.overlaps += 1;
        continue;
      }
      *report.added.entry(entity.level()).or_default() += 1;
      report.missing_in_baseline.push(AddedCode {
        level: entity.level(),
        code:  code.clone(),
      });
      by_code.insert(code, entity);
    }
  }

  // Regroup into dependency order for the store write-through.
  let mut entities = Vec::with_capacity(by_code.len());
  for level in Level::IN_DEPENDENCY_ORDER {
    entities
      .extend(by_code.values().filter(|e| e.level() == level).cloned());
  }

  MergeOutcome { entities, report }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
