//! Standards Validator — aggregate counts against the published PSA
//! reference totals.
//!
//! The reference figures are revised by the PSA over time, so they load
//! from configuration and are never compiled in. A discrepancy is a
//! normal reporting outcome, not an error; nothing in this module can
//! fail.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::Level;

// ─── Reference table ─────────────────────────────────────────────────────────

/// Expected count and allowed deviation for one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelStandard {
  pub expected:  u64,
  #[serde(default)]
  pub tolerance: u64,
}

/// The reference totals per level. Levels absent from the table are not
/// validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StandardsReference(pub BTreeMap<Level, LevelStandard>);

// ─── Findings ────────────────────────────────────────────────────────────────

/// How one level's actual count relates to the reference. Deltas are
/// `actual - expected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "delta", rename_all = "snake_case")]
pub enum CountFidelity {
  ExactMatch,
  WithinTolerance(i64),
  OutOfRange(i64),
}

impl fmt::Display for CountFidelity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CountFidelity::ExactMatch => f.write_str("exact match"),
      CountFidelity::WithinTolerance(delta) => {
        write!(f, "within tolerance ({delta:+})")
      }
      CountFidelity::OutOfRange(delta) => {
        write!(f, "out of range ({delta:+})")
      }
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StandardsFinding {
  pub level:     Level,
  pub actual:    u64,
  pub expected:  u64,
  pub tolerance: u64,
  pub fidelity:  CountFidelity,
}

impl fmt::Display for StandardsFinding {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}: {} of {} expected — {}",
      self.level, self.actual, self.expected, self.fidelity
    )
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

impl StandardsReference {
  /// Compare per-level counts to the reference. A level missing from
  /// `counts` is treated as zero.
  pub fn validate(
    &self,
    counts: &BTreeMap<Level, u64>,
  ) -> Vec<StandardsFinding> {
    self
      .0
      .iter()
      .map(|(&level, standard)| {
        let actual = counts.get(&level).copied().unwrap_or(0);
        let delta = actual as i64 - standard.expected as i64;
        let fidelity = if delta == 0 {
          CountFidelity::ExactMatch
        } else if delta.unsigned_abs() <= standard.tolerance {
          CountFidelity::WithinTolerance(delta)
        } else {
          CountFidelity::OutOfRange(delta)
        };
        StandardsFinding {
          level,
          actual,
          expected: standard.expected,
          tolerance: standard.tolerance,
          fidelity,
        }
      })
      .collect()
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn reference(entries: &[(Level, u64, u64)]) -> StandardsReference {
    StandardsReference(
      entries
        .iter()
        .map(|&(level, expected, tolerance)| {
          (level, LevelStandard { expected, tolerance })
        })
        .collect(),
    )
  }

  #[test]
  fn exact_match_is_reported_as_such() {
    let reference = reference(&[(Level::Region, 17, 0)]);
    let counts = BTreeMap::from([(Level::Region, 17)]);

    let findings = reference.validate(&counts);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].fidelity, CountFidelity::ExactMatch);
  }

  #[test]
  fn far_undercount_is_out_of_range() {
    let reference = reference(&[(Level::Barangay, 42011, 0)]);
    let counts = BTreeMap::from([(Level::Barangay, 490)]);

    let findings = reference.validate(&counts);
    assert_eq!(findings[0].fidelity, CountFidelity::OutOfRange(-41521));
  }

  #[test]
  fn tolerance_window_admits_small_deltas() {
    let reference = reference(&[(Level::City, 146, 3)]);

    let low = reference.validate(&BTreeMap::from([(Level::City, 144)]));
    assert_eq!(low[0].fidelity, CountFidelity::WithinTolerance(-2));

    let high = reference.validate(&BTreeMap::from([(Level::City, 150)]));
    assert_eq!(high[0].fidelity, CountFidelity::OutOfRange(4));
  }

  #[test]
  fn missing_counts_validate_as_zero() {
    let reference = reference(&[(Level::Province, 81, 0)]);
    let findings = reference.validate(&BTreeMap::new());
    assert_eq!(findings[0].actual, 0);
    assert_eq!(findings[0].fidelity, CountFidelity::OutOfRange(-81));
  }

  #[test]
  fn levels_absent_from_the_reference_are_not_validated() {
    let reference = reference(&[(Level::Region, 17, 0)]);
    let counts = BTreeMap::from([(Level::Region, 17), (Level::Barangay, 9)]);
    assert_eq!(reference.validate(&counts).len(), 1);
  }

  #[test]
  fn reference_deserializes_from_config_shaped_toml_keys() {
    let json = r#"{"region":{"expected":17},"barangay":{"expected":42011,"tolerance":5}}"#;
    let reference: StandardsReference = serde_json::from_str(json).unwrap();
    assert_eq!(
      reference.0.get(&Level::Region),
      Some(&LevelStandard { expected: 17, tolerance: 0 })
    );
    assert_eq!(
      reference.0.get(&Level::Barangay),
      Some(&LevelStandard { expected: 42011, tolerance: 5 })
    );
  }
}
