//! Code Grammar — the canonical 9-digit geographic code and its
//! positional rules.
//!
//! Every entity in the system is keyed by one of these codes. The grammar
//! is purely positional: the number of trailing zeros determines the
//! administrative level, and ancestor codes are prefixes padded back out
//! to nine digits.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── GeographicCode ──────────────────────────────────────────────────────────

/// A canonical 9-digit geographic code.
///
/// Always exactly nine ASCII digits and never all-zero. Construct through
/// [`GeographicCode::normalize`]; the parser owns every padding and
/// truncation rule, so a value of this type is guaranteed canonical.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct GeographicCode(String);

impl GeographicCode {
  /// Normalize a raw source value to canonical form.
  ///
  /// Strips non-digit characters, left-pads with zeros to nine digits,
  /// and truncates longer inputs to their first nine digits. One source
  /// format emits ten digits with a leading zero; the canonical form
  /// drops that zero, not the trailing digit. An empty or all-zero
  /// result is rejected — `000000000` denotes "no code", never a real
  /// entity.
  pub fn normalize(raw: &str) -> Result<Self> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
      return Err(Error::InvalidCode {
        raw:    raw.to_string(),
        reason: "no digits",
      });
    }

    let digits = match digits.len() {
      10 if digits.starts_with('0') => digits[1..].to_string(),
      n if n > 9 => digits[..9].to_string(),
      _ => digits,
    };

    let code = format!("{digits:0>9}");
    if code == "000000000" {
      return Err(Error::InvalidCode {
        raw:    raw.to_string(),
        reason: "all-zero code",
      });
    }
    Ok(Self(code))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for GeographicCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl TryFrom<String> for GeographicCode {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::normalize(&s) }
}

impl From<GeographicCode> for String {
  fn from(code: GeographicCode) -> Self { code.0 }
}

// ─── CodeShape ───────────────────────────────────────────────────────────────

/// The administrative level implied by a code's zero-suffix pattern.
///
/// Cities and municipalities share one shape; telling them apart takes
/// signals beyond the code itself (see [`crate::classify`]).
///
/// Variant order is ancestor-first, so the derived ordering can answer
/// "is `a` a strict ancestor level of `b`" as `a < b`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CodeShape {
  Region,
  Province,
  CityOrMunicipality,
  Barangay,
}

/// Classify a canonical code into its shape.
///
/// The four shapes are collectively exhaustive over nine-digit codes, so
/// the `UnclassifiableCode` arm is unreachable for any value produced by
/// [`GeographicCode::normalize`]. A hit means the canonical-form
/// invariant was broken upstream — a data-quality bug, not a skippable
/// condition.
pub fn classify(code: &GeographicCode) -> Result<CodeShape> {
  let d = code.as_str().as_bytes();
  if d.len() != 9 || !d.iter().all(u8::is_ascii_digit) {
    return Err(Error::UnclassifiableCode {
      code: code.to_string(),
    });
  }

  let shape = if d[2..].iter().all(|&b| b == b'0') {
    CodeShape::Region
  } else if d[4..].iter().all(|&b| b == b'0') {
    CodeShape::Province
  } else if d[6..].iter().all(|&b| b == b'0') {
    CodeShape::CityOrMunicipality
  } else {
    CodeShape::Barangay
  };
  Ok(shape)
}

/// Derive the ancestor code at `target` by positional truncation.
///
/// `target` must be a strict ancestor of the code's own shape: region
/// code = first two digits + seven zeros, province = first four + five
/// zeros, city/municipality = first six + three zeros.
pub fn parent_code(
  code: &GeographicCode,
  target: CodeShape,
) -> Result<GeographicCode> {
  let actual = classify(code)?;
  if target >= actual {
    return Err(Error::InvalidAncestorRequest { requested: target, actual });
  }

  let d = code.as_str();
  let truncated = match target {
    CodeShape::Region => format!("{}0000000", &d[..2]),
    CodeShape::Province => format!("{}00000", &d[..4]),
    CodeShape::CityOrMunicipality => format!("{}000", &d[..6]),
    // Guarded above: a barangay is never anyone's ancestor.
    CodeShape::Barangay => {
      return Err(Error::InvalidAncestorRequest { requested: target, actual });
    }
  };
  Ok(GeographicCode(truncated))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn code(s: &str) -> GeographicCode {
    GeographicCode::normalize(s).unwrap()
  }

  // ── normalize ───────────────────────────────────────────────────────────

  #[test]
  fn normalize_pads_short_codes() {
    assert_eq!(code("1234567").as_str(), "001234567");
    assert_eq!(code("13").as_str(), "000000013");
  }

  #[test]
  fn normalize_strips_non_digits() {
    assert_eq!(code("137-401-000").as_str(), "137401000");
    assert_eq!(code(" 137401000 ").as_str(), "137401000");
  }

  #[test]
  fn normalize_ten_digits_drops_leading_zero() {
    // Not the trailing digit.
    assert_eq!(code("0137401000").as_str(), "137401000");
  }

  #[test]
  fn normalize_ten_digits_without_leading_zero_keeps_first_nine() {
    assert_eq!(code("1374010001").as_str(), "137401000");
  }

  #[test]
  fn normalize_rejects_empty_and_all_zero() {
    assert!(GeographicCode::normalize("").is_err());
    assert!(GeographicCode::normalize("abc").is_err());
    assert!(GeographicCode::normalize("000000000").is_err());
    assert!(GeographicCode::normalize("0").is_err());
  }

  #[test]
  fn normalize_is_idempotent() {
    for raw in ["13", "0137401000", "042111001", "PSGC 137401000"] {
      let once = code(raw);
      let twice = GeographicCode::normalize(once.as_str()).unwrap();
      assert_eq!(once, twice);
    }
  }

  // ── classify ────────────────────────────────────────────────────────────

  #[test]
  fn classify_all_four_shapes() {
    assert_eq!(classify(&code("130000000")).unwrap(), CodeShape::Region);
    assert_eq!(classify(&code("137400000")).unwrap(), CodeShape::Province);
    assert_eq!(
      classify(&code("137401000")).unwrap(),
      CodeShape::CityOrMunicipality
    );
    assert_eq!(classify(&code("137401001")).unwrap(), CodeShape::Barangay);
  }

  #[test]
  fn classification_is_exclusive_over_shapes() {
    // Exactly one shape matches any canonical code.
    for raw in ["010000000", "012800000", "012801000", "012801001"] {
      let c = code(raw);
      let shape = classify(&c).unwrap();
      let matches = [
        CodeShape::Region,
        CodeShape::Province,
        CodeShape::CityOrMunicipality,
        CodeShape::Barangay,
      ]
      .iter()
      .filter(|&&s| s == shape)
      .count();
      assert_eq!(matches, 1);
    }
  }

  // ── parent_code ─────────────────────────────────────────────────────────

  #[test]
  fn parent_codes_are_positional() {
    let brgy = code("137401001");
    assert_eq!(
      parent_code(&brgy, CodeShape::CityOrMunicipality)
        .unwrap()
        .as_str(),
      "137401000"
    );
    assert_eq!(
      parent_code(&brgy, CodeShape::Province).unwrap().as_str(),
      "137400000"
    );
    assert_eq!(
      parent_code(&brgy, CodeShape::Region).unwrap().as_str(),
      "130000000"
    );
  }

  #[test]
  fn barangay_reaches_its_region_in_three_steps() {
    let mut current = code("042111001");
    let mut steps = 0;
    while classify(&current).unwrap() != CodeShape::Region {
      let shape = classify(&current).unwrap();
      let target = match shape {
        CodeShape::Barangay => CodeShape::CityOrMunicipality,
        CodeShape::CityOrMunicipality => CodeShape::Province,
        CodeShape::Province => CodeShape::Region,
        CodeShape::Region => unreachable!(),
      };
      current = parent_code(&current, target).unwrap();
      steps += 1;
    }
    assert_eq!(steps, 3);
    assert_eq!(current.as_str(), "040000000");
  }

  #[test]
  fn parent_code_rejects_non_ancestor_requests() {
    let region = code("130000000");
    assert!(matches!(
      parent_code(&region, CodeShape::Region),
      Err(Error::InvalidAncestorRequest { .. })
    ));
    assert!(matches!(
      parent_code(&region, CodeShape::Barangay),
      Err(Error::InvalidAncestorRequest { .. })
    ));
    let city = code("137401000");
    assert!(matches!(
      parent_code(&city, CodeShape::CityOrMunicipality),
      Err(Error::InvalidAncestorRequest { .. })
    ));
  }

  #[test]
  fn serde_round_trip_preserves_canonical_form() {
    let c = code("137401000");
    let json = serde_json::to_string(&c).unwrap();
    assert_eq!(json, "\"137401000\"");
    let back: GeographicCode = serde_json::from_str(&json).unwrap();
    assert_eq!(back, c);
    // Deserialization goes through normalize, so junk is rejected.
    assert!(serde_json::from_str::<GeographicCode>("\"000000000\"").is_err());
  }
}
