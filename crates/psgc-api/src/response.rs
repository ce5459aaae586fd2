//! Response envelopes: `{data, count}`, with the resolved ancestor
//! embedded on hierarchical listings.

use psgc_core::{code::GeographicCode, entity::Entity};
use serde::Serialize;

/// The resolved ancestor of a hierarchical listing.
#[derive(Debug, Clone, Serialize)]
pub struct AncestorRef {
  pub code: GeographicCode,
  pub name: String,
}

impl From<&Entity> for AncestorRef {
  fn from(entity: &Entity) -> Self {
    Self {
      code: entity.code().clone(),
      name: entity.name().to_string(),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct ListEnvelope {
  pub data:     Vec<Entity>,
  pub count:    usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub ancestor: Option<AncestorRef>,
}

impl ListEnvelope {
  pub fn new(data: Vec<Entity>) -> Self {
    let count = data.len();
    Self { data, count, ancestor: None }
  }

  pub fn with_ancestor(data: Vec<Entity>, ancestor: AncestorRef) -> Self {
    let count = data.len();
    Self { data, count, ancestor: Some(ancestor) }
  }
}

#[derive(Debug, Serialize)]
pub struct ItemEnvelope {
  pub data:  Entity,
  pub count: usize,
}

impl ItemEnvelope {
  pub fn new(data: Entity) -> Self { Self { data, count: 1 } }
}
