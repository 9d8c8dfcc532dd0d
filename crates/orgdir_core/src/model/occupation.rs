//! Occupation (category) domain model.
//!
//! # Invariants
//! - Occupations form a forest through the nullable `parent_id` column.
//! - A node is never its own parent.
//! - Names are unique among siblings sharing the same parent.

use crate::model::validation::{normalize_text, ValidationError};
use serde::{Deserialize, Serialize};

pub type OccupationId = i64;

/// Occupation read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupation {
    pub id: OccupationId,
    pub name: String,
    /// `None` marks a root node.
    pub parent_id: Option<OccupationId>,
}

impl Occupation {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Key used to order occupations inside one organization projection:
    /// root-level nodes first, then children grouped by parent.
    pub fn projection_order_key(&self) -> (OccupationId, OccupationId) {
        (self.parent_id.unwrap_or(0), self.id)
    }
}

/// Write model for inserting an occupation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOccupation {
    pub name: String,
    pub parent_id: Option<OccupationId>,
}

impl NewOccupation {
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_id: None,
        }
    }

    pub fn child(parent_id: OccupationId, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_id: Some(parent_id),
        }
    }

    pub fn validated(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: normalize_text("occupation name", &self.name)?,
            parent_id: self.parent_id,
        })
    }
}
