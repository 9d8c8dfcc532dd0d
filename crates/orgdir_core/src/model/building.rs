//! Building domain model.
//!
//! # Invariants
//! - Coordinates are finite and within `[-90, 90]` x `[-180, 180]`.
//! - Every building belongs to exactly one organization, and an
//!   organization owns at most one building.

use crate::geo::GeoPoint;
use crate::model::organization::OrganizationId;
use crate::model::validation::{
    normalize_text, validate_latitude, validate_longitude, ValidationError,
};
use serde::{Deserialize, Serialize};

pub type BuildingId = i64;

/// Building read model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: BuildingId,
    /// Free-text postal address.
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Owning organization (1:1).
    pub organization_id: OrganizationId,
}

impl Building {
    /// Returns the stored coordinates as a point.
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Write model for inserting a building.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBuilding {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub organization_id: OrganizationId,
}

impl NewBuilding {
    /// Validates coordinates and returns a copy with a trimmed address.
    pub fn validated(&self) -> Result<Self, ValidationError> {
        validate_latitude(self.latitude)?;
        validate_longitude(self.longitude)?;
        Ok(Self {
            address: normalize_text("address", &self.address)?,
            ..self.clone()
        })
    }
}
