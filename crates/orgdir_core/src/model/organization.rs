//! Organization domain model and detail-complete projection.
//!
//! # Invariants
//! - `name` is globally unique.
//! - Nested `occupations` are ordered by `(parent_id or 0, id)` ascending.
//! - Nested `phones` are ordered primary-first, then by `id` ascending.

use crate::model::building::Building;
use crate::model::occupation::Occupation;
use crate::model::phone_number::PhoneNumber;
use crate::model::validation::{normalize_text, ValidationError};
use serde::{Deserialize, Serialize};

pub type OrganizationId = i64;

/// Detail-complete organization projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
    pub building: Option<Building>,
    pub occupations: Vec<Occupation>,
    pub phones: Vec<PhoneNumber>,
}

impl Organization {
    /// Creates a projection with no nested data yet attached.
    pub fn bare(id: OrganizationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            building: None,
            occupations: Vec::new(),
            phones: Vec::new(),
        }
    }

    /// Re-applies the deterministic nested ordering.
    pub fn sort_nested(&mut self) {
        self.occupations
            .sort_by_key(Occupation::projection_order_key);
        self.phones
            .sort_by_key(|phone| (!phone.is_primary, phone.id));
    }
}

/// Paired result of an area (radius or bounding-box) query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrganizationArea {
    pub organizations: Vec<Organization>,
    pub buildings: Vec<Building>,
}

/// Normalizes an organization name for insertion.
pub fn validate_organization_name(name: &str) -> Result<String, ValidationError> {
    normalize_text("organization name", name)
}

#[cfg(test)]
mod tests {
    use super::Organization;
    use crate::model::occupation::Occupation;
    use crate::model::phone_number::{PhoneNumber, PhoneNumberType};

    fn occupation(id: i64, parent_id: Option<i64>) -> Occupation {
        Occupation {
            id,
            name: format!("occ-{id}"),
            parent_id,
        }
    }

    fn phone(id: i64, is_primary: bool) -> PhoneNumber {
        PhoneNumber {
            id,
            value: format!("+7000{id}"),
            is_primary,
            kind: PhoneNumberType::Work,
            comment: None,
        }
    }

    #[test]
    fn sort_nested_groups_roots_before_children() {
        let mut org = Organization::bare(1, "Org");
        org.occupations = vec![
            occupation(7, Some(3)),
            occupation(4, Some(1)),
            occupation(3, None),
            occupation(2, Some(1)),
            occupation(1, None),
        ];

        org.sort_nested();

        let ids: Vec<i64> = org.occupations.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1, 3, 2, 4, 7]);
    }

    #[test]
    fn sort_nested_puts_primary_phone_first() {
        let mut org = Organization::bare(1, "Org");
        org.phones = vec![phone(5, false), phone(9, true), phone(2, false)];

        org.sort_nested();

        let ids: Vec<i64> = org.phones.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![9, 2, 5]);
    }
}
