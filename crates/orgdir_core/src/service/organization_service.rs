//! Organization directory use-case service.
//!
//! # Responsibility
//! - Compose building, occupation and organization repositories into the
//!   directory read use-cases.
//! - Refine bounding-box candidates into exact radius matches.
//! - Cap occupation subtree expansion depth.
//!
//! # Invariants
//! - All operations are read-only.
//! - Storage errors are returned unchanged; no retries.
//! - "Not found" is an empty list, or `None` for the single-id lookup.

use crate::geo::{haversine_distance_meters, BoundingBox, GeoPoint};
use crate::model::building::{Building, BuildingId};
use crate::model::occupation::OccupationId;
use crate::model::organization::{Organization, OrganizationArea, OrganizationId};
use crate::repo::building_repo::{BuildingRepository, SqliteBuildingRepository};
use crate::repo::error::RepoResult;
use crate::repo::occupation_repo::{OccupationRepository, SqliteOccupationRepository};
use crate::repo::organization_repo::{OrganizationRepository, SqliteOrganizationRepository};
use log::debug;
use rusqlite::Connection;
use std::collections::BTreeSet;
use std::time::Instant;

/// Depth cap applied to occupation subtree lookups.
pub const MAX_OCCUPATION_DEPTH: u32 = 3;

/// Directory read service facade.
pub struct OrganizationService<O, B, C>
where
    O: OrganizationRepository,
    B: BuildingRepository,
    C: OccupationRepository,
{
    organizations: O,
    buildings: B,
    occupations: C,
}

/// Service wired to SQLite repositories sharing one connection.
pub type SqliteOrganizationService<'conn> = OrganizationService<
    SqliteOrganizationRepository<'conn>,
    SqliteBuildingRepository<'conn>,
    SqliteOccupationRepository<'conn>,
>;

impl<'conn> SqliteOrganizationService<'conn> {
    /// Builds the service from a migrated connection.
    pub fn try_from_connection(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self::new(
            SqliteOrganizationRepository::try_new(conn)?,
            SqliteBuildingRepository::try_new(conn)?,
            SqliteOccupationRepository::try_new(conn)?,
        ))
    }
}

impl<O, B, C> OrganizationService<O, B, C>
where
    O: OrganizationRepository,
    B: BuildingRepository,
    C: OccupationRepository,
{
    /// Creates service from repository implementations.
    pub fn new(organizations: O, buildings: B, occupations: C) -> Self {
        Self {
            organizations,
            buildings,
            occupations,
        }
    }

    /// Loads one organization with building, occupations and phones.
    pub fn get_organization(&self, id: OrganizationId) -> RepoResult<Option<Organization>> {
        self.organizations.get_with_details(id)
    }

    /// Lists organizations located in one building.
    pub fn list_by_building(&self, building_id: BuildingId) -> RepoResult<Vec<Organization>> {
        self.organizations.list_by_building_id(building_id)
    }

    /// Lists organizations linked to exactly `occupation_id`.
    pub fn list_by_occupation(
        &self,
        occupation_id: OccupationId,
    ) -> RepoResult<Vec<Organization>> {
        self.organizations.list_by_occupation_ids(&[occupation_id])
    }

    /// Lists organizations linked to `occupation_id` or any descendant.
    ///
    /// Effective depth is `min(max_depth, MAX_OCCUPATION_DEPTH)`, or the cap
    /// when no depth is requested.
    pub fn list_by_occupation_tree(
        &self,
        occupation_id: OccupationId,
        max_depth: Option<u32>,
    ) -> RepoResult<Vec<Organization>> {
        let depth = effective_occupation_depth(max_depth);
        let occupation_ids = self
            .occupations
            .descendant_ids(occupation_id, Some(depth), true)?
            .into_iter()
            .collect::<Vec<_>>();
        let organizations = self.organizations.list_by_occupation_ids(&occupation_ids)?;
        debug!(
            "event=organizations_by_occupation_tree module=service status=ok occupation_id={} depth={} occupations={} matched={}",
            occupation_id,
            depth,
            occupation_ids.len(),
            organizations.len()
        );
        Ok(organizations)
    }

    /// Subtree lookup at the maximum supported depth.
    pub fn search_by_occupation_hierarchy(
        &self,
        occupation_id: OccupationId,
    ) -> RepoResult<Vec<Organization>> {
        self.list_by_occupation_tree(occupation_id, Some(MAX_OCCUPATION_DEPTH))
    }

    /// Case-insensitive name substring search ordered by name.
    pub fn search_by_name(&self, query: &str, limit: Option<u32>) -> RepoResult<Vec<Organization>> {
        self.organizations.search_by_name(query, limit)
    }

    pub fn list_buildings(&self) -> RepoResult<Vec<Building>> {
        self.buildings.list_all()
    }

    /// Lists buildings within `radius_meters` great-circle distance.
    pub fn list_buildings_within_radius(
        &self,
        center: GeoPoint,
        radius_meters: f64,
    ) -> RepoResult<Vec<Building>> {
        self.fetch_buildings_within_radius(center, radius_meters)
    }

    /// Lists buildings inside an inclusive bounding box.
    ///
    /// Callers must pass a well-formed box (`min <= max` on both axes).
    pub fn list_buildings_within_bounds(&self, bounds: &BoundingBox) -> RepoResult<Vec<Building>> {
        self.buildings.list_within_bounds(bounds)
    }

    /// Lists buildings within a radius together with their organizations.
    pub fn list_organizations_within_radius(
        &self,
        center: GeoPoint,
        radius_meters: f64,
    ) -> RepoResult<OrganizationArea> {
        let buildings = self.fetch_buildings_within_radius(center, radius_meters)?;
        self.pair_with_organizations(buildings)
    }

    /// Lists buildings inside a bounding box together with their organizations.
    pub fn list_organizations_within_bounds(
        &self,
        bounds: &BoundingBox,
    ) -> RepoResult<OrganizationArea> {
        let buildings = self.buildings.list_within_bounds(bounds)?;
        self.pair_with_organizations(buildings)
    }

    fn fetch_buildings_within_radius(
        &self,
        center: GeoPoint,
        radius_meters: f64,
    ) -> RepoResult<Vec<Building>> {
        let started_at = Instant::now();
        let bounds = BoundingBox::around(center, radius_meters);
        let candidates = self.buildings.list_within_bounds(&bounds)?;
        let candidate_count = candidates.len();
        let matched = refine_within_radius(center, radius_meters, candidates);
        debug!(
            "event=buildings_within_radius module=service status=ok radius_m={} candidates={} matched={} duration_ms={}",
            radius_meters,
            candidate_count,
            matched.len(),
            started_at.elapsed().as_millis()
        );
        Ok(matched)
    }

    fn pair_with_organizations(&self, buildings: Vec<Building>) -> RepoResult<OrganizationArea> {
        let organization_ids = buildings
            .iter()
            .map(|building| building.organization_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        let organizations = self.organizations.list_by_ids(&organization_ids)?;
        Ok(OrganizationArea {
            organizations,
            buildings,
        })
    }
}

/// Keeps candidates whose haversine distance from `center` is within radius.
pub fn refine_within_radius(
    center: GeoPoint,
    radius_meters: f64,
    candidates: Vec<Building>,
) -> Vec<Building> {
    candidates
        .into_iter()
        .filter(|building| haversine_distance_meters(center, building.location()) <= radius_meters)
        .collect()
}

/// Applies the subtree depth cap.
pub fn effective_occupation_depth(requested: Option<u32>) -> u32 {
    requested.map_or(MAX_OCCUPATION_DEPTH, |depth| depth.min(MAX_OCCUPATION_DEPTH))
}

#[cfg(test)]
mod tests {
    use super::{effective_occupation_depth, refine_within_radius, MAX_OCCUPATION_DEPTH};
    use crate::geo::GeoPoint;
    use crate::model::building::Building;

    fn building(id: i64, latitude: f64, longitude: f64) -> Building {
        Building {
            id,
            address: format!("address {id}"),
            latitude,
            longitude,
            organization_id: id,
        }
    }

    #[test]
    fn depth_defaults_to_cap_and_never_exceeds_it() {
        assert_eq!(effective_occupation_depth(None), MAX_OCCUPATION_DEPTH);
        assert_eq!(effective_occupation_depth(Some(1)), 1);
        assert_eq!(effective_occupation_depth(Some(10)), MAX_OCCUPATION_DEPTH);
    }

    #[test]
    fn refine_drops_box_corners_outside_circle() {
        let center = GeoPoint::new(55.7497, 37.5951);
        // ~1 m away, and a box corner roughly 700 m away diagonally.
        let near = building(1, 55.749709, 37.595149);
        let corner = building(2, 55.7497 + 0.0045, 37.5951 + 0.0079);

        let kept = refine_within_radius(center, 500.0, vec![near.clone(), corner]);
        assert_eq!(kept, vec![near]);
    }
}
