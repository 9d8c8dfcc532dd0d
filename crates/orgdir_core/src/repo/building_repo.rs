//! Building repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Serve the bounding-box range scan used as the geo pre-filter.
//! - List the full building catalogue.
//!
//! # Invariants
//! - Bounding-box predicates are inclusive on both axes.
//! - Results are ordered by `id ASC`.
//! - The box is used as given: no wraparound, no swapping of reversed
//!   bounds (a reversed box matches nothing).

use crate::geo::BoundingBox;
use crate::model::building::Building;
use crate::repo::error::RepoResult;
use crate::repo::schema::{ensure_connection_ready, BUILDINGS_TABLE};
use log::debug;
use rusqlite::{params, Connection, Row};

const BUILDING_SELECT_SQL: &str = "SELECT
    id,
    address,
    latitude,
    longitude,
    organization_id
FROM buildings";

/// Repository interface for building reads.
pub trait BuildingRepository {
    /// Lists every building.
    fn list_all(&self) -> RepoResult<Vec<Building>>;
    /// Lists buildings whose coordinates fall inside `bounds`.
    fn list_within_bounds(&self, bounds: &BoundingBox) -> RepoResult<Vec<Building>>;
}

/// SQLite-backed building repository.
pub struct SqliteBuildingRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBuildingRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[&BUILDINGS_TABLE])?;
        Ok(Self { conn })
    }
}

impl BuildingRepository for SqliteBuildingRepository<'_> {
    fn list_all(&self) -> RepoResult<Vec<Building>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BUILDING_SELECT_SQL} ORDER BY id ASC;"))?;
        let buildings = stmt
            .query_map([], parse_building_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(buildings)
    }

    fn list_within_bounds(&self, bounds: &BoundingBox) -> RepoResult<Vec<Building>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BUILDING_SELECT_SQL}
             WHERE latitude BETWEEN ?1 AND ?2
               AND longitude BETWEEN ?3 AND ?4
             ORDER BY id ASC;"
        ))?;
        let buildings = stmt
            .query_map(
                params![
                    bounds.min_latitude,
                    bounds.max_latitude,
                    bounds.min_longitude,
                    bounds.max_longitude,
                ],
                parse_building_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "event=buildings_within_bounds module=repo status=ok matched={}",
            buildings.len()
        );
        Ok(buildings)
    }
}

pub(crate) fn parse_building_row(row: &Row<'_>) -> rusqlite::Result<Building> {
    Ok(Building {
        id: row.get("id")?,
        address: row.get("address")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        organization_id: row.get("organization_id")?,
    })
}
