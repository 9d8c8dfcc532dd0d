//! Organization repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Resolve organizations by building ids, organization ids, occupation ids
//!   or name fragment.
//! - Assemble detail-complete projections (building, occupations, phones)
//!   with a fixed number of bulk queries per call.
//!
//! # Invariants
//! - Each organization appears at most once per result, however many of its
//!   occupations or buildings matched.
//! - Id-set lookups are ordered by organization `id ASC`; name search by
//!   `name ASC, id ASC`.
//! - Nested collections follow [`Organization::sort_nested`].
//! - Empty id sets return an empty result without touching storage.
//! - Id sets of any size are accepted; `IN (...)` lists are bound in chunks
//!   of `IN_LIST_CHUNK_SIZE`.

use crate::db::UNICODE_LOWER_FN;
use crate::model::building::BuildingId;
use crate::model::occupation::{Occupation, OccupationId};
use crate::model::organization::{Organization, OrganizationId};
use crate::model::phone_number::{PhoneNumber, PhoneNumberType};
use crate::repo::building_repo::parse_building_row;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::schema::{
    ensure_connection_ready, id_bind_values, int_to_bool, placeholders, BUILDINGS_TABLE,
    IN_LIST_CHUNK_SIZE, OCCUPATIONS_TABLE, ORGANIZATIONS_TABLE, ORGANIZATION_OCCUPATIONS_TABLE,
    PHONE_NUMBERS_TABLE,
};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::collections::{BTreeMap, BTreeSet};

/// Repository interface for detail-complete organization reads.
pub trait OrganizationRepository {
    /// Loads one organization by id.
    fn get_with_details(&self, id: OrganizationId) -> RepoResult<Option<Organization>>;
    /// Loads organizations by id; unknown ids are skipped.
    fn list_by_ids(&self, ids: &[OrganizationId]) -> RepoResult<Vec<Organization>>;
    /// Lists organizations owning any of the given buildings.
    fn list_by_building_ids(&self, building_ids: &[BuildingId]) -> RepoResult<Vec<Organization>>;
    /// Lists organizations linked to any of the given occupations.
    fn list_by_occupation_ids(
        &self,
        occupation_ids: &[OccupationId],
    ) -> RepoResult<Vec<Organization>>;
    /// Case-insensitive substring search on trimmed `query`.
    ///
    /// `limit` of `None` or `Some(0)` returns every match.
    fn search_by_name(&self, query: &str, limit: Option<u32>) -> RepoResult<Vec<Organization>>;

    /// Lists organizations owning one building.
    fn list_by_building_id(&self, building_id: BuildingId) -> RepoResult<Vec<Organization>> {
        self.list_by_building_ids(&[building_id])
    }
}

/// SQLite-backed organization repository.
pub struct SqliteOrganizationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOrganizationRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[
                &ORGANIZATIONS_TABLE,
                &BUILDINGS_TABLE,
                &OCCUPATIONS_TABLE,
                &ORGANIZATION_OCCUPATIONS_TABLE,
                &PHONE_NUMBERS_TABLE,
            ],
        )?;
        Ok(Self { conn })
    }

    fn matching_ids(&self, sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<OrganizationId>> {
        let mut stmt = self.conn.prepare(sql)?;
        let ids = stmt
            .query_map(params_from_iter(bind_values), |row| {
                row.get::<_, OrganizationId>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    /// Runs `sql_for(marks)` once per chunk of `bind_values` and merges the
    /// resulting organization ids in ascending order.
    fn matching_ids_chunked(
        &self,
        bind_values: &[Value],
        sql_for: impl Fn(&str) -> String,
    ) -> RepoResult<Vec<OrganizationId>> {
        let mut ids = BTreeSet::new();
        for chunk in bind_values.chunks(IN_LIST_CHUNK_SIZE) {
            let sql = sql_for(&placeholders(chunk.len()));
            ids.extend(self.matching_ids(&sql, chunk.to_vec())?);
        }
        Ok(ids.into_iter().collect())
    }
}

impl OrganizationRepository for SqliteOrganizationRepository<'_> {
    fn get_with_details(&self, id: OrganizationId) -> RepoResult<Option<Organization>> {
        Ok(load_organizations(self.conn, &[id])?.into_iter().next())
    }

    fn list_by_ids(&self, ids: &[OrganizationId]) -> RepoResult<Vec<Organization>> {
        let ordered_ids = ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();
        load_organizations(self.conn, &ordered_ids)
    }

    fn list_by_building_ids(&self, building_ids: &[BuildingId]) -> RepoResult<Vec<Organization>> {
        let bind_values = id_bind_values(building_ids.iter().copied());
        if bind_values.is_empty() {
            return Ok(Vec::new());
        }

        let org_ids = self.matching_ids_chunked(&bind_values, |marks| {
            format!(
                "SELECT DISTINCT organization_id
                 FROM buildings
                 WHERE id IN ({marks});"
            )
        })?;
        let organizations = load_organizations(self.conn, &org_ids)?;
        debug!(
            "event=organizations_by_buildings module=repo status=ok buildings={} matched={}",
            building_ids.len(),
            organizations.len()
        );
        Ok(organizations)
    }

    fn list_by_occupation_ids(
        &self,
        occupation_ids: &[OccupationId],
    ) -> RepoResult<Vec<Organization>> {
        let bind_values = id_bind_values(occupation_ids.iter().copied());
        if bind_values.is_empty() {
            return Ok(Vec::new());
        }

        let org_ids = self.matching_ids_chunked(&bind_values, |marks| {
            format!(
                "SELECT DISTINCT org_id
                 FROM organization_occupations
                 WHERE occupation_id IN ({marks});"
            )
        })?;
        let organizations = load_organizations(self.conn, &org_ids)?;
        debug!(
            "event=organizations_by_occupations module=repo status=ok occupations={} matched={}",
            occupation_ids.len(),
            organizations.len()
        );
        Ok(organizations)
    }

    fn search_by_name(&self, query: &str, limit: Option<u32>) -> RepoResult<Vec<Organization>> {
        let needle = query.trim().to_lowercase();
        let mut sql = format!(
            "SELECT id
             FROM organizations
             WHERE instr({UNICODE_LOWER_FN}(name), ?) > 0
             ORDER BY name ASC, id ASC"
        );
        let mut bind_values = vec![Value::Text(needle)];
        if let Some(limit) = limit.filter(|value| *value > 0) {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let org_ids = self.matching_ids(&sql, bind_values)?;
        let organizations = load_organizations(self.conn, &org_ids)?;
        debug!(
            "event=organizations_search_by_name module=repo status=ok matched={}",
            organizations.len()
        );
        Ok(organizations)
    }
}

/// Loads detail-complete organizations, keeping the order of `ordered_ids`.
fn load_organizations(
    conn: &Connection,
    ordered_ids: &[OrganizationId],
) -> RepoResult<Vec<Organization>> {
    let bind_values = id_bind_values(ordered_ids.iter().copied());
    let mut by_id: BTreeMap<OrganizationId, Organization> = BTreeMap::new();
    for chunk in bind_values.chunks(IN_LIST_CHUNK_SIZE) {
        load_organization_chunk(conn, chunk, &mut by_id)?;
    }

    let organizations = ordered_ids
        .iter()
        .filter_map(|id| by_id.remove(id))
        .map(|mut organization| {
            organization.sort_nested();
            organization
        })
        .collect();
    Ok(organizations)
}

/// Loads one chunk of organizations with their buildings, occupations and
/// phones into `by_id`.
fn load_organization_chunk(
    conn: &Connection,
    bind_values: &[Value],
    by_id: &mut BTreeMap<OrganizationId, Organization>,
) -> RepoResult<()> {
    let marks = placeholders(bind_values.len());

    let mut stmt = conn.prepare(&format!(
        "SELECT id, name
         FROM organizations
         WHERE id IN ({marks});"
    ))?;
    let mut rows = stmt.query(params_from_iter(bind_values.iter()))?;
    let mut loaded = 0_usize;
    while let Some(row) = rows.next()? {
        let id: OrganizationId = row.get("id")?;
        by_id.insert(id, Organization::bare(id, row.get::<_, String>("name")?));
        loaded += 1;
    }
    if loaded == 0 {
        return Ok(());
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT id, address, latitude, longitude, organization_id
         FROM buildings
         WHERE organization_id IN ({marks});"
    ))?;
    let mut rows = stmt.query(params_from_iter(bind_values.iter()))?;
    while let Some(row) = rows.next()? {
        let building = parse_building_row(row)?;
        let owner = owner_of(by_id, building.organization_id, "buildings")?;
        if owner.building.is_some() {
            return Err(RepoError::InvalidData(format!(
                "organization {} owns more than one building",
                building.organization_id
            )));
        }
        owner.building = Some(building);
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT
            oo.org_id AS org_id,
            o.id AS id,
            o.name AS name,
            o.parent_id AS parent_id
         FROM organization_occupations oo
         INNER JOIN occupations o ON o.id = oo.occupation_id
         WHERE oo.org_id IN ({marks});"
    ))?;
    let mut rows = stmt.query(params_from_iter(bind_values.iter()))?;
    while let Some(row) = rows.next()? {
        let org_id: OrganizationId = row.get("org_id")?;
        let occupation = Occupation {
            id: row.get("id")?,
            name: row.get("name")?,
            parent_id: row.get("parent_id")?,
        };
        owner_of(by_id, org_id, "organization_occupations")?
            .occupations
            .push(occupation);
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT id, value, is_primary, type, comment, organization_id
         FROM phone_numbers
         WHERE organization_id IN ({marks});"
    ))?;
    let mut rows = stmt.query(params_from_iter(bind_values.iter()))?;
    while let Some(row) = rows.next()? {
        let org_id: OrganizationId = row.get("organization_id")?;
        let phone = parse_phone_row(row)?;
        owner_of(by_id, org_id, "phone_numbers")?.phones.push(phone);
    }
    Ok(())
}

fn owner_of<'a>(
    by_id: &'a mut BTreeMap<OrganizationId, Organization>,
    org_id: OrganizationId,
    table: &'static str,
) -> RepoResult<&'a mut Organization> {
    by_id.get_mut(&org_id).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "row in {table} references unloaded organization {org_id}"
        ))
    })
}

fn parse_phone_row(row: &Row<'_>) -> RepoResult<PhoneNumber> {
    let type_text: String = row.get("type")?;
    let kind = PhoneNumberType::parse(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid phone type `{type_text}` in phone_numbers.type"
        ))
    })?;

    Ok(PhoneNumber {
        id: row.get("id")?,
        value: row.get("value")?,
        is_primary: int_to_bool(row.get("is_primary")?, "phone_numbers.is_primary")?,
        kind,
        comment: row.get("comment")?,
    })
}
