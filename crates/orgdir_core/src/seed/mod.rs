//! Administrative writes for populating the directory.
//!
//! # Responsibility
//! - Insert organizations, buildings, occupations, links and phone numbers
//!   after model validation.
//! - Load the demo dataset (see [`demo`]).
//!
//! # Invariants
//! - Every insert validates its write model before touching storage.
//! - Referenced parent rows must exist; a missing one is `NotFound`, never a
//!   raw foreign-key failure.
//! - The query core never calls into this module.

pub mod demo;

pub use demo::{seed_demo_directory, SeedOutcome};

use crate::model::building::{BuildingId, NewBuilding};
use crate::model::occupation::{NewOccupation, OccupationId};
use crate::model::organization::{validate_organization_name, OrganizationId};
use crate::model::phone_number::{NewPhoneNumber, PhoneNumberId};
use crate::model::validation::ValidationError;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::schema::bool_to_int;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

/// Inserts one organization and returns its id.
pub fn insert_organization(conn: &Connection, name: &str) -> RepoResult<OrganizationId> {
    let name = validate_organization_name(name)?;
    conn.execute("INSERT INTO organizations (name) VALUES (?1);", [&name])?;
    let id = conn.last_insert_rowid();
    debug!("event=organization_insert module=seed status=ok id={id}");
    Ok(id)
}

/// Inserts the building owned by `building.organization_id`.
///
/// Fails when the organization is missing or already owns a building.
pub fn insert_building(conn: &Connection, building: &NewBuilding) -> RepoResult<BuildingId> {
    let building = building.validated()?;
    ensure_exists(conn, "organizations", "organization", building.organization_id)?;
    conn.execute(
        "INSERT INTO buildings (address, latitude, longitude, organization_id)
         VALUES (?1, ?2, ?3, ?4);",
        params![
            building.address,
            building.latitude,
            building.longitude,
            building.organization_id,
        ],
    )?;
    let id = conn.last_insert_rowid();
    debug!(
        "event=building_insert module=seed status=ok id={} organization_id={}",
        id, building.organization_id
    );
    Ok(id)
}

/// Inserts one occupation node under an optional existing parent.
pub fn insert_occupation(conn: &Connection, occupation: &NewOccupation) -> RepoResult<OccupationId> {
    let occupation = occupation.validated()?;
    if let Some(parent_id) = occupation.parent_id {
        ensure_exists(conn, "occupations", "occupation", parent_id)?;
    }
    conn.execute(
        "INSERT INTO occupations (name, parent_id) VALUES (?1, ?2);",
        params![occupation.name, occupation.parent_id],
    )?;
    let id = conn.last_insert_rowid();
    debug!("event=occupation_insert module=seed status=ok id={id}");
    Ok(id)
}

/// Re-parents an occupation. `None` turns it into a root.
///
/// Cycles are not detected here; traversal stays bounded regardless.
pub fn set_occupation_parent(
    conn: &Connection,
    occupation_id: OccupationId,
    parent_id: Option<OccupationId>,
) -> RepoResult<()> {
    if parent_id == Some(occupation_id) {
        return Err(ValidationError::SelfParent(occupation_id).into());
    }
    if let Some(parent_id) = parent_id {
        ensure_exists(conn, "occupations", "occupation", parent_id)?;
    }
    let changed = conn.execute(
        "UPDATE occupations SET parent_id = ?2 WHERE id = ?1;",
        params![occupation_id, parent_id],
    )?;
    if changed == 0 {
        return Err(RepoError::NotFound {
            entity: "occupation",
            id: occupation_id,
        });
    }
    Ok(())
}

/// Links an organization to an occupation. Linking twice is a no-op.
pub fn link_occupation(
    conn: &Connection,
    organization_id: OrganizationId,
    occupation_id: OccupationId,
) -> RepoResult<()> {
    ensure_exists(conn, "organizations", "organization", organization_id)?;
    ensure_exists(conn, "occupations", "occupation", occupation_id)?;
    conn.execute(
        "INSERT OR IGNORE INTO organization_occupations (org_id, occupation_id)
         VALUES (?1, ?2);",
        params![organization_id, occupation_id],
    )?;
    Ok(())
}

/// Inserts one phone number for an existing organization.
pub fn insert_phone_number(conn: &Connection, phone: &NewPhoneNumber) -> RepoResult<PhoneNumberId> {
    let phone = phone.validated()?;
    ensure_exists(conn, "organizations", "organization", phone.organization_id)?;
    conn.execute(
        "INSERT INTO phone_numbers (value, is_primary, type, comment, organization_id)
         VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            phone.value,
            bool_to_int(phone.is_primary),
            phone.kind.as_str(),
            phone.comment,
            phone.organization_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn ensure_exists(
    conn: &Connection,
    table: &'static str,
    entity: &'static str,
    id: i64,
) -> RepoResult<()> {
    let found = conn
        .query_row(&format!("SELECT 1 FROM {table} WHERE id = ?1;"), [id], |_| {
            Ok(())
        })
        .optional()?;
    match found {
        Some(()) => Ok(()),
        None => Err(RepoError::NotFound { entity, id }),
    }
}
