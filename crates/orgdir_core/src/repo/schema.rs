//! Connection readiness checks and SQL helpers shared by repositories.

use crate::db::migrations::latest_version;
use crate::repo::error::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::collections::BTreeSet;

/// One table and the columns a repository reads from it.
pub(crate) struct RequiredTable {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

pub(crate) const ORGANIZATIONS_TABLE: RequiredTable = RequiredTable {
    name: "organizations",
    columns: &["id", "name"],
};

pub(crate) const BUILDINGS_TABLE: RequiredTable = RequiredTable {
    name: "buildings",
    columns: &["id", "address", "latitude", "longitude", "organization_id"],
};

pub(crate) const OCCUPATIONS_TABLE: RequiredTable = RequiredTable {
    name: "occupations",
    columns: &["id", "name", "parent_id"],
};

pub(crate) const ORGANIZATION_OCCUPATIONS_TABLE: RequiredTable = RequiredTable {
    name: "organization_occupations",
    columns: &["org_id", "occupation_id"],
};

pub(crate) const PHONE_NUMBERS_TABLE: RequiredTable = RequiredTable {
    name: "phone_numbers",
    columns: &[
        "id",
        "value",
        "is_primary",
        "type",
        "comment",
        "organization_id",
    ],
};

/// Verifies migration version and the presence of required tables/columns.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    tables: &[&RequiredTable],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in tables {
        if !table_exists(conn, table.name)? {
            return Err(RepoError::MissingRequiredTable(table.name));
        }
        let present = table_columns(conn, table.name)?;
        if let Some(&column) = table
            .columns
            .iter()
            .find(|column| !present.contains(**column))
        {
            return Err(RepoError::MissingRequiredColumn {
                table: table.name,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_columns(conn: &Connection, table: &str) -> RepoResult<BTreeSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = BTreeSet::new();
    while let Some(row) = rows.next()? {
        columns.insert(row.get::<_, String>(1)?);
    }
    Ok(columns)
}

/// Upper bound on bind values in one `IN (...)` list.
///
/// Larger id sets are split and queried chunk by chunk, keeping every
/// statement well under SQLite's host-parameter limit.
pub(crate) const IN_LIST_CHUNK_SIZE: usize = 500;

/// Builds `?, ?, ?` for an `IN (...)` list of `count` bind values.
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Deduplicates ids and converts them to bind values in ascending order.
pub(crate) fn id_bind_values(ids: impl IntoIterator<Item = i64>) -> Vec<Value> {
    ids.into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(Value::Integer)
        .collect()
}

pub(crate) fn int_to_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::{id_bind_values, placeholders};
    use rusqlite::types::Value;

    #[test]
    fn placeholders_match_count() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }

    #[test]
    fn id_bind_values_are_sorted_and_unique() {
        let values = id_bind_values([5, 1, 5, 3, 1]);
        assert_eq!(
            values,
            vec![Value::Integer(1), Value::Integer(3), Value::Integer(5)]
        );
    }
}
