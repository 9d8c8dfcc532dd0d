//! Occupation hierarchy repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Resolve an occupation into its descendant id set.
//! - Keep the recursive closure query inside the repository boundary.
//!
//! # Invariants
//! - Traversal depth never exceeds [`MAX_TRAVERSAL_DEPTH`], so a malformed
//!   parent chain that loops back terminates.
//! - Results are sets: an id reached through a cycle is reported once.
//! - `include_self = false` removes exactly the root id.

use crate::model::occupation::OccupationId;
use crate::repo::error::RepoResult;
use crate::repo::schema::{ensure_connection_ready, OCCUPATIONS_TABLE};
use log::debug;
use rusqlite::{params, Connection};
use std::collections::BTreeSet;

/// Hard ceiling for hierarchy traversal regardless of the requested depth.
pub const MAX_TRAVERSAL_DEPTH: u32 = 64;

/// Repository interface for occupation hierarchy reads.
pub trait OccupationRepository {
    /// Returns ids reachable from `root_id` within `max_depth` parent->child
    /// hops (`None` means unbounded up to [`MAX_TRAVERSAL_DEPTH`]).
    ///
    /// An unknown root yields an empty set.
    fn descendant_ids(
        &self,
        root_id: OccupationId,
        max_depth: Option<u32>,
        include_self: bool,
    ) -> RepoResult<BTreeSet<OccupationId>>;
}

/// SQLite-backed occupation repository.
pub struct SqliteOccupationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOccupationRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[&OCCUPATIONS_TABLE])?;
        Ok(Self { conn })
    }
}

impl OccupationRepository for SqliteOccupationRepository<'_> {
    fn descendant_ids(
        &self,
        root_id: OccupationId,
        max_depth: Option<u32>,
        include_self: bool,
    ) -> RepoResult<BTreeSet<OccupationId>> {
        let depth_bound = effective_depth_bound(max_depth);
        let mut stmt = self.conn.prepare(
            "WITH RECURSIVE descendants(id, depth) AS (
                SELECT id, 0
                FROM occupations
                WHERE id = ?1
                UNION ALL
                SELECT child.id, descendants.depth + 1
                FROM occupations child
                INNER JOIN descendants ON child.parent_id = descendants.id
                WHERE descendants.depth < ?2
            )
            SELECT DISTINCT id
            FROM descendants;",
        )?;

        let mut ids = stmt
            .query_map(params![root_id, depth_bound], |row| {
                row.get::<_, OccupationId>(0)
            })?
            .collect::<Result<BTreeSet<_>, _>>()?;

        if !include_self {
            ids.remove(&root_id);
        }

        debug!(
            "event=occupation_descendants module=repo status=ok root_id={} depth_bound={} matched={}",
            root_id,
            depth_bound,
            ids.len()
        );
        Ok(ids)
    }
}

fn effective_depth_bound(max_depth: Option<u32>) -> u32 {
    max_depth
        .unwrap_or(MAX_TRAVERSAL_DEPTH)
        .min(MAX_TRAVERSAL_DEPTH)
}

#[cfg(test)]
mod tests {
    use super::{effective_depth_bound, MAX_TRAVERSAL_DEPTH};

    #[test]
    fn depth_bound_is_capped_by_ceiling() {
        assert_eq!(effective_depth_bound(Some(0)), 0);
        assert_eq!(effective_depth_bound(Some(3)), 3);
        assert_eq!(effective_depth_bound(Some(10_000)), MAX_TRAVERSAL_DEPTH);
        assert_eq!(effective_depth_bound(None), MAX_TRAVERSAL_DEPTH);
    }
}
