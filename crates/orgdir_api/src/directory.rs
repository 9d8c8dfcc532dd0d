//! Async directory use-case API.
//!
//! # Responsibility
//! - Validate caller parameters before touching storage.
//! - Run each request on its own SQLite connection inside tokio's blocking
//!   pool.
//! - Translate absence and failures into [`ApiError`].
//!
//! # Invariants
//! - No connection or service state is shared between requests.
//! - Invalid parameters never open the database.

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::params;
use log::{debug, warn};
use orgdir_core::db::open_db;
use orgdir_core::{
    seed_demo_directory, Building, BuildingId, OccupationId, Organization, OrganizationArea,
    OrganizationId, RepoResult, SeedOutcome, SqliteOrganizationService,
};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Handle for directory operations against one database file.
#[derive(Debug, Clone)]
pub struct DirectoryApi {
    db_path: Arc<PathBuf>,
}

impl DirectoryApi {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Arc::new(db_path.into()),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.db_path.clone())
    }

    pub fn db_path(&self) -> &Path {
        self.db_path.as_path()
    }

    /// Creates the schema if needed and loads the demo dataset once.
    pub async fn seed_demo(&self) -> ApiResult<SeedOutcome> {
        self.with_connection("seed_demo", |conn| Ok(seed_demo_directory(conn)?))
            .await
    }

    /// Loads one organization, or `NotFound`.
    pub async fn get_organization(&self, id: OrganizationId) -> ApiResult<Organization> {
        self.with_service("get_organization", move |service| {
            service.get_organization(id)
        })
        .await?
        .ok_or(ApiError::NotFound {
            entity: "organization",
            id,
        })
    }

    pub async fn list_by_building(&self, building_id: BuildingId) -> ApiResult<Vec<Organization>> {
        self.with_service("list_by_building", move |service| {
            service.list_by_building(building_id)
        })
        .await
    }

    /// Lists organizations for an occupation.
    ///
    /// With `include_children`, the subtree up to `max_depth` (1..=10, capped
    /// further by the core) is searched; otherwise only the exact occupation.
    pub async fn list_by_occupation(
        &self,
        occupation_id: OccupationId,
        include_children: bool,
        max_depth: Option<u32>,
    ) -> ApiResult<Vec<Organization>> {
        let max_depth = params::max_depth(max_depth)?;
        self.with_service("list_by_occupation", move |service| {
            if include_children {
                service.list_by_occupation_tree(occupation_id, max_depth)
            } else {
                service.list_by_occupation(occupation_id)
            }
        })
        .await
    }

    pub async fn search_by_occupation_hierarchy(
        &self,
        occupation_id: OccupationId,
    ) -> ApiResult<Vec<Organization>> {
        self.with_service("search_by_occupation_hierarchy", move |service| {
            service.search_by_occupation_hierarchy(occupation_id)
        })
        .await
    }

    /// Case-insensitive name search; `limit` must be within 1..=100.
    pub async fn search_by_name(
        &self,
        query: &str,
        limit: Option<u32>,
    ) -> ApiResult<Vec<Organization>> {
        let query = params::name_query(query)?.to_string();
        let limit = params::search_limit(limit)?;
        self.with_service("search_by_name", move |service| {
            service.search_by_name(&query, limit)
        })
        .await
    }

    pub async fn list_buildings(&self) -> ApiResult<Vec<Building>> {
        self.with_service("list_buildings", |service| service.list_buildings())
            .await
    }

    pub async fn list_buildings_within_radius(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
    ) -> ApiResult<Vec<Building>> {
        let center = params::point(latitude, longitude)?;
        let radius_meters = params::radius(radius_meters)?;
        self.with_service("list_buildings_within_radius", move |service| {
            service.list_buildings_within_radius(center, radius_meters)
        })
        .await
    }

    pub async fn list_buildings_within_bounds(
        &self,
        min_latitude: f64,
        max_latitude: f64,
        min_longitude: f64,
        max_longitude: f64,
    ) -> ApiResult<Vec<Building>> {
        let bounds = params::bounds(min_latitude, max_latitude, min_longitude, max_longitude)?;
        self.with_service("list_buildings_within_bounds", move |service| {
            service.list_buildings_within_bounds(&bounds)
        })
        .await
    }

    pub async fn list_organizations_within_radius(
        &self,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
    ) -> ApiResult<OrganizationArea> {
        let center = params::point(latitude, longitude)?;
        let radius_meters = params::radius(radius_meters)?;
        self.with_service("list_organizations_within_radius", move |service| {
            service.list_organizations_within_radius(center, radius_meters)
        })
        .await
    }

    pub async fn list_organizations_within_bounds(
        &self,
        min_latitude: f64,
        max_latitude: f64,
        min_longitude: f64,
        max_longitude: f64,
    ) -> ApiResult<OrganizationArea> {
        let bounds = params::bounds(min_latitude, max_latitude, min_longitude, max_longitude)?;
        self.with_service("list_organizations_within_bounds", move |service| {
            service.list_organizations_within_bounds(&bounds)
        })
        .await
    }

    async fn with_service<T, F>(&self, operation: &'static str, f: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteOrganizationService<'_>) -> RepoResult<T> + Send + 'static,
    {
        self.with_connection(operation, move |conn| {
            let service = SqliteOrganizationService::try_from_connection(conn)?;
            Ok(f(&service)?)
        })
        .await
    }

    async fn with_connection<T, F>(&self, operation: &'static str, f: F) -> ApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> ApiResult<T> + Send + 'static,
    {
        let started_at = Instant::now();
        let db_path = Arc::clone(&self.db_path);
        let result = tokio::task::spawn_blocking(move || {
            let conn = open_db(db_path.as_path())?;
            f(&conn)
        })
        .await
        .map_err(ApiError::from)
        .and_then(|result| result);

        match &result {
            Ok(_) => debug!(
                "event=api_call module=api status=ok operation={} duration_ms={}",
                operation,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=api_call module=api status=error operation={} duration_ms={} error_code={} status_code={}",
                operation,
                started_at.elapsed().as_millis(),
                err.code(),
                err.status_code()
            ),
        }
        result
    }
}
