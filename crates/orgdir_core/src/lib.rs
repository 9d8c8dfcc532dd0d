//! Core domain logic for the organization directory.
//!
//! Owns the data model, SQLite storage, geo math and the read use-cases.
//! Front ends (`orgdir_api`, `orgdir_cli`) add no business rules.

pub mod db;
pub mod geo;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError};
pub use geo::{haversine_distance_meters, BoundingBox, GeoPoint};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::building::{Building, BuildingId, NewBuilding};
pub use model::occupation::{NewOccupation, Occupation, OccupationId};
pub use model::organization::{Organization, OrganizationArea, OrganizationId};
pub use model::phone_number::{NewPhoneNumber, PhoneNumber, PhoneNumberId, PhoneNumberType};
pub use model::validation::ValidationError;
pub use repo::building_repo::{BuildingRepository, SqliteBuildingRepository};
pub use repo::error::{RepoError, RepoResult};
pub use repo::occupation_repo::{
    OccupationRepository, SqliteOccupationRepository, MAX_TRAVERSAL_DEPTH,
};
pub use repo::organization_repo::{OrganizationRepository, SqliteOrganizationRepository};
pub use seed::{seed_demo_directory, SeedOutcome};
pub use service::organization_service::{
    OrganizationService, SqliteOrganizationService, MAX_OCCUPATION_DEPTH,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
