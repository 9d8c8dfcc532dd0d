//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define read contracts for buildings, occupations and organizations.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repositories refuse connections whose schema version is not the latest.
//! - Repository APIs return semantic errors (`NotFound`, `InvalidData`) in
//!   addition to DB transport errors.

pub mod building_repo;
pub mod error;
pub mod occupation_repo;
pub mod organization_repo;
pub(crate) mod schema;
