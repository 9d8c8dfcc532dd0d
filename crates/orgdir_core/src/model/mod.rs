//! Directory domain model.
//!
//! # Responsibility
//! - Define the read models returned by repositories and services.
//! - Define validated write models used by seed/admin paths.
//!
//! # Invariants
//! - Every entity is addressed by a stable integer id.
//! - The occupation hierarchy is an adjacency relation (`parent_id`), never
//!   an owned object graph.
//! - Read models carry no storage-specific types.

pub mod building;
pub mod occupation;
pub mod organization;
pub mod phone_number;
pub mod validation;
