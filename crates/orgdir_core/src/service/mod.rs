//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into directory use-case APIs.
//! - Keep callers decoupled from storage details.

pub mod organization_service;
