//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate sanitizer and store calls into use-case level APIs.
//! - Keep UI layers decoupled from storage and repair details.
//!
//! # See also
//! - docs/architecture/persistence.md

pub mod workshop_service;
