//! Typed domain model for the writer's workshop document.
//!
//! # Responsibility
//! - Define the canonical data structures shared by sanitizer, persistence
//!   and export code.
//! - Centralize the default values used when repairing malformed documents.
//!
//! # Invariants
//! - Every entity is identified by an `EntityId` unique across the whole
//!   document; all entity kinds share one identifier space.
//! - Serialized field names match the persisted JSON document (camelCase).
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod entities;
