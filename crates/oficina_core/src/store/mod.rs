//! Persistence adapter for the workshop document.
//!
//! # Responsibility
//! - Define the slot-storage contract consumed by the service layer.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - The whole document is the unit of persistence; saves replace the slot
//!   wholesale (last write wins).
//!
//! # See also
//! - docs/architecture/persistence.md

pub mod state_store;
