//! Core domain logic for the Oficina do Escritor writing workbench.
//! This crate is the single source of truth for document repair invariants.

pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod sanitize;
pub mod service;
pub mod store;

pub use export::backup::{write_backup, BackupError};
pub use export::document::render_document;
pub use logging::{default_log_level, init_logging};
pub use model::entities::{
    Age, Article, Chapter, Character, CustomData, CustomField, CustomSection, EntityId, Plot,
    Project, WorkshopData, World,
};
pub use sanitize::{sanitize, SanitizeOutcome};
pub use service::workshop_service::{
    extract_cross_references, resolve_cross_reference, LoadReport, WorkshopService,
    WorkshopServiceError,
};
pub use store::state_store::{SqliteStateStore, StateStore, StoreError, SLOT_KEY};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
