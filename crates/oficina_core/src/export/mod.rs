//! Read-only export consumers of the sanitized document.
//!
//! # Responsibility
//! - Produce the verbatim JSON backup file.
//! - Render the formatted document the layout engine flows into pages.
//!
//! # Invariants
//! - Export paths never validate or mutate the document.
//!
//! # See also
//! - docs/architecture/export.md

pub mod backup;
pub mod document;
