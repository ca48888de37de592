//! Sanitization and re-indexing engine for imported documents.
//!
//! # Responsibility
//! - Turn an arbitrary, possibly corrupted JSON value into a valid,
//!   internally consistent `WorkshopData`.
//! - Report the number of structural repairs performed.
//!
//! # Invariants
//! - `sanitize` never fails and never mutates its input.
//! - Output ids are unique across the whole document.
//! - References to re-indexed ids are rewritten; dangling references are
//!   preserved as-is.
//! - Sanitizing already-sanitized data is a fixpoint: zero further issues.
//!
//! # See also
//! - docs/architecture/sanitizer.md

use log::{debug, info};
use serde_json::Value;

use crate::model::entities::WorkshopData;

mod rebuild;
mod walk;

use rebuild::Rebuilder;

/// Sanitized document plus the count of structural repairs.
///
/// The issue count travels alongside the data, never inside it, so the
/// persisted document stays a pure entity payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizeOutcome {
    pub data: WorkshopData,
    pub issues_found: u32,
}

/// Repairs `raw` into a consistent workshop document.
///
/// Four deterministic phases run over a private copy of the input:
/// discovery of everything carrying a numeric `id`, re-indexing for global
/// uniqueness, reference remapping through the old -> new table, and typed
/// reconstruction with per-field defaulting.
///
/// A top-level value that is neither object nor array cannot carry any
/// recoverable state; it yields the empty document and a single issue.
pub fn sanitize(raw: &Value) -> SanitizeOutcome {
    if !raw.is_object() && !raw.is_array() {
        info!("event=sanitize module=sanitize status=fallback reason=non_object_input");
        return SanitizeOutcome {
            data: WorkshopData::empty(),
            issues_found: 1,
        };
    }

    let mut doc = raw.clone();
    let mut issues = 0u32;

    let paths = walk::collect_id_paths(&doc);
    debug!(
        "event=sanitize_discovery module=sanitize status=ok items={}",
        paths.len()
    );

    let reindex = walk::reindex_ids(&mut doc, &paths);
    issues += reindex.issues;

    issues += walk::remap_references(&mut doc, &reindex.remap);

    let mut rebuilder = Rebuilder::new(reindex.next_id);
    let data = rebuilder.rebuild(&doc);
    issues += rebuilder.issues();

    info!(
        "event=sanitize module=sanitize status=ok issues={} characters={} plots={} worlds={} projects={}",
        issues,
        data.characters.len(),
        data.plots.len(),
        data.worlds.len(),
        data.projects.len()
    );

    SanitizeOutcome {
        data,
        issues_found: issues,
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize;
    use serde_json::json;

    #[test]
    fn null_input_yields_empty_state_with_one_issue() {
        let outcome = sanitize(&json!(null));
        assert_eq!(outcome.issues_found, 1);
        assert_eq!(outcome.data, crate::model::entities::WorkshopData::empty());
    }

    #[test]
    fn scalar_input_yields_empty_state_with_one_issue() {
        let outcome = sanitize(&json!(42));
        assert_eq!(outcome.issues_found, 1);
        assert!(outcome.data.characters.is_empty());
    }

    #[test]
    fn clean_document_passes_through_without_issues() {
        let doc = json!({
            "characters": [],
            "plots": [],
            "worlds": [{
                "id": 1,
                "name": "Aerthos",
                "description": "",
                "color": "#4A5568",
                "articles": [],
                "customData": {"title": "Campos Personalizados", "sections": []}
            }],
            "projects": []
        });
        let outcome = sanitize(&doc);
        assert_eq!(outcome.issues_found, 0);
        assert_eq!(outcome.data.worlds[0].name, "Aerthos");
    }

    #[test]
    fn input_is_not_mutated() {
        let doc = json!({"characters": [{"id": 1}, {"id": 1}]});
        let before = doc.clone();
        let _ = sanitize(&doc);
        assert_eq!(doc, before);
    }
}
