//! Kind-agnostic traversal phases over the untyped document tree.
//!
//! # Responsibility
//! - Discover every object carrying a numeric `id`, wherever it lives.
//! - Re-index colliding or malformed ids and record the old -> new table.
//! - Rewrite `worldId` and relational id lists through that table.
//!
//! # Invariants
//! - Traversal is iterative (explicit worklist); document depth never grows
//!   the call stack.
//! - Phases operate on `serde_json::Value` only and know nothing about entity
//!   kinds, so documents from unknown schema versions survive intact.
//! - `serde_json::Value` is a tree, never a graph; the alias/cycle guard a
//!   reference-typed representation would need is unnecessary here.
//!
//! # See also
//! - docs/architecture/sanitizer.md

use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::model::entities::EntityId;

/// Relational list fields rewritten during the remap phase.
const RELATION_LIST_FIELDS: &[&str] = &["relatedArticleIds", "relatedCharacterIds"];

/// Largest id magnitude considered well formed. Document ids originate as
/// f64 integers, which are exact only up to 2^53 - 1; the gap between this
/// bound and `i64::MAX` keeps the fresh-id counter from overflowing.
const MAX_WELL_FORMED_ID: EntityId = (1 << 53) - 1;

/// Outcome of the re-indexing phase.
#[derive(Debug, Default)]
pub struct Reindex {
    /// Old id -> replacement id, recorded only for well-formed originals so
    /// references to them can be rewritten afterwards.
    pub remap: HashMap<EntityId, EntityId>,
    /// First id the typed-reconstruction allocator may hand out.
    pub next_id: EntityId,
    /// Number of ids fabricated or reassigned.
    pub issues: u32,
}

/// Returns the id value when it is well formed for this document model.
///
/// Well formed means exactly representable as `i64` within the f64
/// safe-integer range. JSON numbers with a fractional part or beyond that
/// range are repaired like any other malformed id.
pub(crate) fn well_formed_id(value: &Value) -> Option<EntityId> {
    value
        .as_i64()
        .filter(|id| (-MAX_WELL_FORMED_ID..=MAX_WELL_FORMED_ID).contains(id))
}

fn escape_pointer_token(token: &str) -> String {
    // RFC 6901 escaping for keys containing `~` or `/`.
    token.replace('~', "~0").replace('/', "~1")
}

/// Collects JSON-pointer paths of every object with a numeric `id` field,
/// in document order.
pub fn collect_id_paths(root: &Value) -> Vec<String> {
    let mut found = Vec::new();
    let mut stack: Vec<(String, &Value)> = vec![(String::new(), root)];

    while let Some((path, node)) = stack.pop() {
        match node {
            Value::Object(map) => {
                if matches!(map.get("id"), Some(Value::Number(_))) {
                    found.push(path.clone());
                }
                // Children pushed in reverse so the LIFO pop order follows
                // document order.
                for (key, child) in map.iter().rev() {
                    if child.is_object() || child.is_array() {
                        stack.push((format!("{path}/{}", escape_pointer_token(key)), child));
                    }
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate().rev() {
                    if child.is_object() || child.is_array() {
                        stack.push((format!("{path}/{index}"), child));
                    }
                }
            }
            _ => {}
        }
    }

    found
}

/// Re-indexes the discovered items so ids are unique across the document.
///
/// Walks `paths` in discovery order. The first carrier of a well-formed id
/// keeps it; duplicates and malformed ids receive fresh ids counted from one
/// past the largest id seen. Which carrier keeps a contested id is a
/// traversal-order detail callers must not rely on.
pub fn reindex_ids(doc: &mut Value, paths: &[String]) -> Reindex {
    let max_id = paths
        .iter()
        .filter_map(|path| doc.pointer(path))
        .filter_map(|item| item.get("id").and_then(well_formed_id))
        .fold(0, EntityId::max);

    let mut seen: HashSet<EntityId> = HashSet::new();
    let mut outcome = Reindex {
        next_id: max_id.saturating_add(1),
        ..Reindex::default()
    };

    for path in paths {
        let Some(item) = doc.pointer_mut(path).and_then(Value::as_object_mut) else {
            continue;
        };
        let original = item.get("id").and_then(well_formed_id);
        match original {
            Some(id) if !seen.contains(&id) => {
                seen.insert(id);
            }
            _ => {
                let replacement = outcome.next_id;
                outcome.next_id = outcome.next_id.saturating_add(1);
                if let Some(old) = original {
                    outcome.remap.insert(old, replacement);
                }
                item.insert("id".to_string(), Value::from(replacement));
                outcome.issues += 1;
                seen.insert(replacement);
            }
        }
    }

    outcome
}

/// Rewrites references that pointed at a re-indexed id.
///
/// Every object in the tree is inspected: a numeric `worldId` present in the
/// table is replaced, and elements of `relatedArticleIds` /
/// `relatedCharacterIds` arrays are replaced element-wise. List elements
/// that are not well-formed ids are dropped without counting an issue. Ids
/// absent from the table
/// are left untouched, dangling or not.
pub fn remap_references(root: &mut Value, remap: &HashMap<EntityId, EntityId>) -> u32 {
    let mut issues = 0;
    let mut stack: Vec<&mut Value> = vec![root];

    while let Some(node) = stack.pop() {
        match node {
            Value::Object(map) => {
                if let Some(world_id) = map.get("worldId").and_then(well_formed_id) {
                    if let Some(&replacement) = remap.get(&world_id) {
                        map.insert("worldId".to_string(), Value::from(replacement));
                        issues += 1;
                    }
                }
                for field in RELATION_LIST_FIELDS {
                    if let Some(Value::Array(ids)) = map.get_mut(*field) {
                        issues += remap_id_list(ids, remap);
                    }
                }
                for child in map.values_mut() {
                    if child.is_object() || child.is_array() {
                        stack.push(child);
                    }
                }
            }
            Value::Array(items) => {
                for child in items.iter_mut() {
                    if child.is_object() || child.is_array() {
                        stack.push(child);
                    }
                }
            }
            _ => {}
        }
    }

    issues
}

fn remap_id_list(ids: &mut Vec<Value>, remap: &HashMap<EntityId, EntityId>) -> u32 {
    let mut issues = 0;
    let mut rewritten = Vec::with_capacity(ids.len());

    for element in ids.drain(..) {
        let Some(id) = well_formed_id(&element) else {
            continue;
        };
        match remap.get(&id) {
            Some(&replacement) => {
                rewritten.push(Value::from(replacement));
                issues += 1;
            }
            None => rewritten.push(Value::from(id)),
        }
    }

    *ids = rewritten;
    issues
}
