use oficina_core::{sanitize, EntityId, WorkshopData};
use serde_json::{json, Value};
use std::collections::HashSet;

/// Collects every id in the typed output, across all entity kinds sharing
/// the document-wide id space.
fn all_ids(data: &WorkshopData) -> Vec<EntityId> {
    let mut ids = Vec::new();
    for character in &data.characters {
        ids.push(character.id);
        collect_custom_ids(&character.custom_data, &mut ids);
    }
    for plot in &data.plots {
        ids.push(plot.id);
        collect_custom_ids(&plot.custom_data, &mut ids);
    }
    for world in &data.worlds {
        ids.push(world.id);
        collect_custom_ids(&world.custom_data, &mut ids);
        for article in &world.articles {
            ids.push(article.id);
            collect_custom_ids(&article.custom_data, &mut ids);
        }
    }
    for project in &data.projects {
        ids.push(project.id);
        for chapter in &project.chapters {
            ids.push(chapter.id);
        }
    }
    ids
}

fn collect_custom_ids(custom: &oficina_core::CustomData, ids: &mut Vec<EntityId>) {
    for section in &custom.sections {
        ids.push(section.id);
        for field in &section.fields {
            ids.push(field.id);
        }
    }
}

fn assert_ids_unique(data: &WorkshopData) {
    let ids = all_ids(data);
    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len(), "duplicate ids in output: {ids:?}");
}

fn messy_document() -> Value {
    json!({
        "characters": [
            {"id": 7, "name": "Dup", "age": null},
            {"id": 9, "name": "Leitor", "relatedArticleIds": [7, "x", null]},
            {"name": "Sem Id"}
        ],
        "plots": [
            {"id": 7, "title": 12, "relatedCharacterIds": [999, 9]},
            {"id": "abc", "threeActStructureHidden": true}
        ],
        "worlds": [
            {"id": 1, "name": "A", "articles": [
                {"id": 7, "title": "X", "worldId": 55},
                {"title": "Sem Id", "customData": {"sections": [
                    {"title": "S", "fields": [{"value": "v"}]}
                ]}}
            ]}
        ],
        "projects": [
            {"id": 20, "chapters": [{"id": 20, "title": "Dup Capítulo"}, {}]}
        ],
        "unknownKey": {"nested": [{"id": 21, "future": true}]}
    })
}

#[test]
fn sanitize_is_idempotent() {
    let first = sanitize(&messy_document());
    let reserialized = serde_json::to_value(&first.data).unwrap();
    let second = sanitize(&reserialized);

    assert_eq!(second.issues_found, 0);
    assert_eq!(second.data, first.data);
}

#[test]
fn output_ids_are_globally_unique() {
    let outcome = sanitize(&messy_document());
    assert_ids_unique(&outcome.data);
    assert!(outcome.issues_found > 0);
}

#[test]
fn remapped_reference_follows_its_target() {
    // Two entities collide on id 7; a third references the article through
    // relatedArticleIds. Whichever collision loser is re-indexed, the
    // reference must resolve to the article titled "X", never dangle on a
    // stale 7 pointing at the wrong survivor.
    let outcome = sanitize(&json!({
        "worlds": [{"id": 1, "name": "A", "articles": [{"id": 7, "title": "X"}]}],
        "characters": [
            {"id": 7, "name": "Dup"},
            {"id": 9, "relatedArticleIds": [7]}
        ]
    }));
    let data = &outcome.data;
    assert_ids_unique(data);

    let article = data
        .worlds[0]
        .articles
        .iter()
        .find(|article| article.title == "X")
        .expect("article X survives");
    let dup = data
        .characters
        .iter()
        .find(|character| character.name == "Dup")
        .expect("duplicate character survives");
    let reader = data
        .characters
        .iter()
        .find(|character| character.id == 9)
        .expect("referencing character keeps id 9");

    assert_ne!(article.id, dup.id);
    assert_eq!(dup.world_id, None);
    assert_eq!(reader.related_article_ids, vec![article.id]);
}

#[test]
fn world_id_follows_a_reindexed_world() {
    // A character and a world collide on id 3. The character is discovered
    // first and keeps the id, the world is re-indexed, and references to it
    // through worldId follow the remap table to the world's new id.
    let outcome = sanitize(&json!({
        "characters": [
            {"id": 3, "name": "Primeiro"},
            {"id": 8, "name": "Viajante", "worldId": 3}
        ],
        "worlds": [{"id": 3, "name": "B"}]
    }));
    let data = &outcome.data;
    assert_ids_unique(data);

    let world = data
        .worlds
        .iter()
        .find(|world| world.name == "B")
        .expect("world survives");
    let travelled = data
        .characters
        .iter()
        .find(|character| character.name == "Viajante")
        .expect("referencing character survives");
    assert_ne!(world.id, 3);
    assert_eq!(travelled.world_id, Some(world.id));
}

#[test]
fn ids_beyond_the_safe_integer_range_are_reassigned() {
    // i64::MAX parses fine but leaves no room above it for fresh ids; it is
    // treated as malformed and repaired like any other broken id.
    let outcome = sanitize(&json!({
        "characters": [
            {"id": 9223372036854775807i64, "name": "Limite"},
            {"id": 3, "name": "Par"}
        ]
    }));
    let data = &outcome.data;
    assert_ids_unique(data);

    assert_eq!(data.characters[0].id, 4);
    assert_eq!(data.characters[1].id, 3);
    assert_eq!(outcome.issues_found, 1);
}

#[test]
fn references_nested_below_top_level_follow_the_remap() {
    // The stale reference lives inside an article, a level below the
    // top-level collections; the remap still rewrites it to the re-indexed
    // character's new id.
    let outcome = sanitize(&json!({
        "characters": [{"id": 2, "name": "Rui"}, {"id": 2, "name": "Dora"}],
        "worlds": [{"id": 1, "articles": [
            {"id": 4, "title": "Crónica", "relatedCharacterIds": [2]}
        ]}]
    }));
    let data = &outcome.data;
    assert_ids_unique(data);

    let dora = data
        .characters
        .iter()
        .find(|character| character.name == "Dora")
        .expect("re-indexed character survives");
    assert_ne!(dora.id, 2);
    assert_eq!(
        data.worlds[0].articles[0].related_character_ids,
        vec![dora.id]
    );
    assert_eq!(outcome.issues_found, 2);
}

#[test]
fn dangling_world_id_becomes_general() {
    let outcome = sanitize(&json!({
        "characters": [{"id": 1, "name": "Errante", "worldId": 42}]
    }));
    assert_eq!(outcome.data.characters[0].world_id, None);
    assert_eq!(outcome.issues_found, 0);
}

#[test]
fn article_world_id_always_matches_owner() {
    let outcome = sanitize(&json!({
        "worlds": [
            {"id": 1, "articles": [{"id": 10, "worldId": 99}, {"id": 11}]},
            {"id": 2, "articles": [{"id": 12, "worldId": 1}]}
        ]
    }));
    for world in &outcome.data.worlds {
        for article in &world.articles {
            assert_eq!(article.world_id, world.id);
        }
    }
}

#[test]
fn bare_world_gets_documented_defaults() {
    let outcome = sanitize(&json!({"worlds": [{"id": 1}]}));
    let world = &outcome.data.worlds[0];

    assert_eq!(world.name, "Sem Nome");
    assert_eq!(world.description, "");
    assert_eq!(world.color, "#4A5568");
    assert!(world.articles.is_empty());
    assert_eq!(world.custom_data.title, "Campos Personalizados");
    assert!(world.custom_data.sections.is_empty());
    assert_eq!(outcome.issues_found, 0);
}

#[test]
fn dangling_references_are_preserved() {
    let outcome = sanitize(&json!({
        "plots": [{"id": 1, "title": "Solta", "relatedCharacterIds": [999]}]
    }));
    assert_eq!(outcome.data.plots[0].related_character_ids, vec![999]);
    assert_eq!(outcome.issues_found, 0);
}

#[test]
fn merged_backups_with_shared_ids_come_out_unique() {
    // Simulates two backups concatenated by hand: every id appears twice.
    let outcome = sanitize(&json!({
        "characters": [{"id": 1}, {"id": 1}],
        "plots": [{"id": 2}, {"id": 2}],
        "worlds": [{"id": 3, "articles": [{"id": 4}]}, {"id": 3, "articles": [{"id": 4}]}],
        "projects": [{"id": 5, "chapters": [{"id": 6}]}, {"id": 5, "chapters": [{"id": 6}]}]
    }));
    assert_ids_unique(&outcome.data);
    assert_eq!(outcome.data.characters.len(), 2);
    assert_eq!(outcome.data.worlds.len(), 2);
    assert_eq!(outcome.issues_found, 6);
}

#[test]
fn deeply_nested_input_does_not_recurse() {
    let mut nested = json!({"id": 1});
    for _ in 0..2_000 {
        nested = json!({"wrap": [nested]});
    }
    let doc = json!({"characters": [], "junk": nested});

    let outcome = sanitize(&doc);
    assert!(outcome.data.characters.is_empty());
}

#[test]
fn foreign_shapes_survive_without_failure() {
    let outcome = sanitize(&json!({
        "version": "9.9",
        "charactersV2": [{"id": 1, "name": "Futuro"}],
        "blob": [[[{"id": 1}]]]
    }));
    // Nothing lands in the typed collections, but the duplicate id buried in
    // the unknown keys is still repaired and counted.
    assert_eq!(outcome.data, WorkshopData::empty());
    assert_eq!(outcome.issues_found, 1);
}
