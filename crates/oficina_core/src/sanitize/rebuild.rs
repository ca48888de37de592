//! Typed reconstruction of the sanitized document.
//!
//! # Responsibility
//! - Narrow the repaired untyped tree into the concrete entity collections.
//! - Substitute type-correct defaults for missing or mistyped fields.
//! - Fabricate ids for items that still lack a well-formed one.
//!
//! # Invariants
//! - The id allocator continues from the re-indexing counter, so fabricated
//!   ids never collide with kept or reassigned ones.
//! - Articles take their owning world's id, regardless of input `worldId`.
//! - Default substitution is silent; only id fabrication counts as an issue.
//!
//! # See also
//! - docs/architecture/sanitizer.md

use serde_json::{Map, Value};
use std::collections::HashSet;

use super::walk::well_formed_id;
use crate::model::entities::{
    Age, Article, Chapter, Character, CustomData, CustomField, CustomSection, EntityId, Plot,
    Project, WorkshopData, World, DEFAULT_CATEGORY, DEFAULT_CHAPTER_TITLE, DEFAULT_COLOR,
    DEFAULT_CUSTOM_DATA_TITLE, DEFAULT_FIELD_TITLE, DEFAULT_NAME, DEFAULT_SECTION_TITLE,
    DEFAULT_TITLE,
};

type JsonObject = Map<String, Value>;

/// Builds typed collections from the repaired tree, carrying the running id
/// counter and issue tally across entity kinds.
pub struct Rebuilder {
    next_id: EntityId,
    issues: u32,
    /// Ids of worlds present in the repaired tree. Character and plot
    /// `worldId` references outside this set are cleared to null, so every
    /// kept reference resolves to a world that still exists.
    world_ids: HashSet<EntityId>,
}

impl Rebuilder {
    pub fn new(next_id: EntityId) -> Self {
        Self {
            next_id,
            issues: 0,
            world_ids: HashSet::new(),
        }
    }

    pub fn issues(&self) -> u32 {
        self.issues
    }

    /// Reconstructs the four top-level collections in one pass.
    pub fn rebuild(&mut self, doc: &Value) -> WorkshopData {
        // Worlds that get an id fabricated later cannot be referenced by any
        // input worldId, so well-formed ids are enough here.
        self.world_ids = objects_under(doc, "worlds")
            .filter_map(|world| world.get("id").and_then(well_formed_id))
            .collect();

        WorkshopData {
            characters: objects_under(doc, "characters")
                .map(|item| self.character(item))
                .collect(),
            plots: objects_under(doc, "plots")
                .map(|item| self.plot(item))
                .collect(),
            worlds: objects_under(doc, "worlds")
                .map(|item| self.world(item))
                .collect(),
            projects: objects_under(doc, "projects")
                .map(|item| self.project(item))
                .collect(),
        }
    }

    /// Returns the item's `worldId` when it resolves to a surviving world,
    /// otherwise null. Clearing a dangling reference is a default
    /// substitution, not a counted issue.
    fn world_ref(&self, item: &JsonObject) -> Option<EntityId> {
        item.get("worldId")
            .and_then(well_formed_id)
            .filter(|id| self.world_ids.contains(id))
    }

    /// Returns the item's id when well formed, otherwise allocates a fresh
    /// one and counts the repair.
    fn sanitized_id(&mut self, item: &JsonObject) -> EntityId {
        if let Some(id) = item.get("id").and_then(well_formed_id) {
            return id;
        }
        self.issues += 1;
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    fn character(&mut self, item: &JsonObject) -> Character {
        Character {
            id: self.sanitized_id(item),
            name: text(item, "name", DEFAULT_NAME),
            age: age(item),
            world_id: self.world_ref(item),
            appearance: free_text(item, "appearance"),
            color: text(item, "color", DEFAULT_COLOR),
            archetype: free_text(item, "archetype"),
            personality: free_text(item, "personality"),
            motivation: free_text(item, "motivation"),
            fear: free_text(item, "fear"),
            secret: free_text(item, "secret"),
            affiliation: free_text(item, "affiliation"),
            social_status: free_text(item, "socialStatus"),
            enemies_allies: free_text(item, "enemiesAllies"),
            powers: free_text(item, "powers"),
            weaknesses: free_text(item, "weaknesses"),
            equipment: free_text(item, "equipment"),
            backstory: free_text(item, "backstory"),
            custom_data: self.custom_data(item.get("customData")),
            related_article_ids: id_list(item, "relatedArticleIds"),
        }
    }

    fn plot(&mut self, item: &JsonObject) -> Plot {
        Plot {
            id: self.sanitized_id(item),
            title: text(item, "title", DEFAULT_TITLE),
            world_id: self.world_ref(item),
            logline: free_text(item, "logline"),
            act1: free_text(item, "act1"),
            act2: free_text(item, "act2"),
            act3: free_text(item, "act3"),
            three_act_structure_hidden: flag(item, "threeActStructureHidden"),
            custom_data: self.custom_data(item.get("customData")),
            related_article_ids: id_list(item, "relatedArticleIds"),
            related_character_ids: id_list(item, "relatedCharacterIds"),
        }
    }

    fn world(&mut self, item: &JsonObject) -> World {
        let world_id = self.sanitized_id(item);
        let articles = item
            .get("articles")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
            .map(|article| self.article(article, world_id))
            .collect();

        World {
            id: world_id,
            name: text(item, "name", DEFAULT_NAME),
            description: free_text(item, "description"),
            color: text(item, "color", DEFAULT_COLOR),
            articles,
            custom_data: self.custom_data(item.get("customData")),
        }
    }

    fn article(&mut self, item: &JsonObject, owner_id: EntityId) -> Article {
        Article {
            id: self.sanitized_id(item),
            // Ownership is authoritative; whatever `worldId` the input
            // carried is overwritten with the owning world's sanitized id.
            world_id: owner_id,
            title: text(item, "title", DEFAULT_TITLE),
            category: text(item, "category", DEFAULT_CATEGORY),
            content: free_text(item, "content"),
            color: text(item, "color", DEFAULT_COLOR),
            custom_data: self.custom_data(item.get("customData")),
            related_article_ids: id_list(item, "relatedArticleIds"),
            related_character_ids: id_list(item, "relatedCharacterIds"),
        }
    }

    fn project(&mut self, item: &JsonObject) -> Project {
        let project_id = self.sanitized_id(item);
        let chapters = item
            .get("chapters")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
            .map(|chapter| Chapter {
                id: self.sanitized_id(chapter),
                title: text(chapter, "title", DEFAULT_CHAPTER_TITLE),
                content: free_text(chapter, "content"),
            })
            .collect();

        Project {
            id: project_id,
            title: text(item, "title", DEFAULT_TITLE),
            chapters,
        }
    }

    fn custom_data(&mut self, value: Option<&Value>) -> CustomData {
        let Some(block) = value.and_then(Value::as_object) else {
            return CustomData::default();
        };

        let sections = block
            .get("sections")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
            .map(|section| self.custom_section(section))
            .collect();

        CustomData {
            title: text(block, "title", DEFAULT_CUSTOM_DATA_TITLE),
            sections,
        }
    }

    fn custom_section(&mut self, section: &JsonObject) -> CustomSection {
        let section_id = self.sanitized_id(section);
        let fields = section
            .get("fields")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
            .map(|field| CustomField {
                id: self.sanitized_id(field),
                title: text(field, "title", DEFAULT_FIELD_TITLE),
                value: free_text(field, "value"),
            })
            .collect();

        CustomSection {
            id: section_id,
            title: text(section, "title", DEFAULT_SECTION_TITLE),
            fields,
        }
    }
}

fn objects_under<'doc>(
    doc: &'doc Value,
    key: &str,
) -> impl Iterator<Item = &'doc JsonObject> {
    doc.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

fn text(item: &JsonObject, key: &str, default: &str) -> String {
    match item.get(key) {
        Some(Value::String(value)) => value.clone(),
        _ => default.to_string(),
    }
}

fn free_text(item: &JsonObject, key: &str) -> String {
    text(item, key, "")
}

fn flag(item: &JsonObject, key: &str) -> bool {
    matches!(item.get(key), Some(Value::Bool(true)))
}

fn id_list(item: &JsonObject, key: &str) -> Vec<EntityId> {
    item.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_i64)
        .collect()
}

fn age(item: &JsonObject) -> Age {
    match item.get("age") {
        Some(Value::String(value)) => Age::Text(value.clone()),
        Some(Value::Number(value)) => value
            .as_i64()
            .map(Age::Years)
            .unwrap_or_else(|| Age::Text(value.to_string())),
        _ => Age::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::Rebuilder;
    use crate::model::entities::{Age, DEFAULT_COLOR, DEFAULT_NAME, DEFAULT_TITLE};
    use serde_json::json;

    #[test]
    fn bare_world_receives_documented_defaults() {
        let doc = json!({"worlds": [{"id": 1}]});
        let mut rebuilder = Rebuilder::new(2);
        let data = rebuilder.rebuild(&doc);

        let world = &data.worlds[0];
        assert_eq!(world.name, DEFAULT_NAME);
        assert_eq!(world.description, "");
        assert_eq!(world.color, DEFAULT_COLOR);
        assert!(world.articles.is_empty());
        assert_eq!(world.custom_data.title, "Campos Personalizados");
        assert!(world.custom_data.sections.is_empty());
        // Defaults are silent repairs.
        assert_eq!(rebuilder.issues(), 0);
    }

    #[test]
    fn missing_id_is_fabricated_and_counted() {
        let doc = json!({"plots": [{"title": "Queda"}]});
        let mut rebuilder = Rebuilder::new(31);
        let data = rebuilder.rebuild(&doc);

        assert_eq!(data.plots[0].id, 31);
        assert_eq!(data.plots[0].title, "Queda");
        assert_eq!(rebuilder.issues(), 1);
    }

    #[test]
    fn article_world_id_is_forced_to_owner() {
        let doc = json!({"worlds": [{"id": 3, "articles": [{"id": 4, "worldId": 99}]}]});
        let mut rebuilder = Rebuilder::new(100);
        let data = rebuilder.rebuild(&doc);

        assert_eq!(data.worlds[0].articles[0].world_id, 3);
    }

    #[test]
    fn dangling_world_reference_is_cleared_to_null() {
        let doc = json!({
            "characters": [
                {"id": 1, "worldId": 42},
                {"id": 2, "worldId": 5}
            ],
            "worlds": [{"id": 5}]
        });
        let mut rebuilder = Rebuilder::new(6);
        let data = rebuilder.rebuild(&doc);

        assert_eq!(data.characters[0].world_id, None);
        assert_eq!(data.characters[1].world_id, Some(5));
        assert_eq!(rebuilder.issues(), 0);
    }

    #[test]
    fn non_object_collection_entries_are_skipped() {
        let doc = json!({"characters": [null, 7, "x", {"id": 2, "name": "Irena"}]});
        let mut rebuilder = Rebuilder::new(3);
        let data = rebuilder.rebuild(&doc);

        assert_eq!(data.characters.len(), 1);
        assert_eq!(data.characters[0].name, "Irena");
    }

    #[test]
    fn age_keeps_number_or_text_and_defaults_mistypes() {
        let doc = json!({"characters": [
            {"id": 1, "age": 19},
            {"id": 2, "age": "uns trinta"},
            {"id": 3, "age": {"weird": true}}
        ]});
        let mut rebuilder = Rebuilder::new(4);
        let data = rebuilder.rebuild(&doc);

        assert_eq!(data.characters[0].age, Age::Years(19));
        assert_eq!(data.characters[1].age, Age::Text("uns trinta".to_string()));
        assert_eq!(data.characters[2].age, Age::default());
    }

    #[test]
    fn custom_data_sections_and_fields_get_ids() {
        let doc = json!({"plots": [{
            "id": 1,
            "customData": {
                "title": "Notas",
                "sections": [{"title": "Tema", "fields": [{"value": "perda"}]}]
            }
        }]});
        let mut rebuilder = Rebuilder::new(50);
        let data = rebuilder.rebuild(&doc);

        let section = &data.plots[0].custom_data.sections[0];
        assert_eq!(section.title, "Tema");
        assert_eq!(section.fields[0].title, "Novo Campo");
        assert_eq!(section.fields[0].value, "perda");
        // One fabricated id for the field, one for the section.
        assert_eq!(rebuilder.issues(), 2);
        assert_ne!(section.id, section.fields[0].id);
    }

    #[test]
    fn plot_defaults_follow_document_shape() {
        let doc = json!({"plots": [{"id": 9, "threeActStructureHidden": "yes"}]});
        let mut rebuilder = Rebuilder::new(10);
        let data = rebuilder.rebuild(&doc);

        assert_eq!(data.plots[0].title, DEFAULT_TITLE);
        assert!(!data.plots[0].three_act_structure_hidden);
        assert!(data.plots[0].related_character_ids.is_empty());
    }
}
