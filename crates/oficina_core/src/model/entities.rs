//! Workshop entity definitions.
//!
//! # Responsibility
//! - Model worlds, encyclopedia articles, characters, plots and writing
//!   projects as one JSON-document-shaped aggregate.
//! - Keep repair defaults in one place so sanitizer output is reproducible.
//!
//! # Invariants
//! - `Article.world_id` always equals the id of the `World` whose `articles`
//!   list contains it; the sanitizer enforces this on reconstruction.
//! - Relational id lists carry numbers only; dangling ids are tolerated.
//!
//! # See also
//! - docs/architecture/data-model.md

use serde::{Deserialize, Serialize};

/// Document-wide identifier shared by every entity kind.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
/// Relationships cross entity kinds (a plot may reference characters and
/// articles), so the id space is global, not per-kind.
pub type EntityId = i64;

/// Display color applied when input carries none or a non-string value.
pub const DEFAULT_COLOR: &str = "#4A5568";
/// Name fallback for characters and worlds.
pub const DEFAULT_NAME: &str = "Sem Nome";
/// Title fallback for plots, articles and projects.
pub const DEFAULT_TITLE: &str = "Sem Título";
/// Category fallback for encyclopedia articles.
pub const DEFAULT_CATEGORY: &str = "Sem Categoria";
/// Title fallback for a custom data block.
pub const DEFAULT_CUSTOM_DATA_TITLE: &str = "Campos Personalizados";
/// Title fallback for a custom section.
pub const DEFAULT_SECTION_TITLE: &str = "Nova Secção";
/// Title fallback for a custom field.
pub const DEFAULT_FIELD_TITLE: &str = "Novo Campo";
/// Title fallback for a project chapter.
pub const DEFAULT_CHAPTER_TITLE: &str = "Novo Capítulo";

/// User-defined key/value annex attached to worlds, articles, characters and
/// plots. Sections and fields carry their own document-wide ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomData {
    pub title: String,
    pub sections: Vec<CustomSection>,
}

impl Default for CustomData {
    fn default() -> Self {
        Self {
            title: DEFAULT_CUSTOM_DATA_TITLE.to_string(),
            sections: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomSection {
    pub id: EntityId,
    pub title: String,
    pub fields: Vec<CustomField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: EntityId,
    pub title: String,
    pub value: String,
}

/// Encyclopedia article owned by exactly one world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: EntityId,
    pub world_id: EntityId,
    pub title: String,
    /// Free-form tag used for grouping in list views.
    pub category: String,
    /// Rich text; may embed `[[Title]]` cross-reference markers that viewers
    /// resolve by title at render time.
    pub content: String,
    pub color: String,
    pub custom_data: CustomData,
    /// Cross-world references are allowed; dangling ids are tolerated.
    pub related_article_ids: Vec<EntityId>,
    pub related_character_ids: Vec<EntityId>,
}

/// World with its owned encyclopedia articles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct World {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub color: String,
    pub articles: Vec<Article>,
    pub custom_data: CustomData,
}

/// Age is free-form in the source documents: a number or arbitrary text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Age {
    Years(i64),
    Text(String),
}

impl Default for Age {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: EntityId,
    pub name: String,
    pub age: Age,
    /// `None` means "general", not tied to any world.
    pub world_id: Option<EntityId>,
    pub appearance: String,
    pub color: String,
    pub archetype: String,
    pub personality: String,
    pub motivation: String,
    pub fear: String,
    pub secret: String,
    pub affiliation: String,
    pub social_status: String,
    pub enemies_allies: String,
    pub powers: String,
    pub weaknesses: String,
    pub equipment: String,
    pub backstory: String,
    pub custom_data: CustomData,
    pub related_article_ids: Vec<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plot {
    pub id: EntityId,
    pub title: String,
    pub world_id: Option<EntityId>,
    pub logline: String,
    pub act1: String,
    pub act2: String,
    pub act3: String,
    pub three_act_structure_hidden: bool,
    pub custom_data: CustomData,
    pub related_article_ids: Vec<EntityId>,
    pub related_character_ids: Vec<EntityId>,
}

/// Manuscript chapter. Chapters live inside their project and are not
/// referenced from elsewhere in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: EntityId,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: EntityId,
    pub title: String,
    pub chapters: Vec<Chapter>,
}

/// The whole persisted document: four top-level entity collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkshopData {
    pub characters: Vec<Character>,
    pub plots: Vec<Plot>,
    pub worlds: Vec<World>,
    pub projects: Vec<Project>,
}

impl WorkshopData {
    /// Returns the empty-collections state used as the recovery fallback.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Iterates all articles across worlds in document order.
    pub fn all_articles(&self) -> impl Iterator<Item = &Article> {
        self.worlds.iter().flat_map(|world| world.articles.iter())
    }

    /// Looks up a world name by id, if the world still exists.
    pub fn world_name(&self, id: EntityId) -> Option<&str> {
        self.worlds
            .iter()
            .find(|world| world.id == id)
            .map(|world| world.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{Age, Character, CustomData, WorkshopData, DEFAULT_COLOR};

    fn blank_character(id: i64) -> Character {
        Character {
            id,
            name: "Alva".to_string(),
            age: Age::default(),
            world_id: None,
            appearance: String::new(),
            color: DEFAULT_COLOR.to_string(),
            archetype: String::new(),
            personality: String::new(),
            motivation: String::new(),
            fear: String::new(),
            secret: String::new(),
            affiliation: String::new(),
            social_status: String::new(),
            enemies_allies: String::new(),
            powers: String::new(),
            weaknesses: String::new(),
            equipment: String::new(),
            backstory: String::new(),
            custom_data: CustomData::default(),
            related_article_ids: Vec::new(),
        }
    }

    #[test]
    fn character_serializes_with_document_field_names() {
        let json = serde_json::to_value(blank_character(3)).expect("character should serialize");
        assert!(json.get("worldId").is_some());
        assert!(json.get("relatedArticleIds").is_some());
        assert!(json.get("socialStatus").is_some());
        assert_eq!(json["age"], serde_json::json!(""));
    }

    #[test]
    fn age_accepts_number_and_text() {
        assert_eq!(
            serde_json::to_value(Age::Years(30)).expect("age should serialize"),
            serde_json::json!(30)
        );
        assert_eq!(
            serde_json::to_value(Age::Text("mil anos".to_string()))
                .expect("age should serialize"),
            serde_json::json!("mil anos")
        );
    }

    #[test]
    fn empty_state_has_four_empty_collections() {
        let state = WorkshopData::empty();
        assert!(state.characters.is_empty());
        assert!(state.plots.is_empty());
        assert!(state.worlds.is_empty());
        assert!(state.projects.is_empty());
    }
}
