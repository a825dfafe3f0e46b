//! Entity models for the script document and the DTOs used to create them.
//!
//! Entities hold soft references to one another (scene tags, character and
//! shot ids). Nothing here checks that a reference resolves; see
//! [`crate::relations`] for the read side.

use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{EntityId, MediaRef, SceneTag, Timestamp};

// ---------------------------------------------------------------------------
// Script versions
// ---------------------------------------------------------------------------

/// An immutable saved copy of the script text.
///
/// `number` is the 1-based position in the version log and is the version's
/// only identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptVersion {
    pub number: usize,
    pub text: String,
    pub saved_at: Timestamp,
}

/// The text currently shown in the editor.
///
/// `number` points at the saved version the text came from, or is `None`
/// when the text matches no saved version (the unsaved draft).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentVersion {
    pub text: String,
    pub number: Option<usize>,
}

// ---------------------------------------------------------------------------
// Scenes
// ---------------------------------------------------------------------------

/// A tagged scene with ordered character and shot references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub tag: SceneTag,
    pub characters: Vec<EntityId>,
    pub shots: Vec<EntityId>,
}

impl Scene {
    /// A scene with an empty relation set.
    pub fn new(tag: impl Into<SceneTag>) -> Self {
        Self {
            tag: tag.into(),
            characters: Vec::new(),
            shots: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub behaviors: String,
    #[serde(default)]
    pub motivations: String,
    #[serde(default)]
    pub primary_image: Option<MediaRef>,
    #[serde(default)]
    pub reference_images: Vec<MediaRef>,
    #[serde(default)]
    pub associated_scenes: IndexSet<SceneTag>,
}

/// DTO for creating a new character. The id is assigned by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateCharacter {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub behaviors: String,
    #[serde(default)]
    pub motivations: String,
    #[serde(default)]
    pub primary_image: Option<MediaRef>,
    #[serde(default)]
    pub reference_images: Vec<MediaRef>,
    #[serde(default)]
    pub associated_scenes: IndexSet<SceneTag>,
}

impl CreateCharacter {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn into_character(self, id: EntityId) -> Character {
        Character {
            id,
            name: self.name,
            description: self.description,
            behaviors: self.behaviors,
            motivations: self.motivations,
            primary_image: self.primary_image,
            reference_images: self.reference_images,
            associated_scenes: self.associated_scenes,
        }
    }
}

// ---------------------------------------------------------------------------
// Shots
// ---------------------------------------------------------------------------

/// A storyboard shot. Order lives in the shot sequence, not in any field.
///
/// `number` is the free-form label typed by the writer ("1", "12b", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shot {
    pub id: EntityId,
    #[serde(default)]
    pub number: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source_image: Option<MediaRef>,
    #[serde(default)]
    pub source_video: Option<MediaRef>,
    #[serde(default)]
    pub generated_image: Option<MediaRef>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub scene_id: Option<SceneTag>,
    #[serde(default)]
    pub character_ids: IndexSet<EntityId>,
}

/// DTO for creating a new shot. The id is assigned by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateShot {
    #[serde(default)]
    pub number: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub source_image: Option<MediaRef>,
    #[serde(default)]
    pub source_video: Option<MediaRef>,
    #[serde(default)]
    pub generated_image: Option<MediaRef>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub scene_id: Option<SceneTag>,
    #[serde(default)]
    pub character_ids: IndexSet<EntityId>,
}

impl CreateShot {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn into_shot(self, id: EntityId) -> Shot {
        Shot {
            id,
            number: self.number,
            name: self.name,
            description: self.description,
            source_image: self.source_image,
            source_video: self.source_video,
            generated_image: self.generated_image,
            scene_id: self.scene_id,
            character_ids: self.character_ids,
        }
    }
}

/// Browser forms send `""` for "no scene selected".
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<SceneTag>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|tag| !tag.is_empty()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
