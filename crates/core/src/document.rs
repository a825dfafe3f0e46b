//! The entity store: the whole script document as one owned value.
//!
//! [`Document`] owns every collection. Mutations are only reachable through
//! [`crate::gateway::Session`]; each method validates before it writes, so a
//! failed call leaves the document unchanged.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::{
    Character, CreateCharacter, CreateShot, CurrentVersion, Scene, ScriptVersion, Shot,
};
use crate::sequencer;
use crate::types::{new_entity_id, EntityId, MediaRef};

/// Maximum length of a scene tag in characters.
pub const MAX_SCENE_TAG_LENGTH: usize = 200;

/// Whether a save inserted a new shot or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotSaveKind {
    Inserted,
    Updated,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub(crate) versions: Vec<ScriptVersion>,
    pub(crate) current_version: CurrentVersion,
    pub(crate) scenes: Vec<Scene>,
    pub(crate) characters: Vec<Character>,
    pub(crate) shots: Vec<Shot>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- reads ----

    pub fn versions(&self) -> &[ScriptVersion] {
        &self.versions
    }

    pub fn current_version(&self) -> &CurrentVersion {
        &self.current_version
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// Shots in sequence order.
    pub fn shots(&self) -> &[Shot] {
        &self.shots
    }

    pub fn scene(&self, tag: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.tag == tag)
    }

    pub fn character(&self, id: EntityId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn shot(&self, id: EntityId) -> Option<&Shot> {
        self.shots.iter().find(|s| s.id == id)
    }

    // ---- scenes ----

    /// Add a scene with an empty relation set.
    ///
    /// The tag is the scene's identity, so it must be non-empty and unique.
    pub fn add_scene(&mut self, tag: &str) -> Result<(), CoreError> {
        validate_scene_tag(tag)?;
        if self.scene(tag).is_some() {
            return Err(CoreError::Conflict(format!("Scene '{tag}' already exists")));
        }
        self.scenes.push(Scene::new(tag));
        Ok(())
    }

    /// Remove a scene by tag. Absent tags are a no-op.
    pub fn delete_scene(&mut self, tag: &str) -> bool {
        let before = self.scenes.len();
        self.scenes.retain(|s| s.tag != tag);
        self.scenes.len() != before
    }

    /// Add a character reference to a scene. Returns `false` if already linked.
    ///
    /// The character id is a soft reference and is not checked.
    pub fn link_scene_character(&mut self, tag: &str, id: EntityId) -> Result<bool, CoreError> {
        let scene = self.scene_mut(tag)?;
        Ok(push_unique(&mut scene.characters, id))
    }

    pub fn unlink_scene_character(&mut self, tag: &str, id: EntityId) -> Result<bool, CoreError> {
        let scene = self.scene_mut(tag)?;
        Ok(remove_all(&mut scene.characters, id))
    }

    /// Add a shot reference to a scene. Returns `false` if already linked.
    pub fn link_scene_shot(&mut self, tag: &str, id: EntityId) -> Result<bool, CoreError> {
        let scene = self.scene_mut(tag)?;
        Ok(push_unique(&mut scene.shots, id))
    }

    pub fn unlink_scene_shot(&mut self, tag: &str, id: EntityId) -> Result<bool, CoreError> {
        let scene = self.scene_mut(tag)?;
        Ok(remove_all(&mut scene.shots, id))
    }

    fn scene_mut(&mut self, tag: &str) -> Result<&mut Scene, CoreError> {
        self.scenes
            .iter_mut()
            .find(|s| s.tag == tag)
            .ok_or_else(|| CoreError::not_found("Scene", tag))
    }

    // ---- characters ----

    /// Insert a character under a freshly allocated id.
    pub fn add_character(&mut self, input: CreateCharacter) -> EntityId {
        let id = self.fresh_id();
        self.characters.push(input.into_character(id));
        id
    }

    /// Replace the character with the same id.
    ///
    /// Returns `false` and leaves the collection unchanged when the id is
    /// absent; this never inserts.
    pub fn update_character(&mut self, character: Character) -> bool {
        match self.characters.iter_mut().find(|c| c.id == character.id) {
            Some(slot) => {
                *slot = character;
                true
            }
            None => false,
        }
    }

    /// Remove a character by id. Absent ids are a no-op.
    ///
    /// References to the character held by scenes and shots are left in
    /// place and resolve as unresolved afterwards.
    pub fn delete_character(&mut self, id: EntityId) -> bool {
        let before = self.characters.len();
        self.characters.retain(|c| c.id != id);
        self.characters.len() != before
    }

    // ---- shots ----

    /// Append a shot to the end of the sequence under a fresh id.
    pub fn add_shot(&mut self, input: CreateShot) -> EntityId {
        let id = self.fresh_id();
        sequencer::append(&mut self.shots, input.into_shot(id));
        id
    }

    /// Replace the shot with the same id in place, keeping its position.
    ///
    /// Returns `false` when the id is absent; this never inserts.
    pub fn update_shot(&mut self, shot: Shot) -> bool {
        match self.shots.iter_mut().find(|s| s.id == shot.id) {
            Some(slot) => {
                *slot = shot;
                true
            }
            None => false,
        }
    }

    /// Update the shot if its id exists, otherwise append it.
    ///
    /// Appending a caller-supplied id is safe for uniqueness because it only
    /// happens when no shot carries that id.
    pub fn save_shot(&mut self, shot: Shot) -> ShotSaveKind {
        if sequencer::position_of(&self.shots, shot.id).is_some() {
            self.update_shot(shot);
            ShotSaveKind::Updated
        } else {
            sequencer::append(&mut self.shots, shot);
            ShotSaveKind::Inserted
        }
    }

    /// Set only the generated image of an existing shot.
    pub fn set_generated_image(&mut self, id: EntityId, image: Option<MediaRef>) -> bool {
        match self.shots.iter_mut().find(|s| s.id == id) {
            Some(shot) => {
                shot.generated_image = image;
                true
            }
            None => false,
        }
    }

    /// Remove a shot by id. Absent ids are a no-op.
    pub fn delete_shot(&mut self, id: EntityId) -> bool {
        sequencer::remove_by_id(&mut self.shots, id)
    }

    /// Reorder the shot sequence. See [`sequencer::move_item`].
    pub fn move_shot(&mut self, from_index: i64, to_index: i64) -> Result<(), CoreError> {
        sequencer::move_item(&mut self.shots, from_index, to_index)
    }

    /// A v7 id not already used by any character or shot.
    fn fresh_id(&self) -> EntityId {
        loop {
            let id = new_entity_id();
            if self.character(id).is_none() && self.shot(id).is_none() {
                return id;
            }
        }
    }
}

/// Validate a scene tag: non-empty after trimming and within
/// [`MAX_SCENE_TAG_LENGTH`].
pub fn validate_scene_tag(tag: &str) -> Result<(), CoreError> {
    if tag.trim().is_empty() {
        return Err(CoreError::Validation(
            "Scene tag must not be empty".to_string(),
        ));
    }
    let len = tag.chars().count();
    if len > MAX_SCENE_TAG_LENGTH {
        return Err(CoreError::Validation(format!(
            "Scene tag must not exceed {MAX_SCENE_TAG_LENGTH} characters, got {len}"
        )));
    }
    Ok(())
}

fn push_unique(refs: &mut Vec<EntityId>, id: EntityId) -> bool {
    if refs.contains(&id) {
        false
    } else {
        refs.push(id);
        true
    }
}

fn remove_all(refs: &mut Vec<EntityId>, id: EntityId) -> bool {
    let before = refs.len();
    refs.retain(|r| *r != id);
    refs.len() != before
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    // -- scenes ---------------------------------------------------------------

    #[test]
    fn add_scene_starts_with_empty_relations() {
        let mut doc = Document::new();
        doc.add_scene("INT. DINER - NIGHT").unwrap();

        let scene = doc.scene("INT. DINER - NIGHT").unwrap();
        assert!(scene.characters.is_empty());
        assert!(scene.shots.is_empty());
    }

    #[test]
    fn add_scene_rejects_blank_tag() {
        let mut doc = Document::new();
        assert_matches!(doc.add_scene("   "), Err(CoreError::Validation(_)));
        assert!(doc.scenes().is_empty());
    }

    #[test]
    fn add_scene_rejects_overlong_tag() {
        let mut doc = Document::new();
        let tag = "x".repeat(MAX_SCENE_TAG_LENGTH + 1);
        assert_matches!(doc.add_scene(&tag), Err(CoreError::Validation(_)));
    }

    #[test]
    fn add_scene_rejects_duplicate_tag() {
        let mut doc = Document::new();
        doc.add_scene("EXT. PIER").unwrap();
        assert_matches!(doc.add_scene("EXT. PIER"), Err(CoreError::Conflict(_)));
        assert_eq!(doc.scenes().len(), 1);
    }

    #[test]
    fn link_and_unlink_scene_character() {
        let mut doc = Document::new();
        doc.add_scene("EXT. PIER").unwrap();
        let ava = doc.add_character(CreateCharacter::named("Ava"));

        assert!(doc.link_scene_character("EXT. PIER", ava).unwrap());
        assert!(!doc.link_scene_character("EXT. PIER", ava).unwrap());
        assert_eq!(doc.scene("EXT. PIER").unwrap().characters, vec![ava]);

        assert!(doc.unlink_scene_character("EXT. PIER", ava).unwrap());
        assert!(!doc.unlink_scene_character("EXT. PIER", ava).unwrap());
        assert!(doc.scene("EXT. PIER").unwrap().characters.is_empty());
    }

    #[test]
    fn link_on_missing_scene_is_not_found() {
        let mut doc = Document::new();
        assert_matches!(
            doc.link_scene_shot("nowhere", new_entity_id()),
            Err(CoreError::NotFound { entity: "Scene", .. })
        );
    }

    #[test]
    fn delete_scene_is_noop_when_absent() {
        let mut doc = Document::new();
        doc.add_scene("EXT. PIER").unwrap();
        assert!(!doc.delete_scene("INT. OFFICE"));
        assert!(doc.delete_scene("EXT. PIER"));
        assert!(doc.scenes().is_empty());
    }

    // -- characters -----------------------------------------------------------

    #[test]
    fn add_character_assigns_unique_ids() {
        let mut doc = Document::new();
        let a = doc.add_character(CreateCharacter::named("Ava"));
        let b = doc.add_character(CreateCharacter::named("Ben"));
        assert_ne!(a, b);
        assert_eq!(doc.character(a).unwrap().name, "Ava");
    }

    #[test]
    fn update_character_replaces_existing() {
        let mut doc = Document::new();
        let id = doc.add_character(CreateCharacter::named("Ava"));

        let mut updated = doc.character(id).unwrap().clone();
        updated.behaviors = "hums when nervous".to_string();
        assert!(doc.update_character(updated));

        assert_eq!(doc.character(id).unwrap().behaviors, "hums when nervous");
    }

    #[test]
    fn update_character_with_unknown_id_leaves_collection_unchanged() {
        let mut doc = Document::new();
        doc.add_character(CreateCharacter::named("Ava"));
        let before = doc.characters().to_vec();

        let stranger = CreateCharacter::named("Ghost").into_character(new_entity_id());
        assert!(!doc.update_character(stranger));

        assert_eq!(doc.characters(), before.as_slice());
    }

    #[test]
    fn delete_character_leaves_soft_references() {
        let mut doc = Document::new();
        doc.add_scene("EXT. PIER").unwrap();
        let ava = doc.add_character(CreateCharacter::named("Ava"));
        doc.link_scene_character("EXT. PIER", ava).unwrap();

        assert!(doc.delete_character(ava));
        assert!(!doc.delete_character(ava));
        assert_eq!(doc.scene("EXT. PIER").unwrap().characters, vec![ava]);
    }

    // -- shots ----------------------------------------------------------------

    #[test]
    fn add_shot_appends_in_order() {
        let mut doc = Document::new();
        let s1 = doc.add_shot(CreateShot::named("Opening"));
        let s2 = doc.add_shot(CreateShot::named("Chase"));
        let ids: Vec<EntityId> = doc.shots().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![s1, s2]);
        assert!(doc.shot(s1).unwrap().scene_id.is_none());
    }

    #[test]
    fn update_shot_keeps_position() {
        let mut doc = Document::new();
        doc.add_shot(CreateShot::named("Opening"));
        let s2 = doc.add_shot(CreateShot::named("Chase"));

        let mut shot = doc.shot(s2).unwrap().clone();
        shot.name = "Rooftop chase".to_string();
        assert!(doc.update_shot(shot));

        assert_eq!(doc.shots()[1].name, "Rooftop chase");
    }

    #[test]
    fn update_shot_with_unknown_id_is_noop() {
        let mut doc = Document::new();
        doc.add_shot(CreateShot::named("Opening"));
        let before = doc.clone();

        let ghost = CreateShot::named("Ghost").into_shot(new_entity_id());
        assert!(!doc.update_shot(ghost));
        assert_eq!(doc, before);
    }

    #[test]
    fn save_shot_upserts() {
        let mut doc = Document::new();
        let shot = CreateShot::named("Opening").into_shot(new_entity_id());

        assert_eq!(doc.save_shot(shot.clone()), ShotSaveKind::Inserted);

        let mut edited = shot;
        edited.description = "Dawn over the harbour".to_string();
        assert_eq!(doc.save_shot(edited), ShotSaveKind::Updated);

        assert_eq!(doc.shots().len(), 1);
        assert_eq!(doc.shots()[0].description, "Dawn over the harbour");
    }

    #[test]
    fn set_generated_image_touches_only_that_field() {
        let mut doc = Document::new();
        let id = doc.add_shot(CreateShot::named("Opening"));

        assert!(doc.set_generated_image(id, Some(MediaRef::new("data:image/png;base64,AA"))));
        let shot = doc.shot(id).unwrap();
        assert_eq!(shot.generated_image.as_ref().unwrap().as_str(), "data:image/png;base64,AA");
        assert_eq!(shot.name, "Opening");

        assert!(!doc.set_generated_image(new_entity_id(), None));
    }

    #[test]
    fn delete_shot_is_idempotent() {
        let mut doc = Document::new();
        let id = doc.add_shot(CreateShot::named("Opening"));
        assert!(doc.delete_shot(id));
        assert!(!doc.delete_shot(id));
        assert!(doc.shots().is_empty());
    }

    #[test]
    fn move_shot_out_of_range_leaves_document_unchanged() {
        let mut doc = Document::new();
        doc.add_shot(CreateShot::named("S1"));
        doc.add_shot(CreateShot::named("S2"));
        let before = doc.clone();

        assert_matches!(doc.move_shot(0, 2), Err(CoreError::Validation(_)));
        assert_eq!(doc, before);
    }
}
