//! Read-side resolution of soft references between scenes, characters and
//! shots.
//!
//! Nothing here is cached: every call walks the current [`Document`], so the
//! results can never go stale after a mutation. Dangling references resolve
//! to [`Resolved::Unresolved`] and are shown as [`UNRESOLVED_LABEL`].

use serde::Serialize;

use crate::document::Document;
use crate::models::{Character, Scene, Shot};
use crate::types::{EntityId, SceneTag};

/// Display label for a reference that does not resolve.
pub const UNRESOLVED_LABEL: &str = "unknown";

/// Number of shots the shot planner treats as a complete storyboard.
pub const SHOT_PLANNING_TARGET: usize = 10;

/// Outcome of following a soft reference.
#[derive(Debug, PartialEq)]
pub enum Resolved<'a, T> {
    Found(&'a T),
    Unresolved,
}

impl<'a, T> Resolved<'a, T> {
    pub fn found(self) -> Option<&'a T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Unresolved => None,
        }
    }

    pub fn is_unresolved(self) -> bool {
        matches!(self, Self::Unresolved)
    }
}

impl<T> Clone for Resolved<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Resolved<'_, T> {}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve a shot's scene. An empty scene id resolves as unresolved.
pub fn resolve_shot_scene<'a>(doc: &'a Document, shot: &Shot) -> Resolved<'a, Scene> {
    shot.scene_id
        .as_deref()
        .and_then(|tag| doc.scene(tag))
        .map_or(Resolved::Unresolved, Resolved::Found)
}

pub fn resolve_shot_characters<'a>(
    doc: &'a Document,
    shot: &Shot,
) -> Vec<(EntityId, Resolved<'a, Character>)> {
    shot.character_ids
        .iter()
        .map(|id| (*id, resolve_character(doc, *id)))
        .collect()
}

pub fn resolve_scene_characters<'a>(
    doc: &'a Document,
    scene: &Scene,
) -> Vec<(EntityId, Resolved<'a, Character>)> {
    scene
        .characters
        .iter()
        .map(|id| (*id, resolve_character(doc, *id)))
        .collect()
}

pub fn resolve_scene_shots<'a>(
    doc: &'a Document,
    scene: &Scene,
) -> Vec<(EntityId, Resolved<'a, Shot>)> {
    scene
        .shots
        .iter()
        .map(|id| {
            let shot = doc.shot(*id).map_or(Resolved::Unresolved, Resolved::Found);
            (*id, shot)
        })
        .collect()
}

fn resolve_character(doc: &Document, id: EntityId) -> Resolved<'_, Character> {
    doc.character(id).map_or(Resolved::Unresolved, Resolved::Found)
}

fn character_label(resolved: Resolved<'_, Character>) -> String {
    resolved
        .found()
        .map_or_else(|| UNRESOLVED_LABEL.to_string(), |c| c.name.clone())
}

// ---------------------------------------------------------------------------
// Display views
// ---------------------------------------------------------------------------

/// A shot as listed by the shot planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShotView {
    pub id: EntityId,
    pub position: usize,
    pub number: String,
    pub name: String,
    pub scene: String,
    pub scene_resolved: bool,
    pub characters: Vec<String>,
    pub has_generated_image: bool,
}

/// A scene with its references resolved to display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SceneView {
    pub tag: SceneTag,
    pub characters: Vec<String>,
    pub shots: Vec<String>,
}

pub fn shot_views(doc: &Document) -> Vec<ShotView> {
    doc.shots()
        .iter()
        .enumerate()
        .map(|(position, shot)| {
            let scene = resolve_shot_scene(doc, shot);
            ShotView {
                id: shot.id,
                position,
                number: shot.number.clone(),
                name: shot.name.clone(),
                scene: scene
                    .found()
                    .map_or_else(|| UNRESOLVED_LABEL.to_string(), |s| s.tag.clone()),
                scene_resolved: !scene.is_unresolved(),
                characters: resolve_shot_characters(doc, shot)
                    .into_iter()
                    .map(|(_, c)| character_label(c))
                    .collect(),
                has_generated_image: shot.generated_image.is_some(),
            }
        })
        .collect()
}

pub fn scene_views(doc: &Document) -> Vec<SceneView> {
    doc.scenes()
        .iter()
        .map(|scene| SceneView {
            tag: scene.tag.clone(),
            characters: resolve_scene_characters(doc, scene)
                .into_iter()
                .map(|(_, c)| character_label(c))
                .collect(),
            shots: resolve_scene_shots(doc, scene)
                .into_iter()
                .map(|(_, s)| {
                    s.found()
                        .map_or_else(|| UNRESOLVED_LABEL.to_string(), |s| s.name.clone())
                })
                .collect(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Consistency report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    ShotScene,
    ShotCharacter,
    SceneCharacter,
    SceneShot,
    CharacterScene,
}

/// A soft reference whose target does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub kind: ReferenceKind,
    /// Id or tag of the entity holding the reference.
    pub owner: String,
    /// The reference that failed to resolve.
    pub target: String,
}

/// List every soft reference in the document that does not resolve.
pub fn dangling_references(doc: &Document) -> Vec<DanglingReference> {
    let mut out = Vec::new();

    for shot in doc.shots() {
        if let Some(tag) = &shot.scene_id {
            if doc.scene(tag).is_none() {
                out.push(DanglingReference {
                    kind: ReferenceKind::ShotScene,
                    owner: shot.id.to_string(),
                    target: tag.clone(),
                });
            }
        }
        for (id, resolved) in resolve_shot_characters(doc, shot) {
            if resolved.is_unresolved() {
                out.push(DanglingReference {
                    kind: ReferenceKind::ShotCharacter,
                    owner: shot.id.to_string(),
                    target: id.to_string(),
                });
            }
        }
    }

    for scene in doc.scenes() {
        for (id, resolved) in resolve_scene_characters(doc, scene) {
            if resolved.is_unresolved() {
                out.push(DanglingReference {
                    kind: ReferenceKind::SceneCharacter,
                    owner: scene.tag.clone(),
                    target: id.to_string(),
                });
            }
        }
        for (id, resolved) in resolve_scene_shots(doc, scene) {
            if resolved.is_unresolved() {
                out.push(DanglingReference {
                    kind: ReferenceKind::SceneShot,
                    owner: scene.tag.clone(),
                    target: id.to_string(),
                });
            }
        }
    }

    for character in doc.characters() {
        for tag in &character.associated_scenes {
            if doc.scene(tag).is_none() {
                out.push(DanglingReference {
                    kind: ReferenceKind::CharacterScene,
                    owner: character.id.to_string(),
                    target: tag.clone(),
                });
            }
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
