//! The mutation gateway: the single place where intents are applied.
//!
//! [`Session`] owns the live [`Document`] and the [`SnapshotLog`]. Every
//! state change goes through [`Session::apply`] (or
//! [`Session::save_shot_with_result`] for generation results). A failed
//! intent leaves the session exactly as it was and does not bump the
//! revision.

use serde::{Deserialize, Serialize};

use crate::document::{Document, ShotSaveKind};
use crate::error::CoreError;
use crate::generation::GenerationError;
use crate::history::{SnapshotLog, SnapshotSummary, StepDirection};
use crate::models::{Character, CreateCharacter, CreateShot, Shot};
use crate::relations::{scene_views, shot_views, SceneView, ShotView, SHOT_PLANNING_TARGET};
use crate::types::{EntityId, MediaRef, SceneTag};

// ---------------------------------------------------------------------------
// Intents
// ---------------------------------------------------------------------------

/// A named request to change the session state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    AddVersion {
        text: String,
    },
    SetCurrentVersion {
        text: String,
    },
    RevertToVersion {
        number: usize,
    },
    AddScene {
        tag: SceneTag,
    },
    DeleteScene {
        tag: SceneTag,
    },
    LinkSceneCharacter {
        tag: SceneTag,
        character_id: EntityId,
    },
    UnlinkSceneCharacter {
        tag: SceneTag,
        character_id: EntityId,
    },
    LinkSceneShot {
        tag: SceneTag,
        shot_id: EntityId,
    },
    UnlinkSceneShot {
        tag: SceneTag,
        shot_id: EntityId,
    },
    AddCharacter {
        character: CreateCharacter,
    },
    UpdateCharacter {
        character: Character,
    },
    DeleteCharacter {
        id: EntityId,
    },
    AddShot {
        shot: CreateShot,
    },
    UpdateShot {
        shot: Shot,
    },
    /// Update the shot if its id exists, otherwise append it.
    SaveShot {
        shot: Shot,
    },
    AttachGeneratedImage {
        id: EntityId,
        image: Option<MediaRef>,
    },
    DeleteShot {
        id: EntityId,
    },
    MoveShot {
        from_index: i64,
        to_index: i64,
    },
    TakeSnapshot {
        #[serde(default)]
        label: Option<String>,
    },
    NavigateSnapshot {
        index: i64,
    },
    StepSnapshot {
        direction: StepDirection,
    },
}

impl Intent {
    /// Stable snake_case name, matching the serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddVersion { .. } => "add_version",
            Self::SetCurrentVersion { .. } => "set_current_version",
            Self::RevertToVersion { .. } => "revert_to_version",
            Self::AddScene { .. } => "add_scene",
            Self::DeleteScene { .. } => "delete_scene",
            Self::LinkSceneCharacter { .. } => "link_scene_character",
            Self::UnlinkSceneCharacter { .. } => "unlink_scene_character",
            Self::LinkSceneShot { .. } => "link_scene_shot",
            Self::UnlinkSceneShot { .. } => "unlink_scene_shot",
            Self::AddCharacter { .. } => "add_character",
            Self::UpdateCharacter { .. } => "update_character",
            Self::DeleteCharacter { .. } => "delete_character",
            Self::AddShot { .. } => "add_shot",
            Self::UpdateShot { .. } => "update_shot",
            Self::SaveShot { .. } => "save_shot",
            Self::AttachGeneratedImage { .. } => "attach_generated_image",
            Self::DeleteShot { .. } => "delete_shot",
            Self::MoveShot { .. } => "move_shot",
            Self::TakeSnapshot { .. } => "take_snapshot",
            Self::NavigateSnapshot { .. } => "navigate_snapshot",
            Self::StepSnapshot { .. } => "step_snapshot",
        }
    }
}

/// What an applied intent did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum IntentOutcome {
    /// The change was applied in place.
    Applied,
    /// A character or shot was created under a fresh id.
    Created { id: EntityId },
    VersionSaved { number: usize },
    ShotSaved { id: EntityId, inserted: bool },
    /// A delete or unlink; `changed` is false when nothing matched.
    Removed { changed: bool },
    /// A link; `changed` is false when the reference was already present.
    Linked { changed: bool },
    SnapshotTaken { index: usize },
    /// A history navigation; `moved` is false for ignored requests.
    Navigated { moved: bool, cursor: i64 },
}

/// Result of a successful [`Session::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Applied {
    pub revision: u64,
    pub outcome: IntentOutcome,
}

/// Result of storing a shot after an image generation attempt.
///
/// The shot is always stored; `generation_error` carries the degraded part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShotSaveReport {
    pub revision: u64,
    pub shot_id: EntityId,
    pub inserted: bool,
    pub generated_image: Option<MediaRef>,
    pub generation_error: Option<GenerationError>,
}

// ---------------------------------------------------------------------------
// Observed state
// ---------------------------------------------------------------------------

/// Everything a subscriber needs to re-render after a mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionState {
    pub revision: u64,
    pub document: Document,
    pub shots_view: Vec<ShotView>,
    pub scenes_view: Vec<SceneView>,
    pub snapshots: Vec<SnapshotSummary>,
    pub snapshot_cursor: i64,
    pub can_step_back: bool,
    pub can_step_forward: bool,
    pub shot_count: usize,
    pub shot_target: usize,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Session {
    document: Document,
    snapshots: SnapshotLog,
    revision: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn snapshots(&self) -> &SnapshotLog {
        &self.snapshots
    }

    /// Incremented once per successfully applied intent.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Validate and apply one intent.
    pub fn apply(&mut self, intent: Intent) -> Result<Applied, CoreError> {
        let outcome = self.dispatch(intent)?;
        self.revision += 1;
        Ok(Applied {
            revision: self.revision,
            outcome,
        })
    }

    fn dispatch(&mut self, intent: Intent) -> Result<IntentOutcome, CoreError> {
        let doc = &mut self.document;
        let outcome = match intent {
            Intent::AddVersion { text } => IntentOutcome::VersionSaved {
                number: doc.add_version(text),
            },
            Intent::SetCurrentVersion { text } => {
                doc.set_current_version(text);
                IntentOutcome::Applied
            }
            Intent::RevertToVersion { number } => {
                doc.revert_to_version(number)?;
                IntentOutcome::Applied
            }
            Intent::AddScene { tag } => {
                doc.add_scene(&tag)?;
                IntentOutcome::Applied
            }
            Intent::DeleteScene { tag } => IntentOutcome::Removed {
                changed: doc.delete_scene(&tag),
            },
            Intent::LinkSceneCharacter { tag, character_id } => IntentOutcome::Linked {
                changed: doc.link_scene_character(&tag, character_id)?,
            },
            Intent::UnlinkSceneCharacter { tag, character_id } => IntentOutcome::Removed {
                changed: doc.unlink_scene_character(&tag, character_id)?,
            },
            Intent::LinkSceneShot { tag, shot_id } => IntentOutcome::Linked {
                changed: doc.link_scene_shot(&tag, shot_id)?,
            },
            Intent::UnlinkSceneShot { tag, shot_id } => IntentOutcome::Removed {
                changed: doc.unlink_scene_shot(&tag, shot_id)?,
            },
            Intent::AddCharacter { character } => IntentOutcome::Created {
                id: doc.add_character(character),
            },
            Intent::UpdateCharacter { character } => {
                let id = character.id;
                if !doc.update_character(character) {
                    return Err(CoreError::not_found("Character", id));
                }
                IntentOutcome::Applied
            }
            Intent::DeleteCharacter { id } => IntentOutcome::Removed {
                changed: doc.delete_character(id),
            },
            Intent::AddShot { shot } => IntentOutcome::Created {
                id: doc.add_shot(shot),
            },
            Intent::UpdateShot { shot } => {
                let id = shot.id;
                if !doc.update_shot(shot) {
                    return Err(CoreError::not_found("Shot", id));
                }
                IntentOutcome::Applied
            }
            Intent::SaveShot { shot } => {
                let id = shot.id;
                let kind = doc.save_shot(shot);
                IntentOutcome::ShotSaved {
                    id,
                    inserted: kind == ShotSaveKind::Inserted,
                }
            }
            Intent::AttachGeneratedImage { id, image } => {
                if !doc.set_generated_image(id, image) {
                    return Err(CoreError::not_found("Shot", id));
                }
                IntentOutcome::Applied
            }
            Intent::DeleteShot { id } => IntentOutcome::Removed {
                changed: doc.delete_shot(id),
            },
            Intent::MoveShot {
                from_index,
                to_index,
            } => {
                doc.move_shot(from_index, to_index)?;
                IntentOutcome::Applied
            }
            Intent::TakeSnapshot { label } => IntentOutcome::SnapshotTaken {
                index: self.snapshots.take(&self.document, label)?,
            },
            Intent::NavigateSnapshot { index } => {
                let moved = self.snapshots.navigate(index, &mut self.document);
                IntentOutcome::Navigated {
                    moved,
                    cursor: self.snapshots.cursor_position(),
                }
            }
            Intent::StepSnapshot { direction } => {
                let moved = self.snapshots.step(direction, &mut self.document);
                IntentOutcome::Navigated {
                    moved,
                    cursor: self.snapshots.cursor_position(),
                }
            }
        };
        Ok(outcome)
    }

    /// Store a shot together with the outcome of its image generation.
    ///
    /// The shot is saved (update-or-append) in every case. On success its
    /// `generated_image` is the new image; on failure it is cleared and the
    /// typed failure is returned in the report instead of as an error.
    pub fn save_shot_with_result(
        &mut self,
        mut shot: Shot,
        generated: Result<MediaRef, GenerationError>,
    ) -> Result<ShotSaveReport, CoreError> {
        let (generated_image, generation_error) = match generated {
            Ok(image) => (Some(image), None),
            Err(err) => (None, Some(err)),
        };
        shot.generated_image = generated_image.clone();
        let shot_id = shot.id;

        let applied = self.apply(Intent::SaveShot { shot })?;
        let inserted = matches!(applied.outcome, IntentOutcome::ShotSaved { inserted: true, .. });

        Ok(ShotSaveReport {
            revision: applied.revision,
            shot_id,
            inserted,
            generated_image,
            generation_error,
        })
    }

    /// Full observable state, recomputed from the live document.
    pub fn state(&self) -> SessionState {
        SessionState {
            revision: self.revision,
            document: self.document.clone(),
            shots_view: shot_views(&self.document),
            scenes_view: scene_views(&self.document),
            snapshots: self.snapshots.summaries(),
            snapshot_cursor: self.snapshots.cursor_position(),
            can_step_back: self.snapshots.can_step_back(),
            can_step_forward: self.snapshots.can_step_forward(),
            shot_count: self.document.shots().len(),
            shot_target: SHOT_PLANNING_TARGET,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
