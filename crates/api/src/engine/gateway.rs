//! Shared-handle mutation gateway.
//!
//! [`MutationGateway`] wraps the synchronous [`Session`] in a mutex so that
//! intents from concurrent requests are applied one at a time, in arrival
//! order. After each successful intent the full [`SessionState`] is
//! published on the [`EventBus`] while the lock is still held, so observers
//! see revisions in order.
//!
//! Image generation never runs under the lock: the provider is called
//! first and only the resulting save is applied as an ordinary mutation.
//! Every provider call is bounded by the gateway's generation timeout.

use std::sync::Arc;
use std::time::Duration;

use storymaker_core::error::CoreError;
use storymaker_core::gateway::{Applied, Intent, Session, SessionState, ShotSaveReport};
use storymaker_core::generation::{generate_for_shot, GenerationError, ImageGenerator};
use storymaker_core::models::Shot;
use storymaker_core::types::{EntityId, MediaRef};
use storymaker_events::bus::{DocumentEvent, GENERATION_FAILED};
use storymaker_events::EventBus;
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};

pub struct MutationGateway {
    session: Mutex<Session>,
    event_bus: Arc<EventBus>,
    generator: Arc<dyn ImageGenerator>,
    generation_timeout: Duration,
}

impl MutationGateway {
    pub fn new(
        event_bus: Arc<EventBus>,
        generator: Arc<dyn ImageGenerator>,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            session: Mutex::new(Session::new()),
            event_bus,
            generator,
            generation_timeout,
        }
    }

    /// Apply one intent and publish the new state.
    ///
    /// Rejected intents leave the session untouched and publish nothing.
    pub async fn apply(&self, intent: Intent) -> Result<Applied, CoreError> {
        let name = intent.name();
        let mut session = self.session.lock().await;

        match session.apply(intent) {
            Ok(applied) => {
                tracing::info!(
                    intent = name,
                    revision = applied.revision,
                    outcome = ?applied.outcome,
                    "Intent applied"
                );
                let payload = serde_json::to_value(&applied.outcome)
                    .unwrap_or(serde_json::Value::Null);
                self.publish(
                    DocumentEvent::changed(Arc::new(session.state()))
                        .with_intent(name)
                        .with_payload(payload),
                );
                Ok(applied)
            }
            Err(err) => {
                tracing::info!(
                    intent = name,
                    revision = session.revision(),
                    error = %err,
                    "Intent rejected"
                );
                Err(err)
            }
        }
    }

    /// Snapshot of the full observable state.
    pub async fn state(&self) -> SessionState {
        self.session.lock().await.state()
    }

    /// Run a read-only query against the live session.
    pub async fn read<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        let session = self.session.lock().await;
        f(&session)
    }

    /// Generate an image from the shot description, then store the shot.
    ///
    /// The shot is stored whether or not generation succeeds; a failure is
    /// reported in [`ShotSaveReport::generation_error`] and published as a
    /// separate [`GENERATION_FAILED`] event.
    pub async fn save_shot_with_generation(&self, shot: Shot) -> Result<ShotSaveReport, CoreError> {
        let shot_id = shot.id;
        let generated = self.generate(&shot).await;
        if let Err(err) = &generated {
            tracing::warn!(
                shot_id = %shot_id,
                kind = err.kind(),
                error = %err,
                "Image generation failed, saving shot without image"
            );
        }

        let mut session = self.session.lock().await;
        let report = session.save_shot_with_result(shot, generated)?;
        tracing::info!(
            shot_id = %report.shot_id,
            inserted = report.inserted,
            revision = report.revision,
            has_image = report.generated_image.is_some(),
            "Shot saved"
        );

        let state = Arc::new(session.state());
        self.publish(
            DocumentEvent::changed(Arc::clone(&state))
                .with_intent("save_shot")
                .with_payload(serde_json::json!({
                    "result": "shot_saved",
                    "id": report.shot_id,
                    "inserted": report.inserted,
                })),
        );
        if let Some(err) = &report.generation_error {
            self.publish(
                DocumentEvent::new(GENERATION_FAILED, state)
                    .with_intent("save_shot")
                    .with_payload(serde_json::json!({
                        "shot_id": report.shot_id,
                        "error": err,
                    })),
            );
        }
        Ok(report)
    }

    /// [`save_shot_with_generation`](Self::save_shot_with_generation) on its
    /// own task.
    ///
    /// Dropping the returned future (request timeout, client disconnect)
    /// does not cancel the save.
    pub async fn save_shot_with_generation_detached(
        self: Arc<Self>,
        shot: Shot,
    ) -> AppResult<ShotSaveReport> {
        let report = tokio::spawn(async move { self.save_shot_with_generation(shot).await })
            .await
            .map_err(|e| AppError::InternalError(format!("Shot save task failed: {e}")))??;
        Ok(report)
    }

    /// Regenerate the image of a stored shot from its current description.
    ///
    /// Unlike [`save_shot_with_generation`](Self::save_shot_with_generation)
    /// a failed generation is returned as an error and changes nothing.
    pub async fn regenerate_image(&self, id: EntityId) -> AppResult<Applied> {
        let shot = self
            .read(|session| session.document().shot(id).cloned())
            .await
            .ok_or_else(|| CoreError::not_found("Shot", id))?;

        let image = self
            .generate(&shot)
            .await
            .inspect_err(|err| {
                tracing::warn!(shot_id = %id, kind = err.kind(), error = %err, "Image regeneration failed");
            })?;

        Ok(self
            .apply(Intent::AttachGeneratedImage {
                id,
                image: Some(image),
            })
            .await?)
    }

    async fn generate(&self, shot: &Shot) -> Result<MediaRef, GenerationError> {
        tokio::time::timeout(
            self.generation_timeout,
            generate_for_shot(self.generator.as_ref(), shot),
        )
        .await
        .unwrap_or_else(|_| {
            Err(GenerationError::Network {
                message: format!(
                    "Provider did not answer within {}s",
                    self.generation_timeout.as_secs()
                ),
            })
        })
    }

    fn publish(&self, event: DocumentEvent) {
        let receivers = self.event_bus.publish(event);
        tracing::debug!(receivers, "Published document event");
    }
}
