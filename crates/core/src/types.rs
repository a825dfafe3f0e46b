use serde::{Deserialize, Serialize};

/// Identifier for characters and shots.
///
/// UUIDv7 so freshly created ids sort by creation time.
pub type EntityId = uuid::Uuid;

/// Scenes carry no separate id; the tag is the reference.
pub type SceneTag = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Allocate a fresh, collision-resistant entity id.
pub fn new_entity_id() -> EntityId {
    uuid::Uuid::now_v7()
}

/// Opaque handle to externally owned image or video data.
///
/// Usually a URL (`https://...`, `blob:...` or a `data:` URL returned by the
/// image generator). The core stores and returns it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaRef(String);

impl MediaRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MediaRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
