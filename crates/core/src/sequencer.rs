//! Ordered shot sequence operations.
//!
//! The sequence is a plain `Vec`; position is the order. Moves remove the
//! element at `from` and reinsert it at `to`, so set membership never
//! changes.

use crate::error::CoreError;
use crate::models::Shot;
use crate::types::EntityId;

/// Items that can live in an id-addressed sequence.
pub trait Sequenced {
    fn sequence_id(&self) -> EntityId;
}

impl Sequenced for Shot {
    fn sequence_id(&self) -> EntityId {
        self.id
    }
}

/// Append an item to the end of the sequence.
pub fn append<T>(items: &mut Vec<T>, item: T) {
    items.push(item);
}

/// Convert a caller-supplied index into a position within `[0, len)`.
pub fn checked_index(index: i64, len: usize, label: &str) -> Result<usize, CoreError> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i < len)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "{label} {index} is out of range for a sequence of length {len}"
            ))
        })
}

/// Move the item at `from` to position `to`.
///
/// Both indices must lie in `[0, len)`. On error the sequence is untouched.
pub fn move_item<T>(items: &mut Vec<T>, from: i64, to: i64) -> Result<(), CoreError> {
    let from = checked_index(from, items.len(), "from_index")?;
    let to = checked_index(to, items.len(), "to_index")?;
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    Ok(())
}

/// Remove every item with the given id. Returns whether anything was removed.
pub fn remove_by_id<T: Sequenced>(items: &mut Vec<T>, id: EntityId) -> bool {
    let before = items.len();
    items.retain(|item| item.sequence_id() != id);
    items.len() != before
}

pub fn position_of<T: Sequenced>(items: &[T], id: EntityId) -> Option<usize> {
    items.iter().position(|item| item.sequence_id() == id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
