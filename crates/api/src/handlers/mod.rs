//! Request handlers.
//!
//! Each submodule turns HTTP requests into gateway intents (or read-only
//! queries on the live session) and maps errors via [`AppError`](crate::error::AppError).

pub mod characters;
pub mod scenes;
pub mod session;
pub mod shots;
pub mod snapshots;
pub mod versions;
