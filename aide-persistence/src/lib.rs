//! The hydration/persistence facade contract: a storage-agnostic trait plus
//! the wire-shaped value types it moves (spec §4.4, §6.2, §6.3).
//!
//! This crate defines the contract only. See `aide-persistence-memory` and
//! `aide-persistence-fs` for reference backends.

#![deny(missing_docs)]

mod error;
mod facade;
mod types;

pub use error::PersistenceError;
pub use facade::{CallerId, PersistenceFacade};
pub use types::{Blueprint, ConversationMessage, ForkResult, HydrateResponse, PublishOptions, Role, TurnLoad};
