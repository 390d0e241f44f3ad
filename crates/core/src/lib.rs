//! `tally-core` — ledger foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod time;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AccountId, TransactionId, UserId};
pub use time::{Timestamp, parse_timestamp};
