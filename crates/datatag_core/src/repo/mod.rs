//! Repository layer over the SQLite annotation store.
//!
//! # Responsibility
//! - Keep SQL details for committed annotation sets behind the gateway
//!   contract.
//!
//! # Invariants
//! - Repositories only accept connections opened through `db::open_db*`.

pub mod annotation_repo;
