//! Repository layer over the record store.
//!
//! # Responsibility
//! - Own the encode/decode contract for the persisted worry collection.
//! - Isolate serialization details from the list controller.
//!
//! # Invariants
//! - Every mutation is a full load-modify-store cycle of the collection.
//! - The repository keeps no cache; the store is the source of truth.

pub mod worry_repo;
