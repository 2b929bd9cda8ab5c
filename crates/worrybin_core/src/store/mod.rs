//! Raw key-value slot storage.
//!
//! # Responsibility
//! - Read and replace the bytes held under one named slot.
//!
//! # Invariants
//! - An absent slot reads as `None`, never as an error.
//! - A write replaces the whole slot; no partial updates.

pub mod record_store;
