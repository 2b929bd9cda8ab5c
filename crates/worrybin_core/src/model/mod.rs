//! Domain model for the worry list.
//!
//! # Responsibility
//! - Define the single record type persisted by the core.
//!
//! # Invariants
//! - Every worry is identified by a stable `WorryId` that is never reused.
//! - Only `realized` changes after creation.

pub mod worry;
