//! Core use-case services.
//!
//! # Responsibility
//! - Turn user actions into repository calls.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod worry_list;
