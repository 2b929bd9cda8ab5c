//! Flutter-facing bindings for the Worry Bin core.

pub mod api;
