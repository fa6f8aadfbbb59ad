//! Core library for usagedash.
//!
//! Holds the usage data model, the per-view tab state store and the data
//! sources (credentials, usage APIs, credential renewal) that feed them.

pub mod sources;
pub mod state;
pub mod usage;
