//! Domain model for the Stores context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod read_models;
pub mod snapshots;
