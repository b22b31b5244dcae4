//! Application layer for the Stores context.

pub mod command_handlers;
pub mod event_handlers;
pub mod query_handlers;
mod service;

pub use service::StoresApplication;
