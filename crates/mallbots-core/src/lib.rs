//! MallBots Core: event-sourced aggregate persistence.
//!
//! This crate defines how a domain object's state is rebuilt from, and
//! committed as, an ordered sequence of domain events. Application code talks
//! to an [`AggregateRepository`](repository::AggregateRepository); the
//! repository delegates to a chain of [`AggregateStore`](store::AggregateStore)
//! adapters built once at startup:
//!
//! ```text
//! EventPublisher -> SnapshotStore -> EventStore -> EventStorage
//! ```
//!
//! Storage backends are abstracted behind
//! [`EventStorage`](event_store::EventStorage) and
//! [`SnapshotStorage`](snapshot_store::SnapshotStorage). In-memory reference
//! backends live in [`memory`]; PostgreSQL backends live in
//! `mallbots-event-store`.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod dispatcher;
pub mod entity;
pub mod error;
pub mod event;
pub mod event_store;
pub mod memory;
pub mod publisher;
pub mod registry;
pub mod replay;
pub mod repository;
pub mod snapshot;
pub mod snapshot_store;
pub mod store;
