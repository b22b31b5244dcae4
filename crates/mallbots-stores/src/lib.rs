//! MallBots Stores: stores, their products, and the mall and catalog read
//! models built from their events.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod module;
