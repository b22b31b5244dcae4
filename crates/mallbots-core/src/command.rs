//! Command abstractions.

use uuid::Uuid;

/// Trait that all commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Dotted command name, e.g. `stores.create_store`, for logging.
    fn command_type(&self) -> &'static str;

    /// ID of the aggregate the command targets.
    fn aggregate_id(&self) -> &str;

    /// Correlation ID copied onto every event the command produces.
    fn correlation_id(&self) -> Uuid;
}
