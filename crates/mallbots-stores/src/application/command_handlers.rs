//! Command handlers for the Stores context.
//!
//! This module contains application-level command handler functions that
//! orchestrate domain logic: load aggregate, execute command, save events.

use mallbots_core::aggregate::EventSourced;
use mallbots_core::clock::Clock;
use mallbots_core::command::Command;
use mallbots_core::error::DomainError;
use mallbots_core::repository::AggregateRepository;
use tracing::info;

use crate::domain::aggregates::{Product, Store};
use crate::domain::commands::{
    AddProduct, CreateStore, DecreaseProductPrice, DisableParticipation, EnableParticipation,
    IncreaseProductPrice, RebrandProduct, RebrandStore, RemoveProduct,
};

/// Result of a successfully handled command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoresCommandResult {
    /// The aggregate ID affected by the command.
    pub aggregate_id: String,
    /// The aggregate version after the save.
    pub version: i64,
}

fn log_command(command: &dyn Command) {
    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        aggregate_id = command.aggregate_id(),
        "handling command"
    );
}

async fn save_new<T: EventSourced>(
    mut aggregate: T,
    repo: &AggregateRepository<T>,
) -> Result<StoresCommandResult, DomainError> {
    repo.save(&mut aggregate).await?;
    Ok(StoresCommandResult {
        aggregate_id: aggregate.id().to_owned(),
        version: aggregate.version(),
    })
}

async fn load_and_save<T, F>(
    command: &dyn Command,
    repo: &AggregateRepository<T>,
    change: F,
) -> Result<StoresCommandResult, DomainError>
where
    T: EventSourced,
    F: FnOnce(&mut T) -> Result<(), DomainError> + Send,
{
    let mut aggregate = repo.load(command.aggregate_id()).await?;
    change(&mut aggregate)?;
    save_new(aggregate, repo).await
}

/// Handles the `CreateStore` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a blank name or location and
/// `DomainError::ConcurrencyConflict` if the store already exists.
pub async fn handle_create_store(
    command: &CreateStore,
    clock: &dyn Clock,
    repo: &AggregateRepository<Store>,
) -> Result<StoresCommandResult, DomainError> {
    log_command(command);
    let store = Store::create(
        &command.store_id,
        &command.name,
        &command.location,
        command.correlation_id,
        clock,
    )?;
    save_new(store, repo).await
}

/// Handles the `EnableParticipation` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the store does not exist and
/// `DomainError::Validation` if it is already participating.
pub async fn handle_enable_participation(
    command: &EnableParticipation,
    clock: &dyn Clock,
    repo: &AggregateRepository<Store>,
) -> Result<StoresCommandResult, DomainError> {
    log_command(command);
    load_and_save(command, repo, |store: &mut Store| {
        store.enable_participation(command.correlation_id, clock)
    })
    .await
}

/// Handles the `DisableParticipation` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the store does not exist and
/// `DomainError::Validation` if it is not participating.
pub async fn handle_disable_participation(
    command: &DisableParticipation,
    clock: &dyn Clock,
    repo: &AggregateRepository<Store>,
) -> Result<StoresCommandResult, DomainError> {
    log_command(command);
    load_and_save(command, repo, |store: &mut Store| {
        store.disable_participation(command.correlation_id, clock)
    })
    .await
}

/// Handles the `RebrandStore` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the store does not exist and
/// `DomainError::Validation` for a blank name.
pub async fn handle_rebrand_store(
    command: &RebrandStore,
    clock: &dyn Clock,
    repo: &AggregateRepository<Store>,
) -> Result<StoresCommandResult, DomainError> {
    log_command(command);
    load_and_save(command, repo, |store: &mut Store| {
        store.rebrand(&command.name, command.correlation_id, clock)
    })
    .await
}

/// Handles the `AddProduct` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` for invalid product data and
/// `DomainError::ConcurrencyConflict` if the product already exists.
pub async fn handle_add_product(
    command: &AddProduct,
    clock: &dyn Clock,
    repo: &AggregateRepository<Product>,
) -> Result<StoresCommandResult, DomainError> {
    log_command(command);
    let product = Product::add(
        &command.product_id,
        &command.store_id,
        &command.name,
        &command.description,
        &command.sku,
        command.price,
        command.correlation_id,
        clock,
    )?;
    save_new(product, repo).await
}

/// Handles the `RebrandProduct` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the product does not exist and
/// `DomainError::Validation` for a blank name or removed product.
pub async fn handle_rebrand_product(
    command: &RebrandProduct,
    clock: &dyn Clock,
    repo: &AggregateRepository<Product>,
) -> Result<StoresCommandResult, DomainError> {
    log_command(command);
    load_and_save(command, repo, |product: &mut Product| {
        product.rebrand(
            &command.name,
            &command.description,
            command.correlation_id,
            clock,
        )
    })
    .await
}

/// Handles the `IncreaseProductPrice` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the product does not exist and
/// `DomainError::Validation` if the new price is not higher.
pub async fn handle_increase_product_price(
    command: &IncreaseProductPrice,
    clock: &dyn Clock,
    repo: &AggregateRepository<Product>,
) -> Result<StoresCommandResult, DomainError> {
    log_command(command);
    load_and_save(command, repo, |product: &mut Product| {
        product.increase_price(command.price, command.correlation_id, clock)
    })
    .await
}

/// Handles the `DecreaseProductPrice` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the product does not exist and
/// `DomainError::Validation` if the new price is not lower or not positive.
pub async fn handle_decrease_product_price(
    command: &DecreaseProductPrice,
    clock: &dyn Clock,
    repo: &AggregateRepository<Product>,
) -> Result<StoresCommandResult, DomainError> {
    log_command(command);
    load_and_save(command, repo, |product: &mut Product| {
        product.decrease_price(command.price, command.correlation_id, clock)
    })
    .await
}

/// Handles the `RemoveProduct` command.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if the product does not exist and
/// `DomainError::Validation` if it was already removed.
pub async fn handle_remove_product(
    command: &RemoveProduct,
    clock: &dyn Clock,
    repo: &AggregateRepository<Product>,
) -> Result<StoresCommandResult, DomainError> {
    log_command(command);
    load_and_save(command, repo, |product: &mut Product| {
        product.remove(command.correlation_id, clock)
    })
    .await
}
