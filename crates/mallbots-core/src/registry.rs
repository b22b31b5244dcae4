//! Type registry.
//!
//! The registry maps aggregate type names to factories that build blank,
//! correctly-identified instances, and maps event and snapshot names to the
//! Rust types their payloads decode into. It is filled in once at startup and
//! then shared read-only behind an `Arc`.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DomainError;
use crate::event::EventPayload;
use crate::snapshot::Snapshot;

type Factory = Box<dyn Fn(&str) -> Box<dyn Any + Send> + Send + Sync>;

#[derive(Debug, Clone, Copy)]
struct Codec {
    type_id: TypeId,
    type_name: &'static str,
}

impl Codec {
    fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }
}

/// Startup-built registry of aggregate factories and payload codecs.
#[derive(Default)]
pub struct Registry {
    factories: HashMap<String, Factory>,
    codecs: HashMap<String, Codec>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("aggregates", &self.factories.keys().collect::<Vec<_>>())
            .field("codecs", &self.codecs.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory that builds a blank aggregate from its ID.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Registry` if `name` is already registered.
    pub fn register_aggregate<T, F>(&mut self, name: &str, factory: F) -> Result<(), DomainError>
    where
        T: Any + Send,
        F: Fn(&str) -> T + Send + Sync + 'static,
    {
        if self.factories.contains_key(name) {
            return Err(DomainError::Registry(format!(
                "aggregate `{name}` is already registered"
            )));
        }
        self.factories.insert(
            name.to_owned(),
            Box::new(move |id: &str| Box::new(factory(id)) as Box<dyn Any + Send>),
        );
        Ok(())
    }

    /// Registers an event name whose payload decodes into `P`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Registry` if `name` is already registered.
    pub fn register_event<P: EventPayload>(&mut self, name: &str) -> Result<(), DomainError> {
        self.register_codec::<P>(name)
    }

    /// Registers a snapshot name whose payload decodes into `S`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Registry` if `name` is already registered.
    pub fn register_snapshot<S: Snapshot>(&mut self, name: &str) -> Result<(), DomainError> {
        self.register_codec::<S>(name)
    }

    fn register_codec<T: 'static>(&mut self, name: &str) -> Result<(), DomainError> {
        if self.codecs.contains_key(name) {
            return Err(DomainError::Registry(format!(
                "codec `{name}` is already registered"
            )));
        }
        self.codecs.insert(name.to_owned(), Codec::of::<T>());
        Ok(())
    }

    /// Builds a blank aggregate of type `name` with identity `id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Registry` if no factory is registered for `name`.
    pub fn build(&self, name: &str, id: &str) -> Result<Box<dyn Any + Send>, DomainError> {
        let factory = self.factories.get(name).ok_or_else(|| {
            DomainError::Registry(format!("no aggregate registered as `{name}`"))
        })?;
        Ok(factory(id))
    }

    /// Encodes a payload registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Registry` if `name` is unregistered or registered
    /// for another type, or if encoding fails.
    pub fn serialize<T: Serialize + 'static>(
        &self,
        name: &str,
        value: &T,
    ) -> Result<serde_json::Value, DomainError> {
        let codec = self
            .codecs
            .get(name)
            .ok_or_else(|| DomainError::Registry(format!("`{name}` is not registered")))?;
        if codec.type_id != TypeId::of::<T>() {
            return Err(DomainError::Registry(format!(
                "`{name}` is registered as {}, not {}",
                codec.type_name,
                type_name::<T>()
            )));
        }
        serde_json::to_value(value)
            .map_err(|e| DomainError::Registry(format!("failed to serialize `{name}`: {e}")))
    }

    /// Decodes a payload stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ReplayContract` if `name` is unregistered,
    /// registered for another type, or the payload does not decode.
    pub fn deserialize<T: DeserializeOwned + 'static>(
        &self,
        name: &str,
        value: serde_json::Value,
    ) -> Result<T, DomainError> {
        let codec = self.codecs.get(name).ok_or_else(|| {
            DomainError::ReplayContract(format!("`{name}` is not a registered payload"))
        })?;
        if codec.type_id != TypeId::of::<T>() {
            return Err(DomainError::ReplayContract(format!(
                "`{name}` decodes into {}, not {}",
                codec.type_name,
                type_name::<T>()
            )));
        }
        serde_json::from_value(value)
            .map_err(|e| DomainError::ReplayContract(format!("failed to decode `{name}`: {e}")))
    }
}
