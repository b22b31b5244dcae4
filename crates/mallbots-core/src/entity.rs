//! Entity identity.

/// Immutable identity shared by every aggregate.
///
/// `name` is the aggregate type name used for registry lookup and stream
/// naming. Two entities are equal when their ids match.
#[derive(Debug, Clone, Eq)]
pub struct Entity {
    id: String,
    name: String,
}

impl Entity {
    /// Creates a new entity.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Returns the entity identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the entity type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entities_with_same_id_are_equal() {
        let a = Entity::new("store-1", "stores.Store");
        let b = Entity::new("store-1", "stores.Other");

        assert_eq!(a, b);
        assert_ne!(a, Entity::new("store-2", "stores.Store"));
    }
}
