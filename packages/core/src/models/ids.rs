//! Typed Identifiers
//!
//! Content nodes, properties and users are all addressed by UUIDs. Each kind
//! gets its own newtype so a property id can never be passed where a content
//! id is expected. All of them serialize as the bare UUID string.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random (v4) identifier
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Borrow the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

uuid_id!(
    /// Identifier of a [`Content`](crate::models::Content) node
    ContentId
);

uuid_id!(
    /// Identifier of a [`Property`](crate::models::Property) edge
    PropertyId
);

uuid_id!(
    /// Identifier of the owning user
    UserId
);

/// Source of identifiers for newly created rows
///
/// The service never invents ids itself; it asks the generator so tests and
/// embedding applications can plug in their own scheme.
pub trait IdGenerator: Send + Sync {
    fn content_id(&self) -> ContentId;
    fn property_id(&self) -> PropertyId;
}

/// Default generator backed by random v4 UUIDs
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn content_id(&self) -> ContentId {
        ContentId::new_v4()
    }

    fn property_id(&self) -> PropertyId {
        PropertyId::new_v4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tolerates_surrounding_whitespace() {
        let id = PropertyId::new_v4();
        let parsed: PropertyId = format!("  {}\n", id).parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_serializes_as_bare_uuid_string() {
        let id = ContentId::new_v4();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.to_string()));
    }

    #[test]
    fn test_uuid_generator_yields_distinct_ids() {
        let generator = UuidGenerator;
        assert_ne!(generator.content_id(), generator.content_id());
        assert_ne!(generator.property_id(), generator.property_id());
    }
}
