//! Typed ID wrappers for entities, schemas, and constraints.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed ID wrappers prevent mixing up entity ids, schema ids, and
/// constraint ids. These are plain strings underneath — the reducer does
/// not enforce any particular id format beyond what `entity.create`
/// validation requires.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new typed ID from anything that converts to `String`.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// The synthetic root id every top-level entity's `parent` may equal.
            pub fn root() -> Self {
                Self("root".to_string())
            }

            /// Whether this id is the synthetic root.
            pub fn is_root(&self) -> bool {
                self.0 == "root"
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

typed_id!(EntityId, "Unique identifier for an entity within one aide.");
typed_id!(SchemaId, "Unique identifier for a declared entity schema.");
typed_id!(ConstraintId, "Unique identifier for a registered constraint.");
typed_id!(AideId, "Unique identifier for one living document (aide), the unit of ownership and persistence.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_helpers() {
        let r = EntityId::root();
        assert!(r.is_root());
        assert_eq!(r.as_str(), "root");
        assert!(!EntityId::from("page_1").is_root());
    }

    #[test]
    fn display_and_conversions() {
        let id: EntityId = "roster".into();
        assert_eq!(id.to_string(), "roster");
        assert_eq!(EntityId::new("league".to_string()).as_str(), "league");
    }
}
