//! Identifier module - UUIDv7-backed ids for habits, users and records
//!
//! UUIDv7 keeps ids chronologically sortable, which matters for the
//! append-only level history stream.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Generate a new UUIDv7-based id
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// Create an id from a raw u128 value
            ///
            /// This is primarily for storage layer deserialization and tests.
            pub fn from_value(value: u128) -> Self {
                Self(uuid::Uuid::from_u128(value))
            }

            /// Parse an id from its hyphenated string form
            pub fn parse(s: &str) -> Result<Self, String> {
                uuid::Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| format!("Invalid {} string: {}", stringify!($name), e))
            }

            /// Get the raw u128 value
            pub fn value(&self) -> u128 {
                self.0.as_u128()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id! {
    /// Identifier of a tracked habit
    HabitId
}

uuid_id! {
    /// Identifier of a user
    UserId
}

uuid_id! {
    /// Identifier of an immutable record (estimate or history entry)
    RecordId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_sortable() {
        let first = RecordId::new();
        let second = RecordId::new();
        assert!(first <= second);
    }

    #[test]
    fn test_parse_round_trip() {
        let id = HabitId::new();
        let parsed = HabitId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert!(UserId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_from_value() {
        assert_eq!(UserId::from_value(7).value(), 7);
    }
}
