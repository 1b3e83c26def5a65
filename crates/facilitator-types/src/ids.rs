//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every record kind has its own ID type so a participant ID can never be
//! passed where a score ID is expected. IDs are UUID v7 (time-ordered) and
//! are generated application-side before the record reaches the store.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl core::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<Uuid>().map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a dashboard user (facilitator or observer).
    UserId
}

define_id! {
    /// Unique identifier for a simulation participant.
    ParticipantId
}

define_id! {
    /// Unique identifier for a simulation event (incident, change, ...).
    EventId
}

define_id! {
    /// Unique identifier for a feedback message sent to a participant.
    FeedbackId
}

define_id! {
    /// Unique identifier for a score awarded to a participant.
    ScoreId
}

define_id! {
    /// Unique identifier for a simulation session window.
    SessionId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let participant = ParticipantId::new();
        let score = ScoreId::new();
        assert_ne!(participant.into_inner(), Uuid::nil());
        assert_ne!(score.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_serializes_as_bare_uuid() {
        let id = SessionId::new();
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, format!("\"{}\"", id.into_inner()));
    }

    #[test]
    fn id_parses_from_display() {
        let id = ParticipantId::new();
        let parsed: Result<ParticipantId, _> = id.to_string().parse();
        assert_eq!(parsed.ok(), Some(id));
        assert!("not-a-uuid".parse::<ParticipantId>().is_err());
    }
}
