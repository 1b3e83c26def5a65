//! Enumeration types for the facilitator backend.
//!
//! Each enum carries a fixed lowercase label used both on the wire (JSON)
//! and in the database `TEXT` columns, so the two can never drift apart.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A string did not match any label of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} label: {label}")]
pub struct UnknownLabel {
    /// Name of the enum that failed to parse.
    pub kind: &'static str,
    /// The rejected input.
    pub label: String,
}

/// Generates a label-carrying enum with `as_str`, `Display` and `FromStr`.
macro_rules! label_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $label:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The wire and database label for this variant.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl core::str::FromStr for $name {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok(Self::$variant),)+
                    other => Err(UnknownLabel {
                        kind: stringify!($name),
                        label: other.to_owned(),
                    }),
                }
            }
        }
    };
}

label_enum! {
    /// Lifecycle state of a simulation session.
    ///
    /// A session cycles `stopped -> active -> stopped`; at most one session
    /// is `active` at any instant.
    SessionStatus {
        /// The simulation is live.
        Active => "active",
        /// The session window has closed.
        Stopped => "stopped",
    }
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self::Stopped
    }
}

label_enum! {
    /// Presence of a participant in the running simulation.
    ParticipantStatus {
        /// A human is actively playing this role.
        Active => "active",
        /// The participant is not currently engaged.
        Inactive => "inactive",
        /// The role is being driven by an AI stand-in.
        AiControlled => "ai-controlled",
    }
}

impl Default for ParticipantStatus {
    fn default() -> Self {
        Self::Active
    }
}

label_enum! {
    /// Category of an injected simulation event.
    EventType {
        /// Unplanned service interruption.
        Incident => "incident",
        /// Service request from a user.
        Request => "request",
        /// Planned change to the environment.
        Change => "change",
        /// Work item on the agile board.
        AgileTask => "agile-task",
        /// Root-cause investigation.
        Problem => "problem",
    }
}

label_enum! {
    /// Whether an event still needs attention.
    EventStatus {
        /// Awaiting resolution.
        Open => "open",
        /// Resolved.
        Closed => "closed",
    }
}

impl Default for EventStatus {
    fn default() -> Self {
        Self::Open
    }
}

label_enum! {
    /// Access role of a dashboard user.
    UserRole {
        /// Runs the simulation.
        Facilitator => "facilitator",
        /// Watches the dashboard.
        Observer => "observer",
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Observer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_roundtrip_through_from_str() {
        for status in ParticipantStatus::ALL {
            assert_eq!(status.as_str().parse::<ParticipantStatus>().ok(), Some(*status));
        }
        for kind in EventType::ALL {
            assert_eq!(kind.as_str().parse::<EventType>().ok(), Some(*kind));
        }
    }

    #[test]
    fn serde_uses_the_same_labels() {
        let json = serde_json::to_string(&ParticipantStatus::AiControlled).unwrap_or_default();
        assert_eq!(json, "\"ai-controlled\"");
        let json = serde_json::to_string(&EventType::AgileTask).unwrap_or_default();
        assert_eq!(json, "\"agile-task\"");
    }

    #[test]
    fn unknown_label_names_the_enum() {
        let err = "paused".parse::<SessionStatus>().err();
        assert_eq!(
            err.map(|e| e.to_string()),
            Some("unknown SessionStatus label: paused".to_owned())
        );
    }

    #[test]
    fn defaults_match_new_record_state() {
        assert_eq!(SessionStatus::default(), SessionStatus::Stopped);
        assert_eq!(ParticipantStatus::default(), ParticipantStatus::Active);
        assert_eq!(EventStatus::default(), EventStatus::Open);
        assert_eq!(UserRole::default(), UserRole::Observer);
    }
}
