//! Status and role enums for domain entities.
//!
//! Every enum here is a closed set stored as a constrained TEXT column.
//! `as_str`/`FromStr` use the stored wire form (SCREAMING_SNAKE_CASE),
//! matching the serde representation.

use serde::{Deserialize, Serialize};

/// Macro to define a closed string-backed enum.
///
/// Generates `as_str`, `Display`, and `FromStr` using the same
/// SCREAMING_SNAKE_CASE token that serde serializes to, so database values
/// and JSON values never diverge.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// The stored wire form of this value.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(format!(concat!("invalid ", stringify!($name), ": {}"), s)),
                }
            }
        }
    };
}

string_enum! {
    /// Lifecycle status of a sales contact.
    ContactStatus {
        New => "NEW",
        Contacted => "CONTACTED",
        Qualified => "QUALIFIED",
        Converted => "CONVERTED",
        Closed => "CLOSED",
    }
}

impl Default for ContactStatus {
    fn default() -> Self {
        Self::New
    }
}

string_enum! {
    /// Delivery status of a client project.
    ProjectStatus {
        Planning => "PLANNING",
        InProgress => "IN_PROGRESS",
        Review => "REVIEW",
        Completed => "COMPLETED",
        OnHold => "ON_HOLD",
        Cancelled => "CANCELLED",
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        Self::Planning
    }
}

string_enum! {
    /// Board status of a project task.
    TaskStatus {
        Todo => "TODO",
        InProgress => "IN_PROGRESS",
        Review => "REVIEW",
        Done => "DONE",
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Todo
    }
}

string_enum! {
    /// Priority of a project task.
    TaskPriority {
        Low => "LOW",
        Medium => "MEDIUM",
        High => "HIGH",
        Urgent => "URGENT",
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Medium
    }
}

string_enum! {
    /// Directory role of an admin-panel user.
    ///
    /// Roles are data only: no request handler grants or denies anything
    /// based on them. They exist to filter assignable users in the UI.
    UserRole {
        User => "USER",
        Admin => "ADMIN",
        Editor => "EDITOR",
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::User
    }
}

string_enum! {
    /// Kind of a generated client report.
    ReportType {
        Monthly => "MONTHLY",
        Quarterly => "QUARTERLY",
        Custom => "CUSTOM",
    }
}

impl Default for ReportType {
    fn default() -> Self {
        Self::Custom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_status_round_trip() {
        for status in [
            ContactStatus::New,
            ContactStatus::Contacted,
            ContactStatus::Qualified,
            ContactStatus::Converted,
            ContactStatus::Closed,
        ] {
            let parsed: ContactStatus = status.as_str().parse().expect("round trip");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_invalid_status_rejected() {
        assert!("PENDING".parse::<ContactStatus>().is_err());
        assert!("".parse::<TaskStatus>().is_err());
        assert!("low".parse::<TaskPriority>().is_err());
    }

    #[test]
    fn test_serde_matches_stored_form() {
        let json = serde_json::to_string(&TaskStatus::InProgress).expect("serialize");
        assert_eq!(json, "\"IN_PROGRESS\"");
        let back: TaskStatus = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, TaskStatus::InProgress);
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("EDITOR".parse::<UserRole>(), Ok(UserRole::Editor));
        assert!("SUPERUSER".parse::<UserRole>().is_err());
    }
}
