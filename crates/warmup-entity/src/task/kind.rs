//! Recognized task types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use warmup_core::error::AppError;

/// Kinds of work a device knows how to perform.
///
/// The lifecycle never interprets a task's parameters; the type only tells
/// the device which handler to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Send a text message to a contact.
    SendMessage,
    /// Send an image or video.
    SendMedia,
    /// Send a voice note.
    SendAudio,
    /// Join, leave or post in a group.
    GroupAction,
    /// Publish a status update.
    StatusUpdate,
    /// Change profile name, photo or about text.
    ProfileUpdate,
    /// Run one scheduled day of the warmup programme.
    WarmupCycle,
}

impl TaskType {
    /// Every recognized type.
    pub const ALL: [TaskType; 7] = [
        Self::SendMessage,
        Self::SendMedia,
        Self::SendAudio,
        Self::GroupAction,
        Self::StatusUpdate,
        Self::ProfileUpdate,
        Self::WarmupCycle,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SendMessage => "send_message",
            Self::SendMedia => "send_media",
            Self::SendAudio => "send_audio",
            Self::GroupAction => "group_action",
            Self::StatusUpdate => "status_update",
            Self::ProfileUpdate => "profile_update",
            Self::WarmupCycle => "warmup_cycle",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = AppError;

    /// Accepts the snake_case wire name or its kebab-case spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| AppError::invalid_argument(format!("Unknown task type '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warmup_core::error::ErrorKind;

    #[test]
    fn test_parse_known_types() {
        assert_eq!("send_message".parse::<TaskType>().unwrap(), TaskType::SendMessage);
        assert_eq!("send-media".parse::<TaskType>().unwrap(), TaskType::SendMedia);
        assert_eq!(" Group_Action ".parse::<TaskType>().unwrap(), TaskType::GroupAction);
    }

    #[test]
    fn test_unknown_type_is_invalid_argument() {
        let err = "reboot_phone".parse::<TaskType>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_wire_names_round_trip_through_from_str() {
        for t in TaskType::ALL {
            assert_eq!(t.as_str().parse::<TaskType>().unwrap(), t);
        }
    }
}
