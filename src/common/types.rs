use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Canonical user identifier.
///
/// The server is loose about id types: page data and echoed socket payloads
/// may carry ids as strings while database rows carry integers. Every id is
/// normalized to an integer at the boundary so comparisons are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(UserId)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(id) => Ok(UserId(id)),
            Raw::Text(text) => text
                .parse()
                .map_err(|err| serde::de::Error::custom(format!("invalid user id `{text}`: {err}"))),
        }
    }
}

/// A selectable user from the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

/// Payload of `send_message` / `receive_message` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveMessage {
    pub sender: UserId,
    pub receiver: UserId,
    pub message: String,
}

impl LiveMessage {
    /// The participant that is not `me`.
    pub fn counterpart(&self, me: UserId) -> UserId {
        if self.sender == me {
            self.receiver
        } else {
            self.sender
        }
    }
}

/// One row of `GET /messages/{id}`. The server returns whole table rows;
/// only `sender_id` and `message` are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub sender_id: UserId,
    pub message: String,
    #[serde(default)]
    pub receiver_id: Option<UserId>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// One row of `GET /recent_chats`, newest conversation first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentChat {
    pub id: UserId,
    pub username: String,
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl RecentChat {
    pub fn user(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
        }
    }

    /// Short `HH:MM` form of the server's RFC 2822 timestamp.
    pub fn short_time(&self) -> Option<String> {
        let raw = self.timestamp.as_deref()?;
        chrono::DateTime::parse_from_rfc2822(raw)
            .map(|time| time.format("%H:%M").to_string())
            .ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

/// A rendered transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub direction: Direction,
    pub text: String,
}

impl TranscriptLine {
    pub fn from_sender(sender: UserId, me: UserId, text: impl Into<String>) -> Self {
        let direction = if sender == me {
            Direction::Sent
        } else {
            Direction::Received
        };
        Self {
            direction,
            text: text.into(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self.direction {
            Direction::Sent => "You",
            Direction::Received => "User",
        }
    }
}
