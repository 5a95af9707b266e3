use super::room::RoomId;
use super::types::{LiveMessage, UserId};

/// Commands the UI sends down to the network task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkCommand {
    /// Emit `join {room}` on the channel.
    Join { room: RoomId },
    /// Emit `send_message {sender, receiver, message}`.
    SendMessage(LiveMessage),
    /// Fetch `GET /messages/{other}`; the reply is tagged with `other`.
    LoadHistory { other: UserId },
    /// Fetch `GET /recent_chats`.
    LoadRecents,
}
