use crate::common::{
    HistoryMessage, LiveMessage, NetworkCommand, RecentChat, RoomId, TranscriptLine, User, UserId,
};

use super::directory::UserDirectory;

pub const IDLE_HEADER: &str = "Select a user to start chatting";

/// Local state of the chat window.
///
/// `current_room` and `current_receiver` only change through
/// [`AppState::select_user`]; everything else reacts to them.
pub struct AppState {
    pub my_id: UserId,
    pub directory: UserDirectory,
    pub recents: Vec<RecentChat>,
    pub current_room: Option<RoomId>,
    pub current_receiver: Option<UserId>,
    pub header: String,
    pub transcript: Vec<TranscriptLine>,
    pub input_text: String,
    pub connected: bool,
    /// Set whenever the transcript changes; the chat area consumes it.
    pub scroll_to_bottom: bool,
}

impl AppState {
    pub fn new(my_id: UserId, users: Vec<User>) -> Self {
        Self {
            my_id,
            directory: UserDirectory::new(users),
            recents: Vec::new(),
            current_room: None,
            current_receiver: None,
            header: IDLE_HEADER.to_string(),
            transcript: Vec::new(),
            input_text: String::new(),
            connected: false,
            scroll_to_bottom: false,
        }
    }

    /// Switch the conversation to `user`. Returns the join and history
    /// requests the network task has to run.
    pub fn select_user(&mut self, user: &User) -> Vec<NetworkCommand> {
        let room = RoomId::between(self.my_id, user.id);
        log::debug!("Selected {} ({}), room {room}", user.username, user.id);

        self.current_receiver = Some(user.id);
        self.current_room = Some(room.clone());
        self.header = format!("Chat with {}", user.username);

        vec![
            NetworkCommand::Join { room },
            NetworkCommand::LoadHistory { other: user.id },
        ]
    }

    /// Build the outbound message for `text`. Nothing is sent without a
    /// receiver or with blank text.
    pub fn compose_message(&self, text: &str) -> Option<NetworkCommand> {
        let receiver = self.current_receiver?;
        let message = text.trim();
        if message.is_empty() {
            return None;
        }

        Some(NetworkCommand::SendMessage(LiveMessage {
            sender: self.my_id,
            receiver,
            message: message.to_string(),
        }))
    }

    /// Take the input box contents as an outbound message, clearing the
    /// box only when something is actually sent.
    pub fn take_input(&mut self) -> Option<NetworkCommand> {
        let command = self.compose_message(&self.input_text)?;
        self.input_text.clear();
        Some(command)
    }

    /// Append a live message if it belongs to the joined room.
    /// Returns whether the transcript changed.
    pub fn receive_message(&mut self, message: LiveMessage) -> bool {
        let Some(current_room) = &self.current_room else {
            return false;
        };

        let expected = RoomId::between(self.my_id, message.counterpart(self.my_id));
        if &expected != current_room {
            log::debug!("Dropping message for {expected} while in {current_room}");
            return false;
        }

        self.transcript.push(TranscriptLine::from_sender(
            message.sender,
            self.my_id,
            message.message,
        ));
        self.scroll_to_bottom = true;
        true
    }

    /// Replace the transcript with history fetched for `other`, unless the
    /// user has already moved on to a different conversation.
    pub fn apply_history(&mut self, other: UserId, messages: Vec<HistoryMessage>) -> bool {
        if self.current_receiver != Some(other) {
            log::debug!("Discarding stale history for {other}");
            return false;
        }

        self.transcript = messages
            .into_iter()
            .map(|m| TranscriptLine::from_sender(m.sender_id, self.my_id, m.message))
            .collect();
        self.scroll_to_bottom = true;
        true
    }

    pub fn set_recents(&mut self, recents: Vec<RecentChat>) {
        self.recents = recents;
    }
}
