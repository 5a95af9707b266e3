use super::types::{HistoryMessage, LiveMessage, RecentChat, UserId};

/// Events the network task pushes up to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    Connected,
    Disconnected,
    MessageReceived(LiveMessage),
    HistoryLoaded {
        other: UserId,
        messages: Vec<HistoryMessage>,
    },
    RecentsLoaded(Vec<RecentChat>),
}
