pub mod commands;
pub mod events;
pub mod room;
pub mod types;

pub use commands::NetworkCommand;
pub use events::NetworkEvent;
pub use room::RoomId;
pub use types::{Direction, HistoryMessage, LiveMessage, RecentChat, TranscriptLine, User, UserId};
