//! Authoritative multiplayer rules: who is connected, what they carry and
//! which frames go where.

pub mod delivery;
pub mod lobby;
pub mod protocol;
pub mod rules;

pub use lobby::{Lobby, LobbyRepository, Outbound, Target};
pub use protocol::{ClientMessage, PlayerId, ServerMessage};
pub use rules::MultiplayerRules;
