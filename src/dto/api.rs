//! Response payloads of the `/health` and `/api` endpoints.

use serde::Serialize;

use crate::domain::user::User;

#[derive(Debug, Serialize, PartialEq)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Players currently joined over the socket.
    pub players: usize,
    /// Seconds since the server started.
    pub uptime: u64,
}

impl HealthResponse {
    pub fn ok(players: usize, uptime: u64) -> Self {
        Self {
            status: "ok",
            players,
            uptime,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PlayerCount {
    pub count: usize,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub uuid: String,
    pub username: String,
    pub is_new_user: bool,
}

impl SessionResponse {
    pub fn new(user: &User, is_new_user: bool) -> Self {
        Self {
            uuid: user.uuid.to_string(),
            username: user.username.to_string(),
            is_new_user,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct UsernameResponse {
    pub username: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
