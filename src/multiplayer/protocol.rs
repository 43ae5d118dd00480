//! Socket frames exchanged with the browser.
//!
//! Every frame is a JSON object `{"event": "<kebab-case>", "data": ...}`.
//! Events without a payload may omit `data` or send `null`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::round::LeaderboardEntry;
use crate::forms::session::SessionForm;
use crate::game::city::Landmark;
use crate::game::geometry::Pose;
use crate::multiplayer::delivery::Delivery;

/// Connection-scoped player id shown to other clients.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    Join(SessionForm),
    Move(Pose),
    CollectPickup,
    CompleteDelivery,
    DeliveryTimeout,
    EndRound,
    StartRound,
    GetLeaderboard,
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Player as other clients see it. Account identifiers never leave the
/// server.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPlayer {
    pub id: PlayerId,
    pub username: String,
    pub position: Pose,
    pub money: i32,
    pub deliveries: i32,
    pub has_food: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSettings {
    pub game_time: u32,
    pub pickup_radius: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitPayload {
    pub player_id: PlayerId,
    pub uuid: String,
    pub is_new_user: bool,
    pub player: PublicPlayer,
    pub current_delivery: Option<Delivery>,
    pub other_players: Vec<PublicPlayer>,
    pub game_config: GameSettings,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerMoved {
    pub id: PlayerId,
    pub x: f32,
    pub z: f32,
    pub rotation: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdated {
    pub id: PlayerId,
    pub has_food: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerStats {
    pub id: PlayerId,
    pub money: i32,
    pub deliveries: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewDelivery {
    pub restaurant: &'static Landmark,
    pub customer: &'static Landmark,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PickupSuccess {
    pub customer: &'static Landmark,
}

/// Rejected pickup or delivery.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TooFar {
    pub message: String,
    /// Whole units, rounded down.
    pub distance: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverySuccess {
    pub reward: i32,
    pub new_total: i32,
    pub deliveries: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeoutAck {
    pub failed: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundEnded {
    pub final_score: i32,
    pub deliveries: i32,
    pub failed: i32,
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundStarted {
    pub current_delivery: Option<Delivery>,
    pub game_time: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorPayload {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    Init(Box<InitPayload>),
    PlayerJoined(PublicPlayer),
    PlayerMoved(PlayerMoved),
    PlayerUpdated(PlayerUpdated),
    PlayerStatsUpdated(PlayerStats),
    PlayerLeft(PlayerId),
    NewDelivery(NewDelivery),
    PickupSuccess(PickupSuccess),
    PickupFailed(TooFar),
    DeliverySuccess(DeliverySuccess),
    DeliveryFailed(TooFar),
    DeliveryTimeoutAck(TimeoutAck),
    RoundEnded(RoundEnded),
    RoundStarted(RoundStarted),
    Leaderboard(Vec<LeaderboardEntry>),
    Error(ErrorPayload),
}

impl ServerMessage {
    pub fn error(message: impl Into<String>, details: Option<String>) -> Self {
        ServerMessage::Error(ErrorPayload {
            message: message.into(),
            details,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::game::city::RESTAURANTS;

    #[test]
    fn parses_client_events() {
        assert_eq!(
            ClientMessage::parse(r#"{"event":"move","data":{"x":1.5,"z":-2}}"#).unwrap(),
            ClientMessage::Move(Pose::new(1.5, -2.0, 0.0))
        );
        assert_eq!(
            ClientMessage::parse(r#"{"event":"collect-pickup"}"#).unwrap(),
            ClientMessage::CollectPickup
        );
        assert_eq!(
            ClientMessage::parse(r#"{"event":"get-leaderboard","data":null}"#).unwrap(),
            ClientMessage::GetLeaderboard
        );

        let ClientMessage::Join(form) =
            ClientMessage::parse(r#"{"event":"join","data":{"username":"Ana"}}"#).unwrap()
        else {
            panic!("expected join");
        };
        assert_eq!(form.username.as_deref(), Some("Ana"));
        assert_eq!(form.uuid, None);
    }

    #[test]
    fn rejects_malformed_frames() {
        assert!(ClientMessage::parse("not json").is_err());
        assert!(ClientMessage::parse(r#"{"event":"teleport"}"#).is_err());
        assert!(ClientMessage::parse(r#"{"event":"move","data":{"x":"1","z":0}}"#).is_err());
    }

    #[test]
    fn server_events_are_kebab_case_with_camel_payloads() {
        let moved = ServerMessage::PlayerStatsUpdated(PlayerStats {
            id: PlayerId::new("abc"),
            money: 40,
            deliveries: 2,
        });
        assert_eq!(
            serde_json::to_value(&moved).unwrap(),
            json!({"event": "player-stats-updated", "data": {"id": "abc", "money": 40, "deliveries": 2}})
        );

        let left = ServerMessage::PlayerLeft(PlayerId::new("abc"));
        assert_eq!(
            serde_json::to_value(&left).unwrap(),
            json!({"event": "player-left", "data": "abc"})
        );

        let started = ServerMessage::RoundStarted(RoundStarted {
            current_delivery: None,
            game_time: 180,
        });
        assert_eq!(
            serde_json::to_value(&started).unwrap(),
            json!({"event": "round-started", "data": {"currentDelivery": null, "gameTime": 180}})
        );
    }

    #[test]
    fn landmarks_serialize_with_nested_position() {
        let message = ServerMessage::PickupSuccess(PickupSuccess {
            customer: &RESTAURANTS[0],
        });
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["data"]["customer"]["name"], "Pizza Place");
        assert_eq!(value["data"]["customer"]["position"], json!({"x": -120.0, "z": -120.0}));
    }

    #[test]
    fn error_details_are_optional() {
        let value = serde_json::to_value(ServerMessage::error("Failed to join game", None)).unwrap();
        assert_eq!(value, json!({"event": "error", "data": {"message": "Failed to join game"}}));
    }
}
