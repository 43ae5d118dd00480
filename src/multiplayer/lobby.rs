//! In-memory state of everyone connected to the multiplayer server.
//!
//! The lobby never talks to sockets. Each handler mutates the players it
//! owns and returns the frames to send, addressed relative to the connection
//! that triggered it. Persistence goes through the repository traits and
//! clocks are passed in, so every rule can be exercised synchronously.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rand::Rng;

use crate::domain::round::{FinishedRound, NewRound};
use crate::domain::types::{AuthToken, PlayerUuid, RoundId, UserId, Username};
use crate::forms::session::SessionForm;
use crate::game::city::City;
use crate::game::geometry::Pose;
use crate::multiplayer::delivery::Delivery;
use crate::multiplayer::protocol::{
    ClientMessage, DeliverySuccess, GameSettings, InitPayload, NewDelivery, PickupSuccess,
    PlayerId, PlayerMoved, PlayerStats, PlayerUpdated, PublicPlayer, RoundEnded, RoundStarted,
    ServerMessage, TimeoutAck, TooFar,
};
use crate::multiplayer::rules::MultiplayerRules;
use crate::repository::errors::RepositoryResult;
use crate::repository::{AuthSessionReader, RoundReader, RoundWriter, UserReader, UserWriter};
use crate::services::leaderboard::top_rounds_or_empty;
use crate::services::players::{JoinedPlayer, join_player};

const TOO_FAR_FROM_RESTAURANT: &str = "Muito longe do restaurante";
const TOO_FAR_FROM_CUSTOMER: &str = "Muito longe do cliente";

/// Everything the lobby needs from storage.
pub trait LobbyRepository:
    UserReader + UserWriter + RoundReader + RoundWriter + AuthSessionReader
{
}

impl<T> LobbyRepository for T where
    T: UserReader + UserWriter + RoundReader + RoundWriter + AuthSessionReader + ?Sized
{
}

/// Who receives an [`Outbound`] frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// Only the connection that sent the event.
    Sender,
    /// Every connection except the sender.
    Others,
    All,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Outbound {
    pub target: Target,
    pub message: ServerMessage,
}

impl Outbound {
    pub fn sender(message: ServerMessage) -> Self {
        Self {
            target: Target::Sender,
            message,
        }
    }

    pub fn others(message: ServerMessage) -> Self {
        Self {
            target: Target::Others,
            message,
        }
    }

    pub fn all(message: ServerMessage) -> Self {
        Self {
            target: Target::All,
            message,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct OpenRound {
    id: RoundId,
    started_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub user_id: UserId,
    pub uuid: PlayerUuid,
    pub username: Username,
    pub position: Pose,
    pub money: i32,
    pub deliveries: i32,
    pub failed: i32,
    pub has_food: bool,
    pub delivery: Option<Delivery>,
    round: Option<OpenRound>,
    last_move: Option<NaiveDateTime>,
}

impl Player {
    fn new(id: PlayerId, joined: JoinedPlayer) -> Self {
        Self {
            id,
            user_id: joined.user.id,
            uuid: joined.user.uuid,
            username: joined.user.username,
            position: Pose::default(),
            money: 0,
            deliveries: 0,
            failed: 0,
            has_food: false,
            delivery: None,
            round: Some(OpenRound {
                id: joined.round.id,
                started_at: joined.round.started_at,
            }),
            last_move: None,
        }
    }

    pub fn public(&self) -> PublicPlayer {
        PublicPlayer {
            id: self.id.clone(),
            username: self.username.to_string(),
            position: self.position,
            money: self.money,
            deliveries: self.deliveries,
            has_food: self.has_food,
        }
    }

    pub fn has_open_round(&self) -> bool {
        self.round.is_some()
    }

    fn has_progress(&self) -> bool {
        self.money > 0 || self.deliveries > 0
    }

    fn reset_round_stats(&mut self) {
        self.money = 0;
        self.deliveries = 0;
        self.failed = 0;
        self.has_food = false;
        self.delivery = None;
    }

    /// Writes the open round and the owner's totals.
    fn persist_round<R>(&self, round: OpenRound, repo: &R, now: NaiveDateTime) -> RepositoryResult<()>
    where
        R: RoundWriter + ?Sized,
    {
        let finished = FinishedRound::new(
            round.started_at,
            now,
            self.money,
            self.deliveries,
            self.failed,
        );
        repo.finish_round(round.id, &finished)?;
        Ok(())
    }
}

fn unix_millis(now: NaiveDateTime) -> i64 {
    now.and_utc().timestamp_millis()
}

/// Gives the player a fresh delivery and drops any food they carried.
fn assign_delivery<G: Rng + ?Sized>(
    player: &mut Player,
    rules: &MultiplayerRules,
    city: &City,
    rng: &mut G,
    now: NaiveDateTime,
) -> Outbound {
    let delivery = Delivery::assign(rng, rules, city, unix_millis(now));
    let message = ServerMessage::NewDelivery(NewDelivery {
        restaurant: delivery.restaurant,
        customer: delivery.customer,
    });
    player.delivery = Some(delivery);
    player.has_food = false;
    Outbound::sender(message)
}

#[derive(Debug, Default)]
pub struct Lobby {
    rules: MultiplayerRules,
    city: City,
    players: BTreeMap<PlayerId, Player>,
}

impl Lobby {
    pub fn new(rules: MultiplayerRules) -> Self {
        Self {
            rules,
            city: City::open(),
            players: BTreeMap::new(),
        }
    }

    pub fn rules(&self) -> &MultiplayerRules {
        &self.rules
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    /// Applies one client event from connection `id`.
    pub fn handle<R, G>(
        &mut self,
        id: &PlayerId,
        message: ClientMessage,
        token: Option<&AuthToken>,
        repo: &R,
        rng: &mut G,
        now: NaiveDateTime,
    ) -> Vec<Outbound>
    where
        R: LobbyRepository + ?Sized,
        G: Rng + ?Sized,
    {
        match message {
            ClientMessage::Join(form) => self.join(id, form, token, repo, rng, now),
            ClientMessage::Move(pose) => self.move_player(id, pose, now),
            ClientMessage::CollectPickup => self.collect_pickup(id, now),
            ClientMessage::CompleteDelivery => self.complete_delivery(id, rng, now),
            ClientMessage::DeliveryTimeout => self.delivery_timeout(id, rng, now),
            ClientMessage::EndRound => self.end_round(id, repo, now),
            ClientMessage::StartRound => self.start_round(id, repo, rng, now),
            ClientMessage::GetLeaderboard => {
                let entries = top_rounds_or_empty(repo, self.rules.leaderboard_limit);
                vec![Outbound::sender(ServerMessage::Leaderboard(entries))]
            }
        }
    }

    fn join<R, G>(
        &mut self,
        id: &PlayerId,
        form: SessionForm,
        token: Option<&AuthToken>,
        repo: &R,
        rng: &mut G,
        now: NaiveDateTime,
    ) -> Vec<Outbound>
    where
        R: LobbyRepository + ?Sized,
        G: Rng + ?Sized,
    {
        if self.players.contains_key(id) {
            log::warn!("Connection {id} tried to join twice");
            return vec![Outbound::sender(ServerMessage::error("Already joined", None))];
        }

        let joined = match join_player(repo, token, form, now) {
            Ok(joined) => joined,
            Err(err) => {
                log::error!("Join error on {id}: {err}");
                return vec![Outbound::sender(ServerMessage::error(
                    "Failed to join game",
                    Some(err.to_string()),
                ))];
            }
        };
        let is_new_user = joined.is_new_user;

        let mut player = Player::new(id.clone(), joined);
        let mut outbound = vec![assign_delivery(&mut player, &self.rules, &self.city, rng, now)];

        let init = InitPayload {
            player_id: id.clone(),
            uuid: player.uuid.to_string(),
            is_new_user,
            player: player.public(),
            current_delivery: player.delivery.clone(),
            other_players: self.players.values().map(Player::public).collect(),
            game_config: GameSettings {
                game_time: self.rules.round_time,
                pickup_radius: self.rules.pickup_radius,
            },
        };
        outbound.push(Outbound::sender(ServerMessage::Init(Box::new(init))));
        outbound.push(Outbound::others(ServerMessage::PlayerJoined(player.public())));

        log::info!("Player {} ({id}) joined the game", player.username);
        self.players.insert(id.clone(), player);

        outbound
    }

    fn move_player(&mut self, id: &PlayerId, pose: Pose, now: NaiveDateTime) -> Vec<Outbound> {
        let Some(player) = self.players.get_mut(id) else {
            return Vec::new();
        };

        if let Some(last) = player.last_move
            && (now - last).num_milliseconds() < self.rules.move_throttle_ms
        {
            return Vec::new();
        }
        if !pose.x.is_finite() || !pose.z.is_finite() {
            return Vec::new();
        }
        player.last_move = Some(now);

        let rotation = if pose.rotation.is_finite() {
            pose.rotation
        } else {
            0.0
        };
        player.position = Pose::new(self.rules.clamp(pose.x), self.rules.clamp(pose.z), rotation);

        vec![Outbound::others(ServerMessage::PlayerMoved(PlayerMoved {
            id: id.clone(),
            x: player.position.x,
            z: player.position.z,
            rotation,
        }))]
    }

    fn collect_pickup(&mut self, id: &PlayerId, now: NaiveDateTime) -> Vec<Outbound> {
        let reach = self.rules.reach();
        let Some(player) = self.players.get_mut(id) else {
            return Vec::new();
        };
        if player.has_food {
            return Vec::new();
        }
        let Some(delivery) = player.delivery.as_mut() else {
            return Vec::new();
        };

        let distance = player
            .position
            .position()
            .distance_to(&delivery.restaurant.position);
        if distance > reach {
            return vec![Outbound::sender(ServerMessage::PickupFailed(TooFar {
                message: TOO_FAR_FROM_RESTAURANT.to_string(),
                distance: distance.floor() as u32,
            }))];
        }

        delivery.picked_up_at = Some(unix_millis(now));
        let customer = delivery.customer;
        log::info!(
            "{} picked up order from {}",
            player.username,
            delivery.restaurant.name
        );
        player.has_food = true;

        vec![
            Outbound::sender(ServerMessage::PickupSuccess(PickupSuccess { customer })),
            Outbound::others(ServerMessage::PlayerUpdated(PlayerUpdated {
                id: id.clone(),
                has_food: true,
            })),
        ]
    }

    fn complete_delivery<G: Rng + ?Sized>(
        &mut self,
        id: &PlayerId,
        rng: &mut G,
        now: NaiveDateTime,
    ) -> Vec<Outbound> {
        let reach = self.rules.reach();
        let Some(player) = self.players.get_mut(id) else {
            return Vec::new();
        };
        if !player.has_food {
            return Vec::new();
        }
        let Some(delivery) = player.delivery.as_ref() else {
            return Vec::new();
        };

        let distance = player
            .position
            .position()
            .distance_to(&delivery.customer.position);
        if distance > reach {
            return vec![Outbound::sender(ServerMessage::DeliveryFailed(TooFar {
                message: TOO_FAR_FROM_CUSTOMER.to_string(),
                distance: distance.floor() as u32,
            }))];
        }

        let reward = delivery.reward;
        log::info!(
            "{} delivered to {} (+R${reward})",
            player.username,
            delivery.customer.name
        );
        player.money += reward;
        player.deliveries += 1;
        player.has_food = false;

        vec![
            Outbound::sender(ServerMessage::DeliverySuccess(DeliverySuccess {
                reward,
                new_total: player.money,
                deliveries: player.deliveries,
            })),
            Outbound::all(ServerMessage::PlayerStatsUpdated(PlayerStats {
                id: id.clone(),
                money: player.money,
                deliveries: player.deliveries,
            })),
            assign_delivery(player, &self.rules, &self.city, rng, now),
        ]
    }

    fn delivery_timeout<G: Rng + ?Sized>(
        &mut self,
        id: &PlayerId,
        rng: &mut G,
        now: NaiveDateTime,
    ) -> Vec<Outbound> {
        let Some(player) = self.players.get_mut(id) else {
            return Vec::new();
        };

        player.failed += 1;
        player.has_food = false;

        vec![
            Outbound::sender(ServerMessage::DeliveryTimeoutAck(TimeoutAck {
                failed: player.failed,
            })),
            assign_delivery(player, &self.rules, &self.city, rng, now),
        ]
    }

    fn end_round<R>(&mut self, id: &PlayerId, repo: &R, now: NaiveDateTime) -> Vec<Outbound>
    where
        R: RoundReader + RoundWriter + ?Sized,
    {
        let Some(player) = self.players.get_mut(id) else {
            return Vec::new();
        };
        let Some(round) = player.round else {
            return Vec::new();
        };

        if let Err(err) = player.persist_round(round, repo, now) {
            log::error!("Error ending round for {}: {err}", player.username);
            return Vec::new();
        }

        let ended = RoundEnded {
            final_score: player.money,
            deliveries: player.deliveries,
            failed: player.failed,
            leaderboard: top_rounds_or_empty(repo, self.rules.leaderboard_limit),
        };
        log::info!("{} ended round with R${}", player.username, player.money);

        player.reset_round_stats();
        player.round = None;

        vec![Outbound::sender(ServerMessage::RoundEnded(ended))]
    }

    fn start_round<R, G>(
        &mut self,
        id: &PlayerId,
        repo: &R,
        rng: &mut G,
        now: NaiveDateTime,
    ) -> Vec<Outbound>
    where
        R: RoundWriter + ?Sized,
        G: Rng + ?Sized,
    {
        let Some(player) = self.players.get_mut(id) else {
            return Vec::new();
        };

        // An unfinished round with progress is saved rather than dropped.
        if let Some(open) = player.round
            && player.has_progress()
            && let Err(err) = player.persist_round(open, repo, now)
        {
            log::error!("Error saving open round for {}: {err}", player.username);
        }

        let round = match repo.create_round(&NewRound::new(player.user_id, now)) {
            Ok(round) => round,
            Err(err) => {
                log::error!("Error starting round for {}: {err}", player.username);
                return vec![Outbound::sender(ServerMessage::error(
                    "Failed to start round",
                    Some(err.to_string()),
                ))];
            }
        };

        player.reset_round_stats();
        player.round = Some(OpenRound {
            id: round.id,
            started_at: round.started_at,
        });

        let new_delivery = assign_delivery(player, &self.rules, &self.city, rng, now);
        let started = ServerMessage::RoundStarted(RoundStarted {
            current_delivery: player.delivery.clone(),
            game_time: self.rules.round_time,
        });

        vec![new_delivery, Outbound::sender(started)]
    }

    /// Removes the connection's player, saving a round with progress.
    pub fn disconnect<R>(&mut self, id: &PlayerId, repo: &R, now: NaiveDateTime) -> Vec<Outbound>
    where
        R: RoundWriter + ?Sized,
    {
        let Some(player) = self.players.remove(id) else {
            return Vec::new();
        };

        if let Some(round) = player.round
            && player.has_progress()
            && let Err(err) = player.persist_round(round, repo, now)
        {
            log::error!("Error ending round on disconnect for {}: {err}", player.username);
        }

        log::info!("Player {} ({id}) disconnected", player.username);
        vec![Outbound::all(ServerMessage::PlayerLeft(id.clone()))]
    }
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use chrono::{DateTime, Duration};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::domain::round::{LeaderboardEntry, Round};
    use crate::domain::user::User;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;

    fn now() -> NaiveDateTime {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap().naive_utc()
    }

    fn later(ms: i64) -> NaiveDateTime {
        now() + Duration::milliseconds(ms)
    }

    fn open_round(id: i32, user_id: UserId, started_at: NaiveDateTime) -> Round {
        Round {
            id: RoundId::new(id).unwrap(),
            user_id,
            started_at,
            ended_at: None,
            earnings: 0,
            deliveries_completed: 0,
            deliveries_failed: 0,
            play_time: None,
        }
    }

    /// Repository that accepts any number of new players and rounds.
    fn repo() -> MockRepository {
        let mut repo = MockRepository::new();
        let mut next_user = 0;
        repo.expect_create_user().returning(move |new_user| {
            next_user += 1;
            Ok(User {
                id: UserId::new(next_user).unwrap(),
                uuid: new_user.uuid.clone(),
                username: new_user.username.clone(),
                created_at: now(),
                total_earnings: 0,
                total_deliveries: 0,
                best_session_score: 0,
            })
        });
        let mut next_round = 0;
        repo.expect_create_round().returning(move |new_round| {
            next_round += 1;
            Ok(open_round(next_round, new_round.user_id, new_round.started_at))
        });
        repo
    }

    fn join_form(name: &str) -> ClientMessage {
        ClientMessage::Join(SessionForm {
            username: Some(name.to_string()),
            uuid: None,
        })
    }

    fn joined(lobby: &mut Lobby, repo: &MockRepository, rng: &mut StdRng, id: &PlayerId) {
        let out = lobby.handle(id, join_form("Ana"), None, repo, rng, now());
        assert_eq!(out.len(), 3);
    }

    /// Moves the player onto a point, past the throttle window.
    fn park(lobby: &mut Lobby, repo: &MockRepository, rng: &mut StdRng, id: &PlayerId, x: f32, z: f32, at: i64) {
        let out = lobby.handle(id, ClientMessage::Move(Pose::new(x, z, 0.0)), None, repo, rng, later(at));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn join_assigns_delivery_then_init_then_announces() {
        let repo = repo();
        let mut rng = StdRng::seed_from_u64(1);
        let mut lobby = Lobby::default();
        let first = PlayerId::new("a");
        let second = PlayerId::new("b");

        joined(&mut lobby, &repo, &mut rng, &first);
        let out = lobby.handle(&second, join_form("Bia"), None, &repo, &mut rng, now());

        assert_eq!(out.len(), 3);
        assert!(matches!(
            out[0],
            Outbound {
                target: Target::Sender,
                message: ServerMessage::NewDelivery(_)
            }
        ));
        let ServerMessage::Init(init) = &out[1].message else {
            panic!("expected init, got {:?}", out[1]);
        };
        assert_eq!(out[1].target, Target::Sender);
        assert_eq!(init.player_id, second);
        assert!(init.is_new_user);
        assert_eq!(init.player.username, "Bia");
        assert_eq!(init.other_players.len(), 1);
        assert_eq!(init.other_players[0].id, first);
        assert_eq!(init.game_config.game_time, 180);
        assert!(init.current_delivery.is_some());

        assert_eq!(out[2].target, Target::Others);
        let json = serde_json::to_value(&out[2].message).unwrap();
        assert_eq!(json["event"], "player-joined");
        assert!(json["data"].get("uuid").is_none());
        assert!(json["data"].get("userId").is_none());
        assert_eq!(json["data"]["position"], serde_json::json!({"x": 0.0, "z": 0.0, "rotation": 0.0}));

        assert_eq!(lobby.player_count(), 2);
    }

    #[test]
    fn joining_twice_is_rejected() {
        let repo = repo();
        let mut rng = StdRng::seed_from_u64(1);
        let mut lobby = Lobby::default();
        let id = PlayerId::new("a");
        joined(&mut lobby, &repo, &mut rng, &id);

        let out = lobby.handle(&id, join_form("Ana"), None, &repo, &mut rng, now());
        assert_eq!(out, vec![Outbound::sender(ServerMessage::error("Already joined", None))]);
        assert_eq!(lobby.player_count(), 1);
    }

    #[test]
    fn storage_failure_on_join_reports_details() {
        let mut repo = MockRepository::new();
        repo.expect_create_user()
            .returning(|_| Err(RepositoryError::ConnectionError("pool timed out".into())));
        let mut rng = StdRng::seed_from_u64(1);
        let mut lobby = Lobby::default();

        let out = lobby.handle(&PlayerId::new("a"), join_form("Ana"), None, &repo, &mut rng, now());
        let [Outbound { target: Target::Sender, message: ServerMessage::Error(error) }] = out.as_slice() else {
            panic!("expected a single error, got {out:?}");
        };
        assert_eq!(error.message, "Failed to join game");
        assert!(error.details.as_deref().is_some_and(|d| d.contains("pool timed out")));
        assert_eq!(lobby.player_count(), 0);
    }

    #[test]
    fn events_from_strangers_are_ignored() {
        let repo = MockRepository::new();
        let mut rng = StdRng::seed_from_u64(1);
        let mut lobby = Lobby::default();
        let id = PlayerId::new("ghost");

        for message in [
            ClientMessage::Move(Pose::new(1.0, 1.0, 0.0)),
            ClientMessage::CollectPickup,
            ClientMessage::CompleteDelivery,
            ClientMessage::DeliveryTimeout,
            ClientMessage::EndRound,
            ClientMessage::StartRound,
        ] {
            assert!(lobby.handle(&id, message, None, &repo, &mut rng, now()).is_empty());
        }
        assert!(lobby.disconnect(&id, &repo, now()).is_empty());
    }

    #[test]
    fn moves_are_throttled_and_clamped() {
        let repo = repo();
        let mut rng = StdRng::seed_from_u64(1);
        let mut lobby = Lobby::default();
        let id = PlayerId::new("a");
        joined(&mut lobby, &repo, &mut rng, &id);

        let out = lobby.handle(&id, ClientMessage::Move(Pose::new(500.0, -10.0, 1.0)), None, &repo, &mut rng, later(0));
        assert_eq!(
            out,
            vec![Outbound::others(ServerMessage::PlayerMoved(PlayerMoved {
                id: id.clone(),
                x: 190.0,
                z: -10.0,
                rotation: 1.0,
            }))]
        );

        let too_soon = lobby.handle(&id, ClientMessage::Move(Pose::new(0.0, 0.0, 0.0)), None, &repo, &mut rng, later(49));
        assert!(too_soon.is_empty());
        assert_eq!(lobby.player(&id).unwrap().position.x, 190.0);

        let out = lobby.handle(&id, ClientMessage::Move(Pose::new(-300.0, 0.0, 0.0)), None, &repo, &mut rng, later(50));
        assert_eq!(out.len(), 1);
        assert_eq!(lobby.player(&id).unwrap().position.x, -190.0);
    }

    #[test]
    fn pickup_needs_to_be_near_the_restaurant() {
        let repo = repo();
        let mut rng = StdRng::seed_from_u64(2);
        let mut lobby = Lobby::default();
        let id = PlayerId::new("a");
        joined(&mut lobby, &repo, &mut rng, &id);
        let restaurant = lobby.player(&id).unwrap().delivery.as_ref().unwrap().restaurant;

        // 10 units away: outside radius + tolerance
        park(&mut lobby, &repo, &mut rng, &id, restaurant.position.x + 10.5, restaurant.position.z, 100);
        let out = lobby.handle(&id, ClientMessage::CollectPickup, None, &repo, &mut rng, later(150));
        assert_eq!(
            out,
            vec![Outbound::sender(ServerMessage::PickupFailed(TooFar {
                message: "Muito longe do restaurante".into(),
                distance: 10,
            }))]
        );

        park(&mut lobby, &repo, &mut rng, &id, restaurant.position.x + 5.5, restaurant.position.z, 200);
        let out = lobby.handle(&id, ClientMessage::CollectPickup, None, &repo, &mut rng, later(250));
        assert_eq!(out.len(), 2);
        assert!(matches!(out[0].message, ServerMessage::PickupSuccess(_)));
        assert_eq!(
            out[1],
            Outbound::others(ServerMessage::PlayerUpdated(PlayerUpdated {
                id: id.clone(),
                has_food: true,
            }))
        );

        let player = lobby.player(&id).unwrap();
        assert!(player.has_food);
        assert_eq!(
            player.delivery.as_ref().unwrap().picked_up_at,
            Some(unix_millis(later(250)))
        );

        // already carrying food
        assert!(lobby.handle(&id, ClientMessage::CollectPickup, None, &repo, &mut rng, later(300)).is_empty());
    }

    #[test]
    fn delivery_pays_the_assigned_reward() {
        let repo = repo();
        let mut rng = StdRng::seed_from_u64(3);
        let mut lobby = Lobby::default();
        let id = PlayerId::new("a");
        joined(&mut lobby, &repo, &mut rng, &id);
        let delivery = lobby.player(&id).unwrap().delivery.clone().unwrap();

        // no food yet
        park(&mut lobby, &repo, &mut rng, &id, delivery.customer.position.x, delivery.customer.position.z, 100);
        assert!(lobby.handle(&id, ClientMessage::CompleteDelivery, None, &repo, &mut rng, later(120)).is_empty());

        park(&mut lobby, &repo, &mut rng, &id, delivery.restaurant.position.x, delivery.restaurant.position.z, 200);
        lobby.handle(&id, ClientMessage::CollectPickup, None, &repo, &mut rng, later(220));

        park(&mut lobby, &repo, &mut rng, &id, 0.0, 0.0, 300);
        let out = lobby.handle(&id, ClientMessage::CompleteDelivery, None, &repo, &mut rng, later(320));
        let [Outbound { message: ServerMessage::DeliveryFailed(failed), .. }] = out.as_slice() else {
            panic!("expected a failed delivery, got {out:?}");
        };
        assert_eq!(failed.message, "Muito longe do cliente");

        park(&mut lobby, &repo, &mut rng, &id, delivery.customer.position.x, delivery.customer.position.z, 400);
        let out = lobby.handle(&id, ClientMessage::CompleteDelivery, None, &repo, &mut rng, later(420));
        assert_eq!(out.len(), 3);
        assert_eq!(
            out[0],
            Outbound::sender(ServerMessage::DeliverySuccess(DeliverySuccess {
                reward: delivery.reward,
                new_total: delivery.reward,
                deliveries: 1,
            }))
        );
        assert_eq!(
            out[1],
            Outbound::all(ServerMessage::PlayerStatsUpdated(PlayerStats {
                id: id.clone(),
                money: delivery.reward,
                deliveries: 1,
            }))
        );
        assert!(matches!(out[2].message, ServerMessage::NewDelivery(_)));

        let player = lobby.player(&id).unwrap();
        assert!(!player.has_food);
        assert_eq!(player.money, delivery.reward);
        assert_eq!(player.delivery.as_ref().unwrap().assigned_at, unix_millis(later(420)));
    }

    #[test]
    fn timeouts_count_failures_and_reassign() {
        let repo = repo();
        let mut rng = StdRng::seed_from_u64(4);
        let mut lobby = Lobby::default();
        let id = PlayerId::new("a");
        joined(&mut lobby, &repo, &mut rng, &id);

        lobby.handle(&id, ClientMessage::DeliveryTimeout, None, &repo, &mut rng, now());
        let out = lobby.handle(&id, ClientMessage::DeliveryTimeout, None, &repo, &mut rng, now());
        assert_eq!(
            out[0],
            Outbound::sender(ServerMessage::DeliveryTimeoutAck(TimeoutAck { failed: 2 }))
        );
        assert!(matches!(out[1].message, ServerMessage::NewDelivery(_)));
        assert_eq!(lobby.player(&id).unwrap().failed, 2);
    }

    #[test]
    fn end_round_persists_and_resets() {
        let mut repo = repo();
        repo.expect_finish_round()
            .withf(|id, finished| {
                id.get() == 1
                    && finished.earnings == 30
                    && finished.deliveries_completed == 2
                    && finished.deliveries_failed == 1
                    && finished.play_time == 95
            })
            .times(1)
            .returning(|id, finished| {
                Ok(Round {
                    ended_at: Some(finished.ended_at),
                    earnings: finished.earnings,
                    ..open_round(id.get(), UserId::new(1).unwrap(), now())
                })
            });
        repo.expect_list_leaderboard()
            .withf(|limit| *limit == 10)
            .returning(|_| {
                Ok(vec![LeaderboardEntry {
                    username: Username::new("Ana").unwrap(),
                    score: 30,
                    deliveries: 2,
                    date: now(),
                }])
            });
        let mut rng = StdRng::seed_from_u64(5);
        let mut lobby = Lobby::default();
        let id = PlayerId::new("a");
        joined(&mut lobby, &repo, &mut rng, &id);
        {
            let player = lobby.players.get_mut(&id).unwrap();
            player.money = 30;
            player.deliveries = 2;
            player.failed = 1;
            player.has_food = true;
        }

        let out = lobby.handle(&id, ClientMessage::EndRound, None, &repo, &mut rng, later(95_400));
        let [Outbound { target: Target::Sender, message: ServerMessage::RoundEnded(ended) }] = out.as_slice() else {
            panic!("expected round-ended, got {out:?}");
        };
        assert_eq!(ended.final_score, 30);
        assert_eq!(ended.deliveries, 2);
        assert_eq!(ended.failed, 1);
        assert_eq!(ended.leaderboard.len(), 1);

        let player = lobby.player(&id).unwrap();
        assert_eq!((player.money, player.deliveries, player.failed), (0, 0, 0));
        assert!(!player.has_food);
        assert!(player.delivery.is_none());
        assert!(!player.has_open_round());

        // nothing open any more
        assert!(lobby.handle(&id, ClientMessage::EndRound, None, &repo, &mut rng, later(96_000)).is_empty());
    }

    #[test]
    fn failed_end_round_keeps_the_round_open() {
        let mut repo = repo();
        repo.expect_finish_round()
            .returning(|_, _| Err(RepositoryError::DatabaseError("disk full".into())));
        let mut rng = StdRng::seed_from_u64(5);
        let mut lobby = Lobby::default();
        let id = PlayerId::new("a");
        joined(&mut lobby, &repo, &mut rng, &id);

        assert!(lobby.handle(&id, ClientMessage::EndRound, None, &repo, &mut rng, now()).is_empty());
        assert!(lobby.player(&id).unwrap().has_open_round());
    }

    #[test]
    fn start_round_opens_a_new_round() {
        let mut repo = repo();
        repo.expect_finish_round()
            .returning(|id, _| Ok(open_round(id.get(), UserId::new(1).unwrap(), now())));
        repo.expect_list_leaderboard().returning(|_| Ok(Vec::new()));
        let mut rng = StdRng::seed_from_u64(6);
        let mut lobby = Lobby::default();
        let id = PlayerId::new("a");
        joined(&mut lobby, &repo, &mut rng, &id);
        lobby.handle(&id, ClientMessage::EndRound, None, &repo, &mut rng, now());

        let out = lobby.handle(&id, ClientMessage::StartRound, None, &repo, &mut rng, later(1_000));
        assert_eq!(out.len(), 2);
        assert!(matches!(out[0].message, ServerMessage::NewDelivery(_)));
        let ServerMessage::RoundStarted(started) = &out[1].message else {
            panic!("expected round-started, got {:?}", out[1]);
        };
        assert_eq!(started.game_time, 180);
        assert_eq!(started.current_delivery, lobby.player(&id).unwrap().delivery);
        assert!(lobby.player(&id).unwrap().has_open_round());
    }

    #[test]
    fn leaderboard_failures_send_an_empty_list() {
        let mut repo = MockRepository::new();
        repo.expect_list_leaderboard()
            .returning(|_| Err(RepositoryError::ConnectionError("gone".into())));
        let mut rng = StdRng::seed_from_u64(7);
        let mut lobby = Lobby::default();

        let out = lobby.handle(&PlayerId::new("a"), ClientMessage::GetLeaderboard, None, &repo, &mut rng, now());
        assert_eq!(out, vec![Outbound::sender(ServerMessage::Leaderboard(Vec::new()))]);
    }

    #[test]
    fn disconnect_saves_progress_only() {
        let mut repo = repo();
        repo.expect_finish_round()
            .times(1)
            .returning(|id, _| Ok(open_round(id.get(), UserId::new(1).unwrap(), now())));
        let mut rng = StdRng::seed_from_u64(8);
        let mut lobby = Lobby::default();
        let idle = PlayerId::new("idle");
        let busy = PlayerId::new("busy");
        joined(&mut lobby, &repo, &mut rng, &idle);
        joined(&mut lobby, &repo, &mut rng, &busy);
        lobby.players.get_mut(&busy).unwrap().deliveries = 1;

        let out = lobby.disconnect(&idle, &repo, now());
        assert_eq!(out, vec![Outbound::all(ServerMessage::PlayerLeft(idle.clone()))]);

        let out = lobby.disconnect(&busy, &repo, now());
        assert_eq!(out, vec![Outbound::all(ServerMessage::PlayerLeft(busy.clone()))]);
        assert_eq!(lobby.player_count(), 0);
    }
}
