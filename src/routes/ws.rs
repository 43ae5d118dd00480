//! `GET /ws`: one task per socket feeding the shared lobby.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use actix_identity::Identity;
use actix_web::{HttpRequest, HttpResponse, get, rt, web};
use actix_ws::{CloseReason, Message, Session};
use chrono::Utc;
use log::{debug, error, warn};

use crate::domain::types::AuthToken;
use crate::multiplayer::{
    ClientMessage, Lobby, LobbyRepository, MultiplayerRules, Outbound, PlayerId, Target,
};
use crate::repository::DieselRepository;
use crate::routes::session_token;

/// Lobby state plus the open sockets it addresses.
pub struct GameServer {
    lobby: Mutex<Lobby>,
    connections: Mutex<HashMap<PlayerId, Session>>,
    started: Instant,
}

impl GameServer {
    pub fn new(rules: MultiplayerRules) -> Self {
        Self {
            lobby: Mutex::new(Lobby::new(rules)),
            connections: Mutex::new(HashMap::new()),
            started: Instant::now(),
        }
    }

    pub fn player_count(&self) -> usize {
        self.lobby().player_count()
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    fn lobby(&self) -> MutexGuard<'_, Lobby> {
        self.lobby.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn connections(&self) -> MutexGuard<'_, HashMap<PlayerId, Session>> {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn connect(&self, id: PlayerId, session: Session) {
        self.connections().insert(id, session);
    }

    /// Applies one client event on the blocking pool. The lobby lock is held
    /// for the whole event, including its Diesel calls, so events stay
    /// serialised without stalling the async workers.
    async fn handle<R>(
        self: Arc<Self>,
        id: PlayerId,
        message: ClientMessage,
        token: Option<AuthToken>,
        repo: Arc<R>,
    ) -> Vec<Outbound>
    where
        R: LobbyRepository + Send + Sync + 'static,
    {
        let sender = id.clone();
        let result = web::block(move || {
            let mut rng = rand::thread_rng();
            self.lobby().handle(
                &id,
                message,
                token.as_ref(),
                repo.as_ref(),
                &mut rng,
                Utc::now().naive_utc(),
            )
        })
        .await;
        result.unwrap_or_else(|e| {
            error!("Lobby event from {sender} was not applied: {e}");
            Vec::new()
        })
    }

    async fn disconnect<R>(self: Arc<Self>, id: PlayerId, repo: Arc<R>) -> Vec<Outbound>
    where
        R: LobbyRepository + Send + Sync + 'static,
    {
        self.connections().remove(&id);
        let sender = id.clone();
        let result = web::block(move || {
            self.lobby()
                .disconnect(&id, repo.as_ref(), Utc::now().naive_utc())
        })
        .await;
        result.unwrap_or_else(|e| {
            error!("Disconnect of {sender} was not applied: {e}");
            Vec::new()
        })
    }

    /// Sends each frame to the sockets its target selects.
    async fn dispatch(&self, sender: &PlayerId, outbound: Vec<Outbound>) {
        for Outbound { target, message } in outbound {
            let text = match message.to_json() {
                Ok(text) => text,
                Err(e) => {
                    error!("Failed to encode frame for {sender}: {e}");
                    continue;
                }
            };

            let sessions: Vec<(PlayerId, Session)> = {
                let connections = self.connections();
                recipients(target, sender, connections.keys())
                    .into_iter()
                    .filter_map(|id| connections.get(&id).cloned().map(|session| (id, session)))
                    .collect()
            };

            for (id, mut session) in sessions {
                if session.text(text.clone()).await.is_err() {
                    debug!("Dropped frame for closed connection {id}");
                }
            }
        }
    }
}

/// Open connections a frame addressed to `target` reaches. Connections that
/// never joined the lobby still receive `Others` and `All` frames.
fn recipients<'a, I>(target: Target, sender: &PlayerId, ids: I) -> Vec<PlayerId>
where
    I: IntoIterator<Item = &'a PlayerId>,
{
    ids.into_iter()
        .filter(|id| match target {
            Target::Sender => *id == sender,
            Target::Others => *id != sender,
            Target::All => true,
        })
        .cloned()
        .collect()
}

/// Decodes a text frame. Malformed frames are logged and skipped.
fn parse_frame(id: &PlayerId, text: &str) -> Option<ClientMessage> {
    match ClientMessage::parse(text) {
        Ok(message) => Some(message),
        Err(e) => {
            warn!("Malformed frame from {id}: {e}");
            None
        }
    }
}

#[get("/ws")]
pub async fn socket(
    req: HttpRequest,
    body: web::Payload,
    identity: Option<Identity>,
    server: web::Data<GameServer>,
    repo: web::Data<DieselRepository>,
) -> actix_web::Result<HttpResponse> {
    let (response, session, mut stream) = actix_ws::handle(&req, body)?;

    let token = session_token(identity.as_ref());
    let id = PlayerId::generate();
    server.connect(id.clone(), session.clone());
    debug!("Connection {id} opened");

    let server = server.into_inner();
    let repo = repo.into_inner();

    rt::spawn(async move {
        let mut session = session;
        let mut close_reason: Option<CloseReason> = None;

        while let Some(frame) = stream.recv().await {
            match frame {
                Ok(Message::Text(text)) => {
                    let Some(message) = parse_frame(&id, &text) else {
                        continue;
                    };
                    let outbound = Arc::clone(&server)
                        .handle(id.clone(), message, token.clone(), Arc::clone(&repo))
                        .await;
                    server.dispatch(&id, outbound).await;
                }
                Ok(Message::Ping(bytes)) => {
                    if session.pong(&bytes).await.is_err() {
                        break;
                    }
                }
                Ok(Message::Close(reason)) => {
                    close_reason = reason;
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Socket error on {id}: {e}");
                    break;
                }
            }
        }

        let outbound = Arc::clone(&server)
            .disconnect(id.clone(), Arc::clone(&repo))
            .await;
        server.dispatch(&id, outbound).await;
        if session.close(close_reason).await.is_err() {
            debug!("Connection {id} was already closed");
        }
    });

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_and_migrate;
    use crate::multiplayer::ServerMessage;

    fn ids(count: usize) -> Vec<PlayerId> {
        (0..count).map(|_| PlayerId::generate()).collect()
    }

    #[test]
    fn new_server_is_empty() {
        let server = GameServer::new(MultiplayerRules::default());
        assert_eq!(server.player_count(), 0);
        assert!(server.uptime() < Duration::from_secs(5));
    }

    #[test]
    fn frames_reach_the_addressed_connections() {
        let open = ids(3);
        let sender = &open[0];

        assert_eq!(recipients(Target::Sender, sender, &open), vec![sender.clone()]);
        assert_eq!(recipients(Target::Others, sender, &open), open[1..].to_vec());
        assert_eq!(recipients(Target::All, sender, &open), open);
    }

    #[test]
    fn connections_outside_the_lobby_still_hear_broadcasts() {
        // the sender already left, only a never-joined socket is open
        let sender = PlayerId::generate();
        let spectator = PlayerId::generate();
        let open = [spectator.clone()];

        assert!(recipients(Target::Sender, &sender, &open).is_empty());
        assert_eq!(recipients(Target::Others, &sender, &open), vec![spectator.clone()]);
        assert_eq!(recipients(Target::All, &sender, &open), vec![spectator]);
        assert!(recipients(Target::All, &sender, std::iter::empty()).is_empty());
    }

    #[test]
    fn malformed_frames_are_skipped() {
        let id = PlayerId::generate();
        assert_eq!(parse_frame(&id, "not json"), None);
        assert_eq!(parse_frame(&id, r#"{"event":"teleport"}"#), None);
        assert_eq!(
            parse_frame(&id, r#"{"event":"collect-pickup"}"#),
            Some(ClientMessage::CollectPickup)
        );
    }

    #[actix_web::test]
    async fn lobby_events_run_off_the_async_worker() {
        let dir = tempfile::tempdir().unwrap();
        let url = dir.path().join("ws.db").to_str().unwrap().to_string();
        let repo = Arc::new(DieselRepository::new(connect_and_migrate(&url).unwrap()));
        let server = Arc::new(GameServer::new(MultiplayerRules::default()));
        let id = PlayerId::generate();

        let outbound = Arc::clone(&server)
            .handle(id.clone(), ClientMessage::GetLeaderboard, None, Arc::clone(&repo))
            .await;
        assert_eq!(
            outbound,
            vec![Outbound::sender(ServerMessage::Leaderboard(Vec::new()))]
        );

        // a connection that never joined leaves without notifying anyone
        assert!(Arc::clone(&server).disconnect(id, repo).await.is_empty());
        assert_eq!(server.player_count(), 0);
    }
}
