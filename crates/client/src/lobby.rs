use std::time::Duration;

use anyhow::{Context, anyhow, bail};

use nimmt::{ClientMessage, ServerMessage};

use crate::net::{self, Connection, TransportEvent};
use crate::session::Session;

const START_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn login(address: &str, name: &str) -> anyhow::Result<Session> {
    let mut connection = net::open(address).await?;
    connection.send(ClientMessage::Login {
        name: name.to_owned(),
    })?;

    loop {
        let message = next_message(&mut connection).await?;
        if let Some(session) = accept_login(message, address)? {
            log::info!("Logged in to {} as {:?}", address, name);
            return Ok(session);
        }
    }
}

/// Asks the server to deal and waits for the `start_game` broadcast.
///
/// The server only broadcasts to sockets bound to a token, so the fresh
/// socket resumes the session before asking for the start.
pub async fn start(session: &Session) -> anyhow::Result<()> {
    let mut connection = net::open(&session.address).await?;
    connection.send(ClientMessage::Reconnect {
        token: session.token.clone(),
    })?;
    connection.send(ClientMessage::StartGame {
        token: session.token.clone(),
    })?;

    tokio::time::timeout(START_TIMEOUT, async {
        loop {
            match next_message(&mut connection).await? {
                ServerMessage::StartGame => return Ok::<_, anyhow::Error>(()),
                other => log::trace!("Waiting for start, skipping {:?}", other),
            }
        }
    })
    .await
    .context("server did not confirm the game start")??;

    log::info!("Game started");
    Ok(())
}

fn accept_login(message: ServerMessage, address: &str) -> anyhow::Result<Option<Session>> {
    match message {
        ServerMessage::LoginOk {
            success: true,
            token: Some(token),
        } => Ok(Some(Session {
            token,
            address: address.to_owned(),
        })),
        ServerMessage::LoginOk { .. } => bail!("server refused login, lobby closed or full"),
        other => {
            log::debug!("Ignoring {:?} while logging in", other);
            Ok(None)
        }
    }
}

async fn next_message(connection: &mut Connection) -> anyhow::Result<ServerMessage> {
    loop {
        match connection.next_event().await {
            TransportEvent::Text(raw) => match ServerMessage::parse(&raw) {
                Ok(message) => return Ok(message),
                Err(e) => log::warn!("Dropping message: {}", e),
            },
            TransportEvent::Closed(reason) => {
                return Err(anyhow!(
                    "connection closed: {}",
                    reason.as_deref().unwrap_or("by server")
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use futures::{SinkExt, StreamExt};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;
    use tokio_tungstenite::accept_async;
    use tokio_tungstenite::tungstenite::Message;

    use super::*;

    type Registry = Arc<Mutex<HashMap<String, mpsc::UnboundedSender<String>>>>;

    const RESUMED: &str = r#"{"type":"reconnect_ok","state":{
        "players":["t1"],"self_conn":"t1","waiting_for_stack":null,"stacks":[],
        "self":{"name":"me","points":0,"card_points":[],"played_card":null,"hand":[]},
        "others":{}
    }}"#;

    /// Lobby server that, like the real one, only talks to sockets bound to
    /// a token by `login` or `reconnect`, and broadcasts `start_game`.
    async fn lobby_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let registry = Registry::default();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, Arc::clone(&registry)));
            }
        });
        address
    }

    async fn serve(stream: tokio::net::TcpStream, registry: Registry) {
        let socket = accept_async(stream).await.unwrap();
        let (mut sink, mut source) = socket.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        tokio::spawn(async move {
            while let Some(text) = rx.recv().await {
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        });

        while let Some(Ok(frame)) = source.next().await {
            let Message::Text(text) = frame else { continue };
            let request: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
            let token = request["token"].as_str().unwrap_or_default().to_owned();
            match request["type"].as_str() {
                Some("login") => {
                    registry.lock().unwrap().insert(String::from("t1"), tx.clone());
                    let _ = tx.send(String::from(r#"{"type":"login_ok","success":true,"token":"t1"}"#));
                }
                Some("reconnect") => {
                    let mut clients = registry.lock().unwrap();
                    if clients.contains_key(&token) {
                        clients.insert(token, tx.clone());
                        let _ = tx.send(String::from(RESUMED));
                    }
                }
                Some("start_game") => {
                    let clients = registry.lock().unwrap();
                    if clients.contains_key(&token) {
                        for client in clients.values() {
                            let _ = client.send(String::from(r#"{"type":"start_game"}"#));
                        }
                    }
                }
                _ => {}
            }
        }
    }

    #[tokio::test]
    async fn test_start_after_login_is_confirmed() {
        let address = lobby_server().await;
        let session = login(&address, "me").await.unwrap();
        assert_eq!(session.token, "t1");

        start(&session).await.unwrap();
    }

    #[test]
    fn test_successful_login_yields_session() {
        let message = ServerMessage::parse(r#"{"type":"login_ok","success":true,"token":"t1"}"#).unwrap();
        let session = accept_login(message, "host:6767").unwrap().unwrap();
        assert_eq!(session.token, "t1");
        assert_eq!(session.address, "host:6767");
    }

    #[test]
    fn test_refused_login_is_an_error() {
        let message = ServerMessage::parse(r#"{"type":"login_ok","success":false,"token":null}"#).unwrap();
        let err = accept_login(message, "host").unwrap_err();
        assert_eq!(err.to_string(), "server refused login, lobby closed or full");
    }

    #[test]
    fn test_unrelated_messages_are_skipped() {
        let message = ServerMessage::parse(r#"{"type":"start_game"}"#).unwrap();
        assert!(accept_login(message, "host").unwrap().is_none());
    }
}
