use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use nimmt::{ClientMessage, Error, Outbound, ws_url};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Text(String),
    /// Terminal. Carries the error that ended the connection, if any.
    Closed(Option<String>),
}

/// An open websocket driven by a background pump task.
///
/// Dropping every clone of `outbound` closes the socket.
pub struct Connection {
    pub outbound: Outbound,
    pub events: mpsc::UnboundedReceiver<TransportEvent>,
}

impl Connection {
    pub fn send(&self, message: ClientMessage) -> Result<(), Error> {
        self.outbound
            .send(message)
            .map_err(|_| Error::TransportFailure(String::from("connection is closed")))
    }

    pub async fn next_event(&mut self) -> TransportEvent {
        self.events
            .recv()
            .await
            .unwrap_or(TransportEvent::Closed(None))
    }
}

pub async fn open(address: &str) -> Result<Connection, Error> {
    let url = ws_url(address);
    log::debug!("Opening {}", url);
    let (socket, _) = connect_async(url.as_str())
        .await
        .map_err(|e| Error::TransportFailure(format!("{}: {}", url, e)))?;
    log::info!("Connected to {}", url);

    let (outbound, outbound_rx) = mpsc::unbounded_channel();
    let (events_tx, events) = mpsc::unbounded_channel();
    tokio::spawn(pump(socket, outbound_rx, events_tx));

    Ok(Connection { outbound, events })
}

async fn pump(
    socket: Socket,
    mut outbound: mpsc::UnboundedReceiver<ClientMessage>,
    events: mpsc::UnboundedSender<TransportEvent>,
) {
    let (mut sink, mut source) = socket.split();

    let reason = loop {
        tokio::select! {
            message = outbound.recv() => match message {
                Some(message) => {
                    let text = match message.to_json() {
                        Ok(text) => text,
                        Err(e) => {
                            log::warn!("Could not encode outbound message: {}", e);
                            continue;
                        }
                    };
                    log::trace!("-> {}", text);
                    if let Err(e) = sink.send(Message::Text(text.into())).await {
                        break Some(e.to_string());
                    }
                }
                None => {
                    let _ = sink.close().await;
                    break None;
                }
            },
            frame = source.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    log::trace!("<- {}", text.as_str());
                    if events.send(TransportEvent::Text(text.as_str().to_owned())).is_err() {
                        break None;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break None,
                Some(Ok(_)) => {}
                Some(Err(e)) => break Some(e.to_string()),
            },
        }
    };

    let _ = events.send(TransportEvent::Closed(reason));
}
