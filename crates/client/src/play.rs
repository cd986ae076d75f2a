use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::bail;
use tokio::time::{Interval, MissedTickBehavior};

use nimmt::render::lock_surface;
use nimmt::{ActionGate, ClientConfig, ConnectionState, Dispatcher, Scene};

use crate::net::{self, TransportEvent};
use crate::session::Session;

const FRAME_INTERVAL: Duration = Duration::from_millis(33);

#[derive(Debug, Clone)]
pub struct PlayOptions {
    pub reconnect: bool,
    pub reconnect_delay: Duration,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            reconnect: true,
            reconnect_delay: Duration::from_secs(2),
        }
    }
}

/// What a front end gets to see once per frame.
pub struct Board<'a> {
    pub scene: &'a Scene,
    pub state: ConnectionState,
    pub gate: &'a ActionGate,
    pub address: &'a str,
}

pub trait Frontend {
    /// Draws one frame and handles pending input. Returns `false` once the
    /// user asked to leave.
    fn frame(&mut self, board: &Board<'_>) -> anyhow::Result<bool>;
}

enum Flow {
    Continue,
    Quit,
}

pub async fn run(
    session: Session,
    config: ClientConfig,
    options: PlayOptions,
    frontend: &mut dyn Frontend,
) -> anyhow::Result<()> {
    let gate = Arc::new(ActionGate::new(session.token.clone()));
    let scene = Arc::new(Mutex::new(Scene::default()));
    let mut dispatcher = Dispatcher::new(&config, gate, scene);

    let mut ticker = tokio::time::interval(FRAME_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        if let Flow::Quit = connect_once(&session, &mut dispatcher, &mut ticker, frontend).await? {
            return Ok(());
        }

        if !options.reconnect {
            bail!("connection to {} lost", session.address);
        }

        log::info!("Reconnecting in {:?}", options.reconnect_delay);
        let retry = tokio::time::sleep(options.reconnect_delay);
        tokio::pin!(retry);
        loop {
            tokio::select! {
                _ = &mut retry => break,
                _ = ticker.tick() => {
                    if let Flow::Quit = draw(&dispatcher, &session, frontend)? {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Runs a single connection until it closes or the user quits.
async fn connect_once(
    session: &Session,
    dispatcher: &mut Dispatcher<Scene>,
    ticker: &mut Interval,
    frontend: &mut dyn Frontend,
) -> anyhow::Result<Flow> {
    dispatcher.on_connecting();
    let mut connection = match net::open(&session.address).await {
        Ok(connection) => connection,
        Err(e) => {
            log::warn!("Could not connect: {}", e);
            dispatcher.on_close(Some(&e.to_string()));
            return Ok(Flow::Continue);
        }
    };

    if let Err(e) = dispatcher.on_open(connection.outbound.clone()) {
        dispatcher.on_close(Some(&e.to_string()));
        return Ok(Flow::Continue);
    }

    loop {
        tokio::select! {
            event = connection.next_event() => match event {
                TransportEvent::Text(raw) => dispatcher.on_message(&raw),
                TransportEvent::Closed(reason) => {
                    dispatcher.on_close(reason.as_deref());
                    return Ok(Flow::Continue);
                }
            },
            _ = ticker.tick() => {
                if let Flow::Quit = draw(dispatcher, session, frontend)? {
                    return Ok(Flow::Quit);
                }
            }
        }
    }
}

fn draw(
    dispatcher: &Dispatcher<Scene>,
    session: &Session,
    frontend: &mut dyn Frontend,
) -> anyhow::Result<Flow> {
    let scene = lock_surface(dispatcher.surface());
    let board = Board {
        scene: &scene,
        state: dispatcher.state(),
        gate: dispatcher.gate(),
        address: &session.address,
    };
    Ok(if frontend.frame(&board)? {
        Flow::Continue
    } else {
        Flow::Quit
    })
}
