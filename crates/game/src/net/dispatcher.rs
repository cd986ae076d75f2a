use std::sync::Arc;

use crate::animation::Animator;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::event::{AnimationEvent, Sequencer};
use crate::gate::{ActionGate, Outbound};
use crate::render::{self, SharedSurface, Surface, lock_surface};
use crate::snapshot::GameStateSnapshot;

use super::protocol::{ClientMessage, ServerMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    AwaitingReconnectAck,
    Synchronized,
}

/// Classifies inbound envelopes, keeps the [`ActionGate`] current and feeds
/// render and animation work to the [`Sequencer`] in arrival order.
///
/// The queue survives reconnects: a fresh snapshot is rendered after
/// whatever was already queued.
pub struct Dispatcher<S> {
    state: ConnectionState,
    gate: Arc<ActionGate>,
    sequencer: Sequencer,
    surface: SharedSurface<S>,
    animator: Animator<S>,
}

impl<S: Surface> Dispatcher<S> {
    pub fn new(config: &ClientConfig, gate: Arc<ActionGate>, surface: SharedSurface<S>) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            gate,
            sequencer: Sequencer::new(config.task_watchdog),
            animator: Animator::new(Arc::clone(&surface), config.clone()),
            surface,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn gate(&self) -> &Arc<ActionGate> {
        &self.gate
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn surface(&self) -> &SharedSurface<S> {
        &self.surface
    }

    pub fn on_connecting(&mut self) {
        self.state = ConnectionState::Connecting;
    }

    /// Transport is up: ask the server to resume our session right away.
    pub fn on_open(&mut self, link: Outbound) -> Result<(), Error> {
        self.gate.attach(link);
        self.gate.send(ClientMessage::Reconnect {
            token: self.gate.token().to_owned(),
        })?;
        log::info!("Connected, sending reconnect request");
        self.state = ConnectionState::AwaitingReconnectAck;
        Ok(())
    }

    /// Handles one inbound text frame. Bad messages are logged and dropped;
    /// the connection stays usable.
    pub fn on_message(&mut self, raw: &str) {
        if let Err(e) = self.dispatch(raw) {
            log::warn!("Dropping message: {}", e);
            log::debug!("Dropped message was: {}", raw);
        }
    }

    pub fn on_close(&mut self, reason: Option<&str>) {
        match reason {
            Some(reason) => log::warn!("Connection lost: {}", reason),
            None => log::info!("Connection closed by server"),
        }
        self.gate.detach();
        self.state = ConnectionState::Disconnected;
    }

    pub fn dispatch(&mut self, raw: &str) -> Result<(), Error> {
        match ServerMessage::parse(raw)? {
            ServerMessage::Gamestate { state } | ServerMessage::ReconnectOk { state } => {
                self.apply_snapshot(*state)
            }
            ServerMessage::Animations { animations } => {
                log::debug!("Queueing {} animations", animations.len());
                for event in animations {
                    self.enqueue_animation(event);
                }
                Ok(())
            }
            ServerMessage::LoginOk { .. } | ServerMessage::StartGame | ServerMessage::Unknown => {
                log::trace!("Ignoring message outside the game protocol");
                Ok(())
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: GameStateSnapshot) -> Result<(), Error> {
        snapshot.validate()?;

        // The gate must reflect this snapshot before the (possibly delayed)
        // render runs, so clicks are never judged against an older state.
        self.gate.sync(&snapshot);
        self.gate.go_online();
        if self.state != ConnectionState::Synchronized {
            log::info!("Synchronized with server");
        }
        self.state = ConnectionState::Synchronized;

        let regions = render::render(&snapshot);
        let surface = Arc::clone(&self.surface);
        self.sequencer.add("render", move || {
            let mut surface = lock_surface(&surface);
            for region in regions {
                surface.materialize(region);
            }
            std::future::ready(Ok::<(), Error>(()))
        });
        Ok(())
    }

    fn enqueue_animation(&self, event: AnimationEvent) {
        let animator = self.animator.clone();
        self.sequencer.add(event.kind(), move || animator.play(event));
    }
}
