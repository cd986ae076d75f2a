pub mod animation;
pub mod config;
pub mod error;
pub mod event;
pub mod gate;
pub mod net;
pub mod render;
pub mod snapshot;

pub use animation::{Animator, Transition};
pub use config::ClientConfig;
pub use error::{Error, LocalActionRejection, Result};
pub use event::{AnimationEvent, Sequencer};
pub use gate::{ActionGate, Intent, Outbound};
pub use net::{ClientMessage, ConnectionState, DEFAULT_PORT, Dispatcher, ServerMessage, ws_url};
pub use render::{
    Anchor, BoardLayout, ClickTarget, Point, Region, Scene, SharedSurface, Surface, render,
};
pub use snapshot::{Card, GameStateSnapshot, Pip, PlayerId, PlayerView};
