mod dispatcher;
mod protocol;

pub use dispatcher::{ConnectionState, Dispatcher};
pub use protocol::{ClientMessage, DEFAULT_PORT, ServerMessage, WS_PATH, ws_url};
