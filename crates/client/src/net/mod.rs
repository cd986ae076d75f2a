mod transport;

pub use transport::{Connection, TransportEvent, open};
