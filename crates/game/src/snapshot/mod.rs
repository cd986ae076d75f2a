mod card;
mod state;

pub use card::{Card, Pip, sum_points};
pub use state::{GameStateSnapshot, PlayerId, PlayerView};
