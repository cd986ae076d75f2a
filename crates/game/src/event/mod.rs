mod sequencer;
mod types;

pub use sequencer::Sequencer;
pub use types::AnimationEvent;
