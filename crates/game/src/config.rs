use std::time::Duration;

pub const DEFAULT_PLAY_CARD_MS: u64 = 2000;
pub const DEFAULT_PICK_STACK_MS: u64 = 1000;

/// Most cards a pile can hold while being collected.
pub const MAX_PILE_CARDS: u32 = 6;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub play_card_duration: Duration,
    /// Per card; a pile is collected one card after another.
    pub pick_stack_duration: Duration,
    pub frame_interval: Duration,
    /// Slack on top of a transition's duration before it is forced to settle.
    pub transition_grace: Duration,
    pub task_watchdog: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            play_card_duration: Duration::from_millis(DEFAULT_PLAY_CARD_MS),
            pick_stack_duration: Duration::from_millis(DEFAULT_PICK_STACK_MS),
            frame_interval: Duration::from_millis(16),
            transition_grace: Duration::from_millis(500),
            task_watchdog: Duration::from_secs(15),
        }
    }
}

impl ClientConfig {
    /// Scales animation durations; `2.0` plays twice as fast. Non-positive
    /// or non-finite speeds leave the config unchanged.
    pub fn with_animation_speed(mut self, speed: f32) -> Self {
        if !speed.is_finite() || speed <= 0.0 {
            return self;
        }
        self.play_card_duration = self.play_card_duration.div_f32(speed);
        self.pick_stack_duration = self.pick_stack_duration.div_f32(speed);
        self.task_watchdog = self.task_watchdog.max(self.longest_step());
        self
    }

    /// Upper bound on how long a single animation step may legitimately run.
    pub fn longest_step(&self) -> Duration {
        let play_card = self.play_card_duration + self.transition_grace;
        let pick_stack = (self.pick_stack_duration + self.transition_grace) * MAX_PILE_CARDS;
        play_card.max(pick_stack)
    }
}
