use std::time::Duration;

use crate::render::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: Point,
    pub to: Point,
    pub duration: Duration,
}

impl Transition {
    pub fn new(from: Point, to: Point, duration: Duration) -> Self {
        Self { from, to, duration }
    }

    pub fn progress(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }

    pub fn at(&self, elapsed: Duration) -> Point {
        self.from.lerp(self.to, ease_in_out(self.progress(elapsed)))
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}
