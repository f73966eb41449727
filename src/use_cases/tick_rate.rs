use std::time::Duration;
use tokio::time::Instant;

const WINDOW: Duration = Duration::from_secs(1);

/// Measures how many physics ticks actually ran per second.
///
/// The rate is refreshed once per window and reads zero until the first
/// window completes.
#[derive(Debug, Clone, Default)]
pub struct TickRateMeter {
    window_start: Option<Instant>,
    ticks_in_window: u32,
    rate: f64,
}

impl TickRateMeter {
    pub fn record(&mut self, now: Instant) -> f64 {
        let Some(start) = self.window_start else {
            self.window_start = Some(now);
            return self.rate;
        };

        self.ticks_in_window += 1;
        let elapsed = now.duration_since(start);
        if elapsed >= WINDOW {
            self.rate = f64::from(self.ticks_in_window) / elapsed.as_secs_f64();
            self.window_start = Some(now);
            self.ticks_in_window = 0;
        }
        self.rate
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
