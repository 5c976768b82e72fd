//! Local display timer
//!
//! The displayed elapsed time is the server's `active_duration_seconds` at
//! the last authoritative response plus monotonic local time since then,
//! frozen while the session is paused. It is never sent back as truth.

use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
pub struct DisplayTimer {
    base_seconds: i64,
    anchor: Instant,
    paused: bool,
}

impl DisplayTimer {
    pub fn new(active_duration_seconds: i64, paused: bool) -> Self {
        Self {
            base_seconds: active_duration_seconds.max(0),
            anchor: Instant::now(),
            paused,
        }
    }

    /// Adopt a fresh server value
    pub fn reseed(&mut self, active_duration_seconds: i64, paused: bool) {
        *self = Self::new(active_duration_seconds, paused);
    }

    pub fn elapsed_seconds(&self) -> i64 {
        if self.paused {
            return self.base_seconds;
        }
        self.base_seconds + self.anchor.elapsed().as_secs() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_runs_from_server_value() {
        let timer = DisplayTimer::new(300, false);
        assert_eq!(timer.elapsed_seconds(), 300);

        tokio::time::advance(Duration::from_secs(80)).await;
        assert_eq!(timer.elapsed_seconds(), 380);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_timer_is_frozen() {
        let mut timer = DisplayTimer::new(120, true);
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(timer.elapsed_seconds(), 120);

        timer.reseed(120, false);
        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(timer.elapsed_seconds(), 125);
    }
}
