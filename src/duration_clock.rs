/* Active time of a session. Instead of counting ticks we keep the time
banked by earlier runs plus the start of the current run, and sum them
whenever someone asks. A late or dropped tick therefore only delays the
display, it never loses time, and the gap between pause and resume is
never counted.

All instants are milliseconds from a monotonic `Clock`.
*/

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DurationClock {
    accumulated_ms: u64,
    run_started_at_ms: Option<u64>,
}

impl DurationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.run_started_at_ms.is_some()
    }

    pub fn start_run(&mut self, now_ms: u64) {
        if self.run_started_at_ms.is_none() {
            self.run_started_at_ms = Some(now_ms);
        }
    }

    pub fn stop_run(&mut self, now_ms: u64) {
        if let Some(started_at_ms) = self.run_started_at_ms.take() {
            self.accumulated_ms += now_ms.saturating_sub(started_at_ms);
        }
    }

    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match self.run_started_at_ms {
            None => self.accumulated_ms,
            Some(started_at_ms) => self.accumulated_ms + now_ms.saturating_sub(started_at_ms),
        }
    }

    pub fn elapsed_seconds(&self, now_ms: u64) -> u64 {
        self.elapsed_ms(now_ms) / 1000
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
