#[cfg(test)]
#[path = "clock_test.rs"]
mod tests;

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ClockState {
    Running,
    Paused,
    /// Stopped by the server. Only a time sync or a reload revives it.
    Halted,
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    return format!("{:02}:{:02}", secs / 60, secs % 60);
}

fn seconds(value: i64) -> Duration {
    return Duration::from_secs(value.max(0) as u64);
}

/// Countdown for the running assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignmentClock {
    total: Duration,
    remaining: Duration,
    state: ClockState,
}

impl AssignmentClock {
    pub fn new(remaining_secs: u64, total_secs: u64) -> AssignmentClock {
        return AssignmentClock {
            total: Duration::from_secs(total_secs),
            remaining: Duration::from_secs(remaining_secs),
            state: ClockState::Running,
        };
    }

    pub fn state(&self) -> ClockState {
        return self.state;
    }

    pub fn remaining(&self) -> Duration {
        return self.remaining;
    }

    pub fn total(&self) -> Duration {
        return self.total;
    }

    pub fn sync(&mut self, remaining: i64, total: i64) {
        self.remaining = seconds(remaining);
        self.total = seconds(total);
        if self.state == ClockState::Halted {
            self.state = ClockState::Running;
        }
    }

    /// Sets both times without touching the run state.
    pub fn prime(&mut self, total_secs: u64) {
        self.total = Duration::from_secs(total_secs);
        self.remaining = self.total;
    }

    pub fn stop(&mut self) {
        self.state = ClockState::Halted;
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.state == ClockState::Halted {
            return;
        }

        if paused {
            self.state = ClockState::Paused;
        } else {
            self.state = ClockState::Running;
        }
    }

    pub fn tick(&mut self, elapsed: Duration) {
        if self.state == ClockState::Running {
            self.remaining = self.remaining.saturating_sub(elapsed);
        }
    }

    /// Share of the total time already used, between 0 and 1.
    pub fn progress(&self) -> f64 {
        if self.total.is_zero() {
            return 0.0;
        }

        let used = self.total.saturating_sub(self.remaining);
        return (used.as_secs_f64() / self.total.as_secs_f64()).clamp(0.0, 1.0);
    }

    pub fn display(&self) -> String {
        return format!(
            "{} / {}",
            format_duration(self.remaining),
            format_duration(self.total)
        );
    }
}
