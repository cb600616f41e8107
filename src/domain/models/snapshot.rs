use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Assignment;
use super::AssignmentClock;
use super::Session;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub remaining: u64,
    pub total: u64,
}

/// Session state as the server last rendered it for this user.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default)]
    pub session: Session,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub clock: Option<ClockSnapshot>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub tests: Vec<String>,
}

impl PageSnapshot {
    pub fn running_assignment(&self) -> Option<&Assignment> {
        if !self.session.running {
            return None;
        }

        let active = self.session.active_assignment_id.as_deref()?;
        return self.assignments.iter().find(|e| return e.identity() == active);
    }

    pub fn initial_clock(&self) -> Option<AssignmentClock> {
        let mut clock = match (&self.clock, self.running_assignment()) {
            (Some(snapshot), _) => AssignmentClock::new(snapshot.remaining, snapshot.total),
            (None, Some(assignment)) => AssignmentClock::new(
                assignment.remaining_time_seconds,
                assignment.total_time_seconds,
            ),
            (None, None) => return None,
        };

        clock.set_paused(self.paused);
        return Some(clock);
    }
}
