#[cfg(test)]
#[path = "heartbeat_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::anyhow;
use anyhow::Result;

/// STOMP heart-beat settings, `outgoing` and `incoming` as seen from this
/// side of the connection. Zero disables a direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeartBeat {
    pub outgoing: Duration,
    pub incoming: Duration,
}

impl HeartBeat {
    pub fn new(outgoing_ms: u64, incoming_ms: u64) -> HeartBeat {
        return HeartBeat {
            outgoing: Duration::from_millis(outgoing_ms),
            incoming: Duration::from_millis(incoming_ms),
        };
    }

    pub fn header_value(&self) -> String {
        return format!(
            "{},{}",
            self.outgoing.as_millis(),
            self.incoming.as_millis()
        );
    }

    pub fn parse(value: &str) -> Result<HeartBeat> {
        let (outgoing, incoming) = value
            .split_once(',')
            .ok_or_else(|| return anyhow!(format!("Invalid heart-beat header '{value}'")))?;

        return Ok(HeartBeat::new(
            outgoing.trim().parse::<u64>()?,
            incoming.trim().parse::<u64>()?,
        ));
    }

    /// Combines our wish with what the server announced in CONNECTED.
    pub fn negotiate(&self, server: &HeartBeat) -> HeartBeat {
        let mut res = HeartBeat::new(0, 0);
        if !self.outgoing.is_zero() && !server.incoming.is_zero() {
            res.outgoing = self.outgoing.max(server.incoming);
        }
        if !self.incoming.is_zero() && !server.outgoing.is_zero() {
            res.incoming = self.incoming.max(server.outgoing);
        }

        return res;
    }

    /// How long silence is tolerated before the connection counts as dead.
    pub fn incoming_deadline(&self) -> Option<Duration> {
        if self.incoming.is_zero() {
            return None;
        }

        return Some(self.incoming * 2);
    }
}
