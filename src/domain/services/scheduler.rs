use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Event;

/// Fire-and-forget timers. Nothing cancels them; scheduling twice fires
/// twice.
#[derive(Clone)]
pub struct Scheduler {
    tx: mpsc::UnboundedSender<Event>,
    reload_delay: Duration,
    indicator_reset_delay: Duration,
}

impl Scheduler {
    pub fn new(
        tx: mpsc::UnboundedSender<Event>,
        reload_delay: Duration,
        indicator_reset_delay: Duration,
    ) -> Scheduler {
        return Scheduler {
            tx,
            reload_delay,
            indicator_reset_delay,
        };
    }

    pub fn from_config(tx: mpsc::UnboundedSender<Event>) -> Result<Scheduler> {
        return Ok(Scheduler::new(
            tx,
            Config::get_duration(ConfigKey::ReloadDelay)?,
            Config::get_duration(ConfigKey::IndicatorResetDelay)?,
        ));
    }

    pub fn reload(&self) {
        tracing::debug!(delay_ms = self.reload_delay.as_millis() as u64, "Reload scheduled");
        self.after(self.reload_delay, Event::Reload());
    }

    pub fn reset_indicators(&self) {
        self.after(self.indicator_reset_delay, Event::IndicatorsReset());
    }

    fn after(&self, delay: Duration, event: Event) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            time::sleep(delay).await;
            if tx.send(event).is_err() {
                tracing::debug!("UI is gone, dropping timer event");
            }
        });
    }
}
