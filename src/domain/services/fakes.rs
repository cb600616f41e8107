use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::Outbox;
use super::Scheduler;
use crate::domain::models::AckHandle;
use crate::domain::models::ChannelBox;
use crate::domain::models::ConfirmPrompt;
use crate::domain::models::Confirmer;
use crate::domain::models::ControlChannel;
use crate::domain::models::Event;
use crate::domain::models::SyncError;

pub const RELOAD_DELAY: Duration = Duration::from_millis(1000);
pub const INDICATOR_RESET_DELAY: Duration = Duration::from_millis(10000);

/// Control channel that records what would have gone over the wire.
#[derive(Default)]
pub struct RecordingChannel {
    connected: AtomicBool,
    published: Mutex<Vec<(String, String)>>,
    acks: Mutex<Vec<AckHandle>>,
    resyncs: AtomicUsize,
}

impl RecordingChannel {
    pub fn new(connected: bool) -> Arc<RecordingChannel> {
        let channel = RecordingChannel::default();
        channel.connected.store(connected, Ordering::SeqCst);
        return Arc::new(channel);
    }

    pub fn published(&self) -> Vec<(String, String)> {
        return self.published.lock().unwrap().clone();
    }

    pub fn acks(&self) -> Vec<AckHandle> {
        return self.acks.lock().unwrap().clone();
    }

    pub fn resyncs(&self) -> usize {
        return self.resyncs.load(Ordering::SeqCst);
    }
}

impl ControlChannel for RecordingChannel {
    fn is_connected(&self) -> bool {
        return self.connected.load(Ordering::SeqCst);
    }

    fn publish(&self, destination: &str, body: &str) -> Result<()> {
        self.published
            .lock()
            .unwrap()
            .push((destination.to_string(), body.to_string()));
        return Ok(());
    }

    fn ack(&self, handle: &AckHandle) -> Result<()> {
        self.acks.lock().unwrap().push(handle.clone());
        return Ok(());
    }

    fn resynchronize(&self) {
        self.resyncs.fetch_add(1, Ordering::SeqCst);
    }
}

/// Answers every prompt the same way and remembers what was asked.
pub struct FixedConfirmer {
    accept: bool,
    pub prompts: Arc<Mutex<Vec<ConfirmPrompt>>>,
}

impl FixedConfirmer {
    pub fn new(accept: bool) -> FixedConfirmer {
        return FixedConfirmer {
            accept,
            prompts: Arc::new(Mutex::new(vec![])),
        };
    }
}

#[async_trait]
impl Confirmer for FixedConfirmer {
    async fn confirm(&self, prompt: ConfirmPrompt) -> Result<(), SyncError> {
        self.prompts.lock().unwrap().push(prompt);
        if self.accept {
            return Ok(());
        }
        return Err(SyncError::UserCancelled);
    }
}

pub fn outbox(
    channel: &Arc<RecordingChannel>,
) -> (Outbox, mpsc::UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    let scheduler = Scheduler::new(tx.clone(), RELOAD_DELAY, INDICATOR_RESET_DELAY);
    let channel: ChannelBox = channel.clone();

    return (Outbox::new(channel, tx, scheduler), rx);
}

pub fn drain(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
    let mut res = vec![];
    while let Ok(event) = rx.try_recv() {
        res.push(event);
    }
    return res;
}

pub fn notices(events: &[Event]) -> Vec<String> {
    return events
        .iter()
        .filter_map(|e| match e {
            Event::Notice(notice) => return Some(notice.text.to_string()),
            _ => return None,
        })
        .collect();
}

pub fn reloads(events: &[Event]) -> usize {
    return events
        .iter()
        .filter(|e| return matches!(e, Event::Reload()))
        .count();
}
