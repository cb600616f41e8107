#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

use std::future;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use futures::stream::SplitSink;
use futures::stream::SplitStream;
use futures::SinkExt;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::sync::Notify;
use tokio::time;
use tokio::time::Instant;
use tokio::time::Interval;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::COOKIE;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::MaybeTlsStream;
use tokio_tungstenite::WebSocketStream;
use tokio_util::sync::CancellationToken;

use super::frame;
use super::Endpoint;
use super::Frame;
use super::FrameCommand;
use super::HeartBeat;
use super::Inbound;
use crate::domain::models::AckHandle;
use crate::domain::models::AckMode;
use crate::domain::models::ChannelStatus;
use crate::domain::models::ControlChannel;
use crate::domain::models::Delivery;
use crate::domain::models::Event;
use crate::domain::models::Notice;
use crate::domain::models::SyncError;
use crate::domain::models::Topic;

const CONNECTED_TIMEOUT: Duration = Duration::from_secs(10);

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type SocketSink = SplitSink<Socket, Message>;
type SocketStream = SplitStream<Socket>;

#[derive(Clone, Debug)]
pub struct StompSettings {
    pub endpoint: Endpoint,
    pub topics: Vec<Topic>,
    pub heart_beat: HeartBeat,
    pub connect_delay: Duration,
    pub reconnect_delay: Duration,
    pub cookie: String,
}

enum Outbound {
    Send(Frame),
    Ack { generation: u64, frame: Frame },
}

enum SessionEnd {
    Resynchronize,
    Shutdown,
}

#[derive(Default)]
struct Shared {
    connected: AtomicBool,
    /// Bumped on every successful CONNECTED.
    generation: AtomicU64,
    resync: Notify,
}

/// Handle to the control connection. Cloned into whatever needs to publish.
pub struct StompChannel {
    shared: Arc<Shared>,
    outbound: mpsc::UnboundedSender<Outbound>,
}

/// Owns the socket and keeps it connected until shutdown.
pub struct StompSupervisor {
    settings: StompSettings,
    shared: Arc<Shared>,
    outbound: mpsc::UnboundedReceiver<Outbound>,
    deliveries: mpsc::UnboundedSender<Delivery>,
    events: mpsc::UnboundedSender<Event>,
    shutdown: CancellationToken,
}

impl StompChannel {
    pub fn new(
        settings: StompSettings,
        deliveries: mpsc::UnboundedSender<Delivery>,
        events: mpsc::UnboundedSender<Event>,
        shutdown: CancellationToken,
    ) -> (StompChannel, StompSupervisor) {
        let shared = Arc::new(Shared::default());
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<Outbound>();

        let channel = StompChannel {
            shared: Arc::clone(&shared),
            outbound: outbound_tx,
        };

        let supervisor = StompSupervisor {
            settings,
            shared,
            outbound: outbound_rx,
            deliveries,
            events,
            shutdown,
        };

        return (channel, supervisor);
    }
}

impl ControlChannel for StompChannel {
    fn is_connected(&self) -> bool {
        return self.shared.connected.load(Ordering::SeqCst);
    }

    fn publish(&self, destination: &str, body: &str) -> Result<()> {
        if !self.is_connected() {
            return Err(SyncError::ConnectionLost.into());
        }

        self.outbound
            .send(Outbound::Send(Frame::send(destination, body)))
            .map_err(|_| return anyhow!("Control channel is shut down"))?;

        return Ok(());
    }

    fn ack(&self, handle: &AckHandle) -> Result<()> {
        if handle.generation != self.shared.generation.load(Ordering::SeqCst) {
            tracing::debug!(
                generation = handle.generation,
                "Dropping ack from a previous connection"
            );
            return Ok(());
        }

        self.outbound
            .send(Outbound::Ack {
                generation: handle.generation,
                frame: Frame::ack(&handle.headers),
            })
            .map_err(|_| return anyhow!("Control channel is shut down"))?;

        return Ok(());
    }

    fn resynchronize(&self) {
        self.shared.resync.notify_one();
    }
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending::<()>().await,
    }
}

async fn deadline(at: Option<Instant>) {
    match at {
        Some(at) => time::sleep_until(at).await,
        None => future::pending::<()>().await,
    }
}

fn message_text(message: Message) -> Result<Option<String>> {
    match message {
        Message::Text(text) => return Ok(Some(text)),
        Message::Binary(bytes) => return Ok(Some(String::from_utf8(bytes)?)),
        Message::Close(_) => bail!("Server closed the control channel"),
        _ => return Ok(None),
    }
}

fn error_frame(frame: &Frame) -> anyhow::Error {
    return anyhow!(format!(
        "Broker sent an error: {} {}",
        frame.get("message").unwrap_or_default(),
        frame.body
    ));
}

/// ACK headers for a MESSAGE, STOMP 1.2 first with a 1.1 fallback.
fn ack_headers(frame: &Frame) -> Vec<(String, String)> {
    if let Some(id) = frame.get("ack") {
        return vec![("id".to_string(), id.to_string())];
    }

    return ["subscription", "message-id"]
        .iter()
        .filter_map(|key| return frame.get(key).map(|e| return (key.to_string(), e.to_string())))
        .collect();
}

async fn read_connected(stream: &mut SocketStream) -> Result<Frame> {
    while let Some(message) = stream.next().await {
        let text = match message_text(message?)? {
            Some(text) => text,
            None => continue,
        };

        for inbound in frame::parse(&text)? {
            if let Inbound::Frame(frame) = inbound {
                match frame.command {
                    FrameCommand::Connected => return Ok(frame),
                    FrameCommand::Error => return Err(error_frame(&frame)),
                    _ => tracing::debug!(command = %frame.command, "Ignoring frame before CONNECTED"),
                }
            }
        }
    }

    bail!("Control channel closed during the STOMP handshake");
}

impl StompSupervisor {
    fn status(&self, status: ChannelStatus) -> Result<()> {
        tracing::info!(%status, url = %self.settings.endpoint.url, "Control channel");
        self.events.send(Event::ChannelStatus(status))?;
        return Ok(());
    }

    /// Empties the outbound queue once its connection is gone. ACKs for a
    /// dead connection are worthless, but commands were already accepted, so
    /// the user is told they were lost and the page reloads.
    fn discard_pending(&mut self) -> Result<()> {
        let mut commands = 0;
        let mut acks = 0;
        while let Ok(outbound) = self.outbound.try_recv() {
            match outbound {
                Outbound::Send(_) => commands += 1,
                Outbound::Ack { .. } => acks += 1,
            }
        }

        if acks > 0 {
            tracing::debug!(acks, "Dropped acks of a closed connection");
        }
        if commands > 0 {
            tracing::warn!(commands, "Commands lost with the connection");
            self.events
                .send(Event::Notice(Notice::alert(&SyncError::ConnectionLost.to_string())))?;
            self.events.send(Event::Reload())?;
        }

        return Ok(());
    }

    /// Connects after the startup delay, then reconnects with a fixed delay
    /// whenever the connection drops, until shutdown.
    pub async fn run(mut self) -> Result<()> {
        tokio::select! {
            _ = time::sleep(self.settings.connect_delay) => {}
            _ = self.shutdown.cancelled() => return Ok(()),
        }

        loop {
            self.status(ChannelStatus::Connecting)?;
            let res = self.connect_and_run().await;
            self.shared.connected.store(false, Ordering::SeqCst);
            self.status(ChannelStatus::Disconnected)?;

            match res {
                Ok(SessionEnd::Shutdown) => return Ok(()),
                Ok(SessionEnd::Resynchronize) => {
                    self.discard_pending()?;
                    continue;
                }
                Err(err) => {
                    self.discard_pending()?;
                    tracing::warn!(
                        error = ?err,
                        delay_ms = self.settings.reconnect_delay.as_millis() as u64,
                        "Control channel lost, reconnecting"
                    );
                }
            }

            tokio::select! {
                _ = time::sleep(self.settings.reconnect_delay) => {}
                _ = self.shared.resync.notified() => {}
                _ = self.shutdown.cancelled() => return Ok(()),
            }
        }
    }

    async fn connect_and_run(&mut self) -> Result<SessionEnd> {
        let mut request = self.settings.endpoint.url.as_str().into_client_request()?;
        if !self.settings.cookie.is_empty() {
            request
                .headers_mut()
                .insert(COOKIE, HeaderValue::from_str(&self.settings.cookie)?);
        }

        let (socket, _) = connect_async(request).await?;
        let (mut sink, mut stream) = socket.split();

        let connect = Frame::connect(&self.settings.endpoint.host, &self.settings.heart_beat);
        sink.send(Message::Text(connect.encode())).await?;

        let connected = time::timeout(CONNECTED_TIMEOUT, read_connected(&mut stream)).await??;
        let server_beat = HeartBeat::parse(connected.get("heart-beat").unwrap_or("0,0"))?;
        let heart_beat = self.settings.heart_beat.negotiate(&server_beat);

        // Anything queued before this point belongs to a dead connection.
        self.discard_pending()?;

        for (idx, topic) in self.settings.topics.iter().enumerate() {
            let subscribe = Frame::subscribe(
                &format!("sub-{idx}"),
                topic.destination(),
                topic.ack_mode().header_value(),
            );
            sink.send(Message::Text(subscribe.encode())).await?;
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.connected.store(true, Ordering::SeqCst);
        self.status(ChannelStatus::Connected)?;
        tracing::debug!(
            generation,
            outgoing_ms = heart_beat.outgoing.as_millis() as u64,
            incoming_ms = heart_beat.incoming.as_millis() as u64,
            "Heart-beats negotiated"
        );

        return self
            .session_loop(&mut sink, &mut stream, heart_beat, generation)
            .await;
    }

    async fn session_loop(
        &mut self,
        sink: &mut SocketSink,
        stream: &mut SocketStream,
        heart_beat: HeartBeat,
        generation: u64,
    ) -> Result<SessionEnd> {
        let mut beats = if heart_beat.outgoing.is_zero() {
            None
        } else {
            Some(time::interval_at(
                Instant::now() + heart_beat.outgoing,
                heart_beat.outgoing,
            ))
        };
        let mut last_seen = Instant::now();

        loop {
            let silence_deadline = heart_beat.incoming_deadline().map(|e| return last_seen + e);

            tokio::select! {
                message = stream.next() => {
                    let message = message.ok_or_else(|| return anyhow!("Control channel closed"))??;
                    last_seen = Instant::now();

                    if let Some(text) = message_text(message)? {
                        for inbound in frame::parse(&text)? {
                            if let Inbound::Frame(frame) = inbound {
                                self.handle_frame(frame, generation)?;
                            }
                        }
                    }
                }
                outbound = self.outbound.recv() => {
                    match outbound {
                        Some(Outbound::Send(frame)) => {
                            sink.send(Message::Text(frame.encode())).await?;
                        }
                        Some(Outbound::Ack { generation: ack_generation, frame }) => {
                            if ack_generation != generation {
                                tracing::debug!(ack_generation, generation, "Dropping stale ack");
                                continue;
                            }
                            sink.send(Message::Text(frame.encode())).await?;
                        }
                        None => return Ok(SessionEnd::Shutdown),
                    }
                }
                _ = tick(&mut beats) => {
                    sink.send(Message::Text("\n".to_string())).await?;
                }
                _ = deadline(silence_deadline) => {
                    bail!("No heart-beat received from the broker");
                }
                _ = self.shared.resync.notified() => {
                    self.disconnect(sink).await;
                    return Ok(SessionEnd::Resynchronize);
                }
                _ = self.shutdown.cancelled() => {
                    self.disconnect(sink).await;
                    return Ok(SessionEnd::Shutdown);
                }
            }
        }
    }

    fn handle_frame(&self, frame: Frame, generation: u64) -> Result<()> {
        match frame.command {
            FrameCommand::Message => {
                let destination = frame.get("destination").unwrap_or_default();
                let topic = match Topic::from_destination(destination) {
                    Some(topic) => topic,
                    None => {
                        tracing::warn!(destination, "Message on an unknown destination");
                        return Ok(());
                    }
                };

                let ack = match topic.ack_mode() {
                    AckMode::ClientIndividual => Some(AckHandle {
                        generation,
                        headers: ack_headers(&frame),
                    }),
                    AckMode::Auto => None,
                };

                tracing::debug!(%topic, "Delivery");
                self.deliveries.send(Delivery {
                    topic,
                    body: frame.body,
                    ack,
                })?;
            }
            FrameCommand::Error => return Err(error_frame(&frame)),
            command => tracing::debug!(%command, "Ignoring frame"),
        }

        return Ok(());
    }

    async fn disconnect(&self, sink: &mut SocketSink) {
        let res = sink.send(Message::Text(Frame::disconnect().encode())).await;
        if let Err(err) = res.and(sink.close().await) {
            tracing::debug!(error = ?err, "Unclean disconnect");
        }
    }
}
