use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::SinkExt;
use futures::StreamExt;
use test_utils::connected_frame_fixture;
use test_utils::time_message_frame_fixture;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;
use tokio_util::sync::CancellationToken;

use super::StompChannel;
use super::StompSettings;
use crate::domain::models::AckHandle;
use crate::domain::models::ChannelStatus;
use crate::domain::models::ControlChannel;
use crate::domain::models::Delivery;
use crate::domain::models::Event;
use crate::domain::models::NoticeKind;
use crate::domain::models::Topic;
use crate::infrastructure::stomp::frame;
use crate::infrastructure::stomp::Endpoint;
use crate::infrastructure::stomp::Frame;
use crate::infrastructure::stomp::FrameCommand;
use crate::infrastructure::stomp::HeartBeat;
use crate::infrastructure::stomp::Inbound;

fn settings(addr: &str, topics: Vec<Topic>) -> StompSettings {
    return StompSettings {
        endpoint: Endpoint {
            url: format!("ws://{addr}/control/websocket"),
            host: "127.0.0.1".to_string(),
        },
        topics,
        heart_beat: HeartBeat::new(0, 0),
        connect_delay: Duration::ZERO,
        reconnect_delay: Duration::from_millis(50),
        cookie: "".to_string(),
    };
}

async fn next_frame(ws: &mut WebSocketStream<TcpStream>) -> Result<Frame> {
    loop {
        let message = ws
            .next()
            .await
            .ok_or_else(|| return anyhow::anyhow!("Client went away"))??;
        if let Message::Text(text) = message {
            for inbound in frame::parse(&text)? {
                if let Inbound::Frame(frame) = inbound {
                    return Ok(frame);
                }
            }
        }
    }
}

/// Accepts one client, completes the STOMP handshake and reads its
/// subscriptions.
async fn handshake(listener: &TcpListener, topics: usize) -> Result<(WebSocketStream<TcpStream>, Vec<Frame>)> {
    let (stream, _) = listener.accept().await?;
    let mut ws = accept_async(stream).await?;

    let connect = next_frame(&mut ws).await?;
    assert_eq!(connect.command, FrameCommand::Connect);
    assert_eq!(connect.get("accept-version"), Some("1.2,1.1"));
    ws.send(Message::Text(connected_frame_fixture().to_string()))
        .await?;

    let mut subscriptions = vec![];
    for _ in 0..topics {
        subscriptions.push(next_frame(&mut ws).await?);
    }

    return Ok((ws, subscriptions));
}

async fn wait_for_status(
    events: &mut mpsc::UnboundedReceiver<Event>,
    expected: ChannelStatus,
) -> Result<()> {
    while let Some(event) = events.recv().await {
        if let Event::ChannelStatus(status) = event {
            if status == expected {
                return Ok(());
            }
        }
    }

    anyhow::bail!("Event channel closed before {expected}");
}

#[tokio::test]
async fn it_subscribes_and_acknowledges_individually() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?.to_string();
    let (delivery_tx, mut delivery_rx) = mpsc::unbounded_channel::<Delivery>();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let shutdown = CancellationToken::new();

    let (channel, supervisor) = StompChannel::new(
        settings(&addr, vec![Topic::Time, Topic::UserFeedback]),
        delivery_tx,
        event_tx,
        shutdown.clone(),
    );
    let supervisor_handle = tokio::spawn(supervisor.run());

    let (mut ws, subscriptions) = handshake(&listener, 2).await?;
    assert_eq!(subscriptions[0].get("destination"), Some("/queue/time"));
    assert_eq!(subscriptions[0].get("ack"), Some("client-individual"));
    assert_eq!(subscriptions[1].get("destination"), Some("/user/queue/feedback"));
    assert_eq!(subscriptions[1].get("ack"), Some("auto"));

    wait_for_status(&mut event_rx, ChannelStatus::Connected).await?;
    assert!(channel.is_connected());

    ws.send(Message::Text(time_message_frame_fixture().to_string()))
        .await?;
    let delivery = delivery_rx.recv().await.ok_or_else(|| return anyhow::anyhow!("No delivery"))?;
    assert_eq!(delivery.topic, Topic::Time);
    assert_eq!(delivery.body, r#"{"remainingTime":120,"totalTime":440}"#);

    let handle = delivery.ack.ok_or_else(|| return anyhow::anyhow!("No ack handle"))?;
    channel.ack(&handle)?;
    let ack = next_frame(&mut ws).await?;
    assert_eq!(ack.command, FrameCommand::Ack);
    assert_eq!(ack.get("id"), Some("a1b2-7"));

    channel.publish("/app/control/pauseResume", "{}")?;
    let send = next_frame(&mut ws).await?;
    assert_eq!(send.command, FrameCommand::Send);
    assert_eq!(send.get("destination"), Some("/app/control/pauseResume"));
    assert_eq!(send.body, "{}");

    shutdown.cancel();
    supervisor_handle.await??;
    assert!(!channel.is_connected());

    return Ok(());
}

#[tokio::test]
async fn it_reconnects_after_the_server_drops() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?.to_string();
    let (delivery_tx, _delivery_rx) = mpsc::unbounded_channel::<Delivery>();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let shutdown = CancellationToken::new();

    let (channel, supervisor) =
        StompChannel::new(settings(&addr, vec![Topic::Stop]), delivery_tx, event_tx, shutdown.clone());
    let supervisor_handle = tokio::spawn(supervisor.run());

    let (ws, _) = handshake(&listener, 1).await?;
    wait_for_status(&mut event_rx, ChannelStatus::Connected).await?;
    drop(ws);

    wait_for_status(&mut event_rx, ChannelStatus::Disconnected).await?;
    assert!(!channel.is_connected());

    let (_ws, subscriptions) = handshake(&listener, 1).await?;
    assert_eq!(subscriptions[0].get("destination"), Some("/queue/stop"));
    wait_for_status(&mut event_rx, ChannelStatus::Connected).await?;
    assert!(channel.is_connected());

    shutdown.cancel();
    supervisor_handle.await??;

    return Ok(());
}

#[tokio::test]
async fn it_resynchronizes_on_request() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?.to_string();
    let (delivery_tx, _delivery_rx) = mpsc::unbounded_channel::<Delivery>();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let shutdown = CancellationToken::new();

    let (channel, supervisor) =
        StompChannel::new(settings(&addr, vec![Topic::Start]), delivery_tx, event_tx, shutdown.clone());
    let supervisor_handle = tokio::spawn(supervisor.run());

    let (mut ws, _) = handshake(&listener, 1).await?;
    wait_for_status(&mut event_rx, ChannelStatus::Connected).await?;

    channel.resynchronize();
    let disconnect = next_frame(&mut ws).await?;
    assert_eq!(disconnect.command, FrameCommand::Disconnect);

    let _second = handshake(&listener, 1).await?;
    wait_for_status(&mut event_rx, ChannelStatus::Connected).await?;

    shutdown.cancel();
    supervisor_handle.await??;

    return Ok(());
}

#[test]
fn it_refuses_to_publish_while_disconnected() {
    let (delivery_tx, _delivery_rx) = mpsc::unbounded_channel::<Delivery>();
    let (event_tx, _event_rx) = mpsc::unbounded_channel::<Event>();
    let (channel, _supervisor) = StompChannel::new(
        settings("127.0.0.1:1", vec![]),
        delivery_tx,
        event_tx,
        CancellationToken::new(),
    );

    assert!(!channel.is_connected());
    let res = channel.publish("/app/control/pauseResume", "{}");
    assert_eq!(
        res.unwrap_err().to_string(),
        "Your connection has expired, reloading."
    );
}

#[test]
fn it_ignores_acks_from_previous_connections() -> Result<()> {
    let (delivery_tx, _delivery_rx) = mpsc::unbounded_channel::<Delivery>();
    let (event_tx, _event_rx) = mpsc::unbounded_channel::<Event>();
    let (channel, supervisor) = StompChannel::new(
        settings("127.0.0.1:1", vec![]),
        delivery_tx,
        event_tx,
        CancellationToken::new(),
    );
    drop(supervisor);

    // The supervisor is gone, so an ack that reached the queue would fail.
    channel.ack(&AckHandle {
        generation: 3,
        headers: vec![("id".to_string(), "x".to_string())],
    })?;

    return Ok(());
}

#[test]
fn it_reports_commands_lost_with_the_connection() -> Result<()> {
    let (delivery_tx, _delivery_rx) = mpsc::unbounded_channel::<Delivery>();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let (channel, mut supervisor) = StompChannel::new(
        settings("127.0.0.1:1", vec![]),
        delivery_tx,
        event_tx,
        CancellationToken::new(),
    );

    // Accepted while live, never written.
    channel.shared.connected.store(true, Ordering::SeqCst);
    channel.publish("/app/control/pauseResume", "{}")?;
    channel.ack(&AckHandle {
        generation: 0,
        headers: vec![("id".to_string(), "x".to_string())],
    })?;
    channel.shared.connected.store(false, Ordering::SeqCst);

    supervisor.discard_pending()?;
    assert!(supervisor.outbound.try_recv().is_err());
    assert!(matches!(
        event_rx.try_recv()?,
        Event::Notice(notice) if notice.kind == NoticeKind::Alert
            && notice.text == "Your connection has expired, reloading."
    ));
    assert!(matches!(event_rx.try_recv()?, Event::Reload()));
    assert!(event_rx.try_recv().is_err());

    // Only acks left behind is not worth telling anyone about.
    channel.shared.connected.store(true, Ordering::SeqCst);
    channel.ack(&AckHandle {
        generation: 0,
        headers: vec![("id".to_string(), "y".to_string())],
    })?;
    supervisor.discard_pending()?;
    assert!(event_rx.try_recv().is_err());

    return Ok(());
}

#[tokio::test]
async fn it_reloads_when_a_queued_send_outlives_the_connection() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?.to_string();
    let (delivery_tx, _delivery_rx) = mpsc::unbounded_channel::<Delivery>();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let shutdown = CancellationToken::new();

    let (channel, supervisor) =
        StompChannel::new(settings(&addr, vec![Topic::Stop]), delivery_tx, event_tx, shutdown.clone());
    let shared = Arc::clone(&channel.shared);
    let supervisor_handle = tokio::spawn(supervisor.run());

    let (ws, _) = handshake(&listener, 1).await?;
    wait_for_status(&mut event_rx, ChannelStatus::Connected).await?;
    drop(ws);
    wait_for_status(&mut event_rx, ChannelStatus::Disconnected).await?;

    // A publish that passed the liveness check just as the broker went away.
    shared.connected.store(true, Ordering::SeqCst);
    channel.publish("/app/control/pauseResume", "{}")?;
    shared.connected.store(false, Ordering::SeqCst);

    let (mut ws, _) = handshake(&listener, 1).await?;
    let mut lost = vec![];
    while let Some(event) = event_rx.recv().await {
        match event {
            Event::Notice(notice) => lost.push(notice.text),
            Event::Reload() => break,
            _ => {}
        }
    }
    assert_eq!(lost, vec!["Your connection has expired, reloading."]);

    // The stale SEND never reaches the new connection.
    wait_for_status(&mut event_rx, ChannelStatus::Connected).await?;
    shutdown.cancel();
    let disconnect = next_frame(&mut ws).await?;
    assert_eq!(disconnect.command, FrameCommand::Disconnect);
    supervisor_handle.await??;

    return Ok(());
}
