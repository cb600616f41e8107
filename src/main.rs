#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::path;
use std::process;
use std::sync::Arc;

use anyhow::Error;
use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task;
use tokio_util::sync::CancellationToken;
use yansi::Paint;

use crate::application::cli;
use crate::application::ui;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::ActionHandlerBox;
use crate::domain::models::ActionRegistry;
use crate::domain::models::ChannelBox;
use crate::domain::models::ChannelMode;
use crate::domain::models::Delivery;
use crate::domain::models::Event;
use crate::domain::models::TopicHandlerBox;
use crate::domain::services::actions::ActionsService;
use crate::domain::services::FeedbackDisplay;
use crate::domain::services::Outbox;
use crate::domain::services::Scheduler;
use crate::domain::services::SessionSync;
use crate::domain::services::SubscriptionService;
use crate::domain::services::Workspace;
use crate::infrastructure::confirm::UiConfirmer;
use crate::infrastructure::stomp::Endpoint;
use crate::infrastructure::stomp::HeartBeat;
use crate::infrastructure::stomp::StompChannel;
use crate::infrastructure::stomp::StompSettings;

fn handle_error(err: Error) {
    eprintln!(
            "{}",
            Paint::red(format!(
                "Oh no! Taskdeck has failed with the following app version and error.\n\nVersion: {}\nCommit: {}\nError: {}",
                env!("CARGO_PKG_VERSION"),
                env!("VERGEN_GIT_DESCRIBE"),
                err
            ))
        );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

fn stomp_settings(mode: ChannelMode) -> Result<StompSettings> {
    return Ok(StompSettings {
        endpoint: Endpoint::from_server_url(&Config::get(ConfigKey::ServerURL), mode)?,
        topics: mode.topics(),
        heart_beat: HeartBeat::new(
            Config::get_u64(ConfigKey::HeartbeatOutgoing)?,
            Config::get_u64(ConfigKey::HeartbeatIncoming)?,
        ),
        connect_delay: Config::get_duration(ConfigKey::ConnectDelay)?,
        reconnect_delay: Config::get_duration(ConfigKey::ReconnectDelay)?,
        cookie: Config::get(ConfigKey::SessionCookie),
    });
}

fn action_registry(mode: ChannelMode) -> Result<ActionRegistry> {
    let mut keymap = Config::get(ConfigKey::Keymap);
    if keymap.is_empty() {
        keymap = match mode {
            ChannelMode::Control => ActionRegistry::CONTROL_KEYMAP.to_string(),
            ChannelMode::Feedback => ActionRegistry::FEEDBACK_KEYMAP.to_string(),
        };
    }

    return Ok(ActionRegistry::from_keymap(&keymap)?);
}

async fn run(mode: ChannelMode) -> Result<()> {
    let registry = action_registry(mode)?;
    let settings = stomp_settings(mode)?;
    tracing::info!(%mode, endpoint = %settings.endpoint.url, "Starting");

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();
    let (delivery_tx, mut delivery_rx) = mpsc::unbounded_channel::<Delivery>();
    let shutdown = CancellationToken::new();

    let (stomp_channel, supervisor) =
        StompChannel::new(settings, delivery_tx, event_tx.clone(), shutdown.clone());
    let channel: ChannelBox = Arc::new(stomp_channel);
    let outbox = Outbox::new(
        channel.clone(),
        event_tx.clone(),
        Scheduler::from_config(event_tx.clone())?,
    );

    let (topic_handler, action_handler): (TopicHandlerBox, ActionHandlerBox) = match mode {
        ChannelMode::Control => {
            let sync = Arc::new(SessionSync::new(
                outbox,
                Box::new(UiConfirmer::new(event_tx.clone())),
                &Config::get(ConfigKey::Year),
            ));
            let topic_handler: TopicHandlerBox = sync.clone();
            let action_handler: ActionHandlerBox = sync;
            (topic_handler, action_handler)
        }
        ChannelMode::Feedback => {
            let workspace = Workspace::default();
            workspace.ensure_exists().await?;
            let display = Arc::new(FeedbackDisplay::new(outbox, workspace));
            let topic_handler: TopicHandlerBox = display.clone();
            let action_handler: ActionHandlerBox = display;
            (topic_handler, action_handler)
        }
    };

    let mut background_futures = task::JoinSet::new();
    background_futures.spawn(async move {
        return supervisor.run().await;
    });

    let subscription_channel = channel.clone();
    background_futures.spawn(async move {
        return SubscriptionService::start(
            subscription_channel,
            vec![topic_handler],
            &mut delivery_rx,
        )
        .await;
    });

    background_futures.spawn(async move {
        return ActionsService::start(action_handler, channel, event_tx, &mut action_rx).await;
    });

    let ui_future = ui::start(mode, registry, action_tx, event_rx);

    let res = tokio::select!(
        res = background_futures.join_next() => match res {
            Some(Ok(res)) => res,
            Some(Err(err)) => Err(err.into()),
            None => Ok(()),
        },
        res = ui_future => res,
    );

    shutdown.cancel();
    return res;
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        ui::destruct_terminal_for_panic();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let debug_log_dir = env::var("TASKDECK_LOG_DIR").unwrap_or_else(|_| {
        return dirs::cache_dir()
            .unwrap_or_else(|| return path::PathBuf::from("."))
            .join("taskdeck")
            .to_string_lossy()
            .to_string();
    });

    let file_appender = tracing_appender::rolling::never(debug_log_dir, "debug.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("taskdeck")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    let mode = match cli::parse().await {
        Ok(Some(mode)) => mode,
        Ok(None) => process::exit(0),
        Err(err) => {
            handle_error(err);
            return;
        }
    };

    if let Err(err) = run(mode).await {
        ui::destruct_terminal_for_panic();
        handle_error(err);
    }

    process::exit(0);
}
