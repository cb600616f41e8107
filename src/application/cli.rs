use std::io;
use std::path;
use std::process;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ActionRegistry;
use crate::domain::models::ChannelMode;
use crate::domain::models::Confirmer;
use crate::domain::models::Notice;
use crate::domain::models::SyncError;
use crate::infrastructure::api::AssignmentOperation;
use crate::infrastructure::api::ControlApi;
use crate::infrastructure::confirm::TerminalConfirmer;

pub fn help_text() -> String {
    let text = r#"
HOTKEYS:
- Up arrow / Down arrow - Move the selection
- Space - Toggle the selected test for the next test run (feedback mode)
- y / Enter - Accept a confirmation, n / Esc - Reject it
- CTRL+C - Exit

CONTROL KEYS:
- s startTask, x stopTask, r restartAssignment, p pauseResume
- c clearCompetition, n competitionCreateNew, d competitionDelete, a scanAssignments

FEEDBACK KEYS:
- c compile, t test, u submit

Keys can be rebound with --keymap, as a list of key=action pairs.
        "#;

    return text.trim().to_string();
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    process::exit(0);
}

/// Prints the outcome of a one-shot request. Rejections end the process
/// with a failure code, cancellations silently.
fn print_outcome(res: Result<Notice>) -> Result<()> {
    match res {
        Ok(notice) => {
            notice.print();
            return Ok(());
        }
        Err(err) => match err.downcast_ref::<SyncError>() {
            Some(sync_err) if sync_err.is_silent() => return Ok(()),
            Some(sync_err) => {
                Notice::alert(&sync_err.to_string()).print();
                process::exit(1);
            }
            None => return Err(err),
        },
    }
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn print_topics() {
    for mode in [ChannelMode::Control, ChannelMode::Feedback] {
        println!("{} ({})", mode, mode.endpoint_path());
        for topic in mode.topics() {
            println!("- {} [{}]", topic.destination(), topic.ack_mode().header_value());
        }
    }
}

async fn competition_create(matches: &ArgMatches) -> Result<()> {
    let name = matches
        .get_one::<String>("name")
        .map(|e| return e.to_string())
        .unwrap_or_default();
    let assignments = matches
        .get_many::<String>("assignment")
        .map(|e| return e.cloned().collect::<Vec<String>>())
        .unwrap_or_default();

    return print_outcome(
        ControlApi::default()
            .create_competition(&name, &assignments)
            .await,
    );
}

async fn session_start(matches: &ArgMatches) -> Result<()> {
    let competition_id = matches
        .get_one::<String>("competition-id")
        .map(|e| return e.to_string())
        .unwrap_or_default();
    let name = matches
        .get_one::<String>("name")
        .map(|e| return e.to_string())
        .unwrap_or_else(|| return competition_id.to_string());

    return print_outcome(
        ControlApi::default()
            .start_session(&competition_id, &name)
            .await,
    );
}

async fn assignment_change(matches: &ArgMatches, operation: AssignmentOperation) -> Result<()> {
    let session_id = matches
        .get_one::<String>("session-id")
        .map(|e| return e.to_string())
        .unwrap_or_default();
    let assignment_id = matches
        .get_one::<String>("assignment-id")
        .map(|e| return e.to_string())
        .unwrap_or_default();
    let name = matches
        .get_one::<String>("name")
        .map(|e| return e.to_string())
        .unwrap_or_else(|| return assignment_id.to_string());

    if TerminalConfirmer::default()
        .confirm(operation.prompt(&name))
        .await
        .is_err()
    {
        return Ok(());
    }

    return print_outcome(
        ControlApi::default()
            .change_assignment(&session_id, &assignment_id, &name, operation)
            .await,
    );
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for Taskdeck")
        .hide(true)
        .subcommand(
            Command::new("topics").about("List the websocket endpoint and topics of each mode.")
        )
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Taskdeck with environment variable RUST_LOG=taskdeck")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn subcommand_competition() -> Command {
    return Command::new("competition")
        .about("Manage competitions over the HTTP API.")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("create")
                .about("Create a competition from a list of assignments.")
                .arg(
                    Arg::new("name")
                        .help("Name of the competition.")
                        .required(true),
                )
                .arg(
                    Arg::new("assignment")
                        .short('a')
                        .long("assignment")
                        .help("Assignment to include. Can be repeated.")
                        .action(ArgAction::Append),
                ),
        );
}

fn subcommand_session() -> Command {
    return Command::new("session")
        .about("Manage competition sessions over the HTTP API.")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("start")
                .about("Start a new session for a competition.")
                .arg(
                    Arg::new("competition-id")
                        .help("Id of the competition.")
                        .required(true),
                )
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .help("Display name of the competition. Defaults to its id."),
                ),
        );
}

fn subcommand_assignment_operation(operation: AssignmentOperation) -> Command {
    return Command::new(operation.to_string())
        .about(format!("Runs '{operation}' on an assignment of a running session. Asks for confirmation first."))
        .arg(
            Arg::new("session-id")
                .help("Id of the running session.")
                .required(true),
        )
        .arg(
            Arg::new("assignment-id")
                .help("Id of the assignment.")
                .required(true),
        )
        .arg(
            Arg::new("name")
                .short('n')
                .long("name")
                .help("Display name of the assignment. Defaults to its id."),
        );
}

fn subcommand_assignment() -> Command {
    return Command::new("assignment")
        .about("Start, stop, or reset assignments over the HTTP API.")
        .arg_required_else_help(true)
        .subcommand(subcommand_assignment_operation(AssignmentOperation::Start))
        .subcommand(subcommand_assignment_operation(AssignmentOperation::Stop))
        .subcommand(subcommand_assignment_operation(AssignmentOperation::Reset));
}

fn arg_millis(key: ConfigKey, env: &'static str, help: &str) -> Arg {
    return Arg::new(key.to_string())
        .long(key.to_string())
        .env(env)
        .num_args(1)
        .help(format!("{help} [default: {}]", Config::default(key)))
        .global(true);
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.ends_with("KEYS:") {
                return Paint::new(line.to_string()).underline().bold().to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("taskdeck")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(true)
        .subcommand(Command::new("control").about("Mirror the task control channel: assignments, clock, and organizer notices."))
        .subcommand(Command::new("feedback").about("Mirror the team feedback channel: compile, test, and submit."))
        .subcommand(subcommand_competition())
        .subcommand(subcommand_session())
        .subcommand(subcommand_assignment())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("TASKDECK_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::ServerURL.to_string())
                .short('u')
                .long(ConfigKey::ServerURL.to_string())
                .env("TASKDECK_SERVER_URL")
                .num_args(1)
                .help(format!("Competition server URL. The websocket endpoint is derived from it. [default: {}]", Config::default(ConfigKey::ServerURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::SessionCookie.to_string())
                .long(ConfigKey::SessionCookie.to_string())
                .env("TASKDECK_SESSION_COOKIE")
                .num_args(1)
                .help("Cookie header identifying the logged in user, sent on the websocket handshake and every HTTP request.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::SnapshotFile.to_string())
                .short('s')
                .long(ConfigKey::SnapshotFile.to_string())
                .env("TASKDECK_SNAPSHOT_FILE")
                .num_args(1)
                .help(format!("YAML file with the session state to start from. Read again on every reload. [default: {}]", Config::default(ConfigKey::SnapshotFile)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Workspace.to_string())
                .short('w')
                .long(ConfigKey::Workspace.to_string())
                .env("TASKDECK_WORKSPACE")
                .num_args(1)
                .help(format!("Directory holding the editable files sent with compile, test, and submit. [default: {}]", Config::default(ConfigKey::Workspace)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Keymap.to_string())
                .short('k')
                .long(ConfigKey::Keymap.to_string())
                .env("TASKDECK_KEYMAP")
                .num_args(1)
                .help(format!(
                    "Key bindings as key=action pairs. Defaults to '{}' in control mode and '{}' in feedback mode.",
                    ActionRegistry::CONTROL_KEYMAP,
                    ActionRegistry::FEEDBACK_KEYMAP
                ))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Year.to_string())
                .long(ConfigKey::Year.to_string())
                .env("TASKDECK_YEAR")
                .num_args(1)
                .help("Year appended to new competition names without one. Defaults to the current year.")
                .global(true),
        )
        .arg(arg_millis(ConfigKey::ConnectDelay, "TASKDECK_CONNECT_DELAY", "Milliseconds to wait before the first connection attempt."))
        .arg(arg_millis(ConfigKey::ReconnectDelay, "TASKDECK_RECONNECT_DELAY", "Milliseconds to wait before reconnecting after the connection dropped."))
        .arg(arg_millis(ConfigKey::ReloadDelay, "TASKDECK_RELOAD_DELAY", "Milliseconds before a scheduled reload happens."))
        .arg(arg_millis(ConfigKey::IndicatorResetDelay, "TASKDECK_INDICATOR_RESET_DELAY", "Milliseconds before success and failure indicators revert."))
        .arg(arg_millis(ConfigKey::HeartbeatOutgoing, "TASKDECK_HEARTBEAT_OUTGOING", "Milliseconds between heart-beats the client offers to send."))
        .arg(arg_millis(ConfigKey::HeartbeatIncoming, "TASKDECK_HEARTBEAT_INCOMING", "Milliseconds between heart-beats the client asks the server for."));
}

/// Handles one-shot subcommands. Returns the mode to run the terminal UI in,
/// or nothing when the process is done.
pub async fn parse() -> Result<Option<ChannelMode>> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("topics", _)) => {
                    print_topics();
                }
                Some(("log-path", _)) => {
                    let log_path = dirs::cache_dir()
                        .unwrap_or_else(|| return path::PathBuf::from("."))
                        .join("taskdeck/debug.log");
                    println!("{}", log_path.to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(None);
        }
        Some(("control", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            return Ok(Some(ChannelMode::Control));
        }
        Some(("feedback", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            return Ok(Some(ChannelMode::Feedback));
        }
        Some(("competition", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", create_matches)) => {
                Config::load(build(), vec![&matches, subcmd_matches, create_matches]).await?;
                competition_create(create_matches).await?;
                return Ok(None);
            }
            _ => {
                subcommand_competition().print_long_help()?;
                return Ok(None);
            }
        },
        Some(("session", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("start", start_matches)) => {
                Config::load(build(), vec![&matches, subcmd_matches, start_matches]).await?;
                session_start(start_matches).await?;
                return Ok(None);
            }
            _ => {
                subcommand_session().print_long_help()?;
                return Ok(None);
            }
        },
        Some(("assignment", subcmd_matches)) => {
            let (operation, op_matches) = match subcmd_matches.subcommand() {
                Some((name, op_matches)) => (name.parse::<AssignmentOperation>()?, op_matches),
                None => {
                    subcommand_assignment().print_long_help()?;
                    return Ok(None);
                }
            };

            Config::load(build(), vec![&matches, subcmd_matches, op_matches]).await?;
            assignment_change(op_matches, operation).await?;
            return Ok(None);
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(None);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(None);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(None);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(None);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(None);
            }
        },
        _ => {
            build().print_long_help()?;
            return Ok(None);
        }
    }
}
