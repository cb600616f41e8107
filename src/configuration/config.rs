#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use chrono::Datelike;
use chrono::Local;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    ConfigFile,
    ConnectDelay,
    HeartbeatIncoming,
    HeartbeatOutgoing,
    IndicatorResetDelay,
    Keymap,
    ReconnectDelay,
    ReloadDelay,
    ServerURL,
    SessionCookie,
    SnapshotFile,
    Workspace,
    Year,
}

impl ConfigKey {
    /// Keys holding a number. Delays are in milliseconds.
    pub fn is_integer(&self) -> bool {
        return matches!(
            self,
            ConfigKey::ConnectDelay
                | ConfigKey::HeartbeatIncoming
                | ConfigKey::HeartbeatOutgoing
                | ConfigKey::IndicatorResetDelay
                | ConfigKey::ReconnectDelay
                | ConfigKey::ReloadDelay
                | ConfigKey::Year
        );
    }
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn get_u64(key: ConfigKey) -> Result<u64> {
        let val = Config::get(key);
        match val.parse::<u64>() {
            Ok(res) => return Ok(res),
            Err(_) => bail!(format!("Config key '{key}' must be a positive number, got '{val}'")),
        }
    }

    pub fn get_duration(key: ConfigKey) -> Result<Duration> {
        return Ok(Duration::from_millis(Config::get_u64(key)?));
    }

    pub fn default(key: ConfigKey) -> String {
        #[cfg(not(target_os = "macos"))]
        let config_path = dirs::config_dir()
            .unwrap_or_else(|| return path::PathBuf::from("."))
            .join("taskdeck/config.toml");
        #[cfg(target_os = "macos")]
        let config_path = dirs::home_dir()
            .unwrap_or_else(|| return path::PathBuf::from("."))
            .join(".config/taskdeck/config.toml");

        let year = Local::now().year().to_string();

        let res = match key {
            ConfigKey::ConnectDelay => "500",
            ConfigKey::HeartbeatIncoming => "4000",
            ConfigKey::HeartbeatOutgoing => "4000",
            ConfigKey::IndicatorResetDelay => "10000",
            ConfigKey::Keymap => "",
            ConfigKey::ReconnectDelay => "5000",
            ConfigKey::ReloadDelay => "1000",
            ConfigKey::ServerURL => "http://localhost:8080",
            ConfigKey::SessionCookie => "",
            ConfigKey::SnapshotFile => "snapshot.yaml",
            ConfigKey::Workspace => "./solution",
            ConfigKey::Year => &year,

            // Special
            ConfigKey::ConfigFile => return config_path.to_string_lossy().to_string(),
        };

        return res.to_string();
    }

    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if let Some(val) = doc.get(&key.to_string()) {
                    // Use clap value parsers to do validation.
                    let mut possible_values = vec![];
                    if let Some(arg) = cmd
                        .get_arguments()
                        .find(|e| return e.get_long() == Some(key.to_string().as_str()))
                    {
                        possible_values = arg
                            .get_possible_values()
                            .iter()
                            .map(|e| return e.get_name().to_string())
                            .collect::<Vec<String>>();
                    }

                    if let Some(val_int) = val.as_integer() {
                        Config::set(key, &val_int.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        if !possible_values.is_empty()
                            && !possible_values.contains(&val_str.to_string())
                        {
                            bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                        }
                        Config::set(key, val_str);
                    } else {
                        bail!(format!("config.toml has an invalid value for key '{key}'"));
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        for key in ConfigKey::iter().filter(|e| return e.is_integer()) {
            Config::get_u64(key)?;
        }

        tracing::debug!(
            server_url = Config::get(ConfigKey::ServerURL),
            snapshot_file = Config::get(ConfigKey::SnapshotFile),
            workspace = Config::get(ConfigKey::Workspace),
            reconnect_delay = Config::get(ConfigKey::ReconnectDelay),
            keymap = Config::get(ConfigKey::Keymap),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                if key == ConfigKey::Year {
                    return Some(
                        "# Year appended to new competition names without one. Defaults to the current year.\n# year = 2024"
                            .to_string(),
                    );
                }

                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))?;

                let description = arg
                    .get_help()
                    .map(|e| return e.to_string())
                    .unwrap_or_default()
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                let val = Config::default(key);
                let line = if val.is_empty() {
                    format!("# {key} = \"\"")
                } else if key.is_integer() {
                    format!("{key} = {val}")
                } else {
                    format!("{key} = \"{val}\"")
                };

                return Some(format!("# {description}\n{line}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
