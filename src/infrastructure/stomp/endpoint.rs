#[cfg(test)]
#[path = "endpoint_test.rs"]
mod tests;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use reqwest::Url;

use crate::domain::models::ChannelMode;

/// Where the control channel connects to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    /// Sent as the STOMP `host` header.
    pub host: String,
}

impl Endpoint {
    /// Derives the websocket endpoint from the HTTP server url. Secure
    /// servers get `wss`, plain ones `ws`.
    pub fn from_server_url(server_url: &str, mode: ChannelMode) -> Result<Endpoint> {
        let url = Url::parse(server_url)?;
        let scheme = match url.scheme() {
            "https" => "wss",
            "http" => "ws",
            other => bail!(format!(
                "Unsupported server url scheme '{other}', use http or https"
            )),
        };

        let host = url
            .host_str()
            .ok_or_else(|| return anyhow!(format!("Server url {server_url} has no host")))?;

        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        return Ok(Endpoint {
            url: format!("{scheme}://{authority}{}", mode.endpoint_path()),
            host: host.to_string(),
        });
    }
}
