#[cfg(test)]
#[path = "frame_test.rs"]
mod tests;

use std::str::FromStr;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use strum::EnumString;

use super::HeartBeat;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum FrameCommand {
    Connect,
    Stomp,
    Connected,
    Send,
    Subscribe,
    Unsubscribe,
    Ack,
    Nack,
    Disconnect,
    Message,
    Receipt,
    Error,
}

impl FrameCommand {
    /// CONNECT and CONNECTED headers are sent verbatim.
    fn escapes_headers(&self) -> bool {
        return !matches!(self, FrameCommand::Connect | FrameCommand::Connected);
    }
}

fn escape(value: &str) -> String {
    return value
        .replace('\\', "\\\\")
        .replace('\r', "\\r")
        .replace('\n', "\\n")
        .replace(':', "\\c");
}

fn unescape(value: &str) -> Result<String> {
    let mut res = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            res.push(c);
            continue;
        }

        match chars.next() {
            Some('\\') => res.push('\\'),
            Some('r') => res.push('\r'),
            Some('n') => res.push('\n'),
            Some('c') => res.push(':'),
            other => bail!(format!("Invalid header escape sequence \\{other:?}")),
        }
    }

    return Ok(res);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub command: FrameCommand,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    pub fn new(command: FrameCommand) -> Frame {
        return Frame {
            command,
            headers: vec![],
            body: "".to_string(),
        };
    }

    pub fn connect(host: &str, heart_beat: &HeartBeat) -> Frame {
        return Frame::new(FrameCommand::Connect)
            .header("accept-version", "1.2,1.1")
            .header("host", host)
            .header("heart-beat", &heart_beat.header_value());
    }

    pub fn subscribe(id: &str, destination: &str, ack: &str) -> Frame {
        return Frame::new(FrameCommand::Subscribe)
            .header("id", id)
            .header("destination", destination)
            .header("ack", ack);
    }

    pub fn send(destination: &str, body: &str) -> Frame {
        return Frame::new(FrameCommand::Send)
            .header("destination", destination)
            .header("content-type", "application/json")
            .with_body(body);
    }

    pub fn ack(headers: &[(String, String)]) -> Frame {
        let mut frame = Frame::new(FrameCommand::Ack);
        for (key, value) in headers {
            frame = frame.header(key, value);
        }

        return frame;
    }

    pub fn disconnect() -> Frame {
        return Frame::new(FrameCommand::Disconnect);
    }

    pub fn header(mut self, key: &str, value: &str) -> Frame {
        self.headers.push((key.to_string(), value.to_string()));
        return self;
    }

    pub fn with_body(mut self, body: &str) -> Frame {
        self.body = body.to_string();
        return self;
    }

    /// First value wins when a header repeats.
    pub fn get(&self, key: &str) -> Option<&str> {
        return self
            .headers
            .iter()
            .find(|(k, _)| return k == key)
            .map(|(_, v)| return v.as_str());
    }

    pub fn encode(&self) -> String {
        let mut res = format!("{}\n", self.command);
        for (key, value) in &self.headers {
            if self.command.escapes_headers() {
                res += &format!("{}:{}\n", escape(key), escape(value));
            } else {
                res += &format!("{key}:{value}\n");
            }
        }

        if !self.body.is_empty() {
            res += &format!("content-length:{}\n", self.body.len());
        }

        res += "\n";
        res += &self.body;
        res.push('\0');

        return res;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Inbound {
    Heartbeat,
    Frame(Frame),
}

fn header_block_end(text: &str) -> Option<(usize, usize)> {
    let lf = text.find("\n\n").map(|idx| return (idx, idx + 2));
    let crlf = text.find("\n\r\n").map(|idx| return (idx, idx + 3));

    match (lf, crlf) {
        (Some(a), Some(b)) => {
            if a.0 <= b.0 {
                return Some(a);
            }
            return Some(b);
        }
        (a, b) => return a.or(b),
    }
}

fn parse_frame(text: &str) -> Result<(Frame, &str)> {
    let (head_end, body_start) =
        header_block_end(text).ok_or_else(|| return anyhow!("Frame has no header terminator"))?;

    let mut lines = text[..head_end]
        .split('\n')
        .map(|e| return e.trim_end_matches('\r'));
    let command_line = lines.next().unwrap_or_default();
    let command = FrameCommand::from_str(command_line)
        .map_err(|_| return anyhow!(format!("Unknown frame command '{command_line}'")))?;

    let mut frame = Frame::new(command);
    for line in lines {
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| return anyhow!(format!("Malformed header line '{line}'")))?;

        if command.escapes_headers() {
            frame.headers.push((unescape(key)?, unescape(value)?));
        } else {
            frame.headers.push((key.to_string(), value.to_string()));
        }
    }

    let rest = &text[body_start..];
    let body_end = match frame.get("content-length") {
        Some(length) => {
            let length = length.trim().parse::<usize>()?;
            if rest.len() < length + 1 || rest.as_bytes()[length] != 0 {
                bail!("Frame body does not match its content-length");
            }
            length
        }
        None => rest
            .find('\0')
            .ok_or_else(|| return anyhow!("Frame is missing its NUL terminator"))?,
    };

    let body = rest
        .get(..body_end)
        .ok_or_else(|| return anyhow!("Frame body is not valid UTF-8 at its boundary"))?;
    frame.body = body.to_string();

    return Ok((frame, &rest[body_end + 1..]));
}

/// Splits one websocket message into heart-beats and frames.
pub fn parse(text: &str) -> Result<Vec<Inbound>> {
    let mut res = vec![];
    let mut rest = text;

    loop {
        let trimmed = rest.trim_start_matches(|e| return e == '\n' || e == '\r');
        if trimmed.len() != rest.len() {
            res.push(Inbound::Heartbeat);
        }
        if trimmed.is_empty() {
            break;
        }

        let (frame, remaining) = parse_frame(trimmed)?;
        res.push(Inbound::Frame(frame));
        rest = remaining;
    }

    return Ok(res);
}
