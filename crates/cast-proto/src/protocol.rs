//! Wire vocabulary of the bridge's control endpoint.
//!
//! Every request is a `POST /` whose body is a single command token, with at
//! most one space-delimited argument. Only `get_status` and `scan_devices`
//! answer with a body the panel reads.

use std::fmt;
use std::str::FromStr;

/// Commands understood by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    VolumeToggleMute,
    VolumeDown,
    VolumeUp,
    PrevTrack,
    NextTrack,
    TogglePause,
    GetStatus,
    ScanDevices,
    SelectDevice(usize),
}

impl Command {
    /// Body sent on the wire.
    pub fn wire(&self) -> String {
        match self {
            Command::SelectDevice(idx) => format!("select_device {}", idx),
            other => other.token().to_string(),
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Command::VolumeToggleMute => "volume_toggle_mute",
            Command::VolumeDown => "volume_down",
            Command::VolumeUp => "volume_up",
            Command::PrevTrack => "prev_track",
            Command::NextTrack => "next_track",
            Command::TogglePause => "toggle_pause",
            Command::GetStatus => "get_status",
            Command::ScanDevices => "scan_devices",
            Command::SelectDevice(_) => "select_device",
        }
    }

    /// Whether the response body carries data for the panel.
    pub fn has_response_body(&self) -> bool {
        matches!(self, Command::GetStatus | Command::ScanDevices)
    }

    /// Whether completing this command should trigger a status refresh.
    pub fn refreshes_status(&self) -> bool {
        !self.has_response_body()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.wire())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseCommandError {
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("{0} expects a device index")]
    MissingArgument(&'static str),
    #[error("invalid device index: {0}")]
    BadIndex(String),
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(2, ' ');
        let token = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim);
        let cmd = match token {
            "volume_toggle_mute" => Command::VolumeToggleMute,
            "volume_down" => Command::VolumeDown,
            "volume_up" => Command::VolumeUp,
            "prev_track" => Command::PrevTrack,
            "next_track" => Command::NextTrack,
            // later bridges renamed the pause toggle
            "toggle_pause" | "play_pause_resume" => Command::TogglePause,
            "get_status" => Command::GetStatus,
            "scan_devices" => Command::ScanDevices,
            "select_device" => {
                let arg = arg.ok_or(ParseCommandError::MissingArgument("select_device"))?;
                let idx = arg
                    .parse::<usize>()
                    .map_err(|_| ParseCommandError::BadIndex(arg.to_string()))?;
                Command::SelectDevice(idx)
            }
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };
        Ok(cmd)
    }
}

/// One `get_status` snapshot. Fields are positional, one per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusRecord {
    pub connected: String,
    pub device: String,
    pub volume: String,
    pub artist: String,
    pub title: String,
    pub album: String,
    pub current_time: String,
    pub duration: String,
    pub paused: String,
}

impl StatusRecord {
    pub const FIELD_COUNT: usize = 9;

    /// Parse a newline-delimited record. Missing fields become empty strings
    /// and surplus lines are ignored; this never fails.
    pub fn parse(text: &str) -> Self {
        let mut lines = text.split('\n').map(|l| l.strip_suffix('\r').unwrap_or(l));
        let mut next = || lines.next().unwrap_or_default().to_string();
        Self {
            connected: next(),
            device: next(),
            volume: next(),
            artist: next(),
            title: next(),
            album: next(),
            current_time: next(),
            duration: next(),
            paused: next(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected == "1"
    }

    pub fn is_paused(&self) -> bool {
        self.paused != "0"
    }
}

/// A device offered by `scan_devices`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEntry {
    pub index: usize,
    pub name: String,
}

/// Parse `index,name` lines. Lines without a comma or with a non-numeric
/// index are skipped.
pub fn parse_device_list(text: &str) -> Vec<DeviceEntry> {
    text.lines()
        .filter_map(|line| {
            let (idx, name) = line.split_once(',')?;
            let index = idx.trim().parse::<usize>().ok()?;
            Some(DeviceEntry {
                index,
                name: name.trim().to_string(),
            })
        })
        .collect()
}
