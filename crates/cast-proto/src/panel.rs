//! PanelController: the state behind one remote-control session.
//!
//! Owns the marquee offset, the last seen track, the cover-art state and the
//! device-scan state. Everything here is synchronous; the caller performs the
//! HTTP requests and feeds the response bodies back in.

use tracing::{debug, info};

use crate::display::{self, LcdLine, Marquee, PlayIcon};
use crate::protocol::{parse_device_list, Command, DeviceEntry, StatusRecord};

/// Value some bridges report for a track before metadata arrives.
const SPURIOUS_TRACK: &str = "undefined";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CoverArt {
    #[default]
    Hidden,
    Shown { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Closed,
    /// `scan_devices` in flight; polling is suspended.
    Scanning,
    Open(Vec<DeviceEntry>),
}

/// What the display shows right now.
#[derive(Debug, Clone, Default)]
pub struct PanelView {
    pub header: LcdLine,
    /// Status line 1, already windowed to the column budget.
    pub track: String,
    pub icon: PlayIcon,
    pub connected: bool,
    /// Most recent parsed record, if any arrived yet.
    pub record: Option<StatusRecord>,
}

pub struct PanelController {
    max_len: usize,
    base_url: String,
    marquee: Marquee,
    prev_track: String,
    cover: CoverArt,
    scan: ScanState,
    view: PanelView,
}

impl PanelController {
    pub fn new(max_len: usize, base_url: impl Into<String>) -> Self {
        Self {
            max_len,
            base_url: base_url.into(),
            marquee: Marquee::new(),
            prev_track: String::new(),
            cover: CoverArt::Hidden,
            scan: ScanState::Closed,
            view: PanelView::default(),
        }
    }

    pub fn view(&self) -> &PanelView {
        &self.view
    }

    pub fn cover(&self) -> &CoverArt {
        &self.cover
    }

    pub fn scan(&self) -> &ScanState {
        &self.scan
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn polling_suspended(&self) -> bool {
        self.scan == ScanState::Scanning
    }

    /// Fold a `get_status` body into the display. Returns the new cover URL
    /// when the track changed and the art should be reloaded.
    pub fn apply_status(&mut self, body: &str) -> Option<String> {
        if self.polling_suspended() {
            debug!("status dropped while scanning");
            return None;
        }

        let rec = StatusRecord::parse(body);
        let connected = rec.is_connected();

        let full_track = if connected {
            display::track_text(&rec)
        } else {
            String::new()
        };
        let track = if full_track.chars().count() <= self.max_len {
            full_track.clone()
        } else {
            self.marquee.next_window(&full_track, self.max_len)
        };

        self.view = PanelView {
            header: display::header_line(&rec, self.max_len),
            track,
            icon: PlayIcon::for_record(&rec),
            connected,
            record: Some(rec),
        };

        if !connected {
            self.cover = CoverArt::Hidden;
            self.prev_track.clear();
            return None;
        }

        self.refresh_for(full_track)
    }

    /// Reload the cover when `full_track` differs from the last one seen.
    fn refresh_for(&mut self, full_track: String) -> Option<String> {
        if full_track == self.prev_track || full_track == SPURIOUS_TRACK {
            return None;
        }
        info!(
            "Track status changed to: {}",
            full_track.replace(display::NBSP, " ")
        );
        self.prev_track = full_track;
        let url = cover_url(&self.base_url, chrono::Utc::now().timestamp_millis());
        self.cover = CoverArt::Shown { url: url.clone() };
        Some(url)
    }

    /// Toggle the device selector. Returns the command to send when a scan
    /// should start; closing an open list sends nothing.
    pub fn begin_scan(&mut self) -> Option<Command> {
        match self.scan {
            ScanState::Open(_) => {
                self.scan = ScanState::Closed;
                None
            }
            ScanState::Scanning => None,
            ScanState::Closed => {
                self.scan = ScanState::Scanning;
                self.view.header = display::centered_line(display::SCANNING_TEXT, self.max_len);
                Some(Command::ScanDevices)
            }
        }
    }

    /// Fold a `scan_devices` body into the selector and resume polling.
    pub fn finish_scan(&mut self, body: &str) {
        if self.scan != ScanState::Scanning {
            return;
        }
        let devices = parse_device_list(body);
        info!("scan found {} device(s)", devices.len());
        self.scan = ScanState::Open(devices);
    }

    pub fn scan_failed(&mut self) {
        if self.scan == ScanState::Scanning {
            self.scan = ScanState::Closed;
        }
    }

    pub fn close_scan(&mut self) {
        if matches!(self.scan, ScanState::Open(_)) {
            self.scan = ScanState::Closed;
        }
    }

    /// Choose the device with bridge index `index` from the open list.
    pub fn select_device(&mut self, index: usize) -> Option<Command> {
        let ScanState::Open(devices) = &self.scan else {
            return None;
        };
        let entry = devices.iter().find(|d| d.index == index)?;
        info!("selecting device {} ({})", entry.index, entry.name);
        let cmd = Command::SelectDevice(entry.index);
        self.scan = ScanState::Closed;
        Some(cmd)
    }
}

/// Cover URL with a time fragment so every refresh is a distinct URL.
pub fn cover_url(base_url: &str, millis: i64) -> String {
    format!("{}/cover.jpg#{}", base_url.trim_end_matches('/'), millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::NBSP;

    const PLAYING: &str =
        "1\nDen\n50%\nNina Simone\nSinnerman\nPastel Blues (Remastered)\n01:23\n10:20\n0";

    fn panel() -> PanelController {
        PanelController::new(39, "http://10.0.0.2:8000")
    }

    #[test]
    fn short_track_is_shown_verbatim() {
        let mut p = panel();
        p.apply_status("1\nDen\n50%\nA\nB\nC\n\n\n1");
        assert_eq!(p.view().track, format!("A{0}-{0}B{0}(C)", NBSP));
        assert_eq!(p.view().icon, PlayIcon::Play);
        assert!(p.view().connected);
    }

    #[test]
    fn long_track_scrolls_one_char_per_poll() {
        let mut p = panel();
        let first = {
            p.apply_status(PLAYING);
            p.view().track.clone()
        };
        p.apply_status(PLAYING);
        let second = p.view().track.clone();
        assert_eq!(first.chars().count(), 39);
        assert_eq!(
            first.chars().skip(1).collect::<String>(),
            second.chars().take(38).collect::<String>()
        );
        assert_eq!(p.view().icon, PlayIcon::Pause);
    }

    #[test]
    fn cover_refreshes_once_per_distinct_track() {
        let mut p = panel();
        let url = p.apply_status(PLAYING).expect("first track refreshes art");
        assert!(url.starts_with("http://10.0.0.2:8000/cover.jpg#"));
        assert_eq!(p.cover(), &CoverArt::Shown { url });

        assert!(p.apply_status(PLAYING).is_none());
        assert!(p.apply_status(PLAYING).is_none());

        let next = PLAYING.replace("Sinnerman", "Feeling Good");
        assert!(p.apply_status(&next).is_some());
        assert!(p.apply_status(&next).is_none());
    }

    #[test]
    fn undefined_track_never_refreshes() {
        let mut p = panel();
        p.prev_track = "something".into();
        assert_eq!(p.refresh_for(SPURIOUS_TRACK.to_string()), None);
        assert_eq!(p.prev_track, "something");
        assert_eq!(p.cover(), &CoverArt::Hidden);

        assert!(p.refresh_for("else".to_string()).is_some());
        assert_eq!(p.prev_track, "else");
    }

    #[test]
    fn disconnected_hides_cover_and_blanks_track() {
        let mut p = panel();
        p.apply_status(PLAYING);
        assert!(p.apply_status("0\nDen\n\n\n\n\n\n\n").is_none());
        assert!(!p.view().connected);
        assert_eq!(p.view().track, "");
        assert_eq!(p.view().header.to_html(), "<b>Den</b> \u{2716}");
        assert_eq!(p.cover(), &CoverArt::Hidden);

        // same track after reconnect shows the art again
        assert!(p.apply_status(PLAYING).is_some());
    }

    #[test]
    fn scan_flow() {
        let mut p = panel();
        p.apply_status(PLAYING);

        assert_eq!(p.begin_scan(), Some(Command::ScanDevices));
        assert!(p.polling_suspended());
        assert_eq!(
            p.view().header.visible_text().trim_matches(NBSP),
            "Scanning..."
        );
        // polls issued before the scan are ignored
        assert!(p.apply_status(PLAYING).is_none());
        assert_eq!(p.begin_scan(), None);

        p.finish_scan("0,Living Room\n1,Kitchen");
        assert!(!p.polling_suspended());
        match p.scan() {
            ScanState::Open(list) => {
                assert_eq!(list.len(), 2);
                assert_eq!(list[1].name, "Kitchen");
            }
            other => panic!("expected open list, got {:?}", other),
        }

        assert_eq!(p.select_device(1), Some(Command::SelectDevice(1)));
        assert_eq!(p.scan(), &ScanState::Closed);
        assert_eq!(p.select_device(1), None);
    }

    #[test]
    fn scan_toggle_closes_without_rescanning() {
        let mut p = panel();
        p.begin_scan();
        p.finish_scan("0,Living Room");
        assert_eq!(p.begin_scan(), None);
        assert_eq!(p.scan(), &ScanState::Closed);
        assert_eq!(p.begin_scan(), Some(Command::ScanDevices));
    }

    #[test]
    fn scan_failure_resumes_polling() {
        let mut p = panel();
        p.begin_scan();
        p.scan_failed();
        assert!(!p.polling_suspended());
        assert_eq!(p.scan(), &ScanState::Closed);
    }

    #[test]
    fn unknown_device_index_keeps_list_open() {
        let mut p = panel();
        p.begin_scan();
        p.finish_scan("0,Living Room\n1,Kitchen");
        assert_eq!(p.select_device(7), None);
        assert!(matches!(p.scan(), ScanState::Open(_)));
    }

    #[test]
    fn cover_url_has_time_fragment() {
        assert_eq!(
            cover_url("http://localhost:8000/", 1700000000123),
            "http://localhost:8000/cover.jpg#1700000000123"
        );
    }
}
