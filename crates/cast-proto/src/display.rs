//! Pseudo-LCD formatting: the two status lines and the track marquee.
//!
//! Widths are counted in `char`s. Padding uses NBSP so runs of spaces survive
//! any renderer that collapses whitespace.

use crate::protocol::StatusRecord;

pub const NBSP: char = '\u{a0}';
pub const DEFAULT_MAX_LEN: usize = 39;
/// NBSPs appended to a scrolling track before it wraps around.
pub const SCROLL_GAP: usize = 4;
pub const DISCONNECTED_MARK: char = '\u{2716}';
pub const SCANNING_TEXT: &str = "Scanning...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub bold: bool,
}

/// One display line made of plain and bold runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LcdLine {
    pub segments: Vec<Segment>,
}

impl LcdLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        let mut line = Self::new();
        line.push(text, false);
        line
    }

    pub fn push(&mut self, text: impl Into<String>, bold: bool) -> &mut Self {
        let text = text.into();
        if !text.is_empty() {
            self.segments.push(Segment { text, bold });
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Text as it appears on screen, markup stripped.
    pub fn visible_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn visible_len(&self) -> usize {
        self.segments.iter().map(|s| s.text.chars().count()).sum()
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for seg in &self.segments {
            let escaped = escape_html(&seg.text);
            if seg.bold {
                out.push_str("<b>");
                out.push_str(&escaped);
                out.push_str("</b>");
            } else {
                out.push_str(&escaped);
            }
        }
        out
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn nbsp(n: usize) -> String {
    std::iter::repeat(NBSP).take(n).collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// `current/duration` when both are known. Returns the segments and their
/// visible width.
fn playback_fragment(rec: &StatusRecord) -> Option<(Vec<Segment>, usize)> {
    if rec.current_time.is_empty() || rec.duration.is_empty() {
        return None;
    }
    let width = char_len(&rec.current_time) + char_len(&rec.duration) + 1;
    let segments = vec![
        Segment { text: rec.current_time.clone(), bold: false },
        Segment { text: "/".to_string(), bold: true },
        Segment { text: rec.duration.clone(), bold: false },
    ];
    Some((segments, width))
}

/// Status line 0: device, volume and playback position spread across
/// `max_len` columns, or the device plus a disconnected mark.
pub fn header_line(rec: &StatusRecord, max_len: usize) -> LcdLine {
    let mut line = LcdLine::new();

    if !rec.is_connected() {
        line.push(rec.device.clone(), true)
            .push(format!(" {}", DISCONNECTED_MARK), false);
        return line;
    }

    let (playback, playback_len) = playback_fragment(rec).unwrap_or_default();
    let content_len = char_len(&rec.device) + char_len(&rec.volume) + playback_len;

    let (left, right) = if content_len >= max_len.saturating_sub(2) {
        (1, 1)
    } else {
        let left = (max_len - content_len) / 2;
        (left, max_len - content_len - left)
    };

    line.push(rec.device.clone(), true)
        .push(nbsp(left), false)
        .push(rec.volume.clone(), false)
        .push(nbsp(right), false);
    for seg in playback {
        line.push(seg.text, seg.bold);
    }
    line
}

/// `text` centred within `max_len` columns, left side getting the floor half.
pub fn centered_line(text: &str, max_len: usize) -> LcdLine {
    let len = char_len(text);
    let mut line = LcdLine::new();
    if len >= max_len {
        line.push(text, false);
        return line;
    }
    let left = (max_len - len) / 2;
    line.push(nbsp(left), false)
        .push(text, false)
        .push(nbsp(max_len - len - left), false);
    line
}

/// `artist - title (album)` with spaces replaced by NBSP. Empty when no track
/// metadata is present at all.
pub fn track_text(rec: &StatusRecord) -> String {
    if rec.artist.is_empty() && rec.title.is_empty() && rec.album.is_empty() {
        return String::new();
    }
    format!("{} - {} ({})", rec.artist, rec.title, rec.album).replace(' ', &NBSP.to_string())
}

/// Sliding window over text wider than the display. One instance models the
/// single marquee of the panel; its offset survives across polls.
#[derive(Debug, Clone, Default)]
pub struct Marquee {
    offset: usize,
}

impl Marquee {
    pub fn new() -> Self {
        Self { offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Window of `max_len` chars over `text` + gap, treated as circular, then
    /// advance by one char.
    pub fn next_window(&mut self, text: &str, max_len: usize) -> String {
        let extended: Vec<char> = text
            .chars()
            .chain(std::iter::repeat(NBSP).take(SCROLL_GAP))
            .collect();
        let len = extended.len();

        let start = self.offset.min(len);
        let end = len.min(self.offset + max_len);
        let mut window: String = extended[start..end.max(start)].iter().collect();

        let shown = end.saturating_sub(start);
        if shown < max_len {
            let wrap = (max_len - shown).min(len);
            window.extend(&extended[..wrap]);
        }

        self.offset += 1;
        if self.offset > len {
            self.offset = 0;
        }
        window
    }
}

/// Icon for the pause/resume button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayIcon {
    /// Something is playing; the button pauses it.
    Pause,
    #[default]
    Play,
}

impl PlayIcon {
    pub fn for_record(rec: &StatusRecord) -> Self {
        let has_playback = playback_fragment(rec).is_some();
        if rec.is_connected() && has_playback && !rec.is_paused() {
            PlayIcon::Pause
        } else {
            PlayIcon::Play
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            PlayIcon::Pause => "⏸",
            PlayIcon::Play => "▶",
        }
    }
}
