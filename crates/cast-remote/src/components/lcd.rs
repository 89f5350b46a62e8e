//! LcdPanel component: the two-line pseudo-LCD plus the play/pause button.
//!
//! Owns the playback keys; everything it emits is a bridge command.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use cast_proto::display::{LcdLine, PlayIcon};
use cast_proto::panel::ScanState;
use cast_proto::protocol::Command;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{
        style_lcd, style_lcd_bold, C_ACCENT, C_LCD_BG, C_LCD_DIM, C_PAUSED, C_PLAYING, C_SECONDARY,
    },
    widgets::pane_chrome::{pane_chrome, Badge},
};

pub struct LcdPanel;

impl LcdPanel {
    pub fn new() -> Self {
        Self
    }
}

/// Map a key to the bridge command it stands for.
pub fn command_for_key(code: KeyCode) -> Option<Command> {
    let cmd = match code {
        KeyCode::Char('-') | KeyCode::Char('_') => Command::VolumeDown,
        KeyCode::Char('+') | KeyCode::Char('=') => Command::VolumeUp,
        KeyCode::Char('m') => Command::VolumeToggleMute,
        KeyCode::Char(' ') => Command::TogglePause,
        KeyCode::Char(',') | KeyCode::Char('<') => Command::PrevTrack,
        KeyCode::Char('.') | KeyCode::Char('>') => Command::NextTrack,
        _ => return None,
    };
    Some(cmd)
}

/// Render an LCD line as spans padded with spaces out to `width` columns so the
/// backlight fills the whole row.
pub fn lcd_spans(line: &LcdLine, width: usize) -> Vec<Span<'static>> {
    let mut spans: Vec<Span<'static>> = line
        .segments
        .iter()
        .map(|seg| {
            let style = if seg.bold { style_lcd_bold() } else { style_lcd() };
            Span::styled(seg.text.clone(), style)
        })
        .collect();
    let used = line.visible_text().width();
    if used < width {
        spans.push(Span::styled(" ".repeat(width - used), style_lcd()));
    }
    spans
}

impl Component for LcdPanel {
    fn id(&self) -> ComponentId {
        ComponentId::Lcd
    }

    fn handle_key(&mut self, key: KeyEvent, _state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if let Some(cmd) = command_for_key(key.code) {
            return vec![Action::Send(cmd)];
        }
        match key.code {
            KeyCode::Char('s') => vec![Action::ToggleScan],
            KeyCode::Char('r') => vec![Action::RefreshStatus],
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        if area.height == 0 {
            return;
        }

        let badge = if !state.reachable {
            Some(Badge { text: "OFFLINE", color: C_ACCENT })
        } else if !state.view.connected {
            Some(Badge { text: "NO DEVICE", color: C_PAUSED })
        } else {
            None
        };
        let title = format!("cast remote · {}", state.backend_url);
        let block = pane_chrome(&title, true, badge);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lcd_w = (state.max_len as u16 + 2).min(inner.width);
        let icon_w = 4u16;
        let total_w = (lcd_w + icon_w).min(inner.width);
        let x = inner.x + inner.width.saturating_sub(total_w) / 2;
        let y = inner.y + inner.height.saturating_sub(2) / 2;
        let row = Rect { x, y, width: total_w, height: inner.height.min(2) };

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(icon_w), Constraint::Min(0)])
            .split(row);

        let icon = state.view.icon;
        let icon_color = match icon {
            PlayIcon::Pause => C_PLAYING,
            PlayIcon::Play if state.view.connected => C_PAUSED,
            PlayIcon::Play => C_SECONDARY,
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {} ", icon.glyph()),
                Style::default().fg(icon_color),
            ))),
            cols[0],
        );

        let width = state.max_len;
        let mut header = lcd_spans(&state.view.header, 0);
        // disconnected: point at the scan key
        if !state.view.connected && state.view.record.is_some() && state.scan == ScanState::Closed {
            header.push(Span::styled(
                "  s: scan",
                Style::default().fg(C_LCD_DIM).bg(C_LCD_BG),
            ));
        }
        let header_used: usize = header.iter().map(|s| s.content.as_ref().width()).sum();
        if header_used < width {
            header.push(Span::styled(" ".repeat(width - header_used), style_lcd()));
        }

        let track = lcd_spans(&LcdLine::plain(state.view.track.clone()), width);

        let lines = vec![Line::from(header), Line::from(track)];
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().style(style_lcd())),
            cols[1],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playback_keys_map_to_commands() {
        assert_eq!(command_for_key(KeyCode::Char('+')), Some(Command::VolumeUp));
        assert_eq!(command_for_key(KeyCode::Char('_')), Some(Command::VolumeDown));
        assert_eq!(command_for_key(KeyCode::Char(' ')), Some(Command::TogglePause));
        assert_eq!(command_for_key(KeyCode::Char('<')), Some(Command::PrevTrack));
        assert_eq!(command_for_key(KeyCode::Char('.')), Some(Command::NextTrack));
        assert_eq!(command_for_key(KeyCode::Char('m')), Some(Command::VolumeToggleMute));
        assert_eq!(command_for_key(KeyCode::Char('x')), None);
    }

    #[test]
    fn lcd_spans_pad_to_width() {
        let mut line = LcdLine::new();
        line.push("Den", true).push("\u{a0}50%", false);
        let spans = lcd_spans(&line, 39);
        assert_eq!(spans.len(), 3);
        let total: usize = spans.iter().map(|s| s.content.as_ref().width()).sum();
        assert_eq!(total, 39);
        assert_eq!(spans[0].style, style_lcd_bold());
    }

    #[test]
    fn lcd_spans_leave_full_lines_alone() {
        let line = LcdLine::plain("x".repeat(39));
        assert_eq!(lcd_spans(&line, 39).len(), 1);
    }
}
