//! Status bar: bottom lines with reachability, last log line, and keybindings.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{C_ACCENT, C_MUTED, C_PLAYING, C_SECONDARY};

/// Draw the log bar: reachability dot + last log line.
pub fn draw_log_bar(frame: &mut Frame, area: Rect, last_log: Option<&str>, reachable: bool) {
    let conn_span = if reachable {
        Span::styled("●", Style::default().fg(C_PLAYING))
    } else {
        Span::styled("○", Style::default().fg(C_ACCENT))
    };

    let log_span = Span::styled(last_log.unwrap_or(""), Style::default().fg(C_SECONDARY));

    let line = Line::from(vec![Span::raw(" "), conn_span, Span::raw(" "), log_span]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Draw the keybindings footer bar (one row).
pub fn draw_keys_bar(frame: &mut Frame, area: Rect, devices_open: bool) {
    let (label, keys) = if devices_open {
        (
            "DEVICES",
            " ↑↓/jk move  Enter select  0-9 pick index  s/Esc close  q quit",
        )
    } else {
        (
            "REMOTE",
            " -/+ vol  m mute  Space pause  ,/. prev/next  s scan  r refresh  ? help  q quit",
        )
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", label),
            Style::default().fg(C_SECONDARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(keys, Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
