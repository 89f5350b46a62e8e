//! DeviceList component: popup selector filled by a `scan_devices` reply.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use cast_proto::panel::ScanState;
use cast_proto::protocol::DeviceEntry;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::help_overlay::centered_rect,
    theme::{style_focused_border, style_muted, style_selected_focused, C_BG, C_PRIMARY, C_SECONDARY},
};

pub struct DeviceList {
    selected: usize,
    list_state: ListState,
}

impl DeviceList {
    pub fn new() -> Self {
        Self {
            selected: 0,
            list_state: ListState::default(),
        }
    }

    fn entries(state: &AppState) -> &[DeviceEntry] {
        match &state.scan {
            ScanState::Open(entries) => entries,
            _ => &[],
        }
    }
}

impl Component for DeviceList {
    fn id(&self) -> ComponentId {
        ComponentId::DeviceList
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let entries = Self::entries(state);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                vec![]
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < entries.len() {
                    self.selected += 1;
                }
                vec![]
            }
            KeyCode::Enter => match entries.get(self.selected) {
                Some(entry) => vec![Action::SelectDevice(entry.index)],
                None => vec![Action::CloseDevices],
            },
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let index = c.to_digit(10).map(|d| d as usize).unwrap_or_default();
                vec![Action::SelectDevice(index)]
            }
            KeyCode::Esc => vec![Action::CloseDevices],
            KeyCode::Char('s') => vec![Action::ToggleScan],
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if matches!(action, Action::ToggleScan | Action::CloseDevices) {
            self.selected = 0;
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        let entries = Self::entries(state);
        if !matches!(state.scan, ScanState::Open(_)) {
            return;
        }
        if self.selected >= entries.len() {
            self.selected = entries.len().saturating_sub(1);
        }

        let height = (entries.len() as u16 + 4).clamp(5, area.height.max(5));
        let popup = centered_rect(50, height, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(style_focused_border())
            .title(Line::from(Span::styled(
                format!(" devices ({}) ", entries.len()),
                Style::default().fg(C_PRIMARY),
            )))
            .style(Style::default().bg(C_BG));
        let inner = block.inner(popup);
        frame.render_widget(Clear, popup);
        frame.render_widget(block, popup);

        if entries.is_empty() {
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(" no devices found", style_muted()))),
                inner,
            );
            return;
        }

        let items: Vec<ListItem> = entries
            .iter()
            .enumerate()
            .map(|(row, entry)| {
                let line = Line::from(vec![
                    Span::styled(format!(" {:>2}  ", entry.index), Style::default().fg(C_SECONDARY)),
                    Span::raw(entry.name.clone()),
                ]);
                let item = ListItem::new(line);
                if row == self.selected {
                    item.style(style_selected_focused())
                } else {
                    item.style(Style::default().fg(C_PRIMARY))
                }
            })
            .collect();

        let list = List::new(items).highlight_style(Style::default()).highlight_symbol("");
        self.list_state.select(Some(self.selected));
        frame.render_stateful_widget(list, inner, &mut self.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn open_state() -> AppState {
        AppState {
            scan: ScanState::Open(vec![
                DeviceEntry { index: 0, name: "Den".into() },
                DeviceEntry { index: 3, name: "Kitchen speaker".into() },
            ]),
            ..AppState::default()
        }
    }

    #[test]
    fn enter_selects_by_bridge_index() {
        let state = open_state();
        let mut list = DeviceList::new();
        assert!(list.handle_key(key(KeyCode::Down), &state).is_empty());
        assert!(list.handle_key(key(KeyCode::Down), &state).is_empty());
        assert_eq!(list.selected, 1);
        assert_eq!(list.handle_key(key(KeyCode::Enter), &state), vec![Action::SelectDevice(3)]);
    }

    #[test]
    fn digits_pick_an_index_directly() {
        let state = open_state();
        let mut list = DeviceList::new();
        assert_eq!(list.handle_key(key(KeyCode::Char('7')), &state), vec![Action::SelectDevice(7)]);
    }

    #[test]
    fn esc_and_s_close() {
        let state = open_state();
        let mut list = DeviceList::new();
        assert_eq!(list.handle_key(key(KeyCode::Esc), &state), vec![Action::CloseDevices]);
        assert_eq!(list.handle_key(key(KeyCode::Char('s')), &state), vec![Action::ToggleScan]);
    }

    #[test]
    fn cursor_resets_when_closed() {
        let state = open_state();
        let mut list = DeviceList::new();
        list.handle_key(key(KeyCode::Char('j')), &state);
        list.on_action(&Action::CloseDevices, &state);
        assert_eq!(list.selected, 0);
    }
}
