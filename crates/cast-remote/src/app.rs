//! App: component-based event loop for the remote panel.
//!
//! Architecture:
//! - `App` owns the components, the `PanelController` and `AppState`.
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background tasks.
//! - Every bridge request runs on its own spawned task and reports back here.
//! - The event loop draws each frame, then awaits the next message or poll tick.
//! - Components return `Vec<Action>`; App dispatches each Action.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use cast_proto::client::{BackendClient, ClientError};
use cast_proto::config::DisplayConfig;
use cast_proto::panel::{PanelController, ScanState};
use cast_proto::protocol::Command;

use crate::{
    action::Action,
    app_state::{AppState, CoverFile},
    component::Component,
    components::{
        cover_art::CoverArtPane, device_list::DeviceList, help_overlay::HelpOverlay,
        lcd::LcdPanel,
    },
    widgets::status_bar,
};

const MAX_LOG_LINES: usize = 500;
const LCD_PANE_HEIGHT: u16 = 6;

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    /// A bridge request finished.
    Response {
        cmd: Command,
        result: Result<String, ClientError>,
    },
    CoverSaved(CoverFile),
    CoverFailed { url: String, error: String },
}

pub struct App {
    state: AppState,
    panel: PanelController,
    client: BackendClient,
    poll_interval: Duration,
    cover_path: PathBuf,
    tx: Option<mpsc::Sender<AppMessage>>,
    should_quit: bool,

    lcd: LcdPanel,
    cover_art: CoverArtPane,
    device_list: DeviceList,
    help_overlay: HelpOverlay,
}

impl App {
    pub fn new(client: BackendClient, display: &DisplayConfig, cover_path: PathBuf) -> Self {
        let panel = PanelController::new(display.max_len, client.base_url());
        let state = AppState {
            backend_url: client.base_url().to_string(),
            max_len: display.max_len,
            ..AppState::default()
        };
        Self {
            state,
            panel,
            client,
            poll_interval: Duration::from_millis(display.poll_interval_ms.max(100)),
            cover_path,
            tx: None,
            should_quit: false,
            lcd: LcdPanel::new(),
            cover_art: CoverArtPane::new(),
            device_list: DeviceList::new(),
            help_overlay: HelpOverlay::new(),
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(mut self) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        let (tx, mut rx) = mpsc::channel::<AppMessage>(256);
        self.tx = Some(tx.clone());
        self.push_log(format!("cast-remote started · {}", self.client.base_url()));

        // ── Background task: keyboard events ──────────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        let mut poll = tokio::time::interval(self.poll_interval);
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    let was_suspended = self.panel.polling_suspended();
                    needs_redraw = self.handle_message(msg).await;
                    if was_suspended && !self.panel.polling_suspended() {
                        debug!("scan finished, polling resumed");
                        poll.reset();
                    }
                }

                _ = poll.tick() => {
                    if !self.panel.polling_suspended() {
                        self.request(Command::GetStatus);
                    }
                }
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        info!("cast-remote exiting");

        Ok(())
    }

    /// Returns whether the frame needs redrawing.
    async fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                for action in self.handle_key(key) {
                    self.dispatch(action).await;
                }
            }
            AppMessage::Event(Event::Resize(_, _)) => {}
            AppMessage::Event(_) => return false,
            AppMessage::Response { cmd, result } => self.on_response(cmd, result),
            AppMessage::CoverSaved(file) => {
                debug!("cover saved: {} bytes → {}", file.bytes, file.path.display());
                self.state.cover_file = Some(file);
            }
            AppMessage::CoverFailed { url, error } => {
                warn!("cover fetch {} failed: {}", url, error);
            }
        }
        true
    }

    fn on_response(&mut self, cmd: Command, result: Result<String, ClientError>) {
        match (&cmd, result) {
            (Command::GetStatus, Ok(body)) => {
                self.state.reachable = true;
                if let Some(url) = self.panel.apply_status(&body) {
                    let now_playing = self
                        .panel
                        .view()
                        .record
                        .as_ref()
                        .map(|r| format!("now playing: {} - {}", r.artist, r.title));
                    if let Some(line) = now_playing {
                        self.push_log(line);
                    }
                    self.spawn_cover_fetch(url);
                }
            }
            (Command::GetStatus, Err(e)) => {
                debug!("status poll failed: {}", e);
                if self.state.reachable {
                    self.push_log(format!("bridge unreachable: {}", e));
                }
                self.state.reachable = false;
            }
            (Command::ScanDevices, Ok(body)) => {
                self.panel.finish_scan(&body);
                let found = match self.panel.scan() {
                    ScanState::Open(devices) => Some(devices.len()),
                    _ => None,
                };
                if let Some(n) = found {
                    self.push_log(format!("scan found {} device(s)", n));
                }
            }
            (Command::ScanDevices, Err(e)) => {
                warn!("scan failed: {}", e);
                self.panel.scan_failed();
                self.push_log("scan failed".to_string());
            }
            (_, result) => {
                match result {
                    Ok(_) => debug!("{} ok", cmd),
                    Err(e) => warn!("{} failed: {}", cmd, e),
                }
                if cmd.refreshes_status() {
                    self.request(Command::GetStatus);
                }
            }
        }
        self.sync_panel();
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }

        // Global keys
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return vec![Action::Quit];
            }
            KeyCode::Char('?') => return vec![Action::ToggleHelp],
            KeyCode::Char('q') if !self.help_overlay.visible => return vec![Action::Quit],
            _ => {}
        }

        // Help overlay captures all keys when visible
        if self.help_overlay.visible {
            return self.help_overlay.handle_key(key, &self.state);
        }

        if matches!(self.state.scan, ScanState::Open(_)) {
            let actions = self.device_list.handle_key(key, &self.state);
            if !actions.is_empty() {
                debug!("{:?} took {:?}", self.device_list.id(), key.code);
                return actions;
            }
            if matches!(
                key.code,
                KeyCode::Up | KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('k')
            ) {
                return vec![];
            }
        }

        self.lcd.handle_key(key, &self.state)
    }

    // ── Action dispatch ───────────────────────────────────────────────────────

    async fn dispatch(&mut self, action: Action) {
        let secondary: Vec<Action> = {
            let s = &self.state;
            let mut out = Vec::new();
            out.extend(self.lcd.on_action(&action, s));
            out.extend(self.cover_art.on_action(&action, s));
            out.extend(self.device_list.on_action(&action, s));
            out.extend(self.help_overlay.on_action(&action, s));
            out
        };

        self.apply_action(action);

        for a in secondary {
            self.apply_action(a);
        }
    }

    fn apply_action(&mut self, action: Action) {
        if action != Action::Noop {
            debug!("apply_action: {:?}", action);
        }
        match action {
            Action::Send(cmd) => {
                info!("sending {}", cmd);
                self.push_log(format!("→ {}", cmd));
                self.request(cmd);
            }
            Action::RefreshStatus => {
                if !self.panel.polling_suspended() {
                    self.request(Command::GetStatus);
                }
            }
            Action::ToggleScan => {
                if let Some(cmd) = self.panel.begin_scan() {
                    info!("scanning for devices");
                    self.push_log("scanning for devices…".to_string());
                    self.request(cmd);
                }
            }
            Action::SelectDevice(index) => match self.panel.select_device(index) {
                Some(cmd) => {
                    self.push_log(format!("→ {}", cmd));
                    self.request(cmd);
                }
                None => self.push_log(format!("no device with index {}", index)),
            },
            Action::CloseDevices => self.panel.close_scan(),
            Action::Quit => self.should_quit = true,
            Action::ToggleHelp | Action::Noop => {}
        }
        self.sync_panel();
    }

    // ── Background requests ───────────────────────────────────────────────────

    fn request(&self, cmd: Command) {
        let Some(tx) = self.tx.clone() else {
            return;
        };
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client.send(cmd).await;
            let _ = tx.send(AppMessage::Response { cmd, result }).await;
        });
    }

    fn spawn_cover_fetch(&self, url: String) {
        let Some(tx) = self.tx.clone() else {
            return;
        };
        let client = self.client.clone();
        let path = self.cover_path.clone();
        tokio::spawn(async move {
            let msg = match save_cover(&client, &url, path).await {
                Ok(file) => AppMessage::CoverSaved(file),
                Err(e) => AppMessage::CoverFailed {
                    url,
                    error: e.to_string(),
                },
            };
            let _ = tx.send(msg).await;
        });
    }

    // ── State sync ────────────────────────────────────────────────────────────

    fn sync_panel(&mut self) {
        self.state.view = self.panel.view().clone();
        self.state.cover = self.panel.cover().clone();
        self.state.scan = self.panel.scan().clone();
    }

    fn push_log(&mut self, msg: String) {
        self.state.logs.push(msg);
        if self.state.logs.len() > MAX_LOG_LINES {
            self.state.logs.remove(0);
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut ratatui::Frame) {
        use crate::theme::C_BG;
        use ratatui::widgets::Block;
        let area = frame.area();

        frame.render_widget(
            Block::default().style(ratatui::style::Style::default().bg(C_BG)),
            area,
        );

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(LCD_PANE_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        self.lcd.draw(frame, outer[0], &self.state);
        self.cover_art.draw(frame, outer[1], &self.state);
        status_bar::draw_log_bar(frame, outer[2], self.state.last_log(), self.state.reachable);
        status_bar::draw_keys_bar(
            frame,
            outer[3],
            matches!(self.state.scan, ScanState::Open(_)),
        );

        self.device_list.draw(frame, area, &self.state);
        self.help_overlay.draw(frame, area, &self.state);
    }
}

/// Download the cover and write it to `path`.
async fn save_cover(client: &BackendClient, url: &str, path: PathBuf) -> anyhow::Result<CoverFile> {
    let bytes = client.fetch_cover(url).await?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, &bytes).await?;
    Ok(CoverFile {
        url: url.to_string(),
        bytes: bytes.len(),
        path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cast_proto::panel::CoverArt;
    use cast_proto::protocol::DeviceEntry;

    const PLAYING: &str =
        "1\nDen\n50%\nNina Simone\nSinnerman\nPastel Blues (Remastered)\n01:23\n10:20\n0";

    fn app() -> App {
        let client = BackendClient::new("http://127.0.0.1:9", Duration::from_millis(50))
            .expect("client");
        App::new(client, &DisplayConfig::default(), std::env::temp_dir().join("cover.jpg"))
    }

    fn press(app: &mut App, code: KeyCode) -> Vec<Action> {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn status_response_fills_the_view() {
        let mut app = app();
        app.on_response(Command::GetStatus, Ok(PLAYING.to_string()));

        assert!(app.state.reachable);
        assert!(app.state.view.connected);
        assert!(matches!(app.state.cover, CoverArt::Shown { .. }));
        assert_eq!(app.state.view.header.visible_text().chars().count(), 39);
    }

    #[tokio::test]
    async fn playback_keys_become_send_actions() {
        let mut app = app();
        assert_eq!(press(&mut app, KeyCode::Char(' ')), vec![Action::Send(Command::TogglePause)]);
        assert_eq!(press(&mut app, KeyCode::Char('q')), vec![Action::Quit]);
        assert_eq!(press(&mut app, KeyCode::Char('?')), vec![Action::ToggleHelp]);
    }

    #[tokio::test]
    async fn help_overlay_swallows_quit() {
        let mut app = app();
        app.dispatch(Action::ToggleHelp).await;
        assert!(app.help_overlay.visible);
        assert_eq!(press(&mut app, KeyCode::Char('q')), vec![Action::Noop]);
        assert!(!app.help_overlay.visible);
        assert!(!app.should_quit);
    }

    #[tokio::test]
    async fn scan_flow_routes_keys_to_the_device_list() {
        let mut app = app();
        app.dispatch(Action::ToggleScan).await;
        assert!(app.panel.polling_suspended());
        assert_eq!(app.state.scan, ScanState::Scanning);

        app.on_response(Command::ScanDevices, Ok("0,Living Room\n1,Kitchen\n".to_string()));
        assert_eq!(
            app.state.scan,
            ScanState::Open(vec![
                DeviceEntry { index: 0, name: "Living Room".into() },
                DeviceEntry { index: 1, name: "Kitchen".into() },
            ])
        );

        assert!(press(&mut app, KeyCode::Down).is_empty());
        let actions = press(&mut app, KeyCode::Enter);
        assert_eq!(actions, vec![Action::SelectDevice(1)]);
        for a in actions {
            app.dispatch(a).await;
        }
        assert_eq!(app.state.scan, ScanState::Closed);
    }

    #[tokio::test]
    async fn failed_poll_marks_bridge_unreachable() {
        let mut app = app();
        app.on_response(Command::GetStatus, Ok(PLAYING.to_string()));
        let client = BackendClient::new("http://127.0.0.1:9", Duration::from_millis(50))
            .expect("client");
        let err = client.send(Command::GetStatus).await.expect_err("nothing listens on :9");
        app.on_response(Command::GetStatus, Err(err));

        assert!(!app.state.reachable);
        assert!(app.state.view.connected, "last good view is kept");
    }
}
