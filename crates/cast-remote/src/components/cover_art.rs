//! CoverArt component: what the bridge last served as `cover.jpg`.
//!
//! Terminal cells can't show the image, so the pane reports the cache-busted
//! URL and where the downloaded copy lives. With no device connected it shows
//! a static noise placeholder.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use cast_proto::panel::CoverArt;

use crate::{
    action::ComponentId,
    app_state::AppState,
    component::Component,
    theme::{style_muted, C_PRIMARY, C_SECONDARY},
    widgets::pane_chrome::pane_chrome,
};

const NOISE: [char; 4] = ['░', '▒', '▓', ' '];

pub struct CoverArtPane;

impl CoverArtPane {
    pub fn new() -> Self {
        Self
    }
}

/// Deterministic noise rows for the placeholder.
fn noise_line(row: u16, width: u16) -> String {
    (0..width)
        .map(|col| {
            let h = (row as u32)
                .wrapping_mul(2_654_435_761)
                .wrapping_add((col as u32).wrapping_mul(40_503));
            NOISE[(h >> 13) as usize % NOISE.len()]
        })
        .collect()
}

fn human_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

impl Component for CoverArtPane {
    fn id(&self) -> ComponentId {
        ComponentId::CoverArt
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        if area.height == 0 {
            return;
        }
        let block = pane_chrome("cover", false, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines: Vec<Line> = match &state.cover {
            CoverArt::Hidden => (0..inner.height)
                .map(|row| Line::from(Span::styled(noise_line(row, inner.width), style_muted())))
                .collect(),
            CoverArt::Shown { url } => {
                let mut lines = vec![
                    Line::from(Span::styled("♪ cover art", Style::default().fg(C_PRIMARY))),
                    Line::from(Span::styled(url.clone(), Style::default().fg(C_SECONDARY))),
                ];
                match state.cover_file.as_ref().filter(|f| &f.url == url) {
                    Some(file) => {
                        lines.push(Line::from(Span::styled(
                            format!("{} → {}", human_size(file.bytes), file.path.display()),
                            Style::default().fg(C_SECONDARY),
                        )));
                    }
                    None => lines.push(Line::from(Span::styled("fetching…", style_muted()))),
                }
                lines
            }
        };

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_stable_and_sized() {
        assert_eq!(noise_line(3, 20), noise_line(3, 20));
        assert_eq!(noise_line(0, 17).chars().count(), 17);
    }

    #[test]
    fn sizes_are_human_readable() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KiB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0 MiB");
    }
}
