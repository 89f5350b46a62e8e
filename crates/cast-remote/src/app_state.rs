//! AppState: shared read-only data passed to all components during render/event.
//!
//! Components read this for panel state, but never mutate it.
//! The App event-loop is the only thing that writes to AppState.

use std::path::PathBuf;

use cast_proto::panel::{CoverArt, PanelView, ScanState};

/// Outcome of the last cover download.
#[derive(Clone, Debug)]
pub struct CoverFile {
    pub url: String,
    pub bytes: usize,
    pub path: PathBuf,
}

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub backend_url: String,
    pub max_len: usize,
    pub view: PanelView,
    pub cover: CoverArt,
    pub cover_file: Option<CoverFile>,
    pub scan: ScanState,
    /// Whether the last status poll reached the bridge at all.
    pub reachable: bool,
    pub logs: Vec<String>,
}

impl AppState {
    pub fn last_log(&self) -> Option<&str> {
        self.logs.last().map(String::as_str)
    }
}
