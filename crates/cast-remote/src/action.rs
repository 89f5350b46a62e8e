//! Action enum: all user-initiated intents and internal events.

use cast_proto::protocol::Command;

/// Unique identifier for a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Lcd,
    CoverArt,
    DeviceList,
    HelpOverlay,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Player ───────────────────────────────────────────────────────────────
    Send(Command),
    RefreshStatus,

    // ── Device scan ──────────────────────────────────────────────────────────
    ToggleScan,
    SelectDevice(usize), // bridge-side device index
    CloseDevices,

    // ── UI ───────────────────────────────────────────────────────────────────
    ToggleHelp,
    Quit,
    Noop,
}
