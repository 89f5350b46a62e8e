pub mod client;
pub mod config;
pub mod display;
pub mod panel;
pub mod platform;
pub mod protocol;
