mod action;
mod app;
mod app_state;
mod component;
mod components;
mod theme;
mod widgets;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use cast_proto::client::BackendClient;
use cast_proto::config::Config;
use cast_proto::platform;

/// Terminal remote control for a cast bridge.
#[derive(Parser, Debug)]
#[command(name = "cast-remote", version, about)]
struct Args {
    /// Config file (default: <config_dir>/cast-remote/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bridge address; overrides the address file and the config
    #[arg(short, long)]
    address: Option<String>,

    /// Bridge port
    #[arg(short, long)]
    port: Option<u16>,

    /// Host the panel is served from; `localhost` keeps requests on localhost
    #[arg(long)]
    origin_host: Option<String>,

    /// Generated script holding `const ip_address = '...';`
    #[arg(long)]
    address_file: Option<PathBuf>,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        let backend = &mut config.backend;
        if let Some(path) = &self.address_file {
            backend.address_file = Some(path.clone());
        }
        if let Some(address) = &self.address {
            backend.address = address.clone();
            backend.address_file = None;
        }
        if let Some(port) = self.port {
            backend.port = port;
        }
        if let Some(host) = &self.origin_host {
            backend.origin_host = Some(host.clone());
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = platform::log_path();
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; keep HTTP client internals quiet by default.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("cast-remote log: {}", log_path.display());
    tracing::info!("cast-remote starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!("config load failed, using defaults: {}", e);
            Config::default()
        }),
    };
    args.apply(&mut config);

    let client = BackendClient::from_config(&config.backend)?;
    tracing::info!("bridge at {}", client.base_url());

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(client, &config.display, platform::cover_path());
    app.run().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_address_beats_address_file() {
        let mut config = Config::default();
        config.backend.address_file = Some(PathBuf::from("/srv/cast/ip_address.js"));
        let args = Args::parse_from(["cast-remote", "--address", "10.0.0.7", "-p", "9000"]);
        args.apply(&mut config);

        assert_eq!(config.backend.address, "10.0.0.7");
        assert_eq!(config.backend.address_file, None);
        assert_eq!(config.backend.base_url(), "http://10.0.0.7:9000");
    }

    #[test]
    fn origin_host_localhost_is_honoured() {
        let mut config = Config::default();
        let args = Args::parse_from(["cast-remote", "--origin-host", "localhost"]);
        args.apply(&mut config);
        assert_eq!(config.backend.base_url(), "http://localhost:8000");
    }
}
