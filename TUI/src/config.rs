//! Application configuration and constants.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::controller::ControllerOptions;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const API_KEY_ENV: &str = "API_KEY";

pub struct Config {
    /// Main loop tick rate in milliseconds (target 60 FPS = ~16ms)
    pub tick_rate_ms: u64,

    /// How many ticks to show status messages (180 = ~3s at 60fps)
    pub status_timeout_ticks: u64,

    /// Modulo for animation frame counter
    pub animation_frame_mod: usize,

    /// Maximum entries kept in the activity log
    pub activity_log_capacity: usize,

    /// Width of the ring panel in characters
    pub ring_panel_width: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate_ms: 16,
            status_timeout_ticks: 180,
            animation_frame_mod: 360,
            activity_log_capacity: 50,
            ring_panel_width: 44,
        }
    }
}

/// Connection settings for the Gemini checklist backend.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// `None` means requests may wait indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "defense-tui",
    version,
    about = "Explore the defense-in-depth model and generate per-layer security checklists"
)]
pub struct Cli {
    /// Run without a checklist backend
    #[arg(short, long)]
    pub offline: bool,

    /// Gemini API key (falls back to the API_KEY environment variable)
    #[arg(long)]
    pub api_key: Option<String>,

    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Abort checklist requests after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    #[arg(long, default_value = "defense-tui.log")]
    pub log_file: PathBuf,

    /// Drop checklist results that arrive after the selection has moved on
    #[arg(long)]
    pub discard_stale: bool,
}

impl Cli {
    pub fn gemini_config(&self) -> GeminiConfig {
        let api_key = self
            .api_key
            .clone()
            .or_else(|| env::var(API_KEY_ENV).ok())
            .unwrap_or_default();

        GeminiConfig {
            api_key,
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            request_timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            discard_stale_results: self.discard_stale,
        }
    }
}

/// Global commands list
pub const COMMANDS: &[(&str, &str)] = &[
    ("/select", "Select a layer by id"),
    ("/deselect", "Clear the selection"),
    ("/generate", "Generate a checklist"),
    ("/copy", "Copy checklist to clipboard"),
    ("/activity", "Toggle activity log"),
    ("/help", "Show available commands"),
    ("/quit", "Exit"),
];
