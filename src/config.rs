use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::audio::codec::SampleEncoding;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "NEUROGRAM_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "neurogram.json";

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

/// Which dataset columns the finder and the functional-data search ask about.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Columns {
    pub mediator: String,
    pub responder: String,
    pub administration_method: String,
    pub date_recorded: String,
    pub question: String,
    pub success: String,
    pub researcher: String,
    /// Card title in the results list; falls back to "Recording N" when missing.
    pub title: String,
    /// Substring identifying the folder-link column.
    pub folder_link_marker: String,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            mediator: "Mediator".to_owned(),
            responder: "Responder".to_owned(),
            administration_method: "Administration Method".to_owned(),
            date_recorded: "Date Recorded".to_owned(),
            question: "Question".to_owned(),
            success: "Success".to_owned(),
            researcher: "Researcher".to_owned(),
            title: "Subject ID".to_owned(),
            folder_link_marker: "GCS Folder".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// The dataset file; loaded at startup and overwritten on save.
    pub csv_path: PathBuf,
    /// Columns never shown in results, the grid, or the add form.
    pub hidden_columns: Vec<String>,
    /// Columns always parsed as dates, whatever their cells look like.
    pub date_columns: Vec<String>,
    pub columns: Columns,
    pub default_segment_seconds: f64,
    pub default_carrier_hz: f64,
    pub output_encoding: SampleEncoding,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("Neurogram_Chat_With_GCS_Folder.csv"),
            hidden_columns: ["Id", "Start time", "Completion time", "Email", "Name"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            date_columns: vec!["Date Recorded".to_owned()],
            columns: Columns::default(),
            default_segment_seconds: 0.05,
            default_carrier_hz: 15_000.0,
            output_encoding: SampleEncoding::default(),
        }
    }
}

impl AppConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing config JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Config from `$NEUROGRAM_CONFIG`, else `./neurogram.json`, else defaults.
    /// A file that exists but cannot be read is logged and ignored.
    pub fn discover() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring config: {e:#}");
                Self::default()
            }
        }
    }

    pub fn is_hidden(&self, column: &str) -> bool {
        self.hidden_columns.iter().any(|c| c == column)
    }
}
