use crate::errors::{AppError, AppResult};
use crate::models::AppSettings;
use anyhow::Context;
use std::path::Path;

impl AppSettings {
    /// Replaces values the pipeline cannot work with by their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.row_height.is_finite() || self.row_height <= 0.0 {
            tracing::warn!(row_height = self.row_height, "invalid row height; using default");
            self.row_height = defaults.row_height;
        }
        if !self.viewport_height.is_finite() || self.viewport_height < 0.0 {
            tracing::warn!(viewport_height = self.viewport_height, "invalid viewport height; using default");
            self.viewport_height = defaults.viewport_height;
        }
        if let Some(end) = self.timeline_end {
            if end <= self.timeline_start {
                tracing::warn!(start = %self.timeline_start, end = %end, "timeline end precedes start; using load time");
                self.timeline_end = None;
            }
        }
        self
    }
}

pub fn parse_settings(input: &str, yaml: bool) -> AppResult<AppSettings> {
    let settings: AppSettings = if yaml {
        serde_yaml::from_str(input)?
    } else {
        serde_json::from_str(input).map_err(|error| AppError::Config(error.to_string()))?
    };
    Ok(settings.sanitized())
}

/// Loads settings from a YAML or JSON file, chosen by extension. A missing
/// file yields the defaults.
pub fn load_settings(path: &Path) -> AppResult<AppSettings> {
    if !path.exists() {
        tracing::info!(path = %path.to_string_lossy(), "settings file not found; using defaults");
        return Ok(AppSettings::default());
    }

    let input = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read settings {}", path.display()))
        .map_err(|error| AppError::Io(format!("{:#}", error)))?;
    let yaml = !matches!(
        path.extension().and_then(|extension| extension.to_str()),
        Some("json")
    );
    parse_settings(&input, yaml)
}
