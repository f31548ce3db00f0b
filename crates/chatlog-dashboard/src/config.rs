use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, DashboardResult};

const WIDTH_ENV: &str = "CHATLOG_DASHBOARD_WIDTH";
const HEIGHT_ENV: &str = "CHATLOG_DASHBOARD_HEIGHT";
const BINS_ENV: &str = "CHATLOG_HISTOGRAM_BINS";

/// Panels use palette slots 0 through 4.
const MIN_PALETTE_LEN: usize = 5;

/// Styling for one dashboard render. Passed explicitly to the renderer; there
/// is no process-wide theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub width: u32,
    pub height: u32,
    pub palette: Vec<String>,
    pub histogram_bins: usize,
    pub scatter_alpha: f64,
    pub background: String,
    pub plot_background: String,
    pub grid_color: String,
    pub text_color: String,
    pub font_family: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            width: 1500,
            height: 1200,
            palette: [
                "#f77189", "#d58c32", "#a4a031", "#50b131", "#34ae91", "#37abb5", "#3ba3ec",
                "#bb83f4",
            ]
            .iter()
            .map(|color| color.to_string())
            .collect(),
            histogram_bins: 30,
            scatter_alpha: 0.5,
            background: "#ffffff".to_string(),
            plot_background: "#eaeaf2".to_string(),
            grid_color: "#ffffff".to_string(),
            text_color: "#262626".to_string(),
            font_family: "DejaVu Sans, Arial, sans-serif".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Reads the TOML file when one is given, falls back to defaults
    /// otherwise, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> DashboardResult<Self> {
        let mut config = match path {
            Some(path) => {
                let content =
                    std::fs::read_to_string(path).map_err(|source| DashboardError::ReadConfig {
                        path: path.to_path_buf(),
                        source,
                    })?;
                log::debug!("Loaded dashboard config from {}", path.display());
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> DashboardResult<Self> {
        Ok(toml::from_str::<Self>(content)?)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(width) = parse_override(&lookup, WIDTH_ENV) {
            self.width = width;
        }
        if let Some(height) = parse_override(&lookup, HEIGHT_ENV) {
            self.height = height;
        }
        if let Some(bins) = parse_override(&lookup, BINS_ENV) {
            self.histogram_bins = bins;
        }
    }

    pub fn validate(&self) -> DashboardResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(DashboardError::InvalidConfig(format!(
                "figure size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.histogram_bins == 0 {
            return Err(DashboardError::InvalidConfig(
                "histogram_bins must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.scatter_alpha) {
            return Err(DashboardError::InvalidConfig(format!(
                "scatter_alpha must be within 0..=1, got {}",
                self.scatter_alpha
            )));
        }
        if self.palette.len() < MIN_PALETTE_LEN {
            return Err(DashboardError::InvalidConfig(format!(
                "palette needs at least {MIN_PALETTE_LEN} colors, got {}",
                self.palette.len()
            )));
        }
        Ok(())
    }

    /// Palette colour for `slot`, wrapping around; an empty palette falls
    /// back to the text colour.
    pub(crate) fn color(&self, slot: usize) -> &str {
        if self.palette.is_empty() {
            return &self.text_color;
        }
        &self.palette[slot % self.palette.len()]
    }
}

fn parse_override<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("Ignoring {key}={raw:?}: not a valid number");
            None
        }
    }
}
