pub mod charts;
pub mod config;
pub mod error;
pub mod render;
pub mod svg;

use std::fs;
use std::path::{Path, PathBuf};

use chatlog_metrics::VisualizationBundle;

pub use charts::{histogram, pie_slices, HistogramBin, PieSlice};
pub use config::DashboardConfig;
pub use error::{DashboardError, DashboardResult};
pub use render::render_dashboard;

/// Renders the dashboard and writes it to `path`. The file only appears once
/// it is complete; on failure nothing is left at `path`.
pub fn save_dashboard(
    bundle: &VisualizationBundle,
    config: &DashboardConfig,
    path: impl AsRef<Path>,
) -> DashboardResult<()> {
    let path = path.as_ref();
    config.validate()?;
    let document = render_dashboard(bundle, config);

    let write_error = |source| DashboardError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }

    let staging = staging_path(path);
    if let Err(source) = fs::write(&staging, document).and_then(|_| fs::rename(&staging, path)) {
        let _ = fs::remove_file(&staging);
        return Err(write_error(source));
    }

    log::debug!("Dashboard written to {}", path.display());
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dashboard".to_string());
    path.with_file_name(format!(".{name}.partial"))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::staging_path;

    #[test]
    fn staging_path_is_a_hidden_sibling() {
        assert_eq!(
            staging_path(Path::new("output/dash.svg")),
            Path::new("output/.dash.svg.partial")
        );
    }
}
