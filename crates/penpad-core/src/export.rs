//! Export of the path collection as an SVG document or a JSON dump.

use crate::config::ExportConfig;
use crate::stroke::StrokePath;
use std::borrow::Cow;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Escape text for a double-quoted XML attribute.
fn escape_attr(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }
    let mut escaped = String::with_capacity(value.len() + 16);
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Render the paths into a fixed-size SVG document.
///
/// One filled `<path>` per committed path, in collection order, over a
/// background rectangle.
pub fn to_svg(paths: &[Arc<StrokePath>], config: &ExportConfig) -> String {
    let mut svg = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = config.width,
        h = config.height
    );
    let _ = writeln!(
        svg,
        r#"  <rect width="{}" height="{}" fill="{}" fill-opacity="{}"/>"#,
        config.width,
        config.height,
        config.background.to_rgb_hex(),
        config.background.alpha_f64()
    );
    for path in paths {
        if path.path_data.is_empty() {
            continue;
        }
        let _ = writeln!(
            svg,
            r#"  <path d="{}" fill="{}" fill-opacity="{}"/>"#,
            escape_attr(&path.path_data),
            path.color.to_rgb_hex(),
            path.opacity * path.color.alpha_f64()
        );
    }
    svg.push_str("</svg>\n");
    svg
}

/// Write an SVG export to `path`.
pub fn write_svg(path: &Path, paths: &[Arc<StrokePath>], config: &ExportConfig) -> ExportResult<()> {
    let svg = to_svg(paths, config);
    fs::write(path, svg)
        .map_err(|e| ExportError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
    log::info!("Exported {} paths to {}", paths.len(), path.display());
    Ok(())
}

/// Serialize the path collection to pretty JSON.
pub fn paths_to_json(paths: &[Arc<StrokePath>]) -> ExportResult<String> {
    let plain: Vec<&StrokePath> = paths.iter().map(Arc::as_ref).collect();
    Ok(serde_json::to_string_pretty(&plain)?)
}

/// Parse a path collection previously produced by [`paths_to_json`].
pub fn paths_from_json(json: &str) -> ExportResult<Vec<StrokePath>> {
    Ok(serde_json::from_str(json)?)
}
