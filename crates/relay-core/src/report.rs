//! HTML report output.
//!
//! Reports come from the relay service and are trusted as-is: the document is
//! written verbatim, never sanitized.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Writes `html` to a new `.html` file in the temp directory and returns its path.
///
/// The file outlives the process so the browser can still read it.
pub fn write_temp_report(html: &str) -> Result<PathBuf> {
    let mut file = tempfile::Builder::new()
        .prefix("relay-report-")
        .suffix(".html")
        .tempfile()
        .context("create report file")?;
    file.write_all(html.as_bytes())
        .context("write report file")?;
    let (_, path) = file.keep().context("persist report file")?;
    Ok(path)
}

/// Writes the report to a fresh file and opens it with the system browser.
pub fn open_report(html: &str) -> Result<PathBuf> {
    let path = write_temp_report(html)?;
    tracing::info!(path = %path.display(), "opening HTML report");
    open::that(&path).with_context(|| format!("open {}", path.display()))?;
    Ok(path)
}

/// Writes the report to `path`, creating parent directories as needed.
pub fn save_report(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    fs::write(path, html).with_context(|| format!("write report {}", path.display()))?;
    tracing::info!(path = %path.display(), "saved HTML report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_temp_report_is_verbatim_html_file() {
        let html = "<html><script>alert(1)</script></html>";
        let path = write_temp_report(html).unwrap();

        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("html"));
        assert_eq!(fs::read_to_string(&path).unwrap(), html);
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_save_report_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/nested/report.html");
        save_report(&path, "<h1>r</h1>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<h1>r</h1>");
    }
}
