//! Output path resolution

use std::path::{Path, PathBuf};

/// Usage error raised when no output path can be resolved
pub const OUT_REQUIRED: &str = "--out is required unless --inplace is specified";

/// Resolve where the final workbook is written.
///
/// `--inplace` targets the template; a differing `--out` is ignored with a
/// warning. Without `--inplace`, `--out` is required.
pub fn resolve_output(
    out: Option<&Path>,
    inplace: bool,
    template: &Path,
) -> Result<PathBuf, &'static str> {
    let path = if inplace {
        if let Some(out) = out {
            if absolute(out) != absolute(template) {
                tracing::warn!("--inplace specified: ignoring --out and writing to template path");
            }
        }
        template.to_path_buf()
    } else {
        out.ok_or(OUT_REQUIRED)?.to_path_buf()
    };
    Ok(with_xlsx_extension(path))
}

/// Replace any extension other than `.xlsx` (case-insensitive)
pub fn with_xlsx_extension(path: PathBuf) -> PathBuf {
    let is_xlsx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
    if is_xlsx {
        path
    } else {
        path.with_extension("xlsx")
    }
}

/// Create the parent directory of `path` if needed
pub fn ensure_output_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

pub fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
