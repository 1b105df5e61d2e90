//! Per-file line counts for a source tree, filtered by language extension.

use std::path::{Path, PathBuf};

use serde::Serialize;
use sweep_core::{SweepError, SweepResult};
use walkdir::WalkDir;

use crate::tree::{ensure_dir_all, EnsureOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineCount {
    pub file_name: String,
    #[serde(rename = "path")]
    pub dir: String,
    #[serde(rename = "line_count")]
    pub lines: usize,
}

/// Walk `root` and count lines of every file whose extension is listed.
/// Extensions are given without the leading dot.
pub fn count_lines(root: &Path, extensions: &[String]) -> SweepResult<Vec<LineCount>> {
    let mut counts = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            SweepError::io(path, std::io::Error::other(e.to_string()))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e == ext));
        if !matches {
            continue;
        }

        let lines = count_file_lines(path)?;
        tracing::debug!(lines, "counted {}", path.display());
        counts.push(LineCount {
            file_name: entry.file_name().to_string_lossy().into_owned(),
            dir: path
                .parent()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            lines,
        });
    }

    Ok(counts)
}

/// Newline-terminated lines, plus a final line without a newline.
pub fn count_file_lines(path: &Path) -> SweepResult<usize> {
    let bytes = std::fs::read(path).map_err(|e| SweepError::io(path, e))?;
    Ok(count_newlines(&bytes))
}

fn count_newlines(bytes: &[u8]) -> usize {
    let newlines = bytes.iter().filter(|&&b| b == b'\n').count();
    match bytes.last() {
        Some(&b'\n') | None => newlines,
        Some(_) => newlines + 1,
    }
}

/// Extensions for `lang` from a file with lines like `c=['.c', '.h']`.
pub fn parse_extensions_file(text: &str, lang: &str) -> Option<Vec<String>> {
    text.lines().find_map(|line| {
        let (key, list) = line.split_once('=')?;
        if key.trim() != lang {
            return None;
        }
        let normalized = list.replace('"', "'");
        let exts = normalized
            .split('\'')
            .skip(1)
            .step_by(2)
            .map(|e| e.trim().trim_start_matches('.').to_string())
            .filter(|e| !e.is_empty())
            .collect();
        Some(exts)
    })
}

/// Last non-empty component of `root`, used to name the report directory.
pub fn project_name(root: &Path) -> Option<String> {
    root.components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .last()
}

/// Write `report_<project>/report_<lang>.csv` under `out_dir`.
pub fn write_report(
    out_dir: &Path,
    project: &str,
    lang: &str,
    counts: &[LineCount],
) -> SweepResult<PathBuf> {
    let dir = out_dir.join(format!("report_{project}"));
    if let EnsureOutcome::Failed(e) = ensure_dir_all(&dir) {
        return Err(SweepError::io(dir, e));
    }

    let path = dir.join(format!("report_{lang}.csv"));
    let table_err = |e: csv::Error| SweepError::Table(format!("{}: {e}", path.display()));
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .map_err(table_err)?;
    wtr.write_record(["file_name", "path", "line_count"])
        .map_err(table_err)?;
    for count in counts {
        wtr.serialize(count).map_err(table_err)?;
    }
    wtr.flush().map_err(|e| SweepError::io(&path, e))?;
    Ok(path)
}
