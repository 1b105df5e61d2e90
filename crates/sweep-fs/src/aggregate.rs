//! Walk a result tree and write one summary table per N directory.
//!
//! The tree must not change while this runs; aggregating while a sweep is
//! still writing gives undefined tables.

use std::path::{Path, PathBuf};

use sweep_core::layout;
use sweep_core::{extract_duration, RunRecord, RunRow, SweepError, SweepResult, DURATION_MARKER};

pub const DEFAULT_SUMMARY_FILE: &str = "raw.csv";

const HEADER: [&str; 4] = ["N", "Nx", "nrun", "runtime"];

/// What to do with an entry whose name does not follow the tree grammar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MalformedPolicy {
    #[default]
    Abort,
    Skip,
}

#[derive(Debug, Clone)]
pub struct AggregateOptions {
    pub marker: String,
    pub summary_file: String,
    pub malformed: MalformedPolicy,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            marker: DURATION_MARKER.into(),
            summary_file: DEFAULT_SUMMARY_FILE.into(),
            malformed: MalformedPolicy::Abort,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryTable {
    pub path: PathBuf,
    pub rows: usize,
    pub unset: usize,
}

#[derive(Debug, Default)]
pub struct AggregateReport {
    pub tables: Vec<SummaryTable>,
    pub skipped: Vec<PathBuf>,
}

pub fn aggregate_tree(root: &Path, opts: &AggregateOptions) -> SweepResult<AggregateReport> {
    let mut report = AggregateReport::default();

    for (name, n_dir) in list(root, EntryKind::Dir)? {
        let n = match layout::parse_n_dir_name(&name) {
            Ok(n) => n,
            Err(e) => {
                skip_or_abort(opts.malformed, &n_dir, e, &mut report.skipped)?;
                continue;
            }
        };
        tracing::info!("aggregating {}", n_dir.display());
        let records = collect_n_dir(&n_dir, n, opts, &mut report.skipped)?;

        let path = n_dir.join(&opts.summary_file);
        write_summary(&path, &records)?;
        let table = SummaryTable {
            path,
            rows: records.len(),
            unset: records.iter().filter(|r| r.duration.is_none()).count(),
        };
        tracing::info!(rows = table.rows, unset = table.unset, "wrote {}", table.path.display());
        report.tables.push(table);
    }

    Ok(report)
}

/// Records from every problem directory under the directory of `n`, in
/// traversal order. A problem directory naming another N is an error under
/// either policy, since its rows would land in the wrong table.
pub fn collect_n_dir(
    n_dir: &Path,
    n: u64,
    opts: &AggregateOptions,
    skipped: &mut Vec<PathBuf>,
) -> SweepResult<Vec<RunRecord>> {
    let mut records = Vec::new();

    for (name, problem_dir) in list(n_dir, EntryKind::Dir)? {
        let size = match layout::parse_problem_dir_name(&name) {
            Ok(size) => size,
            Err(e) => {
                skip_or_abort(opts.malformed, &problem_dir, e, skipped)?;
                continue;
            }
        };
        if size.n != n {
            return Err(SweepError::NameParse {
                name,
                expected: "N<N>_Nx<Nx> with the N of its parent directory",
            });
        }

        for (file_name, file) in list(&problem_dir, EntryKind::File)? {
            let run_index = match layout::parse_run_file_name(&file_name) {
                Ok(r) => r,
                Err(e) => {
                    skip_or_abort(opts.malformed, &file, e, skipped)?;
                    continue;
                }
            };
            let duration = read_duration(&file, &opts.marker)?;
            records.push(RunRecord {
                n: size.n,
                nx: size.nx,
                run_index,
                duration,
            });
        }
    }

    Ok(records)
}

pub fn read_duration(path: &Path, marker: &str) -> SweepResult<Option<f64>> {
    let bytes = std::fs::read(path).map_err(|e| SweepError::io(path, e))?;
    let duration = extract_duration(&String::from_utf8_lossy(&bytes), marker);
    if duration.is_none() {
        tracing::warn!("no duration in {}", path.display());
    }
    Ok(duration)
}

/// Header is always written, even for an N directory with no runs yet.
pub fn write_summary(path: &Path, records: &[RunRecord]) -> SweepResult<()> {
    let table_err = |e: csv::Error| SweepError::Table(format!("{}: {e}", path.display()));

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(table_err)?;
    wtr.write_record(HEADER).map_err(table_err)?;
    for record in records {
        wtr.serialize(RunRow::from(record)).map_err(table_err)?;
    }
    wtr.flush().map_err(|e| SweepError::io(path, e))
}

fn skip_or_abort(
    policy: MalformedPolicy,
    path: &Path,
    err: SweepError,
    skipped: &mut Vec<PathBuf>,
) -> SweepResult<()> {
    match policy {
        MalformedPolicy::Abort => Err(err),
        MalformedPolicy::Skip => {
            tracing::warn!("skipping {}: {err}", path.display());
            skipped.push(path.to_path_buf());
            Ok(())
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Dir,
    File,
}

/// Non-hidden entries of one kind, sorted by name.
fn list(dir: &Path, kind: EntryKind) -> SweepResult<Vec<(String, PathBuf)>> {
    let io_err = |e| SweepError::io(dir, e);
    let mut out = Vec::new();

    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let is_dir = entry.path().is_dir();
        match kind {
            EntryKind::Dir if is_dir => out.push((name, entry.path())),
            EntryKind::File if !is_dir => out.push((name, entry.path())),
            _ => tracing::debug!("ignoring {}", entry.path().display()),
        }
    }

    out.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweep_core::ProblemSize;

    fn write_run(root: &Path, n: u64, nx: u64, run: u32, body: &str) {
        let path = layout::run_file(root, ProblemSize::new(n, nx), run);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut rdr = csv::Reader::from_path(path).unwrap();
        let header: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(header, vec!["N", "Nx", "nrun", "runtime"]);
        rdr.records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect()
    }

    #[test]
    fn test_single_cell_tree_yields_two_rows() {
        let tmp = tempfile::tempdir().unwrap();
        write_run(tmp.path(), 1024, 1024, 1, "   1.234567 seconds time elapsed\n");
        write_run(tmp.path(), 1024, 1024, 2, "   2.5 seconds time elapsed\n");

        let report = aggregate_tree(tmp.path(), &AggregateOptions::default()).unwrap();
        assert_eq!(report.tables.len(), 1);
        assert_eq!(report.tables[0].rows, 2);
        assert_eq!(report.tables[0].path, tmp.path().join("N1024").join("raw.csv"));

        let rows = read_rows(&report.tables[0].path);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r[0] == "1024" && r[1] == "1024"));
        assert_eq!(rows[0][2], "1");
        assert_eq!(rows[0][3].parse::<f64>().unwrap(), 1.234567);
        assert_eq!(rows[1][3].parse::<f64>().unwrap(), 2.5);
    }

    #[test]
    fn test_missing_marker_records_sentinel() {
        let tmp = tempfile::tempdir().unwrap();
        write_run(tmp.path(), 2048, 1024, 1, "perf crashed\n");

        let report = aggregate_tree(tmp.path(), &AggregateOptions::default()).unwrap();
        assert_eq!(report.tables[0].unset, 1);
        let rows = read_rows(&report.tables[0].path);
        assert_eq!(rows[0][3].parse::<f64>().unwrap(), -1.0);
    }

    #[test]
    fn test_one_table_per_n_dir() {
        let tmp = tempfile::tempdir().unwrap();
        for nx in [1024, 2048] {
            for run in 1..=3 {
                write_run(tmp.path(), 1024, nx, run, "0.1 seconds time elapsed");
                write_run(tmp.path(), 2048, nx, run, "0.2 seconds time elapsed");
            }
        }

        let report = aggregate_tree(tmp.path(), &AggregateOptions::default()).unwrap();
        assert_eq!(report.tables.len(), 2);
        assert!(report.tables.iter().all(|t| t.rows == 6 && t.unset == 0));

        let rows = read_rows(&tmp.path().join("N2048").join("raw.csv"));
        assert!(rows.iter().all(|r| r[0] == "2048"));
        assert_eq!(rows.iter().filter(|r| r[1] == "2048").count(), 3);
    }

    #[test]
    fn test_rerun_ignores_previous_summary() {
        let tmp = tempfile::tempdir().unwrap();
        write_run(tmp.path(), 1024, 1024, 1, "1.0 seconds time elapsed");
        let opts = AggregateOptions::default();

        aggregate_tree(tmp.path(), &opts).unwrap();
        let again = aggregate_tree(tmp.path(), &opts).unwrap();
        assert_eq!(again.tables[0].rows, 1);
    }

    #[test]
    fn test_malformed_dir_aborts_by_default() {
        let tmp = tempfile::tempdir().unwrap();
        write_run(tmp.path(), 1024, 1024, 1, "1.0 seconds time elapsed");
        std::fs::create_dir_all(tmp.path().join("N1024").join("scratch")).unwrap();

        let err = aggregate_tree(tmp.path(), &AggregateOptions::default()).unwrap_err();
        assert!(matches!(err, SweepError::NameParse { .. }));
    }

    #[test]
    fn test_malformed_entries_skipped_on_request() {
        let tmp = tempfile::tempdir().unwrap();
        write_run(tmp.path(), 1024, 1024, 1, "1.0 seconds time elapsed");
        std::fs::create_dir_all(tmp.path().join("N1024").join("scratch")).unwrap();
        std::fs::write(
            tmp.path().join("N1024").join("N1024_Nx1024").join("notes.md"),
            "",
        )
        .unwrap();

        let opts = AggregateOptions {
            malformed: MalformedPolicy::Skip,
            ..Default::default()
        };
        let report = aggregate_tree(tmp.path(), &opts).unwrap();
        assert_eq!(report.tables[0].rows, 1);
        assert_eq!(report.skipped.len(), 2);
    }

    #[test]
    fn test_stray_top_level_dir_aborts_by_default() {
        let tmp = tempfile::tempdir().unwrap();
        write_run(tmp.path(), 1024, 1024, 1, "1.0 seconds time elapsed");
        std::fs::create_dir(tmp.path().join("logs")).unwrap();

        let err = aggregate_tree(tmp.path(), &AggregateOptions::default()).unwrap_err();
        assert!(matches!(err, SweepError::NameParse { ref name, .. } if name == "logs"));
        assert!(!tmp.path().join("logs").join("raw.csv").exists());
    }

    #[test]
    fn test_stray_top_level_dir_skipped_without_table() {
        let tmp = tempfile::tempdir().unwrap();
        write_run(tmp.path(), 1024, 1024, 1, "1.0 seconds time elapsed");
        std::fs::create_dir(tmp.path().join("logs")).unwrap();

        let opts = AggregateOptions {
            malformed: MalformedPolicy::Skip,
            ..Default::default()
        };
        let report = aggregate_tree(tmp.path(), &opts).unwrap();
        assert_eq!(report.tables.len(), 1);
        assert_eq!(report.tables[0].path, tmp.path().join("N1024").join("raw.csv"));
        assert_eq!(report.skipped, vec![tmp.path().join("logs")]);
        assert!(!tmp.path().join("logs").join("raw.csv").exists());
    }

    #[test]
    fn test_problem_dir_under_wrong_n_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let misplaced = tmp.path().join("N1024").join("N2048_Nx1024");
        std::fs::create_dir_all(&misplaced).unwrap();
        std::fs::write(misplaced.join("run1.txt"), "1.0 seconds time elapsed\n").unwrap();

        for malformed in [MalformedPolicy::Abort, MalformedPolicy::Skip] {
            let opts = AggregateOptions {
                malformed,
                ..Default::default()
            };
            let err = aggregate_tree(tmp.path(), &opts).unwrap_err();
            assert!(
                matches!(err, SweepError::NameParse { ref name, .. } if name == "N2048_Nx1024")
            );
        }
        assert!(!tmp.path().join("N1024").join("raw.csv").exists());
    }

    #[test]
    fn test_hidden_entries_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        write_run(tmp.path(), 1024, 1024, 1, "1.0 seconds time elapsed");
        std::fs::write(
            tmp.path().join("N1024").join("N1024_Nx1024").join(".DS_Store"),
            "",
        )
        .unwrap();

        let report = aggregate_tree(tmp.path(), &AggregateOptions::default()).unwrap();
        assert_eq!(report.tables[0].rows, 1);
    }

    #[test]
    fn test_empty_n_dir_still_gets_header() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("N1024").join("N1024_Nx1024")).unwrap();

        let report = aggregate_tree(tmp.path(), &AggregateOptions::default()).unwrap();
        assert_eq!(report.tables[0].rows, 0);
        assert!(read_rows(&report.tables[0].path).is_empty());
    }

    #[test]
    fn test_missing_root_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = aggregate_tree(&tmp.path().join("absent"), &AggregateOptions::default())
            .unwrap_err();
        assert!(matches!(err, SweepError::Io { .. }));
    }
}
