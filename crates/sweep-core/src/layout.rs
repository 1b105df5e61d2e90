//! Naming grammar of the result tree.
//!
//! ```text
//! <root>/N<N>/N<N>_Nx<Nx>/run<r>.txt
//! ```
//!
//! Names are the only record of `N`, `Nx` and the run index, so every
//! parser here accepts exactly the text its builder produces: a literal
//! prefix, unpadded ASCII decimal digits, and a literal delimiter or suffix.

use std::path::{Path, PathBuf};

use crate::error::{SweepError, SweepResult};
use crate::problem::ProblemSize;

const N_PREFIX: &str = "N";
const NX_DELIMITER: &str = "_Nx";
const RUN_PREFIX: &str = "run";
const RUN_SUFFIX: &str = ".txt";

const N_DIR_GRAMMAR: &str = "N<N>";
const PROBLEM_DIR_GRAMMAR: &str = "N<N>_Nx<Nx>";
const RUN_FILE_GRAMMAR: &str = "run<r>.txt with r >= 1";

pub fn n_dir_name(n: u64) -> String {
    format!("{N_PREFIX}{n}")
}

pub fn problem_dir_name(size: ProblemSize) -> String {
    format!("{N_PREFIX}{}{NX_DELIMITER}{}", size.n, size.nx)
}

pub fn run_file_name(run: u32) -> String {
    format!("{RUN_PREFIX}{run}{RUN_SUFFIX}")
}

pub fn n_dir(root: &Path, n: u64) -> PathBuf {
    root.join(n_dir_name(n))
}

pub fn problem_dir(root: &Path, size: ProblemSize) -> PathBuf {
    n_dir(root, size.n).join(problem_dir_name(size))
}

pub fn run_file(root: &Path, size: ProblemSize, run: u32) -> PathBuf {
    problem_dir(root, size).join(run_file_name(run))
}

/// `N<N>` → `N`.
pub fn parse_n_dir_name(name: &str) -> SweepResult<u64> {
    name.strip_prefix(N_PREFIX)
        .and_then(decimal)
        .ok_or_else(|| name_error(name, N_DIR_GRAMMAR))
}

/// `N<N>_Nx<Nx>` → `(N, Nx)`.
pub fn parse_problem_dir_name(name: &str) -> SweepResult<ProblemSize> {
    let (n, nx) = name
        .strip_prefix(N_PREFIX)
        .and_then(|rest| rest.split_once(NX_DELIMITER))
        .ok_or_else(|| name_error(name, PROBLEM_DIR_GRAMMAR))?;
    match (decimal(n), decimal(nx)) {
        (Some(n), Some(nx)) => Ok(ProblemSize::new(n, nx)),
        _ => Err(name_error(name, PROBLEM_DIR_GRAMMAR)),
    }
}

/// `run<r>.txt` → `r`.
pub fn parse_run_file_name(name: &str) -> SweepResult<u32> {
    name.strip_prefix(RUN_PREFIX)
        .and_then(|rest| rest.strip_suffix(RUN_SUFFIX))
        .and_then(decimal)
        .and_then(|r| u32::try_from(r).ok())
        .filter(|&r| r >= 1)
        .ok_or_else(|| name_error(name, RUN_FILE_GRAMMAR))
}

fn decimal(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if s.len() > 1 && s.starts_with('0') {
        return None;
    }
    s.parse().ok()
}

fn name_error(name: &str, expected: &'static str) -> SweepError {
    SweepError::NameParse {
        name: name.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_follow_templates() {
        let root = Path::new("bench");
        let size = ProblemSize::new(1024, 2048);
        assert_eq!(n_dir(root, 1024), Path::new("bench/N1024"));
        assert_eq!(
            problem_dir(root, size),
            Path::new("bench/N1024/N1024_Nx2048")
        );
        assert_eq!(
            run_file(root, size, 7),
            Path::new("bench/N1024/N1024_Nx2048/run7.txt")
        );
    }

    #[test]
    fn test_build_then_parse_recovers_fields() {
        let root = Path::new("/tmp/sweep");
        for (n, nx, run) in [(1024, 1024, 1), (4194304, 65536, 16), (1 << 40, 1 << 12, 250)] {
            let size = ProblemSize::new(n, nx);
            let path = run_file(root, size, run);

            let file = path.file_name().unwrap().to_str().unwrap();
            let dir = path.parent().unwrap();
            let dir_name = dir.file_name().unwrap().to_str().unwrap();
            let n_name = dir.parent().unwrap().file_name().unwrap().to_str().unwrap();

            assert_eq!(parse_run_file_name(file).unwrap(), run);
            assert_eq!(parse_problem_dir_name(dir_name).unwrap(), size);
            assert_eq!(parse_n_dir_name(n_name).unwrap(), n);
        }
    }

    #[test]
    fn test_problem_dir_rejects_malformed() {
        for bad in [
            "N1024",
            "N1024_Nx",
            "N_Nx1024",
            "Nx1024_N1024",
            "N1024_Nx2048x",
            "N+1024_Nx2048",
            "N1024_Nx_Nx2048",
            "n1024_nx2048",
            "N01024_Nx2048",
            "raw.csv",
        ] {
            assert!(
                matches!(
                    parse_problem_dir_name(bad),
                    Err(SweepError::NameParse { .. })
                ),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_n_dir_rejects_problem_dir() {
        assert!(parse_n_dir_name("N1024_Nx2048").is_err());
        assert!(parse_n_dir_name("N").is_err());
        assert_eq!(parse_n_dir_name("N0").unwrap(), 0);
    }

    #[test]
    fn test_run_file_rejects_malformed() {
        for bad in ["run0.txt", "run.txt", "run3.csv", "run3", "rn3.txt", "run-3.txt", "run3.txt.bak"] {
            assert!(parse_run_file_name(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_parse_error_names_grammar() {
        let err = parse_run_file_name("notes.md").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("notes.md"));
        assert!(msg.contains("run<r>.txt"));
    }
}
