use serde::Serialize;

/// Text `perf stat` prints after the wall-clock seconds.
pub const DURATION_MARKER: &str = "seconds time elapsed";

/// Written in place of a duration that could not be extracted.
pub const UNSET_DURATION: f64 = -1.0;

/// One row of a summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub n: u64,
    pub nx: u64,
    pub run_index: u32,
    pub duration: Option<f64>,
}

/// Column layout of the summary table.
#[derive(Debug, Serialize)]
pub struct RunRow {
    #[serde(rename = "N")]
    pub n: u64,
    #[serde(rename = "Nx")]
    pub nx: u64,
    pub nrun: u32,
    pub runtime: f64,
}

impl From<&RunRecord> for RunRow {
    fn from(r: &RunRecord) -> Self {
        Self {
            n: r.n,
            nx: r.nx,
            nrun: r.run_index,
            runtime: r.duration.unwrap_or(UNSET_DURATION),
        }
    }
}

/// First line containing `marker` wins; the text before it is the value.
///
/// A marker line whose prefix is not a finite number counts as a miss.
pub fn extract_duration(text: &str, marker: &str) -> Option<f64> {
    let line = text.lines().find(|line| line.contains(marker))?;
    let (value, _) = line.split_once(marker)?;
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        Ok(v) => {
            tracing::warn!(line = line.trim(), "marker found but value is not finite: {v}");
            None
        }
        Err(e) => {
            tracing::warn!(line = line.trim(), "marker found but value is not a number: {e}");
            None
        }
    }
}
