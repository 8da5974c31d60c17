//! Step-duration measurements.
//!
//! Each `Step` command records the wall-clock time the engine call took,
//! without communication overhead. The log is queryable over the protocol at
//! any time and dumped to a flat file when the session ends cleanly. One file
//! per session; a new session overwrites the previous dump.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use tracing::info;

/// Name of the dump file inside the measures directory.
pub const MEASURES_FILE_NAME: &str = "step_durations_us.txt";

/// Accumulated engine-step durations, microseconds.
#[derive(Debug, Default)]
pub struct StepMeasures {
    samples_us: Vec<u128>,
}

impl StepMeasures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, elapsed: Duration) {
        self.samples_us.push(elapsed.as_micros());
    }

    pub fn len(&self) -> usize {
        self.samples_us.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples_us.is_empty()
    }

    /// Newline-separated microsecond values, one per recorded step.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for sample in &self.samples_us {
            out.push_str(&sample.to_string());
            out.push('\n');
        }
        out
    }

    /// Writes the log under `dir`, creating the directory if needed and
    /// overwriting any previous dump.
    pub fn save_to_dir(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("create measures dir {}", dir.display()))?;

        let path = dir.join(MEASURES_FILE_NAME);
        fs::write(&path, self.render())
            .with_context(|| format!("write measures file {}", path.display()))?;

        info!(path = %path.display(), samples = self.len(), "step measures saved");
        Ok(path)
    }
}
