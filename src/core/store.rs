//! Stage result persistence.
//!
//! Each brand run is grouped under an output id (`output_01`, `output_02`,
//! ...). The workflow never depends on a save succeeding; stores only give
//! callers a way to look results up again later.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::workflow::Stage;

/// Prefix of generated output ids.
const OUTPUT_PREFIX: &str = "output_";

/// Backend for stage results.
pub trait ResultStore: Send + Sync {
    /// Persist the result of one stage, replacing any earlier one.
    fn save(&self, output_id: &str, stage: Stage, result: &Value) -> anyhow::Result<()>;

    /// Load stored results for steps `1..=up_to_step`.
    ///
    /// Keys are `<stage>_result`; steps with nothing stored are left out.
    fn load(&self, output_id: &str, up_to_step: u8) -> anyhow::Result<Map<String, Value>>;

    /// Allocate the next unused output id.
    fn next_output_id(&self) -> anyhow::Result<String>;
}

/// One stored stage result, as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    /// Stage that produced the result
    pub stage: Stage,
    /// Step number of that stage
    pub step: u8,
    /// When the result was saved (RFC 3339)
    pub saved_at: String,
    /// The result itself
    pub result: Value,
}

impl StoredResult {
    /// Stamp a result with the current time.
    pub fn new(stage: Stage, result: Value) -> Self {
        Self { stage, step: stage.step(), saved_at: Utc::now().to_rfc3339(), result }
    }
}

/// Key a stage result is returned under by [`ResultStore::load`].
pub fn result_key(stage: Stage) -> String {
    format!("{}_result", stage.name())
}

/// Stores results as JSON files, one directory per output id.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory holding all outputs.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn result_path(&self, output_id: &str, stage: Stage) -> PathBuf {
        self.root.join(output_id).join(format!("{}.json", stage.name()))
    }

    fn read_result(path: &Path) -> anyhow::Result<StoredResult> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl ResultStore for FileStore {
    fn save(&self, output_id: &str, stage: Stage, result: &Value) -> anyhow::Result<()> {
        validate_output_id(output_id)?;

        let path = self.result_path(output_id, stage);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let stored = StoredResult::new(stage, result.clone());
        fs::write(&path, serde_json::to_string_pretty(&stored)?)?;
        tracing::debug!(output_id, stage = %stage, path = %path.display(), "Saved stage result");

        Ok(())
    }

    fn load(&self, output_id: &str, up_to_step: u8) -> anyhow::Result<Map<String, Value>> {
        validate_output_id(output_id)?;

        let mut results = Map::new();
        for stage in Stage::ALL.into_iter().filter(|s| s.step() <= up_to_step) {
            let path = self.result_path(output_id, stage);
            if !path.exists() {
                continue;
            }
            let stored = Self::read_result(&path)?;
            results.insert(result_key(stage), stored.result);
        }

        Ok(results)
    }

    fn next_output_id(&self) -> anyhow::Result<String> {
        if !self.root.exists() {
            return Ok(format_output_id(1));
        }

        let mut highest = 0;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(n) = parse_output_number(&entry.file_name().to_string_lossy()) {
                highest = highest.max(n);
            }
        }

        next_after(highest)
    }
}

/// In-memory store for tests and runs that should not touch disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    outputs: Mutex<BTreeMap<String, BTreeMap<Stage, StoredResult>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a single stored result.
    pub fn get(&self, output_id: &str, stage: Stage) -> Option<StoredResult> {
        self.outputs.lock().get(output_id)?.get(&stage).cloned()
    }

    /// Number of output ids with at least one result.
    pub fn len(&self) -> usize {
        self.outputs.lock().len()
    }

    /// Whether nothing has been saved.
    pub fn is_empty(&self) -> bool {
        self.outputs.lock().is_empty()
    }
}

impl ResultStore for MemoryStore {
    fn save(&self, output_id: &str, stage: Stage, result: &Value) -> anyhow::Result<()> {
        self.outputs
            .lock()
            .entry(output_id.to_string())
            .or_default()
            .insert(stage, StoredResult::new(stage, result.clone()));
        Ok(())
    }

    fn load(&self, output_id: &str, up_to_step: u8) -> anyhow::Result<Map<String, Value>> {
        let outputs = self.outputs.lock();
        let Some(stages) = outputs.get(output_id) else {
            return Ok(Map::new());
        };

        Ok(stages
            .values()
            .filter(|stored| stored.step <= up_to_step)
            .map(|stored| (result_key(stored.stage), stored.result.clone()))
            .collect())
    }

    fn next_output_id(&self) -> anyhow::Result<String> {
        let highest = self.outputs.lock().keys().filter_map(|id| parse_output_number(id)).max();
        next_after(highest.unwrap_or(0))
    }
}

fn format_output_id(n: u32) -> String {
    format!("{OUTPUT_PREFIX}{n:02}")
}

fn next_after(highest: u32) -> anyhow::Result<String> {
    highest
        .checked_add(1)
        .map(format_output_id)
        .ok_or_else(|| anyhow::anyhow!("output id numbers exhausted after {}", format_output_id(highest)))
}

fn parse_output_number(name: &str) -> Option<u32> {
    name.strip_prefix(OUTPUT_PREFIX)?.parse().ok()
}

/// Output ids become directory names, so keep them to one path segment.
fn validate_output_id(output_id: &str) -> anyhow::Result<()> {
    let valid = !output_id.is_empty()
        && output_id != "."
        && output_id != ".."
        && !output_id.contains(['/', '\\']);
    if valid {
        Ok(())
    } else {
        anyhow::bail!("invalid output id '{}'", output_id)
    }
}
