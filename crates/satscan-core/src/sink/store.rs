use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use super::{HitRecord, HitStore, SinkFuture};
use crate::SinkError;

/// Default hit file, relative to the working directory.
pub const DEFAULT_HIT_PATH: &str = "./satoshi_valid_wallets.json";

/// Appends one JSON document per line to an ever-growing file.
#[derive(Debug, Clone)]
pub struct NdjsonHitStore {
    path: PathBuf,
}

impl NdjsonHitStore {
    /// Opens the store, creating an empty file when none exists.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let path = path.into();
        OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HitStore for NdjsonHitStore {
    fn append<'a>(&'a self, record: &'a HitRecord) -> SinkFuture<'a, ()> {
        Box::pin(async move {
            let mut line = serde_json::to_string(record)?;
            line.push('\n');

            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .await?;
            file.write_all(line.as_bytes()).await?;
            file.flush().await?;
            Ok(())
        })
    }
}

/// Reads every record back, skipping blank lines.
pub fn read_hit_records(path: &Path) -> Result<Vec<HitRecord>, SinkError> {
    let contents = std::fs::read_to_string(path)?;
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(SinkError::from))
        .collect()
}
