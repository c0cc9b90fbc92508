//! JSON-file store: one pretty-printed file per record under a directory.
//!
//! Writes go to a uniquely named sibling `.tmp` file first and are renamed
//! into place, so a concurrent reader never sees a half-written record.
//! Creates hard-link the temp file instead of renaming it; the link fails
//! when the record already exists, so exactly one create per id wins.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pactum_core::{ContractRecord, RecordId};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::StoreError;
use crate::store::{ContractStore, RecordFilter, sort_newest_first};

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        info!(dir = %dir.display(), "opened contract store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Ids come from user input on the CLI; only accept uuid-shaped ones.
    fn path_for(&self, id: &RecordId) -> Result<PathBuf, StoreError> {
        let valid = !id.0.is_empty() && id.0.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(self.dir.join(format!("{}.json", id.0)))
    }

    /// Serialize `record` next to `path` under a name no other writer uses.
    async fn stage(path: &Path, record: &ContractRecord) -> Result<PathBuf, StoreError> {
        let bytes = serde_json::to_vec_pretty(record)?;
        let tmp = path.with_extension(format!("json.{}.tmp", RecordId::new()));
        fs::write(&tmp, &bytes).await?;
        Ok(tmp)
    }

    async fn write(&self, path: &Path, record: &ContractRecord) -> Result<(), StoreError> {
        let tmp = Self::stage(path, record).await?;
        if let Err(e) = fs::rename(&tmp, path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        debug!(id = %record.id, status = %record.status, "record written");
        Ok(())
    }

    async fn read(path: &Path) -> Result<ContractRecord, StoreError> {
        let bytes = fs::read(path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl ContractStore for FileStore {
    async fn create(&self, record: &ContractRecord) -> Result<(), StoreError> {
        let path = self.path_for(&record.id)?;
        let tmp = Self::stage(&path, record).await?;
        let linked = fs::hard_link(&tmp, &path).await;
        fs::remove_file(&tmp).await?;
        match linked {
            Ok(()) => {
                debug!(id = %record.id, status = %record.status, "record created");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(StoreError::Duplicate(record.id.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(&self, record: &ContractRecord) -> Result<(), StoreError> {
        let path = self.path_for(&record.id)?;
        if !fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(record.id.clone()));
        }
        self.write(&path, record).await
    }

    async fn get(&self, id: &RecordId) -> Result<ContractRecord, StoreError> {
        let path = self.path_for(id)?;
        match Self::read(&path).await {
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(id.clone()))
            }
            other => other,
        }
    }

    async fn list(&self, filter: &RecordFilter) -> Result<Vec<ContractRecord>, StoreError> {
        let mut out = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match Self::read(&path).await {
                Ok(record) if filter.matches(&record) => out.push(record),
                Ok(_) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable record"),
            }
        }
        sort_newest_first(&mut out);
        Ok(out)
    }

    async fn delete(&self, id: &RecordId) -> Result<(), StoreError> {
        let path = self.path_for(id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound(id.clone())),
            Err(e) => Err(e.into()),
        }
    }
}
