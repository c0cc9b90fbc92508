//! Sample contract corpus.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tracing::{info, warn};

use crate::StoreError;

/// Most samples handed out per request.
pub const MAX_SAMPLES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleContract {
    pub title: String,
    pub text: String,
    /// Original document bytes, when the corpus has them.
    pub source: Option<Vec<u8>>,
}

#[async_trait]
pub trait SampleCorpus: Send + Sync {
    /// Up to `n` samples (never more than [`MAX_SAMPLES`]).
    async fn samples(&self, n: usize) -> Result<Vec<SampleContract>, StoreError>;
}

/// A directory of `*.txt` contracts, served in file-name order.
pub struct DirectoryCorpus {
    dir: PathBuf,
}

impl DirectoryCorpus {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SampleCorpus for DirectoryCorpus {
    async fn samples(&self, n: usize) -> Result<Vec<SampleContract>, StoreError> {
        let limit = n.min(MAX_SAMPLES);
        let mut paths = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "txt") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut out = Vec::with_capacity(limit);
        for path in paths {
            if out.len() == limit {
                break;
            }
            let bytes = fs::read(&path).await?;
            let text = match std::str::from_utf8(&bytes) {
                Ok(t) if !t.trim().is_empty() => t.to_string(),
                Ok(_) => continue,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping non-UTF-8 sample");
                    continue;
                }
            };
            let title = path
                .file_stem()
                .map(|s| s.to_string_lossy().replace(['_', '-'], " "))
                .unwrap_or_default();
            out.push(SampleContract {
                title,
                text,
                source: Some(bytes),
            });
        }
        info!(dir = %self.dir.display(), count = out.len(), "loaded sample contracts");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sorted_non_blank_and_capped() {
        let tmp = tempfile::tempdir().unwrap();
        for i in (0..15).rev() {
            std::fs::write(tmp.path().join(format!("contract_{i:02}.txt")), format!("Contract number {i}")).unwrap();
        }
        std::fs::write(tmp.path().join("contract_00a.txt"), "  \n").unwrap();
        std::fs::write(tmp.path().join("readme.md"), "not a contract").unwrap();

        let corpus = DirectoryCorpus::new(tmp.path());
        let samples = corpus.samples(50).await.unwrap();
        assert_eq!(samples.len(), MAX_SAMPLES);
        assert_eq!(samples[0].title, "contract 00");
        assert_eq!(samples[1].title, "contract 01");
        assert_eq!(samples[0].source.as_deref(), Some(b"Contract number 0".as_slice()));

        assert_eq!(corpus.samples(3).await.unwrap().len(), 3);
        assert!(corpus.samples(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let corpus = DirectoryCorpus::new("/nonexistent/samples");
        assert!(matches!(corpus.samples(1).await, Err(StoreError::Io(_))));
    }
}
