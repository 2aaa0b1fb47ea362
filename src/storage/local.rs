//! Local filesystem storage implementation.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── config.toml
//! └── {prefix}/
//!     ├── coaches_{id}_{timestamp}_raw_coaches.json
//!     └── coaches_{id}_latest.json
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{SchoolRun, StorageConfig};
use crate::storage::{CoachDocument, CoachStorage, WriteMetadata};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    prefix: String,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Create a LocalStorage from `[storage]`.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.output_dir, config.prefix.clone())
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn snapshot_key(&self, school_id: &str, timestamp: &str) -> String {
        format!(
            "{}/coaches_{}_{}_raw_coaches.json",
            self.prefix, school_id, timestamp
        )
    }

    fn latest_key(&self, school_id: &str) -> String {
        format!("{}/coaches_{}_latest.json", self.prefix, school_id)
    }
}

#[async_trait]
impl CoachStorage for LocalStorage {
    async fn write_run(&self, run: &SchoolRun) -> Result<WriteMetadata> {
        if !run.success {
            return Err(AppError::validation(format!(
                "refusing to store failed run for {}",
                run.school.school_id
            )));
        }

        let now = Utc::now();
        let document = CoachDocument::from_run(run, now);
        let school_id = &document.metadata.school_id;

        let snapshot_key = self.snapshot_key(school_id, &document.metadata.timestamp);
        let latest_key = self.latest_key(school_id);

        self.write_json(&snapshot_key, &document).await?;
        self.write_json(&latest_key, &document).await?;
        log::info!(
            "Saved {} coaches for {} to {}",
            document.coaches.len(),
            document.metadata.school_name,
            self.path(&snapshot_key).display()
        );

        Ok(WriteMetadata {
            snapshot_key,
            latest_key,
            coach_count: document.coaches.len(),
            timestamp: now,
        })
    }

    async fn load_latest(&self, school_id: &str) -> Result<Option<CoachDocument>> {
        let document = self.read_json(&self.latest_key(school_id)).await?;
        if document.is_none() {
            log::warn!("No latest document for school {}", school_id);
        }
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CoachRecord, SchoolContext};
    use tempfile::TempDir;

    fn finished_run() -> SchoolRun {
        let school = SchoolContext {
            school_id: "721".into(),
            school_name: "Example State".into(),
            athletics_url: "goexample.com".into(),
            division: None,
            conference: None,
            coaching_staff_url: None,
        };
        let mut coach = CoachRecord::named("Jane Doe").unwrap();
        coach.email = Some("jd@x.edu".into());
        let mut run = SchoolRun::start(&school).complete(vec![coach]);
        run.coaches_url = Some("https://goexample.com/coaches".into());
        run
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), "coaches_json");

        storage.write_bytes("test.txt", b"hello").await.unwrap();
        let data = storage.read_bytes("test.txt").await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), "coaches_json");

        let data = storage.read_bytes("nope.txt").await.unwrap();
        assert!(data.is_none());
        assert!(storage.load_latest("404").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_run_writes_snapshot_and_latest() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), "coaches_json");

        let meta = storage.write_run(&finished_run()).await.unwrap();

        assert_eq!(meta.coach_count, 1);
        assert_eq!(meta.latest_key, "coaches_json/coaches_721_latest.json");
        assert!(meta.snapshot_key.starts_with("coaches_json/coaches_721_"));
        assert!(meta.snapshot_key.ends_with("_raw_coaches.json"));
        assert!(tmp.path().join(&meta.snapshot_key).exists());
        assert!(!tmp.path().join("coaches_json/coaches_721_latest.tmp").exists());

        let latest = storage.load_latest("721").await.unwrap().unwrap();
        assert_eq!(latest.coaches[0].name, "Jane Doe");
        assert_eq!(latest.emails, vec!["jd@x.edu"]);
        assert_eq!(latest.metadata.source_url, "https://goexample.com/coaches");
    }

    #[tokio::test]
    async fn test_failed_run_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path(), "coaches_json");
        let run = finished_run().fail(crate::models::FailureReason::ExtractionEmpty);

        assert!(storage.write_run(&run).await.is_err());
    }

    #[test]
    fn test_from_config_uses_storage_section() {
        let config = StorageConfig {
            output_dir: "/srv/crawl".into(),
            prefix: "staff".into(),
        };
        let storage = LocalStorage::from_config(&config);
        assert_eq!(
            storage.path(&storage.latest_key("7")),
            Path::new("/srv/crawl/staff/coaches_7_latest.json")
        );
    }
}
