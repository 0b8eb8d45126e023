//! Per-run archive of screenshots and agent thoughts.

use std::path::{Path, PathBuf};

use base64::Engine;
use tokio::io::AsyncWriteExt;

use crate::error::ControllerError;

/// Writes one task run's artifacts into a directory: `NNN.png` per iteration
/// plus an append-only `thoughts.log`.
pub struct RunRecorder {
    dir: PathBuf,
}

impl RunRecorder {
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self, ControllerError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(RunRecorder { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Decode and store the iteration's screenshot, returning its path.
    pub async fn save_screenshot(
        &self,
        iteration: u32,
        base64_png: &str,
    ) -> Result<PathBuf, ControllerError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(base64_png.trim())
            .map_err(|e| ControllerError::Decode(e.to_string()))?;
        let path = self.dir.join(format!("{iteration:03}.png"));
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    pub async fn log_thought(&self, iteration: u32, thought: &str) -> Result<(), ControllerError> {
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(self.dir.join("thoughts.log"))
            .await?;
        file.write_all(format!("[{iteration:03}] {thought}\n").as_bytes())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_makes_the_run_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("run-1");
        let recorder = RunRecorder::create(&dir).await.unwrap();
        assert!(recorder.dir().is_dir());
    }

    #[tokio::test]
    async fn test_screenshot_is_decoded_and_numbered() {
        let temp = TempDir::new().unwrap();
        let recorder = RunRecorder::create(temp.path()).await.unwrap();

        let path = recorder.save_screenshot(7, "aGVsbG8=").await.unwrap();
        assert!(path.ends_with("007.png"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_bad_base64_is_reported() {
        let temp = TempDir::new().unwrap();
        let recorder = RunRecorder::create(temp.path()).await.unwrap();

        let err = recorder.save_screenshot(0, "not base64!!").await.unwrap_err();
        assert!(matches!(err, ControllerError::Decode(_)));
    }

    #[tokio::test]
    async fn test_thoughts_append_in_order() {
        let temp = TempDir::new().unwrap();
        let recorder = RunRecorder::create(temp.path()).await.unwrap();

        recorder.log_thought(0, "open the menu").await.unwrap();
        recorder.log_thought(1, "click search").await.unwrap();

        let log = tokio::fs::read_to_string(temp.path().join("thoughts.log"))
            .await
            .unwrap();
        assert_eq!(log, "[000] open the menu\n[001] click search\n");
    }
}
