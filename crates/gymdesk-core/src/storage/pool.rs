//! Exercise pool loading from blob storage.
//!
//! The pool is described by a JSON manifest listing exercise videos. The
//! manifest lives either in a local directory or behind an HTTP URL; video
//! references are resolved relative to the manifest location so the player
//! receives playable references.
//!
//! ```json
//! { "exercises": [ { "name": "Burpees", "video": "burpees.mp4" },
//!                  { "video": "jumping_jacks.mp4" } ] }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::StoreError;
use crate::workout::{name_from_file, Exercise};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PoolSource {
    /// Manifest file on disk; videos resolve relative to its directory.
    Manifest { path: PathBuf },
    /// Manifest served over HTTP; videos resolve relative to its URL.
    Remote { url: Url },
}

#[derive(Debug, Deserialize)]
struct ExerciseManifest {
    exercises: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    /// Falls back to a name derived from the video file.
    #[serde(default)]
    name: Option<String>,
    video: String,
}

impl ManifestEntry {
    fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => name_from_file(&self.video),
        }
    }
}

impl PoolSource {
    pub fn describe(&self) -> String {
        match self {
            PoolSource::Manifest { path } => path.display().to_string(),
            PoolSource::Remote { url } => url.to_string(),
        }
    }

    /// List every exercise in the pool with resolved video references.
    ///
    /// # Errors
    /// Any IO, HTTP or decode failure is reported as `StoreError::Fetch`;
    /// nothing is retried.
    pub async fn fetch(&self) -> Result<Vec<Exercise>, StoreError> {
        let result = match self {
            PoolSource::Manifest { path } => read_manifest(path).await,
            PoolSource::Remote { url } => fetch_remote(url).await,
        };
        match &result {
            Ok(exercises) => {
                tracing::debug!(source = %self.describe(), count = exercises.len(), "exercise pool loaded")
            }
            Err(e) => tracing::warn!(source = %self.describe(), error = %e, "exercise pool fetch failed"),
        }
        result
    }
}

async fn read_manifest(path: &Path) -> Result<Vec<Exercise>, StoreError> {
    let fetch_err = |message: String| StoreError::Fetch {
        source_name: path.display().to_string(),
        message,
    };

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| fetch_err(e.to_string()))?;
    let manifest: ExerciseManifest =
        serde_json::from_str(&content).map_err(|e| fetch_err(e.to_string()))?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(manifest
        .exercises
        .iter()
        .map(|entry| {
            let video = if Url::parse(&entry.video).is_ok() {
                entry.video.clone()
            } else {
                base.join(&entry.video).display().to_string()
            };
            Exercise::new(entry.display_name(), video)
        })
        .collect())
}

async fn fetch_remote(url: &Url) -> Result<Vec<Exercise>, StoreError> {
    let manifest: ExerciseManifest = reqwest::get(url.clone())
        .await?
        .error_for_status()?
        .json()
        .await?;

    manifest
        .exercises
        .iter()
        .map(|entry| {
            let video = url.join(&entry.video).map_err(|e| StoreError::Fetch {
                source_name: url.to_string(),
                message: format!("bad video reference '{}': {e}", entry.video),
            })?;
            Ok(Exercise::new(entry.display_name(), video.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn manifest_resolves_relative_videos() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exercises.json");
        std::fs::write(
            &path,
            r#"{"exercises": [
                {"name": "Burpees", "video": "burpees.mp4"},
                {"video": "jumping_jacks.mp4"},
                {"name": "Plank", "video": "https://cdn.example.com/plank.mp4"}
            ]}"#,
        )
        .unwrap();

        let pool = PoolSource::Manifest { path }.fetch().await.unwrap();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool[0].name, "Burpees");
        assert_eq!(
            pool[0].video,
            dir.path().join("burpees.mp4").display().to_string()
        );
        assert_eq!(pool[1].name, "Jumping Jacks");
        assert_eq!(pool[2].video, "https://cdn.example.com/plank.mp4");
    }

    #[tokio::test]
    async fn missing_manifest_is_fetch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = PoolSource::Manifest {
            path: dir.path().join("nope.json"),
        };
        assert!(matches!(
            source.fetch().await,
            Err(StoreError::Fetch { .. })
        ));
    }

    #[tokio::test]
    async fn remote_manifest_resolves_against_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/pool/exercises.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"exercises": [{"name": "Squats", "video": "squats.mp4"}]}"#)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/pool/exercises.json", server.url())).unwrap();
        let pool = PoolSource::Remote { url }.fetch().await.unwrap();
        mock.assert_async().await;

        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].name, "Squats");
        assert_eq!(pool[0].video, format!("{}/pool/squats.mp4", server.url()));
    }

    #[tokio::test]
    async fn remote_error_status_is_fetch_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/exercises.json")
            .with_status(503)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/exercises.json", server.url())).unwrap();
        let result = PoolSource::Remote { url }.fetch().await;
        assert!(matches!(result, Err(StoreError::Fetch { .. })));
    }
}
