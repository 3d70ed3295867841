//! Text-to-Speech synthesis client
//!
//! Turns `(text, voice_id, output_id)` into an audio file on disk:
//! - Rejects over-long text before any network call
//! - Issues exactly one provider request per call, no retries
//! - Writes the encoded audio under the configured work directory
//! - Leaves the file in place; the caller deletes it after delivery
//!
//! Every failure (network, provider rejection, local write) is a
//! [`SynthesisError`] with the underlying cause attached.

mod elevenlabs;

pub use elevenlabs::{ElevenLabsClient, ElevenLabsConfig};

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("text too long: {len} characters (max {max})")]
    TextTooLong { len: usize, max: usize },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("provider rejected request ({status}): {body}")]
    Provider { status: u16, body: String },

    #[error("provider returned no audio")]
    EmptyAudio,

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One synthesis call. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice_id: String,
    /// Caller-chosen file stem, unique per concurrent request.
    pub output_id: String,
}

/// Generated audio written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    pub path: PathBuf,
    pub size_bytes: usize,
}

#[async_trait]
pub trait SynthesisClient: Send + Sync {
    async fn synthesize(&self, request: &SynthesisRequest)
        -> Result<AudioArtifact, SynthesisError>;
}

/// `output_id` with `.mp3` appended unless it already carries an audio extension.
pub(crate) fn output_file_name(output_id: &str) -> String {
    if output_id.ends_with(".mp3") || output_id.ends_with(".wav") {
        output_id.to_string()
    } else {
        format!("{}.mp3", output_id)
    }
}

/// Remove every regular file in `dir`. Missing directory is not an error.
pub async fn purge_dir(dir: &Path) -> std::io::Result<usize> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };
    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            tokio::fs::remove_file(entry.path()).await?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_mp3_extension_once() {
        assert_eq!(output_file_name("user_1_2"), "user_1_2.mp3");
        assert_eq!(output_file_name("clip.mp3"), "clip.mp3");
        assert_eq!(output_file_name("clip.wav"), "clip.wav");
    }

    #[tokio::test]
    async fn purge_dir_removes_files_only() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("a.mp3"), b"x").await.unwrap();
        tokio::fs::write(dir.path().join("b.mp3"), b"y").await.unwrap();
        tokio::fs::create_dir(dir.path().join("nested")).await.unwrap();

        let removed = purge_dir(dir.path()).await.unwrap();
        assert_eq!(removed, 2);
        assert!(dir.path().join("nested").exists());
    }

    #[tokio::test]
    async fn purge_missing_dir_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let removed = purge_dir(&dir.path().join("absent")).await.unwrap();
        assert_eq!(removed, 0);
    }
}
