//! Fakes shared by the dialog tests
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use vocalis_core::{
    AudioArtifact, AudioDelivery, ChatId, ChatTransport, DialogController, DialogSettings,
    InMemorySessionStore, MessageId, Reply, SynthesisClient, SynthesisError, SynthesisRequest,
    TransportError, VoiceCatalog,
};

pub const RACHEL: &str = "21m00Tcm4TlvDq8ikWAM";
pub const JOSH: &str = "TxGEqnHWrfWFTfGW9XjX";

#[derive(Debug, Clone)]
pub enum Sent {
    Text {
        chat_id: ChatId,
        message_id: MessageId,
        reply: Reply,
    },
    Edit {
        chat_id: ChatId,
        message_id: MessageId,
        reply: Reply,
    },
    Delete {
        chat_id: ChatId,
        message_id: MessageId,
    },
    Audio {
        chat_id: ChatId,
        delivery: AudioDelivery,
        file_existed: bool,
    },
}

/// Records every outbound call; message ids are handed out sequentially.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<Sent>>,
    next_id: AtomicI64,
    pub fail_audio: AtomicBool,
    /// `send_text` fails for replies containing this fragment; failed sends are not recorded.
    fail_text_containing: Mutex<Option<String>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(100),
            fail_audio: AtomicBool::new(false),
            fail_text_containing: Mutex::new(None),
        }
    }

    pub fn fail_texts_containing(&self, fragment: &str) {
        *self.fail_text_containing.lock().unwrap() = Some(fragment.to_string());
    }

    pub fn log(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    /// Text of every sent or edited message, in order.
    pub fn texts(&self) -> Vec<String> {
        self.log()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { reply, .. } | Sent::Edit { reply, .. } => Some(reply.text),
                _ => None,
            })
            .collect()
    }

    pub fn audio(&self) -> Vec<AudioDelivery> {
        self.log()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Audio { delivery, .. } => Some(delivery),
                _ => None,
            })
            .collect()
    }

    pub fn last(&self) -> Option<Sent> {
        self.log().last().cloned()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_text(&self, chat_id: ChatId, reply: &Reply) -> Result<MessageId, TransportError> {
        let rejected = self
            .fail_text_containing
            .lock()
            .unwrap()
            .as_deref()
            .is_some_and(|f| reply.text.contains(f));
        if rejected {
            return Err(TransportError::Api {
                code: 429,
                description: "Too Many Requests: retry after 5".into(),
            });
        }
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(Sent::Text {
            chat_id,
            message_id,
            reply: reply.clone(),
        });
        Ok(message_id)
    }

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        reply: &Reply,
    ) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(Sent::Edit {
            chat_id,
            message_id,
            reply: reply.clone(),
        });
        Ok(())
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(Sent::Delete {
            chat_id,
            message_id,
        });
        Ok(())
    }

    async fn send_audio(
        &self,
        chat_id: ChatId,
        audio: &AudioDelivery,
    ) -> Result<MessageId, TransportError> {
        let file_existed = audio.path.exists();
        self.sent.lock().unwrap().push(Sent::Audio {
            chat_id,
            delivery: audio.clone(),
            file_existed,
        });
        if self.fail_audio.load(Ordering::SeqCst) {
            return Err(TransportError::Api {
                code: 400,
                description: "Bad Request: file is too big".into(),
            });
        }
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

/// Writes a small fake mp3 per request and records what it was asked for.
pub struct FakeSynthesizer {
    dir: PathBuf,
    pub requests: Mutex<Vec<SynthesisRequest>>,
    pub fail: AtomicBool,
    delay: Duration,
}

impl FakeSynthesizer {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            requests: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<SynthesisRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SynthesisClient for FakeSynthesizer {
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<AudioArtifact, SynthesisError> {
        self.requests.lock().unwrap().push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(SynthesisError::Provider {
                status: 401,
                body: r#"{"detail":"quota_exceeded"}"#.into(),
            });
        }
        let path = self.dir.join(format!("{}.mp3", request.output_id));
        let bytes = format!("ID3 {}", request.text).into_bytes();
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| SynthesisError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(AudioArtifact {
            path,
            size_bytes: bytes.len(),
        })
    }
}

pub struct Harness {
    pub controller: Arc<DialogController>,
    pub transport: Arc<RecordingTransport>,
    pub synth: Arc<FakeSynthesizer>,
    pub dir: tempfile::TempDir,
}

pub fn harness() -> Harness {
    harness_with(DialogSettings::default(), Duration::ZERO)
}

pub fn harness_with(settings: DialogSettings, synth_delay: Duration) -> Harness {
    harness_with_catalog(VoiceCatalog::premade(), settings, synth_delay)
}

pub fn harness_with_catalog(
    catalog: VoiceCatalog,
    settings: DialogSettings,
    synth_delay: Duration,
) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(RecordingTransport::new());
    let synth = Arc::new(FakeSynthesizer::new(dir.path()).with_delay(synth_delay));
    let controller = Arc::new(DialogController::new(
        Arc::new(catalog),
        Arc::new(InMemorySessionStore::new()),
        synth.clone(),
        transport.clone(),
        settings,
    ));
    Harness {
        controller,
        transport,
        synth,
        dir,
    }
}
