// Vocalis Core Library
// Chat-to-speech dialog runtime

pub mod catalog;
pub mod dialog;
pub mod event;
pub mod session;
pub mod synthesis;
pub mod transport;

// Export core types
pub use catalog::{VoiceCatalog, VoiceIdentity, VoiceLabels};
pub use dialog::{DialogController, DialogSettings};
pub use event::{Command, EventKind, IncomingEvent};
pub use session::{ConversationState, InMemorySessionStore, Phase, SessionStore};
pub use synthesis::{
    AudioArtifact, ElevenLabsClient, ElevenLabsConfig, SynthesisClient, SynthesisError,
    SynthesisRequest,
};
pub use transport::{
    AudioDelivery, ChatId, ChatTransport, Markup, MessageId, OptionButton, Reply, TextFormat,
    TransportError, UserId,
};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VocalisError {
    #[error("text too long: {len} characters (max {max})")]
    TextTooLong { len: usize, max: usize },

    #[error("no voice selected")]
    NoVoiceSelected,

    #[error("voice not found: {0}")]
    VoiceNotFound(String),

    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VocalisError {
    /// Validation and lookup failures are answered with a specific message;
    /// everything else collapses into the generic failure text.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            VocalisError::TextTooLong { .. }
                | VocalisError::NoVoiceSelected
                | VocalisError::VoiceNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, VocalisError>;
