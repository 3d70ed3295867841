//! Outbound chat surface used by the dialog controller.
//!
//! The controller never talks to a chat platform directly; it produces
//! [`Reply`] values and audio deliveries and hands them to a
//! [`ChatTransport`]. The Telegram implementation lives in `vocalis-bridge`.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

pub type UserId = i64;
pub type ChatId = i64;
pub type MessageId = i64;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A selectable inline option carrying an opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionButton {
    pub label: String,
    pub payload: String,
}

impl OptionButton {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// Keyboard attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Markup {
    #[default]
    None,
    /// The persistent two-button menu pinned under the input field.
    Menu,
    /// Inline options, one row per inner vector.
    Options(Vec<Vec<OptionButton>>),
}

impl Markup {
    /// Inline options can be attached to an edited message; the persistent
    /// menu can only ride along with a freshly sent one.
    pub fn is_editable(&self) -> bool {
        !matches!(self, Markup::Menu)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFormat {
    #[default]
    Plain,
    Markdown,
}

/// Outgoing text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub markup: Markup,
    pub format: TextFormat,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: Markup::None,
            format: TextFormat::Plain,
        }
    }

    pub fn with_menu(mut self) -> Self {
        self.markup = Markup::Menu;
        self
    }

    pub fn with_options(mut self, rows: Vec<Vec<OptionButton>>) -> Self {
        self.markup = Markup::Options(rows);
        self
    }

    pub fn markdown(mut self) -> Self {
        self.format = TextFormat::Markdown;
        self
    }
}

/// One generated audio file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDelivery {
    pub path: PathBuf,
    pub title: String,
    pub performer: String,
    pub caption: String,
    pub format: TextFormat,
    pub markup: Markup,
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a new message and return its id.
    async fn send_text(&self, chat_id: ChatId, reply: &Reply) -> Result<MessageId, TransportError>;

    /// Replace the text (and inline options) of an existing message.
    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        reply: &Reply,
    ) -> Result<(), TransportError>;

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId)
        -> Result<(), TransportError>;

    async fn send_audio(&self, chat_id: ChatId, audio: &AudioDelivery)
        -> Result<MessageId, TransportError>;
}
