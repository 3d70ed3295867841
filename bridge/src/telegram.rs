use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use vocalis_core::{AudioDelivery, ChatId, ChatTransport, MessageId, Reply, TransportError};

use crate::api::{parse_mode, reply_markup, ApiResponse, Message, Update, User};
use crate::config::TelegramConfig;

/// Bot API client implementing the dialog's outbound transport.
#[derive(Clone)]
pub struct TelegramTransport {
    http_client: reqwest::Client,
    /// `{api_base}/bot{token}`
    endpoint: String,
}

impl TelegramTransport {
    pub fn new(cfg: &TelegramConfig) -> Self {
        // Long polls hold the connection open for the poll timeout; leave headroom.
        let timeout = Duration::from_secs(cfg.poll_timeout_secs + 15);
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("vocalis/0.1")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http_client,
            endpoint: format!("{}/bot{}", cfg.api_base.trim_end_matches('/'), cfg.token),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.endpoint, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, TransportError> {
        let resp = self
            .http_client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;
        let bytes = resp.bytes().await?;
        let envelope: ApiResponse<T> = serde_json::from_slice(&bytes)?;
        envelope.into_result()
    }

    /// Long-poll for updates newer than `offset`.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, TransportError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }

    /// Identity of the bot owning the token.
    pub async fn get_me(&self) -> Result<User, TransportError> {
        self.call("getMe", &json!({})).await
    }

    /// Stop the client-side spinner on a pressed inline button.
    pub async fn answer_callback_query(&self, query_id: &str) -> Result<(), TransportError> {
        let _: bool = self
            .call("answerCallbackQuery", &json!({ "callback_query_id": query_id }))
            .await?;
        Ok(())
    }

    fn text_body(reply: &Reply) -> serde_json::Map<String, Value> {
        let mut body = serde_json::Map::new();
        body.insert("text".into(), json!(reply.text));
        if let Some(mode) = parse_mode(reply.format) {
            body.insert("parse_mode".into(), json!(mode));
        }
        if let Some(markup) = reply_markup(&reply.markup) {
            body.insert("reply_markup".into(), markup);
        }
        body
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_text(&self, chat_id: ChatId, reply: &Reply) -> Result<MessageId, TransportError> {
        let mut body = Self::text_body(reply);
        body.insert("chat_id".into(), json!(chat_id));
        let message: Message = self.call("sendMessage", &Value::Object(body)).await?;
        Ok(message.message_id)
    }

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        reply: &Reply,
    ) -> Result<(), TransportError> {
        let mut body = Self::text_body(reply);
        body.insert("chat_id".into(), json!(chat_id));
        body.insert("message_id".into(), json!(message_id));
        // Result is the edited Message, or `true` for inline messages.
        match self
            .call::<Value>("editMessageText", &Value::Object(body))
            .await
        {
            Ok(_) => Ok(()),
            Err(TransportError::Api { description, .. })
                if description.contains("message is not modified") =>
            {
                debug!(target: "telegram", chat_id, message_id, "Edit was a no-op");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), TransportError> {
        let _: bool = self
            .call(
                "deleteMessage",
                &json!({ "chat_id": chat_id, "message_id": message_id }),
            )
            .await?;
        Ok(())
    }

    async fn send_audio(
        &self,
        chat_id: ChatId,
        audio: &AudioDelivery,
    ) -> Result<MessageId, TransportError> {
        let bytes = tokio::fs::read(&audio.path).await?;
        let file_name = audio
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.mp3")
            .to_string();
        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/mpeg")?;

        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("title", audio.title.clone())
            .text("performer", audio.performer.clone())
            .text("caption", audio.caption.clone())
            .part("audio", part);
        if let Some(mode) = parse_mode(audio.format) {
            form = form.text("parse_mode", mode);
        }
        if let Some(markup) = reply_markup(&audio.markup) {
            form = form.text("reply_markup", markup.to_string());
        }

        let resp = self
            .http_client
            .post(self.method_url("sendAudio"))
            .multipart(form)
            .send()
            .await?;
        let raw = resp.bytes().await?;
        let envelope: ApiResponse<Message> = serde_json::from_slice(&raw)?;
        match envelope.into_result() {
            Ok(message) => {
                debug!(target: "telegram", chat_id, bytes = size, "Audio uploaded");
                Ok(message.message_id)
            }
            Err(e) => {
                warn!(target: "telegram", chat_id, bytes = size, error = %e, "Audio upload rejected");
                Err(e)
            }
        }
    }
}
