//! Per-user dialog state machine
//!
//! Phases: `Idle` → `SelectingVoice` → `Ready`. Every inbound event goes
//! through [`DialogController::dispatch`], which is the single recovery
//! boundary for that event: any error is logged and turned into a reply,
//! so one user's failure never leaks into another user's handling.
//!
//! Text is checked in a fixed order: reserved menu labels first, then
//! length, then voice selection. Only text passing all three reaches the
//! synthesis client.

pub mod texts;

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::catalog::{VoiceCatalog, VoiceIdentity};
use crate::event::{Command, EventKind, IncomingEvent};
use crate::session::{Phase, SessionStore};
use crate::synthesis::{SynthesisClient, SynthesisRequest};
use crate::transport::{
    AudioDelivery, ChatId, ChatTransport, Markup, MessageId, Reply, TextFormat, UserId,
};
use crate::{Result, VocalisError};

#[derive(Clone, Debug)]
pub struct DialogSettings {
    /// Longest accepted text, in characters.
    pub max_text_len: usize,
    /// Voices shown in the picker. Pagination beyond this is a stub.
    pub voice_page_size: usize,
    /// Characters of the source text quoted in the audio caption.
    pub caption_excerpt_chars: usize,
}

impl Default for DialogSettings {
    fn default() -> Self {
        Self {
            max_text_len: 2500,
            voice_page_size: 10,
            caption_excerpt_chars: 500,
        }
    }
}

pub struct DialogController {
    catalog: Arc<VoiceCatalog>,
    sessions: Arc<dyn SessionStore>,
    synthesizer: Arc<dyn SynthesisClient>,
    transport: Arc<dyn ChatTransport>,
    settings: DialogSettings,
    request_seq: AtomicU64,
}

impl DialogController {
    pub fn new(
        catalog: Arc<VoiceCatalog>,
        sessions: Arc<dyn SessionStore>,
        synthesizer: Arc<dyn SynthesisClient>,
        transport: Arc<dyn ChatTransport>,
        settings: DialogSettings,
    ) -> Self {
        Self {
            catalog,
            sessions,
            synthesizer,
            transport,
            settings,
            request_seq: AtomicU64::new(1),
        }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    pub fn catalog(&self) -> &VoiceCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &DialogSettings {
        &self.settings
    }

    /// Handle one event and answer the user whatever happens.
    pub async fn dispatch(&self, event: IncomingEvent) {
        if let Err(err) = self.handle(&event).await {
            self.report(&event, err).await;
        }
    }

    /// Handle one event, surfacing failures to the caller.
    pub async fn handle(&self, event: &IncomingEvent) -> Result<()> {
        // Any processed event materializes the user's state
        self.sessions.upsert(event.user_id, &mut |_| {});

        match &event.kind {
            EventKind::Command(command) => self.on_command(event, *command).await,
            EventKind::Text(text) => self.on_text(event, text).await,
            EventKind::Selection(payload) => self.on_selection(event, payload).await,
        }
    }

    async fn on_command(&self, event: &IncomingEvent, command: Command) -> Result<()> {
        debug!(target: "dialog", user_id = event.user_id, ?command, "Command");
        match command {
            Command::Start => self.show_main_menu(event).await,
            Command::Help => {
                self.transport
                    .send_text(event.chat_id, &texts::help(self.settings.max_text_len))
                    .await?;
                Ok(())
            }
            Command::Voices => self.show_voices(event).await,
        }
    }

    async fn on_text(&self, event: &IncomingEvent, raw: &str) -> Result<()> {
        let text = raw.trim();
        match text {
            texts::MENU_CHOOSE_VOICE => return self.show_voices(event).await,
            texts::MENU_MAIN => return self.show_main_menu(event).await,
            "" => return Ok(()),
            _ => {}
        }

        let len = text.chars().count();
        let max = self.settings.max_text_len;
        if len > max {
            return Err(VocalisError::TextTooLong { len, max });
        }

        let voice_id = self
            .sessions
            .get(event.user_id)
            .selected_voice_id
            .ok_or(VocalisError::NoVoiceSelected)?;
        let voice = self
            .catalog
            .find_by_id(&voice_id)
            .ok_or(VocalisError::VoiceNotFound(voice_id))?;

        self.synthesize_and_deliver(event, text, voice).await
    }

    async fn on_selection(&self, event: &IncomingEvent, payload: &str) -> Result<()> {
        debug!(target: "dialog", user_id = event.user_id, payload, "Selection");
        match payload {
            texts::PAYLOAD_SELECT_VOICE => self.show_voices(event).await,
            texts::PAYLOAD_BACK_TO_MAIN => self.show_main_menu(event).await,
            texts::PAYLOAD_SHOW_HELP => {
                self.respond(event, &texts::inline_help(self.settings.max_text_len))
                    .await
            }
            other => match other.strip_prefix(texts::PAYLOAD_VOICE_PREFIX) {
                Some(voice_id) => self.select_voice(event, voice_id).await,
                None => {
                    if other != texts::PAYLOAD_MORE_VOICES {
                        warn!(target: "dialog", payload = other, "Unhandled option; falling back to voice list");
                    }
                    self.respond(event, &texts::pagination_stub()).await?;
                    self.show_voices(event).await
                }
            },
        }
    }

    async fn show_main_menu(&self, event: &IncomingEvent) -> Result<()> {
        self.sessions.upsert(event.user_id, &mut |s| s.reset());
        self.transport
            .send_text(event.chat_id, &texts::welcome(self.settings.max_text_len))
            .await?;
        Ok(())
    }

    async fn show_voices(&self, event: &IncomingEvent) -> Result<()> {
        if self.catalog.is_empty() {
            self.transport
                .send_text(event.chat_id, &texts::no_voices())
                .await?;
            return Ok(());
        }

        self.sessions
            .upsert(event.user_id, &mut |s| s.phase = Phase::SelectingVoice);
        let shown = self.catalog.first_page(self.settings.voice_page_size);
        self.respond(event, &texts::voice_list(shown, self.catalog.len()))
            .await
    }

    async fn select_voice(&self, event: &IncomingEvent, voice_id: &str) -> Result<()> {
        let voice = self
            .catalog
            .find_by_id(voice_id)
            .ok_or_else(|| VocalisError::VoiceNotFound(voice_id.to_string()))?;

        self.sessions
            .upsert(event.user_id, &mut |s| s.select_voice(voice.id.as_str()));
        info!(target: "dialog", user_id = event.user_id, voice = %voice.display_name, "Voice selected");

        self.respond(event, &texts::voice_selected(voice)).await
    }

    async fn synthesize_and_deliver(
        &self,
        event: &IncomingEvent,
        text: &str,
        voice: &VoiceIdentity,
    ) -> Result<()> {
        let chat_id = event.chat_id;
        let notice_id = self
            .transport
            .send_text(chat_id, &texts::processing())
            .await?;

        let request = SynthesisRequest {
            text: text.to_string(),
            voice_id: voice.id.clone(),
            output_id: self.output_id(event.user_id, notice_id),
        };

        let artifact = match self.synthesizer.synthesize(&request).await {
            Ok(artifact) => artifact,
            Err(err) => {
                error!(
                    target: "dialog",
                    user_id = event.user_id,
                    voice_id = %request.voice_id,
                    error = %err,
                    "Synthesis failed"
                );
                self.replace_notice(chat_id, notice_id, &texts::synthesis_failed())
                    .await;
                return Ok(());
            }
        };

        let delivery = AudioDelivery {
            path: artifact.path.clone(),
            title: texts::audio_title(&voice.display_name),
            performer: texts::AUDIO_PERFORMER.to_string(),
            caption: texts::audio_caption(
                &voice.display_name,
                text,
                self.settings.caption_excerpt_chars,
            ),
            format: TextFormat::Markdown,
            markup: Markup::None,
        };
        let sent = self.transport.send_audio(chat_id, &delivery).await;
        remove_artifact(&artifact.path).await;

        match sent {
            Ok(_) => {
                info!(
                    target: "dialog",
                    user_id = event.user_id,
                    voice = %voice.display_name,
                    bytes = artifact.size_bytes,
                    "Audio delivered"
                );
                if let Err(e) = self.transport.delete_message(chat_id, notice_id).await {
                    debug!(target: "dialog", error = %e, "Could not delete processing notice");
                }
                // The audio already arrived; a lost follow-up is not a failure.
                if let Err(e) = self.transport.send_text(chat_id, &texts::done()).await {
                    warn!(target: "dialog", user_id = event.user_id, error = %e, "Could not send completion message");
                }
            }
            Err(err) => {
                error!(target: "dialog", user_id = event.user_id, error = %err, "Audio delivery failed");
                self.replace_notice(chat_id, notice_id, &texts::synthesis_failed())
                    .await;
            }
        }
        Ok(())
    }

    /// Collision-free file stem: user id, notice message id, process-wide sequence.
    fn output_id(&self, user_id: UserId, notice_id: MessageId) -> String {
        let seq = self.request_seq.fetch_add(1, Ordering::Relaxed);
        format!("user_{}_{}_{}", user_id, notice_id, seq)
    }

    /// Edit the message carrying the option when there is one, otherwise send.
    async fn respond(&self, event: &IncomingEvent, reply: &Reply) -> Result<()> {
        match event.origin_message_id {
            Some(message_id) if reply.markup.is_editable() => {
                self.transport
                    .edit_text(event.chat_id, message_id, reply)
                    .await?;
            }
            _ => {
                self.transport.send_text(event.chat_id, reply).await?;
            }
        }
        Ok(())
    }

    async fn replace_notice(&self, chat_id: ChatId, notice_id: MessageId, reply: &Reply) {
        if let Err(e) = self.transport.edit_text(chat_id, notice_id, reply).await {
            warn!(target: "dialog", error = %e, "Could not update processing notice");
        }
    }

    async fn report(&self, event: &IncomingEvent, err: VocalisError) {
        let reply = match &err {
            VocalisError::TextTooLong { len, max } => texts::text_too_long(*len, *max),
            VocalisError::NoVoiceSelected => texts::select_voice_first(),
            VocalisError::VoiceNotFound(_) => texts::voice_not_found(),
            _ => texts::internal_failure(),
        };

        if err.is_user_facing() {
            info!(target: "dialog", user_id = event.user_id, reason = %err, "Request rejected");
        } else {
            error!(target: "dialog", user_id = event.user_id, error = %err, "Event handling failed");
        }

        if let Err(e) = self.respond(event, &reply).await {
            warn!(target: "dialog", user_id = event.user_id, error = %e, "Could not report failure to user");
        }
    }
}

async fn remove_artifact(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(target: "dialog", path = ?path, error = %e, "Failed to remove temporary audio file");
    }
}
