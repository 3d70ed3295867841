use tracing::debug;

use vocalis_core::{Command, IncomingEvent};

use crate::api::Update;

/// Translate a raw update into a dialog event.
///
/// Returns `None` for updates the dialog has no use for: messages without
/// text, messages from bots, and slash commands other than the known three.
/// When `bot_username` is known, commands addressed to another bot are dropped.
pub fn to_event(update: &Update, bot_username: Option<&str>) -> Option<IncomingEvent> {
    if let Some(query) = &update.callback_query {
        let payload = query.data.clone()?;
        let (chat_id, origin) = match &query.message {
            Some(m) => (m.chat.id, Some(m.message_id)),
            // Inline-mode callbacks carry no message; answer in the private chat.
            None => (query.from.id, None),
        };
        return Some(IncomingEvent::selection(
            query.from.id,
            chat_id,
            origin,
            payload,
        ));
    }

    let message = update.message.as_ref()?;
    let from = message.from.as_ref()?;
    if from.is_bot {
        return None;
    }
    let text = message.text.as_deref()?;

    if text.trim_start().starts_with('/') {
        return match Command::parse_for(text, bot_username) {
            Some(cmd) => Some(IncomingEvent::command(from.id, message.chat.id, cmd)),
            None => {
                debug!(target: "telegram", user_id = from.id, command = %text, "Ignoring command not meant for us");
                None
            }
        };
    }

    Some(IncomingEvent::text(from.id, message.chat.id, text))
}
