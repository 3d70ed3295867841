use crate::transport::{ChatId, MessageId, UserId};

/// Slash commands understood by the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Voices,
}

impl Command {
    /// Parse `/start`, `/help@my_bot`, ... Returns `None` for anything else.
    pub fn parse(text: &str) -> Option<Self> {
        Self::parse_for(text, None)
    }

    /// Like [`Command::parse`], but a `@suffix` naming another bot yields `None`.
    /// With `bot_username` unset any suffix is accepted.
    pub fn parse_for(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let word = word.strip_prefix('/')?;
        let (name, addressee) = match word.split_once('@') {
            Some((name, to)) => (name, Some(to)),
            None => (word, None),
        };
        if let (Some(to), Some(me)) = (addressee, bot_username) {
            if !to.eq_ignore_ascii_case(me.trim_start_matches('@')) {
                return None;
            }
        }
        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "voices" => Some(Command::Voices),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Command(Command),
    /// Free text typed by the user (menu button presses arrive here too).
    Text(String),
    /// An inline option was picked; carries its opaque payload.
    Selection(String),
}

/// Inbound update already stripped of platform details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingEvent {
    pub user_id: UserId,
    pub chat_id: ChatId,
    /// Message carrying the picked option, for selections.
    pub origin_message_id: Option<MessageId>,
    pub kind: EventKind,
}

impl IncomingEvent {
    pub fn command(user_id: UserId, chat_id: ChatId, command: Command) -> Self {
        Self {
            user_id,
            chat_id,
            origin_message_id: None,
            kind: EventKind::Command(command),
        }
    }

    pub fn text(user_id: UserId, chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            user_id,
            chat_id,
            origin_message_id: None,
            kind: EventKind::Text(text.into()),
        }
    }

    pub fn selection(
        user_id: UserId,
        chat_id: ChatId,
        origin_message_id: Option<MessageId>,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            chat_id,
            origin_message_id,
            kind: EventKind::Selection(payload.into()),
        }
    }
}
