//! Bot API wire types.
//!
//! Only the fields the bridge reads are modelled; serde ignores the rest.

use serde::Deserialize;
use serde_json::{json, Value};

use vocalis_core::dialog::texts::{MENU_CHOOSE_VOICE, MENU_MAIN};
use vocalis_core::{Markup, TextFormat, TransportError};

/// Envelope wrapping every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
}

impl<T> ApiResponse<T> {
    pub fn into_result(self) -> Result<T, TransportError> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(TransportError::Api {
                code: 0,
                description: "response without result".into(),
            }),
            (false, _) => Err(TransportError::Api {
                code: self.error_code.unwrap_or(0),
                description: self.description.unwrap_or_default(),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

/// `reply_markup` field for a message, or `None` when nothing is attached.
pub fn reply_markup(markup: &Markup) -> Option<Value> {
    match markup {
        Markup::None => None,
        Markup::Menu => Some(json!({
            "keyboard": [[{ "text": MENU_CHOOSE_VOICE }, { "text": MENU_MAIN }]],
            "resize_keyboard": true,
            "one_time_keyboard": false,
        })),
        Markup::Options(rows) => {
            let rows: Vec<Vec<Value>> = rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| json!({ "text": b.label, "callback_data": b.payload }))
                        .collect()
                })
                .collect();
            Some(json!({ "inline_keyboard": rows }))
        }
    }
}

pub fn parse_mode(format: TextFormat) -> Option<&'static str> {
    match format {
        TextFormat::Plain => None,
        TextFormat::Markdown => Some("Markdown"),
    }
}
