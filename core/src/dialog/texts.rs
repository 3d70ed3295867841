// User-facing strings and keyboards

use crate::catalog::VoiceIdentity;
use crate::transport::{OptionButton, Reply};

pub const MENU_CHOOSE_VOICE: &str = "🎭 Choose voice";
pub const MENU_MAIN: &str = "🏠 Main menu";

pub const PAYLOAD_VOICE_PREFIX: &str = "voice_";
pub const PAYLOAD_SELECT_VOICE: &str = "select_voice";
pub const PAYLOAD_BACK_TO_MAIN: &str = "back_to_main";
pub const PAYLOAD_MORE_VOICES: &str = "more_voices";
pub const PAYLOAD_SHOW_HELP: &str = "show_help";

pub const AUDIO_PERFORMER: &str = "ElevenLabs TTS Bot";

pub fn welcome(max_len: usize) -> Reply {
    Reply::plain(format!(
        "🎤 Welcome to the Text-to-Speech bot!\n\n\
         I voice any text you send me using ElevenLabs AI.\n\n\
         How to use:\n\
         • Tap '{}' and pick a voice.\n\
         • Send a text (up to {} characters).\n\
         • Receive an mp3 with the voiceover.",
        MENU_CHOOSE_VOICE, max_len
    ))
    .with_menu()
}

pub fn help(max_len: usize) -> Reply {
    Reply::plain(format!(
        "📖 How to use the bot:\n\n\
         1. Tap '{}' or use the /voices command\n\
         2. Send the text to voice\n\
         3. Receive an audio file\n\n\
         ⚠️ Maximum text length: {} characters",
        MENU_CHOOSE_VOICE, max_len
    ))
    .with_menu()
}

pub fn inline_help(max_len: usize) -> Reply {
    Reply::plain(format!(
        "📖 How to use the bot:\n\n\
         1. Pick a voice\n\
         2. Send the text to voice\n\
         3. Receive an audio file\n\n\
         ⚠️ Maximum text length: {}",
        max_len
    ))
    .with_options(vec![vec![OptionButton::new("🔙 Back", PAYLOAD_BACK_TO_MAIN)]])
}

/// Voice picker: one option per shown voice, the pagination stub and a way back.
pub fn voice_list(shown: &[VoiceIdentity], total: usize) -> Reply {
    let mut rows: Vec<Vec<OptionButton>> = shown
        .iter()
        .map(|v| {
            vec![OptionButton::new(
                format!("🎤 {}", v.display_name),
                format!("{}{}", PAYLOAD_VOICE_PREFIX, v.id),
            )]
        })
        .collect();
    rows.push(vec![OptionButton::new("📄 Show more", PAYLOAD_MORE_VOICES)]);
    rows.push(vec![OptionButton::new(MENU_MAIN, PAYLOAD_BACK_TO_MAIN)]);

    Reply::plain(format!(
        "🎭 Choose a voice:\n\nVoices available: {}\nPick one of the options below:",
        total
    ))
    .with_options(rows)
}

pub fn no_voices() -> Reply {
    Reply::plain("❌ Could not load the voice list. Please try again later.").with_menu()
}

pub fn voice_selected(voice: &VoiceIdentity) -> Reply {
    Reply::plain(format!(
        "✅ Voice selected: *{}*\n\n📝 Description: {}\n\nNow send me the text to voice!",
        escape_markdown(&voice.display_name),
        escape_markdown(&voice.description)
    ))
    .markdown()
    .with_options(vec![
        vec![OptionButton::new("🔙 Pick another voice", PAYLOAD_SELECT_VOICE)],
        vec![OptionButton::new(MENU_MAIN, PAYLOAD_BACK_TO_MAIN)],
    ])
}

pub fn voice_not_found() -> Reply {
    Reply::plain("❌ Voice not found. Try picking another one.")
}

pub fn pagination_stub() -> Reply {
    Reply::plain("🚧 Pagination is not implemented yet. Showing the first 10 voices.")
}

pub fn text_too_long(len: usize, max: usize) -> Reply {
    Reply::plain(format!(
        "❌ Text is too long! Maximum is {} characters.\nYour text: {} characters.",
        max, len
    ))
    .with_menu()
}

pub fn select_voice_first() -> Reply {
    Reply::plain("❌ Pick a voice first with /voices or the button below:").with_menu()
}

pub fn processing() -> Reply {
    Reply::plain("🎤 Processing your text...")
}

pub fn done() -> Reply {
    Reply::plain("Done! You can send the next text.").with_menu()
}

pub fn synthesis_failed() -> Reply {
    Reply::plain("❌ Failed to generate audio. Please try again.")
}

pub fn internal_failure() -> Reply {
    Reply::plain("❌ Something went wrong while handling your request. Please try again.")
        .with_menu()
}

pub fn audio_title(voice_name: &str) -> String {
    format!("Voice: {}", voice_name)
}

pub fn audio_caption(voice_name: &str, text: &str, excerpt_chars: usize) -> String {
    format!(
        "🎤 Voiced by: *{}*\n📝 {}",
        escape_markdown(voice_name),
        escape_markdown(&excerpt(text, excerpt_chars))
    )
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Escape the characters legacy Telegram Markdown treats as markup.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_marks_truncation() {
        assert_eq!(excerpt("Hello", 500), "Hello");
        let long = "a".repeat(501);
        let cut = excerpt(&long, 500);
        assert_eq!(cut.chars().count(), 503);
        assert!(cut.ends_with("..."));
        assert_eq!(excerpt(&"a".repeat(500), 500).len(), 500);
    }

    #[test]
    fn excerpt_counts_characters_not_bytes() {
        let text = "привет".repeat(100);
        let cut = excerpt(&text, 500);
        assert_eq!(cut.chars().count(), 503);
    }

    #[test]
    fn markdown_escaping() {
        assert_eq!(escape_markdown("a_b*c`d[e"), "a\\_b\\*c\\`d\\[e");
        assert_eq!(escape_markdown("plain"), "plain");
    }
}
