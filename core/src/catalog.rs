//! Static catalog of the provider's premade voices.
//!
//! The table is seed data, not a live registry: it is built once at startup
//! and never mutated. Lookups never fail loudly, they return `None`.

use serde::{Deserialize, Serialize};

/// Demographic labels attached to a voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceLabels {
    pub gender: String,
    pub age: String,
}

/// A provider-defined synthetic voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceIdentity {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub category: String,
    pub labels: VoiceLabels,
}

impl VoiceIdentity {
    fn premade(id: &str, name: &str, description: &str, gender: &str, age: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: name.to_string(),
            description: description.to_string(),
            category: "premade".to_string(),
            labels: VoiceLabels {
                gender: gender.to_string(),
                age: age.to_string(),
            },
        }
    }
}

/// Ordered, immutable list of voices.
#[derive(Debug, Clone)]
pub struct VoiceCatalog {
    voices: Vec<VoiceIdentity>,
}

impl Default for VoiceCatalog {
    fn default() -> Self {
        Self::premade()
    }
}

impl VoiceCatalog {
    /// Build a catalog from an explicit table. Order is preserved.
    pub fn new(voices: Vec<VoiceIdentity>) -> Self {
        Self { voices }
    }

    /// The ElevenLabs premade voices available to every account.
    pub fn premade() -> Self {
        Self::new(vec![
            VoiceIdentity::premade(
                "21m00Tcm4TlvDq8ikWAM",
                "Rachel",
                "Calm, soothing voice perfect for narration",
                "female",
                "young_adult",
            ),
            VoiceIdentity::premade(
                "AZnzlk1XvdvUeBnXmlld",
                "Domi",
                "Confident, strong voice with authority",
                "female",
                "middle_aged",
            ),
            VoiceIdentity::premade(
                "EXAVITQu4vr4xnSDxMaL",
                "Bella",
                "Warm, friendly voice with character",
                "female",
                "young_adult",
            ),
            VoiceIdentity::premade(
                "ErXwobaYiN019PkySvjV",
                "Antoni",
                "Professional, clear male voice",
                "male",
                "young_adult",
            ),
            VoiceIdentity::premade(
                "MF3mGyEYCl7XYWbV9V6O",
                "Elli",
                "Energetic, upbeat voice",
                "female",
                "young_adult",
            ),
            VoiceIdentity::premade(
                "TxGEqnHWrfWFTfGW9XjX",
                "Josh",
                "Deep, resonant male voice",
                "male",
                "adult",
            ),
            VoiceIdentity::premade(
                "VR6AewLTigWG4xSOukaG",
                "Arnold",
                "Strong, authoritative male voice",
                "male",
                "adult",
            ),
            VoiceIdentity::premade(
                "pNInz6obpgDQGcFmaJgB",
                "Adam",
                "Clear, professional male voice",
                "male",
                "young_adult",
            ),
            VoiceIdentity::premade(
                "yoZ06aMxZJJ28mfd3POQ",
                "Sam",
                "Friendly, approachable male voice",
                "male",
                "young_adult",
            ),
            VoiceIdentity::premade(
                "2EiwWnXFnvU5JabPnv8n",
                "Clyde",
                "Wise, mature male voice",
                "male",
                "senior",
            ),
        ])
    }

    pub fn list(&self) -> &[VoiceIdentity] {
        &self.voices
    }

    /// The first `n` voices, in catalog order.
    pub fn first_page(&self, n: usize) -> &[VoiceIdentity] {
        &self.voices[..n.min(self.voices.len())]
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&VoiceIdentity> {
        self.voices.iter().find(|v| v.id == id)
    }

    /// Case-insensitive exact match on the display name.
    pub fn find_by_name(&self, name: &str) -> Option<&VoiceIdentity> {
        let wanted = name.to_lowercase();
        self.voices
            .iter()
            .find(|v| v.display_name.to_lowercase() == wanted)
    }
}
