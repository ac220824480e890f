use crate::analysis::content::ContentType;
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_CHORDS: u32 = 4;
pub const DEFAULT_SCALE: &str = "major";

/// What the generation service handed back. Only the encoded score matters here.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOutput {
    /// Base64 text of a Standard MIDI File.
    #[serde(default, alias = "midi_base64")]
    pub encoded_score: Option<String>,
}

impl GenerationOutput {
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self {
            encoded_score: Some(encoded.into()),
        }
    }

    pub fn from_midi_bytes(bytes: &[u8]) -> Self {
        Self::from_encoded(general_purpose::STANDARD.encode(bytes))
    }

    /// The payload, if there is any non-blank text.
    pub fn payload(&self) -> Option<&str> {
        self.encoded_score
            .as_deref()
            .filter(|encoded| !encoded.trim().is_empty())
    }
}

fn default_min_chords() -> u32 {
    DEFAULT_MIN_CHORDS
}

fn default_scale() -> String {
    DEFAULT_SCALE.to_string()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChordExpectation {
    #[serde(default = "default_min_chords")]
    pub min_chords: u32,

    #[serde(default, alias = "requires_7ths")]
    pub requires_sevenths: bool,
}

impl Default for ChordExpectation {
    fn default() -> Self {
        Self {
            min_chords: DEFAULT_MIN_CHORDS,
            requires_sevenths: false,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KeyExpectation {
    #[serde(default, alias = "key")]
    pub tonic: String,

    #[serde(default = "default_scale")]
    pub scale: String,
}

impl KeyExpectation {
    pub fn new(tonic: impl Into<String>, scale: impl Into<String>) -> Self {
        Self {
            tonic: tonic.into(),
            scale: scale.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentExpectation {
    #[serde(default)]
    pub content_type: ContentType,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_from_an_empty_mapping() {
        let chords: ChordExpectation = serde_json::from_str("{}").unwrap();
        assert_eq!(chords, ChordExpectation::default());

        let key: KeyExpectation = serde_json::from_str(r#"{"tonic": "D"}"#).unwrap();
        assert_eq!(key.scale, "major");

        let content: ContentExpectation = serde_json::from_str("{}").unwrap();
        assert_eq!(content.content_type, ContentType::Chords);
    }

    #[test]
    fn one_mapping_feeds_every_expectation() {
        let raw = serde_json::json!({
            "min_chords": 8,
            "requires_7ths": true,
            "key": "Bb",
            "scale": "dorian",
            "content_type": "full_arrangement",
        });

        let chords: ChordExpectation = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(chords.min_chords, 8);
        assert!(chords.requires_sevenths);

        let key: KeyExpectation = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(key, KeyExpectation::new("Bb", "dorian"));

        let content: ContentExpectation = serde_json::from_value(raw).unwrap();
        assert_eq!(content.content_type, ContentType::FullArrangement);
    }

    #[test]
    fn legacy_names() {
        let content: ContentExpectation =
            serde_json::from_str(r#"{"content_type": "chords_only"}"#).unwrap();
        assert_eq!(content.content_type, ContentType::Chords);

        let output: GenerationOutput =
            serde_json::from_str(r#"{"midi_base64": "TVRoZA==", "status": "ok"}"#).unwrap();
        assert_eq!(output.payload(), Some("TVRoZA=="));
    }

    #[test]
    fn blank_payload_is_missing() {
        assert_eq!(GenerationOutput::default().payload(), None);
        assert_eq!(GenerationOutput::from_encoded("  \n").payload(), None);
    }
}
