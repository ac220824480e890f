use crate::model::expectation::GenerationOutput;
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerSelection {
    Chords,
    Key,
    Content,
    All,
}

impl ScorerSelection {
    pub fn includes(&self, other: ScorerSelection) -> bool {
        *self == ScorerSelection::All || *self == other
    }
}

pub fn parse_scorer(s: &str) -> ScorerSelection {
    match s.to_lowercase().as_str() {
        "c" | "chord" | "chords" => ScorerSelection::Chords,
        "k" | "key" | "scale" => ScorerSelection::Key,
        "t" | "content" | "texture" => ScorerSelection::Content,
        "a" | "all" => ScorerSelection::All,
        other => {
            info!("Unknown scorer '{}', defaulting to `all`..!", other);
            ScorerSelection::All
        }
    }
}

/// Load the file to grade as a generation output, encoding raw MIDI bytes as base64.
pub fn load_output<P: AsRef<Path>>(path: P, is_base64: bool) -> Result<GenerationOutput> {
    let path = path.as_ref();

    if is_base64 {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read base64 file {}", path.display()))?;
        return Ok(GenerationOutput::from_encoded(text));
    }

    let bytes =
        fs::read(path).with_context(|| format!("Failed to read MIDI file {}", path.display()))?;
    Ok(GenerationOutput::from_midi_bytes(&bytes))
}

/// Read the expectation mapping, or an empty one so every criterion takes its default.
pub fn load_expectations<P: AsRef<Path>>(path: Option<P>) -> Result<serde_json::Value> {
    let Some(path) = path else {
        return Ok(serde_json::Value::Object(Default::default()));
    };
    let path = path.as_ref();

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read expectations {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Expectations in {} are not valid JSON", path.display()))?;

    anyhow::ensure!(
        value.is_object(),
        "Expectations in {} must be a JSON object",
        path.display()
    );

    Ok(value)
}
