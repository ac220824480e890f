use crate::analysis::chords::ChordEvent;
use crate::analysis::content::{ContentAnalysis, ContentType};
use serde::Serialize;

/// Outcome of one scoring call: a score in `[0, 1]`, an optional explanation,
/// and scorer-specific diagnostics flattened next to them when serialized.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ScoreResult<D> {
    score: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,

    #[serde(flatten)]
    details: D,
}

impl<D> ScoreResult<D> {
    pub fn new(score: f64, details: D) -> Self {
        let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
        Self {
            score,
            reason: None,
            details,
        }
    }

    pub fn with_reason(self, reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..self
        }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn details(&self) -> &D {
        &self.details
    }

    pub fn failed(reason: impl Into<String>, details: D) -> Self {
        Self::new(0.0, details).with_reason(reason)
    }

    pub fn map_details<E>(self, f: impl FnOnce(D) -> E) -> ScoreResult<E> {
        ScoreResult {
            score: self.score,
            reason: self.reason,
            details: f(self.details),
        }
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct ChordDiagnostics {
    pub chords_found: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_required: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chords: Vec<ChordEvent>,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct KeyDiagnostics {
    pub detected_key: Option<String>,
    pub expected_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tonic_match: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode_match: Option<bool>,
    /// Key signature written in the file, if any. Never affects the score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_key: Option<String>,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct ContentDiagnostics {
    pub detected_type: Option<ContentType>,
    pub expected_type: Option<ContentType>,
    pub analysis: Option<ContentAnalysis>,
}
