use crate::analysis::content::{ContentAnalysis, ContentType, analyze_content_type};
use crate::model::expectation::{ContentExpectation, GenerationOutput};
use crate::model::result::{ContentDiagnostics, ScoreResult};
use crate::model::score::Score;
use crate::scorers::Scorer;

pub const EXACT_CONTENT_SCORE: f64 = 1.0;

/// Credit for delivering more than was asked for.
pub const UPGRADE_SCORE: f64 = 0.9;

/// Requested type and the richer types that count as an upgrade.
const UPGRADE_PATHS: &[(ContentType, &[ContentType])] = &[
    (
        ContentType::Chords,
        &[ContentType::ChordsAndMelody, ContentType::FullArrangement],
    ),
    (ContentType::ChordsAndMelody, &[ContentType::FullArrangement]),
];

/// (requested, detected, credit) for near misses. Anything else scores zero.
const PARTIAL_CREDIT: &[(ContentType, ContentType, f64)] = &[
    (ContentType::Chords, ContentType::ChordsAndMelody, 0.7),
    (ContentType::Chords, ContentType::FullArrangement, 0.7),
    // missing melody
    (ContentType::ChordsAndMelody, ContentType::Chords, 0.5),
    // missing bass
    (ContentType::FullArrangement, ContentType::ChordsAndMelody, 0.7),
];

pub fn is_upgrade(expected: ContentType, detected: ContentType) -> bool {
    UPGRADE_PATHS
        .iter()
        .any(|(requested, richer)| *requested == expected && richer.contains(&detected))
}

pub fn partial_credit(expected: ContentType, detected: ContentType) -> f64 {
    PARTIAL_CREDIT
        .iter()
        .find(|(requested, got, _)| *requested == expected && *got == detected)
        .map(|(_, _, credit)| *credit)
        .unwrap_or(0.0)
}

impl ContentExpectation {
    pub fn grade(&self, analysis: ContentAnalysis) -> ScoreResult<ContentDiagnostics> {
        let expected = self.content_type;
        let detected = analysis.detected_type;
        let diagnostics = ContentDiagnostics {
            detected_type: Some(detected),
            expected_type: Some(expected),
            analysis: Some(analysis),
        };

        if detected == expected {
            ScoreResult::new(EXACT_CONTENT_SCORE, diagnostics)
        } else if is_upgrade(expected, detected) {
            ScoreResult::new(UPGRADE_SCORE, diagnostics)
                .with_reason("More content than requested (acceptable)")
        } else {
            ScoreResult::new(partial_credit(expected, detected), diagnostics)
                .with_reason(format!("Detected {}, expected {}", detected, expected))
        }
    }
}

impl Scorer for ContentExpectation {
    type Diagnostics = ContentDiagnostics;

    fn name(&self) -> &'static str {
        "content"
    }

    fn evaluate(&self, score: &Score) -> anyhow::Result<ScoreResult<ContentDiagnostics>> {
        Ok(self.grade(analyze_content_type(score)))
    }

    fn failed_details(&self) -> ContentDiagnostics {
        ContentDiagnostics {
            expected_type: Some(self.content_type),
            ..Default::default()
        }
    }
}

pub fn score_content_type(
    output: &GenerationOutput,
    expected: &ContentExpectation,
) -> ScoreResult<ContentDiagnostics> {
    expected.score(output)
}
