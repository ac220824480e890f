use crate::analysis::chords::extract_chords;
use crate::model::expectation::{ChordExpectation, GenerationOutput};
use crate::model::result::{ChordDiagnostics, ScoreResult};
use crate::model::score::Score;
use crate::scorers::Scorer;

/// Ceiling when seventh chords were required but none appeared.
pub const MISSING_SEVENTHS_CAP: f64 = 0.5;

impl Scorer for ChordExpectation {
    type Diagnostics = ChordDiagnostics;

    fn name(&self) -> &'static str {
        "chords"
    }

    fn evaluate(&self, score: &Score) -> anyhow::Result<ScoreResult<ChordDiagnostics>> {
        let chords = extract_chords(score);
        let chords_found = chords.len();

        if chords_found == 0 {
            return Ok(ScoreResult::failed("No chords detected", self.failed_details()));
        }

        let has_sevenths = chords.iter().any(|c| c.is_seventh());
        let diagnostics = ChordDiagnostics {
            chords_found,
            min_required: Some(self.min_chords),
            chords,
        };

        if self.requires_sevenths && !has_sevenths {
            return Ok(ScoreResult::new(MISSING_SEVENTHS_CAP, diagnostics)
                .with_reason("Missing required 7th chords"));
        }

        let min_chords = self.min_chords as usize;
        if chords_found >= min_chords {
            return Ok(ScoreResult::new(1.0, diagnostics));
        }

        Ok(
            ScoreResult::new(chords_found as f64 / min_chords as f64, diagnostics).with_reason(
                format!("Found {} of {} required chords", chords_found, min_chords),
            ),
        )
    }

    fn failed_details(&self) -> ChordDiagnostics {
        ChordDiagnostics {
            min_required: Some(self.min_chords),
            ..Default::default()
        }
    }
}

pub fn score_chord_detection(
    output: &GenerationOutput,
    expected: &ChordExpectation,
) -> ScoreResult<ChordDiagnostics> {
    expected.score(output)
}
