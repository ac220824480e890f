use crate::analysis::key::{KeyEstimate, detect_key, is_modal_scale, match_key};
use crate::model::expectation::{GenerationOutput, KeyExpectation};
use crate::model::result::{KeyDiagnostics, ScoreResult};
use crate::model::score::Score;
use crate::scorers::Scorer;
use anyhow::Context;

pub const MODAL_TONIC_SCORE: f64 = 0.8;
pub const EXACT_KEY_SCORE: f64 = 1.0;
pub const TONIC_ONLY_SCORE: f64 = 0.6;
pub const WRONG_TONIC_SCORE: f64 = 0.0;

impl KeyExpectation {
    fn describe(&self) -> String {
        format!("{} {}", self.tonic, self.scale)
    }

    /// Grade a key estimate. The first matching rule wins:
    /// modal scale with the right tonic, full match, right tonic only, wrong tonic.
    pub fn grade(&self, detected: &KeyEstimate) -> ScoreResult<KeyDiagnostics> {
        let matched = match_key(detected, &self.tonic, &self.scale);

        let diagnostics = KeyDiagnostics {
            detected_key: Some(detected.to_string()),
            expected_key: Some(self.describe()),
            tonic_match: Some(matched.tonic_match),
            mode_match: Some(matched.mode_match),
            declared_key: None,
        };

        if is_modal_scale(&self.scale) && matched.tonic_match {
            ScoreResult::new(MODAL_TONIC_SCORE, diagnostics)
                .with_reason("Tonic matches (modal detection is approximate)")
        } else if matched.tonic_match && matched.mode_match {
            ScoreResult::new(EXACT_KEY_SCORE, diagnostics)
        } else if matched.tonic_match {
            ScoreResult::new(TONIC_ONLY_SCORE, diagnostics)
                .with_reason("Tonic matches but mode differs")
        } else {
            ScoreResult::new(WRONG_TONIC_SCORE, diagnostics).with_reason("Tonic does not match")
        }
    }
}

impl Scorer for KeyExpectation {
    type Diagnostics = KeyDiagnostics;

    fn name(&self) -> &'static str {
        "key"
    }

    fn evaluate(&self, score: &Score) -> anyhow::Result<ScoreResult<KeyDiagnostics>> {
        let detected = detect_key(score).context("Error analyzing key")?;
        let declared_key = score
            .metadata
            .key_signature
            .map(|signature| KeyEstimate::from_signature(signature).to_string());

        Ok(self.grade(&detected).map_details(|details| KeyDiagnostics {
            declared_key,
            ..details
        }))
    }

    fn failed_details(&self) -> KeyDiagnostics {
        KeyDiagnostics {
            expected_key: Some(self.describe()),
            ..Default::default()
        }
    }
}

pub fn score_key_validation(
    output: &GenerationOutput,
    expected: &KeyExpectation,
) -> ScoreResult<KeyDiagnostics> {
    expected.score(output)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::analysis::key::Mode;
    use crate::scorers::NO_DATA_REASON;
    use crate::test_support::*;

    fn estimate(tonic: &str, mode: Mode) -> KeyEstimate {
        KeyEstimate {
            tonic: tonic.into(),
            mode,
        }
    }

    fn cadence(semitones: u8) -> GenerationOutput {
        let chords: Vec<Vec<u8>> = [[60u8, 64, 67], [60, 65, 69], [59, 62, 67], [60, 64, 67]]
            .iter()
            .map(|c| c.iter().map(|p| p + semitones).collect())
            .collect();
        let refs: Vec<&[u8]> = chords.iter().map(|c| c.as_slice()).collect();

        GenerationOutput::from_encoded(encoded_smf(&[TestTrack::block_chords(0, &refs, 480)]))
    }

    #[test]
    fn enharmonic_tonic_scores_full() {
        let result = KeyExpectation::new("Db", "major").grade(&estimate("C♯", Mode::Major));

        assert_eq!(result.score(), 1.0);
        assert_eq!(result.details().tonic_match, Some(true));
        assert_eq!(result.details().mode_match, Some(true));
        assert_eq!(result.details().detected_key.as_deref(), Some("C♯ major"));
        assert_eq!(result.details().expected_key.as_deref(), Some("Db major"));
    }

    #[test]
    fn scoring_policy_order() {
        let c_major = estimate("C", Mode::Major);

        assert_eq!(KeyExpectation::new("C", "dorian").grade(&c_major).score(), MODAL_TONIC_SCORE);
        assert_eq!(KeyExpectation::new("C", "major").grade(&c_major).score(), EXACT_KEY_SCORE);
        assert_eq!(KeyExpectation::new("C", "minor").grade(&c_major).score(), TONIC_ONLY_SCORE);
        assert_eq!(KeyExpectation::new("G", "major").grade(&c_major).score(), WRONG_TONIC_SCORE);
        assert_eq!(KeyExpectation::new("G", "lydian").grade(&c_major).score(), WRONG_TONIC_SCORE);
    }

    #[test]
    fn end_to_end_major_cadence() {
        env_logger::try_init().unwrap_or(());

        let result = score_key_validation(&cadence(1), &KeyExpectation::new("C#", "major"));
        assert_eq!(result.score(), 1.0);
        assert_eq!(result.details().detected_key.as_deref(), Some("Db major"));
        assert_eq!(result.details().declared_key, None);
    }

    #[test]
    fn end_to_end_modal_expectation() {
        env_logger::try_init().unwrap_or(());

        let melody = TestTrack::line(0, &[62, 64, 65, 67, 69, 71, 72, 74, 62, 69, 62], 480)
            .key_signature(0, false);
        let output = GenerationOutput::from_encoded(encoded_smf(&[melody]));

        let result = score_key_validation(&output, &KeyExpectation::new("D", "Dorian"));
        assert!(approx_eq(result.score(), MODAL_TONIC_SCORE));
        assert_eq!(result.reason(), Some("Tonic matches (modal detection is approximate)"));
        assert_eq!(result.details().detected_key.as_deref(), Some("D minor"));
        assert_eq!(result.details().declared_key.as_deref(), Some("C major"));
    }

    #[test]
    fn analysis_failure_is_contained() {
        env_logger::try_init().unwrap_or(());

        let drums =
            GenerationOutput::from_encoded(encoded_smf(&[TestTrack::line(9, &[36, 38], 480)]));
        let result = score_key_validation(&drums, &KeyExpectation::new("C", "major"));

        assert_eq!(result.score(), 0.0);
        assert!(result.reason().unwrap().starts_with("Error analyzing key"));
        assert_eq!(result.details().detected_key, None);
        assert_eq!(result.details().expected_key.as_deref(), Some("C major"));
    }

    #[test]
    fn missing_payload() {
        let expected = KeyExpectation::new("C", "major");
        let result = score_key_validation(&GenerationOutput::default(), &expected);
        assert_eq!(result.score(), 0.0);
        assert_eq!(result.reason(), Some(NO_DATA_REASON));
        assert_eq!(result.details().expected_key.as_deref(), Some("C major"));
    }
}
