use crate::midi_importer::decode_base64_score;
use crate::model::expectation::GenerationOutput;
use crate::model::result::ScoreResult;
use crate::model::score::Score;
use anyhow::Context;
use log::{debug, warn};
use serde::Serialize;

mod chord;
mod content;
mod key;

pub use chord::*;
pub use content::*;
pub use key::*;

pub const NO_DATA_REASON: &str = "No MIDI data in output";

pub trait Scorer {
    type Diagnostics: Serialize + Default;

    /// Short name used in logs and CLI output.
    fn name(&self) -> &'static str;

    /// Grade an already decoded score against this expectation.
    fn evaluate(&self, score: &Score) -> anyhow::Result<ScoreResult<Self::Diagnostics>>;

    /// Diagnostics reported when nothing could be analyzed. Only the
    /// expectation side is known at that point.
    fn failed_details(&self) -> Self::Diagnostics {
        Self::Diagnostics::default()
    }

    /// Decode and grade a generation output. Never fails: a missing payload,
    /// a decode error or an analysis error all become a zero score with a reason.
    fn score(&self, output: &GenerationOutput) -> ScoreResult<Self::Diagnostics> {
        let Some(payload) = output.payload() else {
            debug!("[{}] {}", self.name(), NO_DATA_REASON);
            return ScoreResult::failed(NO_DATA_REASON, self.failed_details());
        };

        let result = decode_base64_score(payload)
            .context("Error parsing MIDI")
            .and_then(|score| self.evaluate(&score));

        match result {
            Ok(result) => {
                debug!("[{}] scored {:.3}", self.name(), result.score());
                result
            }
            Err(e) => {
                warn!("[{}] scoring failed: {:#}", self.name(), e);
                ScoreResult::failed(format!("{e:#}"), self.failed_details())
            }
        }
    }
}
