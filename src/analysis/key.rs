use crate::model::pitch::{MAJOR_KEY_TONICS, MINOR_KEY_TONICS, SEMITONES, keys_match, pitch_class};
use crate::model::score::{KeySignature, Score};
use anyhow::{Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};

// Krumhansl-Kessler key profiles, tonic at index 0.
const KK_MAJOR: [f64; SEMITONES] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];
const KK_MINOR: [f64; SEMITONES] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Scale names whose mode a major/minor estimator cannot resolve.
pub const MODAL_SCALES: [&str; 6] = [
    "dorian",
    "phrygian",
    "lydian",
    "mixolydian",
    "aeolian",
    "locrian",
];

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct KeyEstimate {
    pub tonic: String,
    pub mode: Mode,
}

impl KeyEstimate {
    fn new(tonic_pc: usize, mode: Mode) -> Self {
        let tonic = match mode {
            Mode::Major => MAJOR_KEY_TONICS[tonic_pc],
            Mode::Minor => MINOR_KEY_TONICS[tonic_pc],
        };
        Self {
            tonic: tonic.to_string(),
            mode,
        }
    }

    /// The key a MIDI key-signature meta event declares.
    pub fn from_signature(signature: KeySignature) -> Self {
        // each sharp moves the major tonic a fifth up; relative minor sits a minor third below
        let major_pc = (i32::from(signature.sharps) * 7).rem_euclid(SEMITONES as i32) as usize;
        if signature.minor {
            Self::new((major_pc + 9) % SEMITONES, Mode::Minor)
        } else {
            Self::new(major_pc, Mode::Major)
        }
    }
}

impl std::fmt::Display for KeyEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.tonic, self.mode.name())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMatch {
    pub tonic_match: bool,
    pub mode_match: bool,
}

pub fn is_modal_scale(scale: &str) -> bool {
    let scale = scale.trim().to_lowercase();
    MODAL_SCALES.contains(&scale.as_str())
}

fn pearson(a: &[f64; SEMITONES], b: &[f64; SEMITONES]) -> f64 {
    let mean_a = a.iter().sum::<f64>() / SEMITONES as f64;
    let mean_b = b.iter().sum::<f64>() / SEMITONES as f64;

    let mut num = 0.0;
    let mut den_a = 0.0;
    let mut den_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let (dx, dy) = (x - mean_a, y - mean_b);
        num += dx * dy;
        den_a += dx * dx;
        den_b += dy * dy;
    }

    let den = (den_a * den_b).sqrt();
    if den <= f64::EPSILON { 0.0 } else { num / den }
}

/// Duration-weighted pitch-class histogram of every pitched (non-percussion) note.
pub fn pitch_class_histogram(score: &Score) -> [f64; SEMITONES] {
    let mut histogram = [0.0; SEMITONES];

    for part in score.pitched_parts() {
        for event in &part.events {
            for note in &event.notes {
                let held = note.end_tick.saturating_sub(event.start_tick);
                histogram[pitch_class(note.midi)] += score.beats(held);
            }
        }
    }

    histogram
}

/// Krumhansl-Schmuckler estimate: the rotation of the major or minor profile
/// that best correlates with the histogram. Ties go to the earlier key in
/// C major, C minor, C# major, ... order.
pub fn detect_key(score: &Score) -> Result<KeyEstimate> {
    let histogram = pitch_class_histogram(score);
    if histogram.iter().all(|&w| w <= 0.0) {
        bail!("no pitched notes to estimate a key from");
    }

    let mut best: Option<(f64, usize, Mode)> = None;
    for tonic in 0..SEMITONES {
        for (mode, profile) in [(Mode::Major, &KK_MAJOR), (Mode::Minor, &KK_MINOR)] {
            let mut rotated = [0.0; SEMITONES];
            for (pc, weight) in rotated.iter_mut().enumerate() {
                *weight = profile[(pc + SEMITONES - tonic) % SEMITONES];
            }

            let r = pearson(&histogram, &rotated);
            if best.is_none_or(|(best_r, _, _)| r > best_r) {
                best = Some((r, tonic, mode));
            }
        }
    }

    let Some((r, tonic, mode)) = best else {
        bail!("key correlation produced no candidates");
    };

    let estimate = KeyEstimate::new(tonic, mode);
    debug!("Estimated key {} (r = {:.3})", estimate, r);

    Ok(estimate)
}

/// Compare an estimate against an expected tonic and scale name.
pub fn match_key(detected: &KeyEstimate, expected_tonic: &str, expected_scale: &str) -> KeyMatch {
    KeyMatch {
        tonic_match: keys_match(&detected.tonic, expected_tonic),
        mode_match: detected.mode.name().eq_ignore_ascii_case(expected_scale.trim()),
    }
}
