use crate::analysis::chords::{VerticalSlice, vertical_slices};
use crate::model::score::{Part, Score};
use log::debug;
use serde::{Deserialize, Serialize};

/// Parts averaging below C3 play the bass.
pub const BASS_CEILING: f64 = 48.0;

/// Parts averaging above C5 carry the melody.
pub const MELODY_FLOOR: f64 = 72.0;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Bass,
    Melody,
    Chords,
    Unknown,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    #[serde(alias = "chords_only")]
    Chords,
    ChordsAndMelody,
    FullArrangement,
    MelodyOnly,
    Unknown,
}

impl ContentType {
    pub fn name(&self) -> &'static str {
        match self {
            ContentType::Chords => "chords",
            ContentType::ChordsAndMelody => "chords_and_melody",
            ContentType::FullArrangement => "full_arrangement",
            ContentType::MelodyOnly => "melody_only",
            ContentType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PartAnalysis {
    pub instrument: String,
    pub note_count: usize,
    pub average_pitch: Option<f64>,
    pub pitch_range: Option<u8>,
    pub role: Role,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContentAnalysis {
    pub num_parts: usize,
    pub has_bass: bool,
    pub has_melody: bool,
    pub has_chords: bool,
    pub parts: Vec<PartAnalysis>,
    pub detected_type: ContentType,
}

impl PartAnalysis {
    fn without_role(part: &Part) -> Self {
        PartAnalysis {
            instrument: part.instrument.clone(),
            note_count: part.note_count(),
            average_pitch: None,
            pitch_range: None,
            role: Role::Unknown,
        }
    }
}

/// Register decides bass and melody outright. A mid-register part is chordal
/// if it ever sounds two pitches at once, otherwise it is a melody. A part is
/// given one role for its whole length.
/// Percussion parts are recorded without statistics or a role.
pub fn classify_part(part: &Part) -> PartAnalysis {
    if part.is_percussion() {
        return PartAnalysis::without_role(part);
    }

    let pitches: Vec<u8> = part.pitches().collect();

    let (Some(&min), Some(&max)) = (pitches.iter().min(), pitches.iter().max()) else {
        return PartAnalysis::without_role(part);
    };

    let average = pitches.iter().map(|&p| f64::from(p)).sum::<f64>() / pitches.len() as f64;

    let role = if average < BASS_CEILING {
        Role::Bass
    } else if average > MELODY_FLOOR {
        Role::Melody
    } else if vertical_slices(&part.events).iter().any(VerticalSlice::is_chord) {
        Role::Chords
    } else {
        Role::Melody
    };

    PartAnalysis {
        instrument: part.instrument.clone(),
        note_count: pitches.len(),
        average_pitch: Some(average),
        pitch_range: Some(max - min),
        role,
    }
}

pub fn content_type_for(has_bass: bool, has_melody: bool, has_chords: bool) -> ContentType {
    match (has_chords, has_melody, has_bass) {
        (true, true, true) => ContentType::FullArrangement,
        (true, true, false) => ContentType::ChordsAndMelody,
        (true, false, _) => ContentType::Chords,
        (false, true, _) => ContentType::MelodyOnly,
        (false, false, _) => ContentType::Unknown,
    }
}

pub fn analyze_content_type(score: &Score) -> ContentAnalysis {
    let parts: Vec<PartAnalysis> = score.parts.iter().map(classify_part).collect();

    let has_role = |role: Role| parts.iter().any(|p| p.role == role);
    let (has_bass, has_melody, has_chords) =
        (has_role(Role::Bass), has_role(Role::Melody), has_role(Role::Chords));
    let detected_type = content_type_for(has_bass, has_melody, has_chords);

    debug!(
        "Content: {} part(s), bass={} melody={} chords={} -> {}",
        parts.len(),
        has_bass,
        has_melody,
        has_chords,
        detected_type
    );

    ContentAnalysis {
        num_parts: parts.len(),
        has_bass,
        has_melody,
        has_chords,
        parts,
        detected_type,
    }
}
