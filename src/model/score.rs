use serde::{Deserialize, Serialize};

/// MIDI channel 10 (zero-based 9) carries General MIDI percussion.
pub const PERCUSSION_CHANNEL: u8 = 9;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub midi: u8,
    pub velocity: u8,
    /// Release of this note. Chord members may end before their event does.
    pub end_tick: u64,
}

/// One onset in a part. Several notes sharing a start tick form an explicit chord.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NoteEvent {
    pub start_tick: u64,
    /// Latest release among the event's notes.
    pub end_tick: u64,
    /// Ascending by pitch.
    pub notes: Vec<Note>,
}

impl NoteEvent {
    pub fn is_chord(&self) -> bool {
        self.notes.len() >= 2
    }

    pub fn pitches(&self) -> Vec<u8> {
        self.notes.iter().map(|n| n.midi).collect()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Part {
    pub instrument: String,
    pub channel: Option<u8>,
    pub events: Vec<NoteEvent>,
}

impl Part {
    pub fn is_percussion(&self) -> bool {
        self.channel == Some(PERCUSSION_CHANNEL)
    }

    /// Every sounding pitch in the part, chord members included.
    pub fn pitches(&self) -> impl Iterator<Item = u8> + '_ {
        self.events
            .iter()
            .flat_map(|e| e.notes.iter().map(|n| n.midi))
    }

    pub fn note_count(&self) -> usize {
        self.events.iter().map(|e| e.notes.len()).sum()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySignature {
    /// Positive for sharps, negative for flats.
    pub sharps: i8,
    pub minor: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub tempo_bpm: Option<f64>,
    pub key_signature: Option<KeySignature>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Score {
    pub metadata: Metadata,
    pub ticks_per_quarter: u16,
    pub parts: Vec<Part>,
}

impl Score {
    pub fn beats(&self, tick: u64) -> f64 {
        tick as f64 / f64::from(self.ticks_per_quarter.max(1))
    }

    /// Parts with definite pitch. Percussion parts are left out.
    pub fn pitched_parts(&self) -> impl Iterator<Item = &Part> + '_ {
        self.parts.iter().filter(|p| !p.is_percussion())
    }

    /// Events of every pitched part on one timeline, ordered by start tick.
    /// Ties keep part order, then event order.
    pub fn flatten(&self) -> Vec<&NoteEvent> {
        let mut events: Vec<&NoteEvent> =
            self.pitched_parts().flat_map(|p| p.events.iter()).collect();
        events.sort_by_key(|e| e.start_tick);
        events
    }
}
