use crate::model::pitch::{PITCH_CLASS_NAMES, SEMITONES, pitch_class, pitch_name};
use crate::model::score::{NoteEvent, Score};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Marker that identifies a seventh chord in a symbol.
pub const SEVENTH_MARKER: char = '7';

/// Fewest simultaneous pitches that count as a chord.
pub const MIN_CHORD_PITCHES: usize = 2;

/// Pitch-class interval sets (relative to the root) and their lead-sheet suffix.
const CHORD_TEMPLATES: &[(&[usize], &str)] = &[
    (&[0, 4, 7, 10], "7"),
    (&[0, 4, 7, 11], "maj7"),
    (&[0, 3, 7, 10], "m7"),
    (&[0, 3, 6, 10], "m7b5"),
    (&[0, 3, 6, 9], "dim7"),
    (&[0, 3, 7, 11], "mMaj7"),
    (&[0, 4, 7, 9], "6"),
    (&[0, 3, 7, 9], "m6"),
    (&[0, 4, 7], ""),
    (&[0, 3, 7], "m"),
    (&[0, 3, 6], "dim"),
    (&[0, 4, 8], "aug"),
    (&[0, 2, 7], "sus2"),
    (&[0, 5, 7], "sus4"),
    (&[0, 7], "5"),
];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChordEvent {
    /// Offset in quarter-note beats.
    pub beat: f64,
    pub symbol: String,
    /// Octave-qualified pitch names, lowest first.
    pub pitches: Vec<String>,
}

impl ChordEvent {
    pub fn is_seventh(&self) -> bool {
        self.symbol.contains(SEVENTH_MARKER)
    }
}

/// Notes sounding together over one stretch of the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalSlice {
    pub start_tick: u64,
    pub end_tick: u64,
    /// Ascending, no duplicates.
    pub pitches: Vec<u8>,
}

impl VerticalSlice {
    pub fn is_chord(&self) -> bool {
        self.pitches.len() >= MIN_CHORD_PITCHES
    }
}

/// Canonical lead-sheet name for a set of pitches.
///
/// Candidate roots are tried from the bass upward so inversions name their real
/// root while ambiguous sets (C6 / Am7) favour the bass. Sets no template covers
/// are named by their pitch classes, e.g. `C+E+F#`.
pub fn chord_symbol(pitches: &[u8]) -> String {
    let mut ordered: Vec<u8> = pitches.to_vec();
    ordered.sort_unstable();

    let classes: BTreeSet<usize> = ordered.iter().map(|&p| pitch_class(p)).collect();

    let mut roots: Vec<usize> = Vec::new();
    for &p in &ordered {
        let pc = pitch_class(p);
        if !roots.contains(&pc) {
            roots.push(pc);
        }
    }

    for &root in &roots {
        let template = CHORD_TEMPLATES.iter().find(|(intervals, _)| {
            intervals.len() == classes.len()
                && classes
                    .iter()
                    .all(|&pc| intervals.contains(&((pc + SEMITONES - root) % SEMITONES)))
        });

        if let Some((_, suffix)) = template {
            return format!("{}{}", PITCH_CLASS_NAMES[root], suffix);
        }
    }

    roots
        .iter()
        .map(|&pc| PITCH_CLASS_NAMES[pc])
        .collect::<Vec<_>>()
        .join("+")
}

/// Cut notes at every attack and release and collect what sounds in each span.
/// Silent spans are omitted.
/// Notes are admitted in start order and dropped once released.
pub fn vertical_slices<'a, I>(events: I) -> Vec<VerticalSlice>
where
    I: IntoIterator<Item = &'a NoteEvent>,
{
    // (start, end, pitch) of every note, ordered by start
    let mut notes: Vec<(u64, u64, u8)> = events
        .into_iter()
        .flat_map(|e| e.notes.iter().map(move |n| (e.start_tick, n.end_tick, n.midi)))
        .filter(|&(start, end, _)| end > start)
        .collect();
    notes.sort_unstable();

    let boundaries: BTreeSet<u64> = notes
        .iter()
        .flat_map(|&(start, end, _)| [start, end])
        .collect();
    let boundaries: Vec<u64> = boundaries.into_iter().collect();

    let mut next = 0;
    let mut held: Vec<(u64, u8)> = Vec::new();
    let mut slices = Vec::new();

    for span in boundaries.windows(2) {
        let (start_tick, end_tick) = (span[0], span[1]);

        while let Some(&(start, end, midi)) = notes.get(next)
            && start <= start_tick
        {
            held.push((end, midi));
            next += 1;
        }
        held.retain(|&(end, _)| end > start_tick);

        if held.is_empty() {
            continue;
        }

        let sounding: BTreeSet<u8> = held.iter().map(|&(_, midi)| midi).collect();
        slices.push(VerticalSlice {
            start_tick,
            end_tick,
            pitches: sounding.into_iter().collect(),
        });
    }

    slices
}

fn chord_event(score: &Score, start_tick: u64, pitches: &[u8]) -> ChordEvent {
    ChordEvent {
        beat: score.beats(start_tick),
        symbol: chord_symbol(pitches),
        pitches: pitches.iter().map(|&p| pitch_name(p)).collect(),
    }
}

/// Chords of a score, in timeline order.
///
/// Explicit chord events win. Only when there are none is the timeline sliced
/// vertically, and the two sources are never merged.
pub fn extract_chords(score: &Score) -> Vec<ChordEvent> {
    let timeline = score.flatten();

    let explicit: Vec<ChordEvent> = timeline
        .iter()
        .filter(|e| e.is_chord())
        .map(|e| chord_event(score, e.start_tick, &e.pitches()))
        .collect();

    if !explicit.is_empty() {
        debug!("Found {} explicit chord event(s)", explicit.len());
        return explicit;
    }

    let synthesized: Vec<ChordEvent> = vertical_slices(timeline)
        .into_iter()
        .filter(VerticalSlice::is_chord)
        .map(|slice| chord_event(score, slice.start_tick, &slice.pitches))
        .collect();

    debug!(
        "No explicit chords, synthesized {} from vertical slices",
        synthesized.len()
    );

    synthesized
}
