use crate::model::score::*;
use base64::{Engine as _, engine::general_purpose};
use log::{debug, warn};
use midly::{Format, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use std::collections::BTreeMap;
use thiserror::Error;

const DEFAULT_MPQN: u32 = 500_000;
const MICROSECONDS_PER_MINUTE: f64 = 60_000_000.0;

/// General MIDI program families, eight programs each.
const GM_FAMILIES: [&str; 16] = [
    "Piano",
    "Chromatic Percussion",
    "Organ",
    "Guitar",
    "Bass",
    "Strings",
    "Ensemble",
    "Brass",
    "Reed",
    "Pipe",
    "Synth Lead",
    "Synth Pad",
    "Synth Effects",
    "Ethnic",
    "Percussive",
    "Sound Effects",
];

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("failed to parse MIDI: {0}")]
    InvalidMidi(String),

    #[error("SMPTE timecode MIDI timing is not supported")]
    UnsupportedTiming,
}

struct NoteInterval {
    pub midi: u8,
    pub start_tick: u64,
    pub end_tick: u64,
    pub velocity: u8,
    pub channel: u8,
}

#[derive(Default)]
struct TrackScan {
    name: Option<String>,
    programs: BTreeMap<u8, u8>,
    intervals: Vec<NoteInterval>,
}

/// Decode a base64 transported Standard MIDI File. ASCII whitespace (line wrapping) is ignored.
pub fn decode_base64_score(encoded: &str) -> Result<Score, DecodeError> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = general_purpose::STANDARD.decode(compact.as_bytes())?;

    decode_midi_bytes(&bytes)
}

pub fn decode_midi_bytes(bytes: &[u8]) -> Result<Score, DecodeError> {
    let smf = Smf::parse(bytes).map_err(|e| DecodeError::InvalidMidi(e.to_string()))?;

    let ticks_per_quarter = match smf.header.timing {
        Timing::Metrical(t) => t.as_int(),
        Timing::Timecode(_fps, _subframe) => return Err(DecodeError::UnsupportedTiming),
    };

    debug!("Ticks per quarter note: {}", ticks_per_quarter);
    debug!(
        "MIDI format: {:?}, tracks: {}",
        smf.header.format,
        smf.tracks.len()
    );

    let mut metadata = Metadata::default();
    let mut first_mpqn: Option<u32> = None;
    let scans: Vec<TrackScan> = smf
        .tracks
        .iter()
        .enumerate()
        .map(|(track_idx, track)| {
            scan_track(
                track,
                track_idx,
                u64::from(ticks_per_quarter),
                &mut metadata,
                &mut first_mpqn,
            )
        })
        .collect();

    metadata.title = scans.first().and_then(|scan| scan.name.clone());
    metadata.tempo_bpm =
        Some(MICROSECONDS_PER_MINUTE / f64::from(first_mpqn.unwrap_or(DEFAULT_MPQN)));

    let parts = match smf.header.format {
        Format::SingleTrack => split_by_channel(scans),
        Format::Parallel | Format::Sequential => parts_per_track(scans),
    };

    debug!("Decoded {} part(s)", parts.len());

    Ok(Score {
        metadata,
        ticks_per_quarter,
        parts,
    })
}

fn scan_track(
    track: &[TrackEvent<'_>],
    track_idx: usize,
    ticks_per_quarter: u64,
    metadata: &mut Metadata,
    first_mpqn: &mut Option<u32>,
) -> TrackScan {
    let mut scan = TrackScan::default();
    let mut open_notes: BTreeMap<(u8, u8), Vec<(u64, u8)>> = BTreeMap::new();
    let mut abs_tick: u64 = 0;

    for event in track.iter() {
        abs_tick = abs_tick.saturating_add(u64::from(event.delta.as_int()));

        match &event.kind {
            TrackEventKind::Meta(meta) => match meta {
                MetaMessage::Tempo(micro) => {
                    let mpqn: u32 = micro.as_int();
                    debug!(
                        "Tempo at tick {} -> {} us/qn (track {})",
                        abs_tick, mpqn, track_idx
                    );
                    first_mpqn.get_or_insert(mpqn);
                }
                MetaMessage::TrackName(bytes) | MetaMessage::InstrumentName(bytes) => {
                    if scan.name.is_none() {
                        let name = String::from_utf8_lossy(bytes).trim().to_string();
                        if !name.is_empty() {
                            debug!("Track {} name: {}", track_idx, name);
                            scan.name = Some(name);
                        }
                    }
                }
                MetaMessage::KeySignature(sharps, minor) => {
                    if metadata.key_signature.is_none() {
                        metadata.key_signature = Some(KeySignature {
                            sharps: *sharps,
                            minor: *minor,
                        });
                    }
                }
                _ => {}
            },
            TrackEventKind::Midi { channel, message } => {
                let ch: u8 = channel.as_int();

                match message {
                    MidiMessage::NoteOn { key, vel } => {
                        let velocity: u8 = vel.as_int();

                        if velocity == 0 {
                            close_note(
                                &mut open_notes,
                                &mut scan.intervals,
                                ch,
                                key.as_int(),
                                abs_tick,
                            );
                        } else {
                            open_notes
                                .entry((ch, key.as_int()))
                                .or_default()
                                .push((abs_tick, velocity));
                        }
                    }
                    MidiMessage::NoteOff { key, vel: _ } => {
                        close_note(
                            &mut open_notes,
                            &mut scan.intervals,
                            ch,
                            key.as_int(),
                            abs_tick,
                        );
                    }
                    MidiMessage::ProgramChange { program } => {
                        scan.programs.entry(ch).or_insert(program.as_int());
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    for ((ch, key), stack) in open_notes.into_iter() {
        for (start_tick, velocity) in stack {
            let end_tick = if abs_tick > start_tick {
                abs_tick
            } else {
                start_tick + ticks_per_quarter
            };

            warn!(
                "Unclosed NoteOn for {}, channel: {} at tick: {} auto-closing at: {}..!",
                key, ch, start_tick, end_tick
            );

            scan.intervals.push(NoteInterval {
                midi: key,
                start_tick,
                end_tick,
                velocity,
                channel: ch,
            });
        }
    }

    scan
}

fn close_note(
    open_notes: &mut BTreeMap<(u8, u8), Vec<(u64, u8)>>,
    intervals: &mut Vec<NoteInterval>,
    ch: u8,
    midi_num: u8,
    abs_tick: u64,
) {
    let Some((start_tick, velocity)) = open_notes.get_mut(&(ch, midi_num)).and_then(|s| s.pop())
    else {
        debug!(
            "Orphaned NoteOff for {} ch{} at tick {}..!",
            midi_num, ch, abs_tick
        );
        return;
    };

    intervals.push(NoteInterval {
        midi: midi_num,
        start_tick,
        end_tick: abs_tick,
        velocity,
        channel: ch,
    });
}

fn parts_per_track(scans: Vec<TrackScan>) -> Vec<Part> {
    let track_count = scans.len();

    scans
        .into_iter()
        .enumerate()
        .filter(|(idx, scan)| {
            // a leading conductor track only carries tempo and meta events
            !(*idx == 0 && track_count > 1 && scan.intervals.is_empty())
        })
        .map(|(_, scan)| {
            let channel = scan
                .intervals
                .first()
                .map(|i| i.channel)
                .or_else(|| scan.programs.keys().next().copied());
            let program = channel.and_then(|ch| scan.programs.get(&ch).copied());

            Part {
                instrument: instrument_label(scan.name.as_deref(), program, channel),
                channel,
                events: group_onsets(scan.intervals),
            }
        })
        .collect()
}

fn split_by_channel(scans: Vec<TrackScan>) -> Vec<Part> {
    let mut parts = Vec::new();

    for scan in scans {
        let mut by_channel: BTreeMap<u8, Vec<NoteInterval>> = BTreeMap::new();
        for interval in scan.intervals {
            by_channel.entry(interval.channel).or_default().push(interval);
        }

        let single_channel = by_channel.len() == 1;
        for (ch, intervals) in by_channel {
            let name = if single_channel { scan.name.as_deref() } else { None };
            parts.push(Part {
                instrument: instrument_label(name, scan.programs.get(&ch).copied(), Some(ch)),
                channel: Some(ch),
                events: group_onsets(intervals),
            });
        }
    }

    parts
}

/// Collapse intervals sharing a start tick into one event, so simultaneous attacks become a chord.
fn group_onsets(mut intervals: Vec<NoteInterval>) -> Vec<NoteEvent> {
    intervals.retain(|interval| {
        if interval.end_tick <= interval.start_tick {
            debug!(
                "Skipping zero-length note {} at tick {}..!",
                interval.midi, interval.start_tick
            );
            return false;
        }
        true
    });
    intervals.sort_by_key(|i| (i.start_tick, i.midi));

    let mut events: Vec<NoteEvent> = Vec::new();
    for interval in intervals {
        let note = Note {
            midi: interval.midi,
            velocity: interval.velocity,
            end_tick: interval.end_tick,
        };

        if let Some(last) = events.last_mut()
            && last.start_tick == interval.start_tick
        {
            last.end_tick = last.end_tick.max(interval.end_tick);
            match last.notes.last_mut() {
                // same pitch struck twice on different channels
                Some(prev) if prev.midi == note.midi => {
                    prev.velocity = prev.velocity.max(note.velocity);
                    prev.end_tick = prev.end_tick.max(note.end_tick);
                }
                _ => last.notes.push(note),
            }
            continue;
        }

        events.push(NoteEvent {
            start_tick: interval.start_tick,
            end_tick: interval.end_tick,
            notes: vec![note],
        });
    }

    events
}

fn instrument_label(name: Option<&str>, program: Option<u8>, channel: Option<u8>) -> String {
    if let Some(name) = name {
        return name.to_string();
    }
    if channel == Some(PERCUSSION_CHANNEL) {
        return "Percussion".into();
    }

    program
        .and_then(|p| GM_FAMILIES.get(usize::from(p) / 8))
        .map(|family| family.to_string())
        .unwrap_or_else(|| "Unknown".into())
}
