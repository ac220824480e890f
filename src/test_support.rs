//! In-memory Standard MIDI File fixtures for unit tests.

use base64::{Engine as _, engine::general_purpose};
use midly::num::{u4, u7, u15, u24, u28};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};

pub const TICKS_PER_QUARTER: u16 = 480;
pub const EPSILON: f64 = 1e-9;

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}

pub fn encode(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// One track of `(pitch, start_tick, length_ticks)` notes on a single channel.
#[derive(Debug, Clone)]
pub struct TestTrack {
    channel: u8,
    notes: Vec<(u8, u64, u64)>,
    name: Option<&'static str>,
    program: Option<u8>,
    key_signature: Option<(i8, bool)>,
    left_open: Vec<u8>,
}

impl TestTrack {
    pub fn new(channel: u8, notes: &[(u8, u64, u64)]) -> Self {
        Self {
            channel,
            notes: notes.to_vec(),
            name: None,
            program: None,
            key_signature: None,
            left_open: Vec::new(),
        }
    }

    /// Block chords of equal length, one after another from tick 0.
    pub fn block_chords(channel: u8, chords: &[&[u8]], length: u64) -> Self {
        let notes: Vec<(u8, u64, u64)> = chords
            .iter()
            .enumerate()
            .flat_map(|(i, chord)| chord.iter().map(move |&p| (p, i as u64 * length, length)))
            .collect();
        Self::new(channel, &notes)
    }

    /// Single notes of equal length, one after another from tick 0.
    pub fn line(channel: u8, pitches: &[u8], length: u64) -> Self {
        let notes: Vec<(u8, u64, u64)> = pitches
            .iter()
            .enumerate()
            .map(|(i, &p)| (p, i as u64 * length, length))
            .collect();
        Self::new(channel, &notes)
    }

    pub fn named(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    pub fn program(mut self, program: u8) -> Self {
        self.program = Some(program);
        self
    }

    pub fn key_signature(mut self, sharps: i8, minor: bool) -> Self {
        self.key_signature = Some((sharps, minor));
        self
    }

    /// Drop the note-off of every note with this pitch.
    pub fn leave_open(mut self, pitch: u8) -> Self {
        self.left_open.push(pitch);
        self
    }

    fn to_track(&self) -> Track<'static> {
        let mut track: Track<'static> = Vec::new();
        let channel = u4::new(self.channel);

        if let Some(name) = self.name {
            track.push(meta(MetaMessage::TrackName(name.as_bytes())));
        }
        if let Some((sharps, minor)) = self.key_signature {
            track.push(meta(MetaMessage::KeySignature(sharps, minor)));
        }
        if let Some(program) = self.program {
            track.push(TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::ProgramChange {
                        program: u7::new(program),
                    },
                },
            });
        }

        // note-offs sort before note-ons on the same tick
        let mut timed: Vec<(u64, u8, MidiMessage)> = Vec::new();
        for &(pitch, start, length) in &self.notes {
            timed.push((
                start,
                1,
                MidiMessage::NoteOn {
                    key: u7::new(pitch),
                    vel: u7::new(80),
                },
            ));
            if !self.left_open.contains(&pitch) {
                timed.push((
                    start + length,
                    0,
                    MidiMessage::NoteOff {
                        key: u7::new(pitch),
                        vel: u7::new(0),
                    },
                ));
            }
        }
        timed.sort_by_key(|(tick, order, _)| (*tick, *order));

        let mut last_tick = 0;
        for (tick, _, message) in timed {
            track.push(TrackEvent {
                delta: u28::new((tick - last_tick) as u32),
                kind: TrackEventKind::Midi { channel, message },
            });
            last_tick = tick;
        }

        track.push(meta(MetaMessage::EndOfTrack));
        track
    }
}

fn meta(message: MetaMessage<'static>) -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(message),
    }
}

fn write(smf: &Smf<'_>) -> Vec<u8> {
    let mut buf = Vec::new();
    smf.write_std(&mut buf).unwrap();
    buf
}

/// Format 1 file: a named conductor track followed by one track per `TestTrack`.
pub fn smf_bytes(tracks: &[TestTrack]) -> Vec<u8> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    smf.tracks.push(vec![
        meta(MetaMessage::TrackName(b"Conductor")),
        meta(MetaMessage::Tempo(u24::new(500_000))),
        meta(MetaMessage::EndOfTrack),
    ]);
    smf.tracks.extend(tracks.iter().map(TestTrack::to_track));

    write(&smf)
}

/// Format 0 file from `(channel, pitch, start_tick, length_ticks)` notes.
pub fn single_track_smf_bytes(notes: &[(u8, u8, u64, u64)]) -> Vec<u8> {
    let mut timed: Vec<(u64, u8, u8, MidiMessage)> = Vec::new();
    for &(channel, pitch, start, length) in notes {
        timed.push((
            start,
            1,
            channel,
            MidiMessage::NoteOn {
                key: u7::new(pitch),
                vel: u7::new(80),
            },
        ));
        timed.push((
            start + length,
            0,
            channel,
            MidiMessage::NoteOff {
                key: u7::new(pitch),
                vel: u7::new(0),
            },
        ));
    }
    timed.sort_by_key(|(tick, order, _, _)| (*tick, *order));

    let mut track: Track<'static> = vec![meta(MetaMessage::Tempo(u24::new(500_000)))];
    let mut last_tick = 0;
    for (tick, _, channel, message) in timed {
        track.push(TrackEvent {
            delta: u28::new((tick - last_tick) as u32),
            kind: TrackEventKind::Midi {
                channel: u4::new(channel),
                message,
            },
        });
        last_tick = tick;
    }
    track.push(meta(MetaMessage::EndOfTrack));

    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));
    smf.tracks.push(track);

    write(&smf)
}

pub fn encoded_smf(tracks: &[TestTrack]) -> String {
    encode(&smf_bytes(tracks))
}
