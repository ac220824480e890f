pub const SEMITONES: usize = 12;

pub const SHARP: char = '♯';
pub const FLAT: char = '♭';

pub const PITCH_CLASS_NAMES: [&str; SEMITONES] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Tonic spellings as they appear in conventional key signatures.
pub const MAJOR_KEY_TONICS: [&str; SEMITONES] = [
    "C", "Db", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];
pub const MINOR_KEY_TONICS: [&str; SEMITONES] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "G#", "A", "Bb", "B",
];

/// Fixed enharmonic pairs, in normalized form.
pub const ENHARMONIC_PAIRS: [(&str, &str); 5] = [
    ("C♯", "D♭"),
    ("D♯", "E♭"),
    ("F♯", "G♭"),
    ("G♯", "A♭"),
    ("A♯", "B♭"),
];

const KEY_QUALIFIERS: [&str; 2] = [" MAJOR", " MINOR"];

pub fn pitch_class(midi: u8) -> usize {
    midi as usize % SEMITONES
}

/// Octave-qualified name, MIDI 60 is `C4`.
pub fn pitch_name(midi: u8) -> String {
    let octave = i32::from(midi) / 12 - 1;
    format!("{}{}", PITCH_CLASS_NAMES[pitch_class(midi)], octave)
}

/// Map ASCII and spelled-out accidentals to glyphs, uppercase, and collapse whitespace.
///
/// A lowercase `b` only reads as a flat after the note letter, so `bb` is B♭.
pub fn normalize_key_name(name: &str) -> String {
    let words = name
        .trim()
        .to_lowercase()
        .replace("sharp", &SHARP.to_string())
        .replace("flat", &FLAT.to_string());

    let mut out = String::with_capacity(words.len());
    let mut previous: Option<char> = None;
    for c in words.chars() {
        let after_letter =
            previous.is_some_and(|p| p.is_ascii_alphabetic() || p == FLAT || p == SHARP);
        match c {
            '#' => out.push(SHARP),
            '-' | 'b' if after_letter => out.push(FLAT),
            _ => out.extend(c.to_uppercase()),
        }
        previous = Some(c);
    }

    let collapsed = out.split_whitespace().collect::<Vec<_>>().join(" ");
    // "C ♯" from "C sharp" should read as "C♯"
    collapsed
        .replace(&format!(" {SHARP}"), &SHARP.to_string())
        .replace(&format!(" {FLAT}"), &FLAT.to_string())
}

fn strip_qualifier(normalized: &str) -> &str {
    KEY_QUALIFIERS
        .iter()
        .find_map(|q| normalized.strip_suffix(q))
        .unwrap_or(normalized)
}

pub fn enharmonic_partner(normalized: &str) -> Option<&'static str> {
    ENHARMONIC_PAIRS.iter().find_map(|(a, b)| {
        if *a == normalized {
            Some(*b)
        } else if *b == normalized {
            Some(*a)
        } else {
            None
        }
    })
}

/// Whether two tonic names denote the same key center.
pub fn keys_match(detected: &str, expected: &str) -> bool {
    let detected = normalize_key_name(detected);
    let expected = normalize_key_name(expected);

    if detected == expected {
        return true;
    }

    let (detected, expected) = (strip_qualifier(&detected), strip_qualifier(&expected));
    if detected.is_empty() || expected.is_empty() {
        return false;
    }

    detected == expected
        || enharmonic_partner(detected) == Some(expected)
        || enharmonic_partner(expected) == Some(detected)
}
