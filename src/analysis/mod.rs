pub mod chords;
pub mod content;
pub mod key;
