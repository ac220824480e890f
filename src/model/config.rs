use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "midi-eval",
    about = "Grade a generated MIDI file against expected chords, key and texture."
)]
pub struct Args {
    /// Path to the MIDI file (or base64 text with `--base64`) to grade.
    pub input: PathBuf,

    /// Treat the input as base64 text, as returned by the generation service.
    #[arg(short, long, default_value_t = false)]
    pub base64: bool,

    /// Which scorer to run: chords|key|content|all.
    #[arg(short, long, default_value = "all")]
    pub scorer: String,

    /// JSON file holding one mapping of expectations, e.g.
    /// `{"min_chords": 4, "tonic": "D", "scale": "dorian", "content_type": "chords"}`.
    /// Missing criteria fall back to their defaults.
    #[arg(short, long)]
    pub expected: Option<PathBuf>,

    /// Pretty-print the JSON report.
    #[arg(short, long)]
    pub pretty: bool,
}
