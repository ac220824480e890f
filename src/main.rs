use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use midi_eval::{
    Args, ChordExpectation, ContentExpectation, KeyExpectation, Scorer, ScorerSelection,
    load_expectations, load_output, parse_scorer,
};
use serde_json::{Map, Value};

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let selection = parse_scorer(&args.scorer);

    info!("Grading '{}'...", args.input.display());
    let output = load_output(&args.input, args.base64)?;
    let expectations = load_expectations(args.expected.as_ref())?;
    debug!("Expectations: {}", expectations);

    let mut report = Map::new();

    if selection.includes(ScorerSelection::Chords) {
        let expected: ChordExpectation = serde_json::from_value(expectations.clone())
            .context("Invalid chord expectations")?;
        report.insert(expected.name().into(), serde_json::to_value(expected.score(&output))?);
    }

    if selection.includes(ScorerSelection::Key) {
        let expected: KeyExpectation = serde_json::from_value(expectations.clone())
            .context("Invalid key expectations")?;
        report.insert(expected.name().into(), serde_json::to_value(expected.score(&output))?);
    }

    if selection.includes(ScorerSelection::Content) {
        let expected: ContentExpectation = serde_json::from_value(expectations.clone())
            .context("Invalid content expectations")?;
        report.insert(expected.name().into(), serde_json::to_value(expected.score(&output))?);
    }

    let report = Value::Object(report);
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", rendered);

    info!("Grading finished..!");
    Ok(())
}
