pub mod analysis;
mod midi_importer;
pub mod model;
mod scorers;
mod util;

#[cfg(test)]
mod test_support;

pub use analysis::chords::*;
pub use analysis::content::*;
pub use analysis::key::*;
pub use midi_importer::*;
pub use model::config::*;
pub use model::expectation::*;
pub use model::pitch::*;
pub use model::result::*;
pub use model::score::*;
pub use scorers::*;
pub use util::*;
