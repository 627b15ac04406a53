//! The generate-and-publish pipeline.
//!
//! A run reads the history index, asks the model for a snippet that is not
//! in it, upserts the snippet into the repository, and appends it to the
//! index. Each stage lives in its own module:
//!
//! - `parser`: pulls the file name and code out of a model response
//! - `generator`: builds the prompt and calls the completion API
//! - `publisher`: create-or-update of one file
//! - `history`: the README index
//! - `skip`: the per-run skip decision
//! - `runner`: sequences the above

mod generator;
mod history;
mod parser;
mod publisher;
mod runner;
mod skip;

pub use runner::{Pipeline, RunOutcome};
pub use skip::{FixedSkip, RandomSkip, SkipPolicy};
