//! Command line interface

pub mod args;
pub mod output;
pub mod prompt;
pub mod runtime;

pub use args::{Args, VerbosityLevel};
pub use output::{OutputFormatter, RunSettings};
pub use prompt::{confirm, confirm_stdin};
pub use runtime::run_until_interrupted;
