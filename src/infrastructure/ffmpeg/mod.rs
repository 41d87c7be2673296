pub mod command;
pub mod runner;

pub use command::{CaptionCommand, Invocation};
pub use runner::{ProcessOutcome, run};
