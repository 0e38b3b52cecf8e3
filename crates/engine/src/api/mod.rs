//! API layer - the line-oriented command surface used by the binary.

pub mod commands;

pub use commands::{dispatch, Command, CommandError};
