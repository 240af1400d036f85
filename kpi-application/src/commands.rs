pub mod evaluation_commands;

pub use evaluation_commands::*;
