pub mod cli;
pub mod context;
pub mod lifecycle;
pub mod telemetry;

pub use cli::{Args, Command};
pub use lifecycle::run;
