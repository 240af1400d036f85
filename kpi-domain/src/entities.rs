// Domain entities and read models
pub mod analytics;
pub mod config;
pub mod evaluation;
pub mod historical_data;
pub mod indicator;
pub mod scheduler;

pub use analytics::*;
pub use config::*;
pub use evaluation::*;
pub use historical_data::*;
pub use indicator::*;
pub use scheduler::*;
