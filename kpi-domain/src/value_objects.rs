// Domain value objects
pub mod deviation_percentage;
pub mod email_address;
pub mod escalation_level;
pub mod execution_context;
pub mod indicator_code;
pub mod phone_number;
pub mod priority;
pub mod severity_level;
pub mod sql_query;
pub mod threshold_value;

pub use deviation_percentage::*;
pub use email_address::*;
pub use escalation_level::*;
pub use execution_context::*;
pub use indicator_code::*;
pub use phone_number::*;
pub use priority::*;
pub use severity_level::*;
pub use sql_query::*;
pub use threshold_value::*;
