pub mod indicator_queries;
pub mod kpi_analytics_queries;

pub use indicator_queries::*;
pub use kpi_analytics_queries::*;
