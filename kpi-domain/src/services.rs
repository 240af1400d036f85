// Domain services
pub mod indicator_service;
pub mod kpi_analytics;
pub mod statistics;

pub use indicator_service::*;
