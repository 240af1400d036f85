// Runtime configuration shared with the application layer

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub trend_days_back: u32,
    pub prediction_days_ahead: u32,
    /// How many of the latest runs feed health and frequency calculations.
    pub recent_execution_limit: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            trend_days_back: 30,
            prediction_days_ahead: 7,
            recent_execution_limit: 20,
        }
    }
}
