// Deviation percentage value object

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValueObjectError;
use crate::value_objects::threshold_value::percent_change;
use crate::value_objects::SeverityLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviationPercentage(Decimal);

impl DeviationPercentage {
    pub fn new(value: Decimal) -> Result<Self, ValueObjectError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValueObjectError::NegativeDeviation(value.to_string()));
        }
        Ok(Self(value.round_dp(2)))
    }

    /// Relative difference between `current` and `reference`.
    pub fn between(current: Decimal, reference: Decimal) -> Result<Self, ValueObjectError> {
        let deviation = percent_change(current, reference).ok_or(ValueObjectError::ZeroReference)?;
        Self::new(deviation)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_significant(&self) -> bool {
        self.0 >= Decimal::from(10)
    }

    pub fn severity_level(&self) -> SeverityLevel {
        if self.0 >= Decimal::from(50) {
            SeverityLevel::Critical
        } else if self.0 >= Decimal::from(25) {
            SeverityLevel::High
        } else if self.0 >= Decimal::from(10) {
            SeverityLevel::Medium
        } else if self.0 >= Decimal::from(5) {
            SeverityLevel::Low
        } else {
            SeverityLevel::Minimal
        }
    }
}

impl std::fmt::Display for DeviationPercentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}
