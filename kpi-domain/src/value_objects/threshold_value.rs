// Threshold value object

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValueObjectError;
use crate::value_objects::SeverityLevel;

/// Tolerance used by the equality-flavoured operators.
pub const COMPARISON_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOperator {
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    Equal,
    NotEqual,
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::GreaterThan => "gt",
            ComparisonOperator::GreaterOrEqual => "gte",
            ComparisonOperator::LessThan => "lt",
            ComparisonOperator::LessOrEqual => "lte",
            ComparisonOperator::Equal => "eq",
            ComparisonOperator::NotEqual => "ne",
        }
    }

    pub fn compare(&self, value: Decimal, threshold: Decimal) -> bool {
        let close = (value - threshold).abs() < COMPARISON_EPSILON;
        match self {
            ComparisonOperator::GreaterThan => value > threshold,
            ComparisonOperator::GreaterOrEqual => value > threshold || close,
            ComparisonOperator::LessThan => value < threshold,
            ComparisonOperator::LessOrEqual => value < threshold || close,
            ComparisonOperator::Equal => close,
            ComparisonOperator::NotEqual => !close,
        }
    }
}

impl FromStr for ComparisonOperator {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gt" | ">" => Ok(ComparisonOperator::GreaterThan),
            "gte" | ">=" => Ok(ComparisonOperator::GreaterOrEqual),
            "lt" | "<" => Ok(ComparisonOperator::LessThan),
            "lte" | "<=" => Ok(ComparisonOperator::LessOrEqual),
            "eq" | "==" | "=" => Ok(ComparisonOperator::Equal),
            "ne" | "!=" | "<>" => Ok(ComparisonOperator::NotEqual),
            _ => Err(ValueObjectError::InvalidComparisonOperator(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThresholdType {
    Absolute,
    Percentage,
}

impl ThresholdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdType::Absolute => "absolute",
            ThresholdType::Percentage => "percentage",
        }
    }
}

impl FromStr for ThresholdType {
    type Err = ValueObjectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "absolute" | "threshold_value" | "value" => Ok(ThresholdType::Absolute),
            "percentage" | "percent" | "percentage_change" => Ok(ThresholdType::Percentage),
            _ => Err(ValueObjectError::InvalidThresholdType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThresholdValue {
    value: Decimal,
    operator: ComparisonOperator,
    threshold_type: ThresholdType,
}

impl ThresholdValue {
    pub fn new(
        value: Decimal,
        comparison_operator: &str,
        threshold_type: &str,
    ) -> Result<Self, ValueObjectError> {
        Ok(Self {
            value,
            operator: comparison_operator.parse()?,
            threshold_type: threshold_type.parse()?,
        })
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn operator(&self) -> ComparisonOperator {
        self.operator
    }

    pub fn threshold_type(&self) -> ThresholdType {
        self.threshold_type
    }

    pub fn is_breached(&self, current: Decimal, historical: Option<Decimal>) -> bool {
        match self.compared_value(current, historical) {
            Some(compared) => self.operator.compare(compared, self.value),
            None => false,
        }
    }

    /// Deviation of the compared quantity from the threshold, bucketed at
    /// 100/50/25/10 percent. Not breached means `Minimal`.
    pub fn breach_severity(&self, current: Decimal, historical: Option<Decimal>) -> SeverityLevel {
        if !self.is_breached(current, historical) {
            return SeverityLevel::Minimal;
        }
        let Some(compared) = self.compared_value(current, historical) else {
            return SeverityLevel::Minimal;
        };
        let Some(deviation) = percent_change(compared, self.value) else {
            return SeverityLevel::Critical;
        };
        if deviation >= Decimal::from(100) {
            SeverityLevel::Critical
        } else if deviation >= Decimal::from(50) {
            SeverityLevel::High
        } else if deviation >= Decimal::from(25) {
            SeverityLevel::Medium
        } else if deviation >= Decimal::from(10) {
            SeverityLevel::Low
        } else {
            SeverityLevel::Minimal
        }
    }

    pub fn describe(&self) -> String {
        match self.threshold_type {
            ThresholdType::Absolute => format!("value {} {}", self.operator.as_str(), self.value),
            ThresholdType::Percentage => {
                format!("change {} {}%", self.operator.as_str(), self.value)
            }
        }
    }

    fn compared_value(&self, current: Decimal, historical: Option<Decimal>) -> Option<Decimal> {
        match self.threshold_type {
            ThresholdType::Absolute => Some(current),
            ThresholdType::Percentage => {
                let historical = historical.filter(|value| !value.is_zero())?;
                (current - historical)
                    .abs()
                    .checked_div(historical)
                    .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            }
        }
    }
}

/// `|value - reference| / |reference| * 100`, `None` for a zero reference.
pub(crate) fn percent_change(value: Decimal, reference: Decimal) -> Option<Decimal> {
    if reference.is_zero() {
        return None;
    }
    (value - reference)
        .abs()
        .checked_div(reference.abs())
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}
