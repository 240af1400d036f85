// Indicator code value object

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValueObjectError;

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]{2,49}$").expect("indicator code pattern"));

const SYSTEM_PREFIXES: [&str; 2] = ["SYS_", "SYSTEM_"];
const USER_PREFIXES: [&str; 2] = ["USER_", "CUSTOM_"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndicatorCode(String);

impl IndicatorCode {
    pub fn new(raw: &str) -> Result<Self, ValueObjectError> {
        let normalized = raw.trim().to_uppercase();
        if !CODE_RE.is_match(&normalized) {
            return Err(ValueObjectError::InvalidIndicatorCode(raw.to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_system_code(&self) -> bool {
        SYSTEM_PREFIXES.iter().any(|prefix| self.0.starts_with(prefix))
    }

    pub fn is_user_code(&self) -> bool {
        USER_PREFIXES.iter().any(|prefix| self.0.starts_with(prefix))
    }
}

impl std::fmt::Display for IndicatorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
