// Phone number value object

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValueObjectError;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9]\d{7,14}$").expect("phone number pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(raw: &str) -> Result<Self, ValueObjectError> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|ch| !matches!(ch, ' ' | '-' | '.' | '(' | ')'))
            .collect();
        if !PHONE_RE.is_match(&normalized) {
            return Err(ValueObjectError::InvalidPhoneNumber(raw.to_string()));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_international(&self) -> bool {
        self.0.starts_with('+')
    }

    /// All but the last four digits replaced with `*`.
    pub fn masked(&self) -> String {
        let keep = self.0.len().saturating_sub(4);
        self.0
            .chars()
            .enumerate()
            .map(|(idx, ch)| if idx < keep && ch != '+' { '*' } else { ch })
            .collect()
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
