//! Human-readable order numbers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix shared by every order number.
pub const ORDER_NUMBER_PREFIX: &str = "ORD-";

const RANDOM_DIGITS: usize = 12;

/// Unique, immutable order number such as `ORD-3F9A1C22B07E`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Generates a fresh order number from 12 random upper-case hex digits.
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string().to_uppercase();
        Self(format!("{ORDER_NUMBER_PREFIX}{}", &hex[..RANDOM_DIGITS]))
    }

    /// Wraps an existing order number.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
