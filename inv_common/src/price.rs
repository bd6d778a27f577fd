use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sqlx::Type;

//--------------------------------------        Price          ---------------------------------------------------------
/// A unit price, stored in minor units (cents).
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Price(i64);

impl From<i64> for Price {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Price {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Prices must be strictly positive to be stored against a product.
    pub fn is_valid(&self) -> bool {
        self.0 > 0
    }
}
