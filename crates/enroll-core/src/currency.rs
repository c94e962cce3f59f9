//! # Currency
//!
//! The checkout currency and its minor-unit conversion.

use serde::{Deserialize, Serialize};

/// Currency every course checkout is charged in
pub const CHECKOUT_CURRENCY: Currency = Currency::INR;

/// Currencies courses are sold in (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    /// Indian rupee, 100 paise to the rupee
    INR,
}

impl Currency {
    /// Returns the lowercase ISO 4217 code, as the processor expects it
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::INR => "inr",
        }
    }

    /// Minor units per major unit
    pub fn minor_units(&self) -> i64 {
        match self {
            Currency::INR => 100,
        }
    }

    /// Convert a decimal amount to the smallest currency unit (paise)
    pub fn to_smallest_unit(&self, amount: f64) -> i64 {
        (amount * self.minor_units() as f64).round() as i64
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}
