//! Currencies a subscription can be billed in, with static USD rates.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Uah,
    Gbp,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Eur, Currency::Uah, Currency::Gbp];

    /// Approximate value of one unit in USD. Hardcoded, never refreshed.
    pub fn rate_to_usd(&self) -> f64 {
        match self {
            Currency::Usd => 1.0,
            Currency::Eur => 1.08,
            Currency::Uah => 0.025,
            Currency::Gbp => 1.27,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Uah => "₴",
            Currency::Gbp => "£",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Uah => "UAH",
            Currency::Gbp => "GBP",
        }
    }

    /// Parses a stored currency code, falling back to USD for anything unknown.
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_else(|_| {
            debug!("Unknown currency {s:?}, using USD");
            Currency::default()
        })
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "UAH" => Ok(Currency::Uah),
            "GBP" => Ok(Currency::Gbp),
            _ => Err(anyhow::anyhow!("Invalid currency: {}", s)),
        }
    }
}
