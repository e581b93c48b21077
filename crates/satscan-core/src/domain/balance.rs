use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Non-negative address balance held in base units (satoshis).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Balance(u64);

impl Balance {
    pub const ZERO: Self = Self(0);
    pub const SATS_PER_BTC: u64 = 100_000_000;

    pub const fn from_sats(sats: u64) -> Self {
        Self(sats)
    }

    pub const fn sats(self) -> u64 {
        self.0
    }

    /// Decimal view in whole coins.
    pub fn as_btc(self) -> f64 {
        self.0 as f64 / Self::SATS_PER_BTC as f64
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl Display for Balance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let whole = self.0 / Self::SATS_PER_BTC;
        let fraction = self.0 % Self::SATS_PER_BTC;
        write!(f, "{whole}.{fraction:08}")
    }
}
