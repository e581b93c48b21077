use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Canonical balance provider identifiers, in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    Mempool,
    Blockstream,
    BlockchainInfo,
}

impl ProviderId {
    pub const ALL: [Self; 3] = [Self::Mempool, Self::Blockstream, Self::BlockchainInfo];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mempool => "mempool",
            Self::Blockstream => "blockstream",
            Self::BlockchainInfo => "blockchain_info",
        }
    }

    /// Host shown in progress output.
    pub const fn host(self) -> &'static str {
        match self {
            Self::Mempool => "mempool.space",
            Self::Blockstream => "blockstream.info",
            Self::BlockchainInfo => "blockchain.info",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mempool" | "mempool.space" => Ok(Self::Mempool),
            "blockstream" | "blockstream.info" => Ok(Self::Blockstream),
            "blockchain_info" | "blockchain.info" | "blockchain" => Ok(Self::BlockchainInfo),
            other => Err(ConfigError::InvalidProvider {
                value: other.to_owned(),
            }),
        }
    }
}
