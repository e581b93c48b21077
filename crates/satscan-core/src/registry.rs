//! Provider registry and per-provider response parsing.
//!
//! | Provider | Endpoint | Balance |
//! |----------|----------|---------|
//! | mempool | `https://mempool.space/api/address/{address}` | `chain_stats.funded_txo_sum - chain_stats.spent_txo_sum` |
//! | blockstream | `https://blockstream.info/api/address/{address}` | same Esplora schema |
//! | blockchain_info | `https://blockchain.info/rawaddr/{address}` | `final_balance` (absent means zero) |

use std::collections::HashSet;

use serde_json::Value;

use crate::{Balance, ConfigError, ParseError, ProviderId};

/// Custom parse rule applied to an already-decoded JSON document.
pub type ParseFn = fn(&Value) -> Result<Balance, ParseError>;

/// Response schema understood by a provider.
#[derive(Debug, Clone, Copy)]
pub enum BalanceParser {
    /// Esplora `chain_stats` funded/spent sums (mempool.space, blockstream.info).
    Esplora,
    /// blockchain.info `rawaddr` `final_balance`.
    BlockchainInfo,
    Custom(ParseFn),
}

impl BalanceParser {
    pub const fn schema_name(self) -> &'static str {
        match self {
            Self::Esplora => "esplora",
            Self::BlockchainInfo => "blockchain_info",
            Self::Custom(_) => "custom",
        }
    }

    pub fn parse(self, body: &str) -> Result<Balance, ParseError> {
        let document: Value =
            serde_json::from_str(body).map_err(|error| ParseError::InvalidJson {
                message: error.to_string(),
            })?;

        match self {
            Self::Esplora => parse_esplora(&document),
            Self::BlockchainInfo => parse_blockchain_info(&document),
            Self::Custom(parse) => parse(&document),
        }
    }
}

fn parse_esplora(document: &Value) -> Result<Balance, ParseError> {
    let stats = document.get("chain_stats");
    let funded = stats
        .and_then(|stats| stats.get("funded_txo_sum"))
        .and_then(Value::as_u64)
        .ok_or(ParseError::MissingField {
            field: "chain_stats.funded_txo_sum",
        })?;
    let spent = stats
        .and_then(|stats| stats.get("spent_txo_sum"))
        .and_then(Value::as_u64)
        .ok_or(ParseError::MissingField {
            field: "chain_stats.spent_txo_sum",
        })?;

    funded
        .checked_sub(spent)
        .map(Balance::from_sats)
        .ok_or(ParseError::NegativeBalance { funded, spent })
}

fn parse_blockchain_info(document: &Value) -> Result<Balance, ParseError> {
    if !document.is_object() {
        return Err(ParseError::MissingField {
            field: "final_balance",
        });
    }

    match document.get("final_balance") {
        None | Some(Value::Null) => Ok(Balance::ZERO),
        Some(value) => value
            .as_u64()
            .map(Balance::from_sats)
            .ok_or(ParseError::MissingField {
                field: "final_balance",
            }),
    }
}

/// A remote balance source. Immutable after construction.
#[derive(Debug, Clone)]
pub struct Provider {
    id: ProviderId,
    base_url: String,
    parser: BalanceParser,
}

impl Provider {
    pub fn new(id: ProviderId, base_url: impl Into<String>, parser: BalanceParser) -> Self {
        Self {
            id,
            base_url: base_url.into(),
            parser,
        }
    }

    /// Canonical provider definition for `id`.
    pub fn builtin(id: ProviderId) -> Self {
        match id {
            ProviderId::Mempool => Self::new(
                id,
                "https://mempool.space/api/address",
                BalanceParser::Esplora,
            ),
            ProviderId::Blockstream => Self::new(
                id,
                "https://blockstream.info/api/address",
                BalanceParser::Esplora,
            ),
            ProviderId::BlockchainInfo => Self::new(
                id,
                "https://blockchain.info/rawaddr",
                BalanceParser::BlockchainInfo,
            ),
        }
    }

    pub fn id(&self) -> ProviderId {
        self.id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn parser(&self) -> BalanceParser {
        self.parser
    }

    /// Lookup URL for `address`: `{base_url}/{address}`.
    pub fn url_for(&self, address: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(address)
        )
    }

    pub fn parse_balance(&self, body: &str) -> Result<Balance, ParseError> {
        self.parser.parse(body)
    }
}

/// Ordered, fixed set of providers.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self {
            providers: ProviderId::ALL.into_iter().map(Provider::builtin).collect(),
        }
    }
}

impl ProviderRegistry {
    pub fn new(providers: Vec<Provider>) -> Result<Self, ConfigError> {
        if providers.is_empty() {
            return Err(ConfigError::EmptyRegistry);
        }

        let mut seen = HashSet::new();
        for provider in &providers {
            if !seen.insert(provider.id()) {
                return Err(ConfigError::DuplicateProvider { id: provider.id() });
            }
        }

        Ok(Self { providers })
    }

    /// Builtin providers restricted to `ids`, kept in canonical order.
    pub fn only(ids: &[ProviderId]) -> Result<Self, ConfigError> {
        Self::new(
            ProviderId::ALL
                .into_iter()
                .filter(|id| ids.contains(id))
                .map(Provider::builtin)
                .collect(),
        )
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn get(&self, id: ProviderId) -> Option<&Provider> {
        self.providers.iter().find(|provider| provider.id() == id)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
