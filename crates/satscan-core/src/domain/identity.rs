//! Identities handed to the scan loop and the generator seam that produces them.
//!
//! Key derivation lives outside this crate. Any producer that can hand out one
//! [`Identity`] per call plugs in through [`IdentityGenerator`]; the bundled
//! [`WatchlistGenerator`] cycles through a fixed list of addresses.

use std::fmt::{Debug, Formatter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Secret key material attached to a generated identity.
///
/// `Debug` is redacted so the material never reaches log output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretMaterial {
    pub private_key_hex: String,
    pub wif: String,
}

impl Debug for SecretMaterial {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretMaterial")
            .field("private_key_hex", &"<redacted>")
            .field("wif", &"<redacted>")
            .finish()
    }
}

/// One address to look up, optionally with the secret material behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub address: String,
    pub secret: Option<SecretMaterial>,
}

impl Identity {
    pub fn watch_only(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            secret: None,
        }
    }

    pub fn with_secret(address: impl Into<String>, secret: SecretMaterial) -> Self {
        Self {
            address: address.into(),
            secret: Some(secret),
        }
    }
}

/// Produces a fresh identity per scan iteration.
pub trait IdentityGenerator: Send + Sync {
    fn next_identity(&mut self) -> Identity;
}

/// Cycles through a fixed, non-empty list of watch-only addresses.
#[derive(Debug, Clone)]
pub struct WatchlistGenerator {
    addresses: Vec<String>,
    next: usize,
}

impl WatchlistGenerator {
    pub fn new(addresses: Vec<String>) -> Result<Self, ConfigError> {
        let addresses = addresses
            .into_iter()
            .map(|address| address.trim().to_owned())
            .filter(|address| !address.is_empty())
            .collect::<Vec<_>>();
        if addresses.is_empty() {
            return Err(ConfigError::EmptyWatchlist);
        }
        Ok(Self { addresses, next: 0 })
    }

    /// Reads one address per line; blank lines and `#` comments are skipped.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|error| ConfigError::Watchlist {
                path: path.display().to_string(),
                message: error.to_string(),
            })?;
        Self::new(
            contents
                .lines()
                .filter(|line| !line.trim_start().starts_with('#'))
                .map(str::to_owned)
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}

impl IdentityGenerator for WatchlistGenerator {
    fn next_identity(&mut self) -> Identity {
        let address = self.addresses[self.next % self.addresses.len()].clone();
        self.next = self.next.wrapping_add(1);
        Identity::watch_only(address)
    }
}
