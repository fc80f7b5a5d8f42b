//! Deterministic key and address derivation.
//!
//! # Responsibilities
//! - Parse a master extended private key (BIP32 base58)
//! - Validate `m / purpose' / coin' / account' / change / index` paths
//! - Derive the child public key and its P2PKH address
//!
//! # Security
//! - Master keys are never logged or included in error messages
//! - Derivation is pure: no caching, no side effects

use std::str::FromStr;

use bitcoin::bip32::{DerivationPath, Xpriv, Xpub};
use bitcoin::secp256k1::Secp256k1;
use bitcoin::{Address, CompressedPublicKey, Network};
use thiserror::Error;

/// Number of components in a BIP44-style path (purpose through index).
const PATH_DEPTH: usize = 5;

/// Number of leading components that must be hardened.
const HARDENED_DEPTH: usize = 3;

/// Errors raised while deriving keys.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyDerivationError {
    /// The master key could not be parsed.
    #[error("invalid master key: {0}")]
    InvalidMasterKey(String),

    /// The derivation path is malformed or has the wrong shape.
    #[error("invalid derivation path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// The BIP32 step itself failed.
    #[error("derivation failed: {0}")]
    Derivation(String),
}

/// Result of deriving a single child key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedKey {
    /// Compressed public key, hex encoded.
    pub public_key: String,
    /// Address string for the configured network.
    pub address: String,
}

/// Capability for turning a master key and path into an address.
pub trait KeyDeriver: Send + Sync {
    /// Derive the public key and address at `path`.
    fn derive(&self, master_key: &str, path: &str) -> Result<DerivedKey, KeyDerivationError>;

    /// Derive only the address at `path`.
    fn derive_address(&self, master_key: &str, path: &str) -> Result<String, KeyDerivationError> {
        self.derive(master_key, path).map(|key| key.address)
    }
}

/// Build the path `m/44'/0'/0'/0/<index>`.
pub fn bip44_path(index: u32) -> String {
    format!("m/44'/0'/0'/0/{}", index)
}

/// Path of the canonical funding address.
pub fn zero_path() -> String {
    bip44_path(0)
}

/// Parse `path` and check it has the BIP44 shape.
pub fn parse_path(path: &str) -> Result<DerivationPath, KeyDerivationError> {
    let invalid = |reason: String| KeyDerivationError::InvalidPath {
        path: path.to_string(),
        reason,
    };

    let parsed = DerivationPath::from_str(path).map_err(|e| invalid(e.to_string()))?;
    let children = parsed.as_ref();
    if children.len() != PATH_DEPTH {
        return Err(invalid(format!(
            "expected {} components, found {}",
            PATH_DEPTH,
            children.len()
        )));
    }

    for (i, child) in children.iter().enumerate() {
        let must_harden = i < HARDENED_DEPTH;
        if child.is_hardened() != must_harden {
            let expectation = if must_harden { "hardened" } else { "unhardened" };
            return Err(invalid(format!("component {} must be {}", i + 1, expectation)));
        }
    }

    Ok(parsed)
}

/// BIP32 deriver producing P2PKH addresses.
#[derive(Debug, Clone)]
pub struct Bip32Deriver {
    network: Network,
}

impl Bip32Deriver {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    pub fn network(&self) -> Network {
        self.network
    }
}

impl Default for Bip32Deriver {
    fn default() -> Self {
        Self::new(Network::Regtest)
    }
}

impl KeyDeriver for Bip32Deriver {
    fn derive(&self, master_key: &str, path: &str) -> Result<DerivedKey, KeyDerivationError> {
        let master = Xpriv::from_str(master_key.trim())
            .map_err(|e| KeyDerivationError::InvalidMasterKey(e.to_string()))?;
        let path = parse_path(path)?;

        let secp = Secp256k1::new();
        let child = master
            .derive_priv(&secp, &path)
            .map_err(|e| KeyDerivationError::Derivation(e.to_string()))?;
        let public_key = CompressedPublicKey(Xpub::from_priv(&secp, &child).public_key);
        let address = Address::p2pkh(public_key.pubkey_hash(), self.network);

        Ok(DerivedKey {
            public_key: public_key.to_string(),
            address: address.to_string(),
        })
    }
}
