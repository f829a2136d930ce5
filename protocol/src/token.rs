//! # Token Metadata
//!
//! Every asset that can be locked in a fund — stablecoins, wrapped crypto,
//! loyalty points, one-off community tokens — is represented as a
//! [`TokenInfo`] with a unique [`TokenId`].
//!
//! Token IDs are deterministic BLAKE3 hashes of the token's canonical
//! properties (name, symbol, issuer). The same token always gets the same
//! ID regardless of when or where it's registered — no registry needed, no
//! coordination required.
//!
//! This module is also the only place allowed to convert human-scale
//! amounts ("lock 100") into base units. A token's `decimals` field decides
//! the scale, and getting this wrong puts deposits off by orders of
//! magnitude, so the conversion lives behind one checked function instead
//! of being sprinkled across call sites.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::MAX_TOKEN_DECIMALS;
use crate::crypto::hash::blake3_hash;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while working with token amounts.
#[derive(Debug, Error)]
pub enum AmountError {
    /// Scaling the human amount by 10^decimals overflowed u64.
    #[error("amount overflow: {human} at {decimals} decimals exceeds u64 range")]
    Overflow {
        /// The human-scale amount that was being converted.
        human: u64,
        /// The token's decimal precision.
        decimals: u8,
    },

    /// The token declares more decimal places than the protocol supports.
    #[error("unsupported decimals: {0} exceeds the protocol maximum")]
    UnsupportedDecimals(u8),
}

// ---------------------------------------------------------------------------
// TokenId
// ---------------------------------------------------------------------------

/// A unique, content-addressed identifier for a token type (a "mint").
///
/// Computed as `BLAKE3(name || symbol || issuer)` with separator bytes.
/// Two tokens with identical properties always produce the same ID, making
/// this a natural deduplication key across the network.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId([u8; 32]);

impl TokenId {
    /// Creates a `TokenId` from a raw 32-byte hash.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw 32-byte identifier.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the hex-encoded token ID.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a hex-encoded token ID.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// Derives a `TokenId` from the canonical token properties.
    ///
    /// The hash input is the concatenation of:
    /// - `name` (UTF-8 bytes)
    /// - `0x00` separator
    /// - `symbol` (UTF-8 bytes)
    /// - `0x00` separator
    /// - `issuer` (UTF-8 bytes of the issuer address)
    ///
    /// The separator bytes prevent ambiguity when one field's suffix
    /// matches another field's prefix.
    pub fn derive(name: &str, symbol: &str, issuer: &str) -> Self {
        let mut preimage = Vec::with_capacity(name.len() + symbol.len() + issuer.len() + 2);
        preimage.extend_from_slice(name.as_bytes());
        preimage.push(0x00);
        preimage.extend_from_slice(symbol.as_bytes());
        preimage.push(0x00);
        preimage.extend_from_slice(issuer.as_bytes());

        Self(blake3_hash(&preimage))
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId({}...)", &self.to_hex()[..12])
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for TokenId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// ---------------------------------------------------------------------------
// TokenInfo
// ---------------------------------------------------------------------------

/// Complete metadata for a registered token.
///
/// This is the canonical record for a token type. It lives in the ledger's
/// token registry and is referenced by [`TokenId`] everywhere else —
/// notably in the `mint` field of every fund.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Content-addressed identifier derived from this token's properties.
    pub id: TokenId,

    /// Human-readable token name (e.g., "Azalea Dollar").
    pub name: String,

    /// Trading symbol / ticker (e.g., "aUSD").
    pub symbol: String,

    /// Number of decimal places.
    ///
    /// A token with `decimals = 2` and raw amount `12345` displays as
    /// `123.45`. All protocol math happens in base units; decimals exist
    /// so that human input can be scaled exactly once, at the boundary.
    pub decimals: u8,

    /// Address of the entity that issued this token.
    pub issuer: String,
}

impl TokenInfo {
    /// Creates a new [`TokenInfo`] with a deterministically derived ID.
    ///
    /// This is the only correct way to create a token — it ensures the ID
    /// is always consistent with the token's properties.
    pub fn new(name: &str, symbol: &str, decimals: u8, issuer: &str) -> Self {
        let id = TokenId::derive(name, symbol, issuer);
        Self {
            id,
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals,
            issuer: issuer.to_string(),
        }
    }

    /// Scale a human-entered amount into base units.
    ///
    /// `to_base_units(100)` for a 6-decimals token yields `100_000_000`.
    /// The multiplication is checked: amounts that cannot be represented
    /// in u64 are rejected rather than wrapped, because wrapping arithmetic
    /// and money do not mix.
    pub fn to_base_units(&self, human: u64) -> Result<u64, AmountError> {
        let factor = self.base_unit_factor()?;
        human.checked_mul(factor).ok_or(AmountError::Overflow {
            human,
            decimals: self.decimals,
        })
    }

    /// Render a base-unit amount as a human-readable decimal string.
    ///
    /// Display only — the protocol never performs division on balances.
    pub fn to_display(&self, base_units: u64) -> String {
        if self.decimals == 0 {
            return base_units.to_string();
        }
        let factor = 10u64.pow(self.decimals as u32);
        let whole = base_units / factor;
        let frac = base_units % factor;
        format!("{whole}.{frac:0width$}", width = self.decimals as usize)
    }

    fn base_unit_factor(&self) -> Result<u64, AmountError> {
        if self.decimals > MAX_TOKEN_DECIMALS {
            return Err(AmountError::UnsupportedDecimals(self.decimals));
        }
        Ok(10u64.pow(self.decimals as u32))
    }
}
