//! # Fund Records & Deterministic Addressing
//!
//! A fund is addressed, not registered. Its identity is a BLAKE3 digest of
//! `(seed tag, owner, sequence index)`, its vault's identity is a digest of
//! the fund's, and the vault authority is a single derived identity shared
//! by every fund in the deployment. Anyone holding an owner's address can
//! re-derive the owner's entire fund set from indices 1, 2, 3, … — which is
//! exactly how discovery works.
//!
//! The scheme gives three properties for free:
//!
//! - **Determinism**: the same `(owner, index)` derives the same fund
//!   identity on every machine, forever.
//! - **Collision freedom**: distinct inputs yield distinct identities, by
//!   the collision resistance of the hash over the separator-delimited
//!   preimage.
//! - **No registry**: there is no list of funds anywhere that could drift
//!   out of sync with the funds themselves.
//!
//! This module also owns lifecycle classification. A fund's observable
//! state is a pure function of two facts — the live vault balance and the
//! clock — evaluated balance-first, so a drained fund can never be
//! reported "Open" again merely because its unlock time has passed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use azalea_protocol::config::{FUND_SEED, TOKEN_VAULT_AUTHORITY_SEED};
use azalea_protocol::crypto::hash::{blake3_hash, blake3_hash_multi};
use azalea_protocol::identity::AccountId;
use azalea_protocol::token::TokenId;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while deriving fund-related identities.
#[derive(Debug, Error)]
pub enum FundError {
    /// Sequence indices are 1-based; index 0 does not address anything.
    #[error("invalid sequence index: indices start at 1, got {0}")]
    InvalidIndex(u64),
}

// ---------------------------------------------------------------------------
// FundId
// ---------------------------------------------------------------------------

/// The deterministic identity of a fund.
///
/// Computed as `BLAKE3(FUND_SEED || owner_hash || decimal(index))` with
/// `0x00` separators. The decimal string form of the index (rather than a
/// fixed-width integer) is part of the addressing scheme and must never
/// change: every existing fund was derived with it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FundId([u8; 32]);

impl FundId {
    /// Derive the identity of `owner`'s fund at `index`.
    ///
    /// Pure and deterministic. Fails only on `index == 0` — the sequence
    /// is 1-based, and a zero index is always a caller bug, not a fund.
    pub fn derive(owner: &AccountId, index: u64) -> Result<Self, FundError> {
        if index == 0 {
            return Err(FundError::InvalidIndex(index));
        }
        let index_str = index.to_string();
        let digest = blake3_hash_multi(&[
            FUND_SEED,
            &[0x00],
            owner.key_hash(),
            &[0x00],
            index_str.as_bytes(),
        ]);
        Ok(Self(digest))
    }

    /// Raw 32-byte identity. These bytes seed the vault derivation.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded identity for display and transport.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a hex-encoded fund identity.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for FundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FundId({}...)", &self.to_hex()[..12])
    }
}

impl fmt::Display for FundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::str::FromStr for FundId {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

// ---------------------------------------------------------------------------
// VaultId
// ---------------------------------------------------------------------------

/// The identity of the token vault bound 1:1 to a fund.
///
/// Derived solely from the fund identity (`BLAKE3(fund_id_bytes)`), so a
/// fund and its vault can never be paired wrongly — the pairing is
/// arithmetic, not bookkeeping.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VaultId([u8; 32]);

impl VaultId {
    /// Derive the vault identity for a fund.
    pub fn for_fund(fund: &FundId) -> Self {
        Self(blake3_hash(fund.as_bytes()))
    }

    /// Raw 32-byte identity.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded identity.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for VaultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VaultId({}...)", &self.to_hex()[..12])
    }
}

impl fmt::Display for VaultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// ---------------------------------------------------------------------------
// VaultAuthorityId
// ---------------------------------------------------------------------------

/// The single, deployment-wide vault authority identity.
///
/// Every vault is owned by this identity, and it is the only entity
/// permitted to move tokens out of any vault. It has no keypair: it exists
/// purely as a derived identity, and only the executing ledger may act as
/// it. Authorization to *trigger* it is proven by the redeemer's signature
/// on the redeem operation — the authority itself is structural, not
/// credentialed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VaultAuthorityId([u8; 32]);

impl VaultAuthorityId {
    /// Raw 32-byte identity.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded identity.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for VaultAuthorityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VaultAuthorityId({}...)", &self.to_hex()[..12])
    }
}

impl fmt::Display for VaultAuthorityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Derive the global vault authority identity.
///
/// Constant across a deployment; derived from the authority seed tag
/// alone, so every fund record caches the same value.
pub fn vault_authority_id() -> VaultAuthorityId {
    VaultAuthorityId(blake3_hash(TOKEN_VAULT_AUTHORITY_SEED))
}

// ---------------------------------------------------------------------------
// Fund
// ---------------------------------------------------------------------------

/// A fund record: one deposit, one unlock time, one redeemer.
///
/// Created once, read many times, and mutated exactly once *implicitly* —
/// its vault balance drops to zero at redemption. Note what is absent: a
/// `redeemed` flag. Redemption status is derived from the live vault
/// balance at query time ([`FundState::classify`]); storing it separately
/// would create a second source of truth that could desynchronize from the
/// actual token balance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fund {
    /// Display label, free text.
    pub name: String,

    /// The token type held in the vault.
    pub mint: TokenId,

    /// Original deposit in base units. Immutable after creation; the live
    /// vault balance, not this field, decides redemption status.
    pub amount: u64,

    /// Instant after which redemption is permitted.
    pub redeem_timestamp: DateTime<Utc>,

    /// Cached vault identity, set at creation. Always equals
    /// `VaultId::for_fund(&fund_id)`.
    pub token_vault: VaultId,

    /// Cached vault authority identity, set at creation. Identical for
    /// every fund in a deployment.
    pub token_vault_authority: VaultAuthorityId,

    /// The single principal authorized to redeem. Stored address-only —
    /// the redeemer proves key possession at redeem time.
    pub redeemer: AccountId,

    /// The index this fund's identity was derived from. Kept for
    /// re-derivation and enumeration.
    pub sequence_index: u64,
}

// ---------------------------------------------------------------------------
// FundState
// ---------------------------------------------------------------------------

/// The observable lifecycle state of a fund.
///
/// Terminal state: `Redeemed`. No transition leaves it — the vault balance
/// that produced it can never rise again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundState {
    /// The unlock instant is still in the future.
    Locked,
    /// Unlocked but not yet redeemed.
    Open,
    /// The vault has been drained.
    Redeemed,
}

impl FundState {
    /// Classify a fund from its two observable facts: the live vault
    /// balance and the clock.
    ///
    /// Evaluated first-match-wins, balance first:
    ///
    /// 1. `live_balance == 0` → `Redeemed`
    /// 2. `now >= redeem_timestamp` → `Open`
    /// 3. otherwise → `Locked`
    ///
    /// Balance goes first because a redeemed fund's unlock time has
    /// necessarily already passed — timestamp-first would resurrect every
    /// drained fund as "Open". With this ordering the result is a total
    /// function of the two inputs, no hidden state involved.
    ///
    /// A zero-amount fund classifies `Redeemed` from birth. That is
    /// deliberate: "nothing to redeem" and "already redeemed" are
    /// observationally identical, and we unify them.
    pub fn classify(fund: &Fund, live_balance: u64, now: DateTime<Utc>) -> Self {
        if live_balance == 0 {
            FundState::Redeemed
        } else if now >= fund.redeem_timestamp {
            FundState::Open
        } else {
            FundState::Locked
        }
    }
}

impl fmt::Display for FundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FundState::Locked => write!(f, "Locked"),
            FundState::Open => write!(f, "Open"),
            FundState::Redeemed => write!(f, "Redeemed"),
        }
    }
}

// ---------------------------------------------------------------------------
// ClassifiedFund
// ---------------------------------------------------------------------------

/// A fund record joined with its live observations — one row of a
/// discovery result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedFund {
    /// The fund's derived identity.
    pub id: FundId,
    /// The stored record.
    pub fund: Fund,
    /// Live vault balance at observation time.
    pub vault_balance: u64,
    /// Lifecycle state computed from the balance and the clock.
    pub state: FundState,
}
