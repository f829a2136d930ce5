//! # The Ledger Gateway Boundary
//!
//! The escrow core never talks to storage, networks, or clocks directly —
//! it talks to a [`LedgerGateway`]. The gateway is the contract with the
//! executing ledger: durable keyed storage of fund records, balance
//! queries, and atomic all-or-nothing execution of the two state-changing
//! operations.
//!
//! Two things in this module deserve attention:
//!
//! - **The error taxonomy.** `FundNotFound` is not an application error —
//!   it is the enumeration terminator for discovery. Everything else *is*
//!   an error and propagates unchanged to the caller. `Transient` exists
//!   precisely so that "the network hiccuped" can never be confused with
//!   "there is no fund here"; collapsing those two is how clients end up
//!   silently truncating fund lists.
//!
//! - **Signed operations.** [`CreateFund`] and [`Redeem`] carry the
//!   caller's public key and an Ed25519 signature over a domain-separated
//!   digest. The executor verifies that the key hashes to the claimed
//!   account and that the signature checks out. Authorization is proven,
//!   not asserted — a client cannot redeem on behalf of an account it
//!   doesn't hold the key for, no matter what it writes in the payload.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use azalea_protocol::crypto::hash::domain_separated_hash;
use azalea_protocol::crypto::keys::{AzaleaKeypair, AzaleaPublicKey, AzaleaSignature};
use azalea_protocol::identity::AccountId;
use azalea_protocol::token::{AmountError, TokenId, TokenInfo};

use crate::fund::{Fund, FundError, FundId, VaultId};

// ---------------------------------------------------------------------------
// Signing Domains
// ---------------------------------------------------------------------------

/// Domain-separation context for create-fund signing digests.
const CREATE_FUND_CONTEXT: &str = "azalea/create-fund/v1";

/// Domain-separation context for redeem signing digests.
const REDEEM_CONTEXT: &str = "azalea/redeem/v1";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure modes of the ledger boundary.
///
/// Messages are deliberately distinguishable per variant: a client needs to
/// tell "locked until Friday" apart from "you are not the redeemer" to
/// build a sensible retry-after-unlock experience.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// No fund record exists at the derived identity. For discovery this
    /// is the normal end-of-sequence signal, not a failure.
    #[error("no fund at identity {0}")]
    FundNotFound(FundId),

    /// No vault exists at the derived identity. Indicates a corrupted or
    /// half-created fund and should never occur under atomic creation.
    #[error("no vault at identity {0}")]
    VaultNotFound(VaultId),

    /// The referenced token is not registered with the ledger.
    #[error("unknown token {0}")]
    TokenNotFound(TokenId),

    /// The operation's authorization proof failed: missing key, key that
    /// doesn't hash to the claimed account, bad signature, or a redeemer
    /// other than the one stored in the fund.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Redemption attempted before the unlock instant. Carries both
    /// timestamps so callers can schedule a retry.
    #[error("fund is locked until {unlock_at} (now {now})")]
    RedeemLocked {
        /// The ledger's clock at execution time.
        now: DateTime<Utc>,
        /// The fund's unlock instant.
        unlock_at: DateTime<Utc>,
    },

    /// The vault is already empty. A second redemption fails here,
    /// deterministically — this is the exactly-once guarantee surfacing
    /// as an error instead of a silent zero-value transfer.
    #[error("fund {0} has already been redeemed (vault is empty)")]
    AlreadyRedeemed(FundId),

    /// The depositor does not hold enough of the token to fund the vault.
    /// Checked before any state is created.
    #[error("insufficient source balance for token {token}: available {available}, required {required}")]
    InsufficientSource {
        /// The token being deposited.
        token: TokenId,
        /// What the depositor actually holds.
        available: u64,
        /// What the deposit requires.
        required: u64,
    },

    /// A fund already exists at the derived identity — the sequence slot
    /// is taken. The client computed a stale index; re-list and retry.
    #[error("fund already exists at identity {0}")]
    FundExists(FundId),

    /// Zero-amount deposits are rejected at creation.
    #[error("fund amount must be greater than zero")]
    InvalidAmount,

    /// Crediting the recipient would overflow its balance.
    #[error("balance overflow crediting account")]
    BalanceOverflow,

    /// Infrastructure failure between the client and the ledger. Distinct
    /// from [`FundNotFound`] by design: discovery must never treat a
    /// network hiccup as end-of-sequence.
    #[error("transient gateway error: {0}")]
    Transient(String),

    /// Identity derivation rejected its inputs.
    #[error(transparent)]
    Derivation(#[from] FundError),

    /// Amount scaling rejected its inputs.
    #[error(transparent)]
    Amount(#[from] AmountError),
}

// ---------------------------------------------------------------------------
// CreateFund
// ---------------------------------------------------------------------------

/// The create-fund operation payload.
///
/// Executing this atomically (a) writes the fund record, (b) creates the
/// vault, and (c) moves the deposit from the owner into the vault. All
/// three effects or none — a partially created fund is never observable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateFund {
    /// The depositing account (address form).
    pub owner: AccountId,

    /// The owner's public key. The executor checks it hashes to `owner`.
    pub owner_key: AzaleaPublicKey,

    /// Signature over [`Self::signing_digest`] by the owner's key.
    pub signature: AzaleaSignature,

    /// The sequence slot being claimed. Must be the owner's fund count
    /// plus one: a smaller value collides with an existing fund (the
    /// ledger rejects it), a larger one leaves a gap that discovery will
    /// never probe past.
    pub sequence_index: u64,

    /// Display label for the fund.
    pub name: String,

    /// The token type being deposited.
    pub mint: TokenId,

    /// Deposit amount in base units. Scaling from human input happens
    /// before the payload is built, via `TokenInfo::to_base_units`.
    pub amount: u64,

    /// The single account that will be allowed to redeem.
    pub redeemer: AccountId,

    /// Instant after which redemption is permitted.
    pub redeem_timestamp: DateTime<Utc>,
}

impl CreateFund {
    /// Build and sign a create-fund operation in one step.
    pub fn new_signed(
        keypair: &AzaleaKeypair,
        sequence_index: u64,
        name: String,
        mint: TokenId,
        amount: u64,
        redeemer: AccountId,
        redeem_timestamp: DateTime<Utc>,
    ) -> Self {
        let owner_key = keypair.public_key();
        let owner = AccountId::from_public_key(&owner_key).address_only();
        let mut op = Self {
            owner,
            owner_key,
            signature: AzaleaSignature::from_bytes(Vec::new()),
            sequence_index,
            name,
            mint,
            amount,
            redeemer: redeemer.address_only(),
            redeem_timestamp,
        };
        op.signature = keypair.sign(&op.signing_digest());
        op
    }

    /// The digest the owner signs.
    ///
    /// Covers every field that affects execution, with `0x00` separators
    /// between variable-length parts, under a dedicated domain context so
    /// it can never collide with a redeem digest.
    pub fn signing_digest(&self) -> [u8; 32] {
        let mut preimage = Vec::with_capacity(128 + self.name.len());
        preimage.extend_from_slice(self.owner.key_hash());
        preimage.push(0x00);
        preimage.extend_from_slice(self.sequence_index.to_string().as_bytes());
        preimage.push(0x00);
        preimage.extend_from_slice(self.name.as_bytes());
        preimage.push(0x00);
        preimage.extend_from_slice(self.mint.as_bytes());
        preimage.extend_from_slice(&self.amount.to_le_bytes());
        preimage.extend_from_slice(self.redeemer.key_hash());
        preimage.extend_from_slice(&self.redeem_timestamp.timestamp().to_le_bytes());
        domain_separated_hash(CREATE_FUND_CONTEXT, &preimage)
    }

    /// Verify the embedded authorization proof: the key must hash to the
    /// claimed owner account and the signature must verify the digest.
    pub fn verify(&self) -> Result<(), LedgerError> {
        let claimed = AccountId::from_public_key(&self.owner_key);
        if claimed != self.owner {
            return Err(LedgerError::Unauthorized(
                "owner key does not hash to the claimed account".into(),
            ));
        }
        if !self.owner_key.verify(&self.signing_digest(), &self.signature) {
            return Err(LedgerError::Unauthorized(
                "invalid owner signature on create-fund".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Redeem
// ---------------------------------------------------------------------------

/// The redeem operation payload.
///
/// Intentionally has no amount parameter: the full vault balance is always
/// moved. Partial redemption would reopen every running-balance edge case
/// the protocol was designed to avoid, and would break the "balance zero
/// means redeemed" equivalence the lifecycle model rests on.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Redeem {
    /// The fund being redeemed.
    pub fund: FundId,

    /// The claimed redeeming account (address form).
    pub redeemer: AccountId,

    /// The redeemer's public key. The executor checks it hashes to
    /// `redeemer` — the structural half of the authorization.
    pub redeemer_key: AzaleaPublicKey,

    /// Signature over [`Self::signing_digest`] by the redeemer's key.
    pub signature: AzaleaSignature,
}

impl Redeem {
    /// Build and sign a redeem operation in one step.
    pub fn new_signed(keypair: &AzaleaKeypair, fund: FundId) -> Self {
        let redeemer_key = keypair.public_key();
        let redeemer = AccountId::from_public_key(&redeemer_key).address_only();
        let mut op = Self {
            fund,
            redeemer,
            redeemer_key,
            signature: AzaleaSignature::from_bytes(Vec::new()),
        };
        op.signature = keypair.sign(&op.signing_digest());
        op
    }

    /// The digest the redeemer signs: the fund identity under the redeem
    /// domain context.
    pub fn signing_digest(&self) -> [u8; 32] {
        domain_separated_hash(REDEEM_CONTEXT, self.fund.as_bytes())
    }

    /// Verify the embedded authorization proof.
    ///
    /// Note this only proves "the caller holds the key for the account it
    /// claims to be". Whether that account is the fund's stored redeemer
    /// is the executor's check, against its own copy of the record.
    pub fn verify(&self) -> Result<(), LedgerError> {
        let claimed = AccountId::from_public_key(&self.redeemer_key);
        if claimed != self.redeemer {
            return Err(LedgerError::Unauthorized(
                "redeemer key does not hash to the claimed account".into(),
            ));
        }
        if !self
            .redeemer_key
            .verify(&self.signing_digest(), &self.signature)
        {
            return Err(LedgerError::Unauthorized(
                "invalid redeemer signature on redeem".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LedgerGateway
// ---------------------------------------------------------------------------

/// The external ledger, as seen from the escrow core.
///
/// Implementations must provide serializable, all-or-nothing execution of
/// the two submit operations; the core adds no locking of its own. Every
/// method either completes or fails — timeout policy, if any, belongs to
/// the implementation, not to this trait.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Fetch a fund record by its derived identity.
    ///
    /// Returns [`LedgerError::FundNotFound`] when no record exists — the
    /// signal discovery uses to stop enumerating.
    async fn fetch_fund(&self, id: &FundId) -> Result<Fund, LedgerError>;

    /// Fetch the live balance of a vault.
    async fn fetch_balance(&self, vault: &VaultId) -> Result<u64, LedgerError>;

    /// Fetch token metadata (needed for decimal scaling).
    async fn fetch_token(&self, id: &TokenId) -> Result<TokenInfo, LedgerError>;

    /// Execute a create-fund operation atomically. Returns the new fund's
    /// identity.
    async fn submit_create(&self, op: CreateFund) -> Result<FundId, LedgerError>;

    /// Execute a redeem operation atomically. Returns the amount paid out
    /// (the entire vault balance at execution time).
    async fn submit_redeem(&self, op: Redeem) -> Result<u64, LedgerError>;
}
