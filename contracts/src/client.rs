//! # Escrow Client
//!
//! The account-holder's view of the escrow system. An [`EscrowClient`]
//! wraps a keypair and a gateway handle and exposes the three things a
//! participant actually does: list their funds, create a new one, and
//! redeem one addressed to them.
//!
//! The client owns two responsibilities the ledger deliberately does not:
//!
//! - **Index selection.** New funds claim sequence index `count + 1`,
//!   where `count` comes from a fresh enumeration. This keeps the owner's
//!   index sequence gap-free, which is what lets discovery stop at the
//!   first miss. The ledger only enforces that the slot is unclaimed; if a
//!   concurrent creation wins the slot, the submission fails with
//!   [`LedgerError::FundExists`] and the caller re-lists and retries.
//! - **Amount scaling.** Callers speak human units ("lock 100"); the
//!   client fetches the token's metadata and scales through the checked
//!   conversion exactly once, at this boundary.

use chrono::{DateTime, Utc};
use tracing::info;

use azalea_protocol::crypto::keys::AzaleaKeypair;
use azalea_protocol::identity::AccountId;
use azalea_protocol::token::TokenId;

use crate::discovery::discover_funds;
use crate::fund::{ClassifiedFund, FundId, FundState};
use crate::gateway::{CreateFund, LedgerError, LedgerGateway, Redeem};

// ---------------------------------------------------------------------------
// CreateFundParams
// ---------------------------------------------------------------------------

/// Caller-facing parameters for creating a fund.
///
/// Amounts are human-scale; scaling to base units happens inside
/// [`EscrowClient::create_fund`] using the token's registered decimals.
#[derive(Clone, Debug)]
pub struct CreateFundParams {
    /// Display label for the fund.
    pub name: String,

    /// The token type to deposit.
    pub mint: TokenId,

    /// Deposit amount in human units (e.g. `100` for "100 aUSD").
    pub amount: u64,

    /// The account that will be allowed to redeem.
    pub redeemer: AccountId,

    /// Instant after which redemption is permitted.
    pub redeem_timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// FundBoard
// ---------------------------------------------------------------------------

/// An owner's funds grouped by lifecycle state.
///
/// Within each group the discovery order — ascending sequence index — is
/// preserved.
#[derive(Clone, Debug, Default)]
pub struct FundBoard {
    /// Unlocked and waiting for the redeemer.
    pub open: Vec<ClassifiedFund>,
    /// Unlock instant still in the future.
    pub locked: Vec<ClassifiedFund>,
    /// Drained; kept for history.
    pub redeemed: Vec<ClassifiedFund>,
}

impl FundBoard {
    /// Group an enumeration result by state.
    pub fn from_funds(funds: Vec<ClassifiedFund>) -> Self {
        let mut board = Self::default();
        for fund in funds {
            match fund.state {
                FundState::Open => board.open.push(fund),
                FundState::Locked => board.locked.push(fund),
                FundState::Redeemed => board.redeemed.push(fund),
            }
        }
        board
    }

    /// Total number of funds across all groups.
    pub fn len(&self) -> usize {
        self.open.len() + self.locked.len() + self.redeemed.len()
    }

    /// True when the owner has no funds at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// EscrowClient
// ---------------------------------------------------------------------------

/// A participant's handle on the escrow system: one keypair, one gateway.
pub struct EscrowClient<G: LedgerGateway> {
    gateway: G,
    keypair: AzaleaKeypair,
    account: AccountId,
}

impl<G: LedgerGateway> EscrowClient<G> {
    /// Build a client around a keypair and a gateway handle.
    pub fn new(gateway: G, keypair: AzaleaKeypair) -> Self {
        let account = AccountId::from_public_key(&keypair.public_key());
        Self {
            gateway,
            keypair,
            account,
        }
    }

    /// This client's account identity.
    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// Enumerate this account's funds, classified against live state.
    pub async fn list_funds(&self) -> Result<Vec<ClassifiedFund>, LedgerError> {
        discover_funds(&self.gateway, &self.account).await
    }

    /// Enumerate and group this account's funds by lifecycle state.
    pub async fn fund_board(&self) -> Result<FundBoard, LedgerError> {
        Ok(FundBoard::from_funds(self.list_funds().await?))
    }

    /// Create a new fund, depositing `params.amount` (human units) of
    /// `params.mint` for `params.redeemer`.
    ///
    /// Enumerates first to pick the next gap-free sequence index, scales
    /// the amount through the token's registered decimals, then signs and
    /// submits. Returns the new fund's identity.
    pub async fn create_fund(&self, params: CreateFundParams) -> Result<FundId, LedgerError> {
        let existing = self.list_funds().await?;
        let sequence_index = existing.len() as u64 + 1;

        let token = self.gateway.fetch_token(&params.mint).await?;
        let base_amount = token.to_base_units(params.amount)?;

        info!(
            owner = %self.account,
            index = sequence_index,
            amount = base_amount,
            token = %token.symbol,
            "submitting fund creation"
        );

        let op = CreateFund::new_signed(
            &self.keypair,
            sequence_index,
            params.name,
            params.mint,
            base_amount,
            params.redeemer,
            params.redeem_timestamp,
        );
        self.gateway.submit_create(op).await
    }

    /// Redeem a fund addressed to this account. Returns the amount paid
    /// out in base units.
    pub async fn redeem(&self, fund: FundId) -> Result<u64, LedgerError> {
        info!(redeemer = %self.account, fund = %fund, "submitting redemption");
        let op = Redeem::new_signed(&self.keypair, fund);
        self.gateway.submit_redeem(op).await
    }
}
