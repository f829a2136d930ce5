//! # In-Memory Ledger
//!
//! A complete, self-contained [`LedgerGateway`] implementation backed by
//! process memory. It is the reference executor: every rule the gateway
//! contract states — structural authorization, atomic create, time-gated
//! exactly-once redemption — is enforced here, in one place, under one
//! lock.
//!
//! Concurrency model: all state lives behind a single `RwLock`. Reads take
//! the read lock; `submit_create` and `submit_redeem` take the write lock
//! for their whole validate-then-apply span, which makes each submission
//! serializable and all-or-nothing without any per-entry bookkeeping.
//! Validation never mutates, so an operation that fails any check leaves
//! the ledger byte-for-byte untouched.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};

use azalea_protocol::identity::AccountId;
use azalea_protocol::token::{TokenId, TokenInfo};

use crate::fund::{vault_authority_id, Fund, FundId, VaultId};
use crate::gateway::{CreateFund, LedgerError, LedgerGateway, Redeem};

// ---------------------------------------------------------------------------
// LedgerState
// ---------------------------------------------------------------------------

/// Everything the ledger knows, guarded as a unit.
#[derive(Default)]
struct LedgerState {
    /// Registered token types, by content-addressed ID.
    tokens: HashMap<TokenId, TokenInfo>,

    /// Free balances held by accounts, per token.
    balances: HashMap<(AccountId, TokenId), u64>,

    /// Fund records, by derived identity.
    funds: HashMap<FundId, Fund>,

    /// Vault balances, by derived identity. A vault entry exists from the
    /// moment its fund does; redemption drops it to zero, never removes it.
    vaults: HashMap<VaultId, u64>,
}

// ---------------------------------------------------------------------------
// MemoryLedger
// ---------------------------------------------------------------------------

/// An in-memory ledger executor.
///
/// Cheap to clone — clones share the same underlying state, so a test can
/// hand one handle to a client and keep another for assertions.
#[derive(Clone, Default)]
pub struct MemoryLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl MemoryLedger {
    /// Create an empty ledger: no tokens, no balances, no funds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token type so funds can reference it.
    pub fn register_token(&self, token: TokenInfo) {
        let mut state = self.state.write();
        debug!(token = %token.id, symbol = %token.symbol, "registering token");
        state.tokens.insert(token.id, token);
    }

    /// Credit an account's free balance. Test and genesis plumbing; real
    /// deployments mint through the issuer path. Even here the arithmetic
    /// is checked: a credit that would overflow fails instead of capping.
    pub fn credit(
        &self,
        account: &AccountId,
        token: &TokenId,
        amount: u64,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.write();
        let balance = state
            .balances
            .entry((account.address_only(), *token))
            .or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow)?;
        Ok(())
    }

    /// Read an account's free balance for a token.
    pub fn account_balance(&self, account: &AccountId, token: &TokenId) -> u64 {
        let state = self.state.read();
        state
            .balances
            .get(&(account.address_only(), *token))
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl LedgerGateway for MemoryLedger {
    async fn fetch_fund(&self, id: &FundId) -> Result<Fund, LedgerError> {
        let state = self.state.read();
        state
            .funds
            .get(id)
            .cloned()
            .ok_or(LedgerError::FundNotFound(*id))
    }

    async fn fetch_balance(&self, vault: &VaultId) -> Result<u64, LedgerError> {
        let state = self.state.read();
        state
            .vaults
            .get(vault)
            .copied()
            .ok_or(LedgerError::VaultNotFound(*vault))
    }

    async fn fetch_token(&self, id: &TokenId) -> Result<TokenInfo, LedgerError> {
        let state = self.state.read();
        state
            .tokens
            .get(id)
            .cloned()
            .ok_or(LedgerError::TokenNotFound(*id))
    }

    async fn submit_create(&self, op: CreateFund) -> Result<FundId, LedgerError> {
        // Authorization first: prove the caller holds the owner key.
        op.verify()?;

        let fund_id = FundId::derive(&op.owner, op.sequence_index)?;
        let vault_id = VaultId::for_fund(&fund_id);

        let mut state = self.state.write();

        // Validate everything before touching anything.
        if !state.tokens.contains_key(&op.mint) {
            return Err(LedgerError::TokenNotFound(op.mint));
        }
        if op.amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        if state.funds.contains_key(&fund_id) {
            return Err(LedgerError::FundExists(fund_id));
        }
        let source_key = (op.owner.address_only(), op.mint);
        let available = state.balances.get(&source_key).copied().unwrap_or(0);
        if available < op.amount {
            return Err(LedgerError::InsufficientSource {
                token: op.mint,
                available,
                required: op.amount,
            });
        }

        // Apply. Record, vault, and deposit come into being together.
        state.balances.insert(source_key, available - op.amount);
        state.vaults.insert(vault_id, op.amount);
        state.funds.insert(
            fund_id,
            Fund {
                name: op.name,
                mint: op.mint,
                amount: op.amount,
                redeem_timestamp: op.redeem_timestamp,
                token_vault: vault_id,
                token_vault_authority: vault_authority_id(),
                redeemer: op.redeemer.address_only(),
                sequence_index: op.sequence_index,
            },
        );

        info!(
            fund = %fund_id,
            owner = %op.owner,
            amount = op.amount,
            unlock_at = %op.redeem_timestamp,
            "fund created"
        );
        Ok(fund_id)
    }

    async fn submit_redeem(&self, op: Redeem) -> Result<u64, LedgerError> {
        op.verify()?;

        let mut state = self.state.write();

        let fund = state
            .funds
            .get(&op.fund)
            .cloned()
            .ok_or(LedgerError::FundNotFound(op.fund))?;

        // The signature proved key possession; this check binds that key
        // to the one account the fund names.
        if op.redeemer != fund.redeemer {
            return Err(LedgerError::Unauthorized(format!(
                "account {} is not the designated redeemer of fund {}",
                op.redeemer, op.fund
            )));
        }

        let now = Utc::now();
        if now < fund.redeem_timestamp {
            return Err(LedgerError::RedeemLocked {
                now,
                unlock_at: fund.redeem_timestamp,
            });
        }

        let vault_balance = state
            .vaults
            .get(&fund.token_vault)
            .copied()
            .ok_or(LedgerError::VaultNotFound(fund.token_vault))?;
        if vault_balance == 0 {
            return Err(LedgerError::AlreadyRedeemed(op.fund));
        }

        // Check the credit side before mutating either side.
        let dest_key = (op.redeemer.address_only(), fund.mint);
        let dest_balance = state.balances.get(&dest_key).copied().unwrap_or(0);
        let credited = dest_balance
            .checked_add(vault_balance)
            .ok_or(LedgerError::BalanceOverflow)?;

        // Drain in full. Whatever the vault holds moves, in one step.
        state.vaults.insert(fund.token_vault, 0);
        state.balances.insert(dest_key, credited);

        info!(
            fund = %op.fund,
            redeemer = %op.redeemer,
            amount = vault_balance,
            "fund redeemed"
        );
        Ok(vault_balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azalea_protocol::crypto::keys::AzaleaKeypair;
    use chrono::Duration;

    fn keypair(seed: u8) -> AzaleaKeypair {
        AzaleaKeypair::from_seed(&[seed; 32])
    }

    fn account(seed: u8) -> AccountId {
        AccountId::from_public_key(&keypair(seed).public_key())
    }

    fn test_token() -> TokenInfo {
        TokenInfo::new("Azalea Dollar", "aUSD", 6, "azl1issuer")
    }

    fn funded_ledger(owner_seed: u8, balance: u64) -> (MemoryLedger, TokenInfo) {
        let ledger = MemoryLedger::new();
        let token = test_token();
        ledger.register_token(token.clone());
        ledger.credit(&account(owner_seed), &token.id, balance).unwrap();
        (ledger, token)
    }

    #[tokio::test]
    async fn create_moves_deposit_into_vault() {
        let (ledger, token) = funded_ledger(1, 1_000);
        let op = CreateFund::new_signed(
            &keypair(1),
            1,
            "rent deposit".into(),
            token.id,
            400,
            account(2),
            Utc::now() + Duration::days(1),
        );

        let fund_id = ledger.submit_create(op).await.unwrap();
        let fund = ledger.fetch_fund(&fund_id).await.unwrap();

        assert_eq!(ledger.fetch_balance(&fund.token_vault).await.unwrap(), 400);
        assert_eq!(ledger.account_balance(&account(1), &token.id), 600);
    }

    #[tokio::test]
    async fn create_rejects_unregistered_token() {
        let ledger = MemoryLedger::new();
        let op = CreateFund::new_signed(
            &keypair(1),
            1,
            "ghost".into(),
            test_token().id,
            100,
            account(2),
            Utc::now(),
        );
        assert!(matches!(
            ledger.submit_create(op).await,
            Err(LedgerError::TokenNotFound(_))
        ));
    }

    #[tokio::test]
    async fn create_rejects_zero_amount() {
        let (ledger, token) = funded_ledger(1, 1_000);
        let op = CreateFund::new_signed(
            &keypair(1),
            1,
            "empty".into(),
            token.id,
            0,
            account(2),
            Utc::now(),
        );
        assert!(matches!(
            ledger.submit_create(op).await,
            Err(LedgerError::InvalidAmount)
        ));
    }

    #[tokio::test]
    async fn failed_create_leaves_no_trace() {
        let (ledger, token) = funded_ledger(1, 50);
        let op = CreateFund::new_signed(
            &keypair(1),
            1,
            "too big".into(),
            token.id,
            100,
            account(2),
            Utc::now(),
        );
        let fund_id = FundId::derive(&account(1), 1).unwrap();

        assert!(matches!(
            ledger.submit_create(op).await,
            Err(LedgerError::InsufficientSource { available: 50, required: 100, .. })
        ));

        // No fund, no vault, balance untouched.
        assert!(matches!(
            ledger.fetch_fund(&fund_id).await,
            Err(LedgerError::FundNotFound(_))
        ));
        assert!(matches!(
            ledger.fetch_balance(&VaultId::for_fund(&fund_id)).await,
            Err(LedgerError::VaultNotFound(_))
        ));
        assert_eq!(ledger.account_balance(&account(1), &token.id), 50);
    }

    #[tokio::test]
    async fn duplicate_sequence_index_rejected() {
        let (ledger, token) = funded_ledger(1, 1_000);
        let make_op = || {
            CreateFund::new_signed(
                &keypair(1),
                1,
                "slot one".into(),
                token.id,
                100,
                account(2),
                Utc::now() + Duration::days(1),
            )
        };

        ledger.submit_create(make_op()).await.unwrap();
        assert!(matches!(
            ledger.submit_create(make_op()).await,
            Err(LedgerError::FundExists(_))
        ));
        // The first fund's vault is untouched by the rejected retry.
        let fund_id = FundId::derive(&account(1), 1).unwrap();
        let fund = ledger.fetch_fund(&fund_id).await.unwrap();
        assert_eq!(ledger.fetch_balance(&fund.token_vault).await.unwrap(), 100);
    }

    #[tokio::test]
    async fn redeem_before_unlock_rejected() {
        let (ledger, token) = funded_ledger(1, 1_000);
        let unlock_at = Utc::now() + Duration::days(1);
        let op = CreateFund::new_signed(
            &keypair(1),
            1,
            "locked".into(),
            token.id,
            100,
            account(2),
            unlock_at,
        );
        let fund_id = ledger.submit_create(op).await.unwrap();

        let err = ledger
            .submit_redeem(Redeem::new_signed(&keypair(2), fund_id))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::RedeemLocked { .. }));

        // Nothing moved.
        let fund = ledger.fetch_fund(&fund_id).await.unwrap();
        assert_eq!(ledger.fetch_balance(&fund.token_vault).await.unwrap(), 100);
        assert_eq!(ledger.account_balance(&account(2), &token.id), 0);
    }

    #[tokio::test]
    async fn redeem_drains_vault_exactly_once() {
        let (ledger, token) = funded_ledger(1, 1_000);
        let op = CreateFund::new_signed(
            &keypair(1),
            1,
            "payday".into(),
            token.id,
            250,
            account(2),
            Utc::now() - Duration::minutes(1),
        );
        let fund_id = ledger.submit_create(op).await.unwrap();

        let paid = ledger
            .submit_redeem(Redeem::new_signed(&keypair(2), fund_id))
            .await
            .unwrap();
        assert_eq!(paid, 250);

        let fund = ledger.fetch_fund(&fund_id).await.unwrap();
        assert_eq!(ledger.fetch_balance(&fund.token_vault).await.unwrap(), 0);
        assert_eq!(ledger.account_balance(&account(2), &token.id), 250);

        // Second attempt fails deterministically, balances unchanged.
        let err = ledger
            .submit_redeem(Redeem::new_signed(&keypair(2), fund_id))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyRedeemed(_)));
        assert_eq!(ledger.account_balance(&account(2), &token.id), 250);
    }

    #[tokio::test]
    async fn wrong_redeemer_rejected() {
        let (ledger, token) = funded_ledger(1, 1_000);
        let op = CreateFund::new_signed(
            &keypair(1),
            1,
            "for bob only".into(),
            token.id,
            100,
            account(2),
            Utc::now() - Duration::minutes(1),
        );
        let fund_id = ledger.submit_create(op).await.unwrap();

        // A third party with a perfectly valid signature over its own
        // account still isn't the designated redeemer.
        let err = ledger
            .submit_redeem(Redeem::new_signed(&keypair(3), fund_id))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized(_)));

        let fund = ledger.fetch_fund(&fund_id).await.unwrap();
        assert_eq!(ledger.fetch_balance(&fund.token_vault).await.unwrap(), 100);
    }

    #[tokio::test]
    async fn redeem_unknown_fund_rejected() {
        let ledger = MemoryLedger::new();
        let fund_id = FundId::derive(&account(1), 7).unwrap();
        let err = ledger
            .submit_redeem(Redeem::new_signed(&keypair(2), fund_id))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::FundNotFound(_)));
    }

    #[tokio::test]
    async fn cloned_handles_share_state() {
        let (ledger, token) = funded_ledger(1, 500);
        let handle = ledger.clone();
        handle.credit(&account(1), &token.id, 100).unwrap();
        assert_eq!(ledger.account_balance(&account(1), &token.id), 600);
    }

    #[tokio::test]
    async fn overflowing_credit_rejected() {
        let (ledger, token) = funded_ledger(1, 500);
        let err = ledger.credit(&account(1), &token.id, u64::MAX).unwrap_err();
        assert!(matches!(err, LedgerError::BalanceOverflow));
        // The failed credit changed nothing.
        assert_eq!(ledger.account_balance(&account(1), &token.id), 500);
    }
}
