//! Discovery behavior against an unreliable gateway: enumeration must stop
//! only on a genuine miss, and must refuse to return a truncated list when
//! the infrastructure fails mid-walk.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use azalea_contracts::{
    discover_funds, CreateFund, Fund, FundId, LedgerError, LedgerGateway, MemoryLedger, Redeem,
    VaultId,
};
use azalea_protocol::crypto::keys::AzaleaKeypair;
use azalea_protocol::identity::AccountId;
use azalea_protocol::token::{TokenId, TokenInfo};

fn keypair(seed: u8) -> AzaleaKeypair {
    AzaleaKeypair::from_seed(&[seed; 32])
}

fn account(seed: u8) -> AccountId {
    AccountId::from_public_key(&keypair(seed).public_key())
}

async fn ledger_with_funds(owner_seed: u8, count: u64) -> MemoryLedger {
    let ledger = MemoryLedger::new();
    let token = TokenInfo::new("Azalea Dollar", "aUSD", 6, "azl1issuer");
    ledger.register_token(token.clone());
    ledger
        .credit(&account(owner_seed), &token.id, 1_000_000)
        .unwrap();

    for index in 1..=count {
        let op = CreateFund::new_signed(
            &keypair(owner_seed),
            index,
            format!("fund {index}"),
            token.id,
            1_000,
            account(9),
            Utc::now() + Duration::days(1),
        );
        ledger.submit_create(op).await.unwrap();
    }
    ledger
}

/// A gateway that delegates to a [`MemoryLedger`] but fails the Nth fund
/// fetch with a transient error, simulating a network hiccup mid-walk.
struct FlakyGateway {
    inner: MemoryLedger,
    fetch_count: Arc<AtomicU64>,
    fail_on_fetch: u64,
}

impl FlakyGateway {
    fn failing_on(inner: MemoryLedger, fail_on_fetch: u64) -> Self {
        Self {
            inner,
            fetch_count: Arc::new(AtomicU64::new(0)),
            fail_on_fetch,
        }
    }
}

#[async_trait]
impl LedgerGateway for FlakyGateway {
    async fn fetch_fund(&self, id: &FundId) -> Result<Fund, LedgerError> {
        let n = self.fetch_count.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.fail_on_fetch {
            return Err(LedgerError::Transient("connection reset".into()));
        }
        self.inner.fetch_fund(id).await
    }

    async fn fetch_balance(&self, vault: &VaultId) -> Result<u64, LedgerError> {
        self.inner.fetch_balance(vault).await
    }

    async fn fetch_token(&self, id: &TokenId) -> Result<TokenInfo, LedgerError> {
        self.inner.fetch_token(id).await
    }

    async fn submit_create(&self, op: CreateFund) -> Result<FundId, LedgerError> {
        self.inner.submit_create(op).await
    }

    async fn submit_redeem(&self, op: Redeem) -> Result<u64, LedgerError> {
        self.inner.submit_redeem(op).await
    }
}

#[tokio::test]
async fn finds_the_whole_prefix_and_stops_at_the_first_miss() {
    let ledger = ledger_with_funds(1, 10).await;
    let funds = discover_funds(&ledger, &account(1)).await.unwrap();

    assert_eq!(funds.len(), 10);
    let indices: Vec<u64> = funds.iter().map(|f| f.fund.sequence_index).collect();
    assert_eq!(indices, (1..=10).collect::<Vec<u64>>());
}

#[tokio::test]
async fn transient_failure_aborts_instead_of_truncating() {
    let ledger = ledger_with_funds(1, 10).await;

    // The hiccup lands on probe 3 of what should be an 11-probe walk.
    // A lenient enumerator would report 2 funds and call it a day; ours
    // must surface the failure.
    let flaky = FlakyGateway::failing_on(ledger, 3);
    let err = discover_funds(&flaky, &account(1)).await.unwrap_err();
    assert!(matches!(err, LedgerError::Transient(_)));
}

#[tokio::test]
async fn retry_after_transient_failure_sees_everything() {
    let ledger = ledger_with_funds(1, 5).await;
    let flaky = FlakyGateway::failing_on(ledger.clone(), 2);

    assert!(discover_funds(&flaky, &account(1)).await.is_err());

    // The flake was a one-off; a fresh walk over the same state succeeds
    // and reports the full set.
    let funds = discover_funds(&ledger, &account(1)).await.unwrap();
    assert_eq!(funds.len(), 5);
}

#[tokio::test]
async fn owners_see_only_their_own_funds() {
    let ledger = ledger_with_funds(1, 4).await;

    // Give a second owner two funds on the same ledger.
    let token = TokenInfo::new("Azalea Dollar", "aUSD", 6, "azl1issuer");
    ledger.credit(&account(2), &token.id, 1_000_000).unwrap();
    for index in 1..=2u64 {
        let op = CreateFund::new_signed(
            &keypair(2),
            index,
            format!("second owner {index}"),
            token.id,
            500,
            account(9),
            Utc::now() + Duration::days(1),
        );
        ledger.submit_create(op).await.unwrap();
    }

    assert_eq!(discover_funds(&ledger, &account(1)).await.unwrap().len(), 4);
    assert_eq!(discover_funds(&ledger, &account(2)).await.unwrap().len(), 2);
    assert!(discover_funds(&ledger, &account(3)).await.unwrap().is_empty());
}
