//! # Fund Discovery
//!
//! There is no index of funds anywhere, so an owner's fund set is found by
//! re-deriving it: probe the identity for index 1, then 2, then 3, until a
//! probe comes back [`LedgerError::FundNotFound`]. Because creation always
//! claims `count + 1`, the owner's funds occupy a gap-free prefix of the
//! index sequence, and the first miss is a proof that no higher index is
//! occupied.
//!
//! That proof only holds if a miss really means *missing*. A transient
//! infrastructure failure at index 3 of 10 must not be mistaken for the end
//! of the sequence — treating it that way would silently report 2 funds
//! where 10 exist. So this module is strict: `FundNotFound` terminates,
//! every other error aborts the walk and propagates to the caller, who can
//! retry the whole enumeration once the ledger is reachable again.

use chrono::Utc;
use tracing::debug;

use azalea_protocol::config::FIRST_SEQUENCE_INDEX;
use azalea_protocol::identity::AccountId;

use crate::fund::{ClassifiedFund, FundId, FundState};
use crate::gateway::{LedgerError, LedgerGateway};

/// Enumerate every fund owned by `owner`, classified against the live
/// ledger state.
///
/// Results are in ascending sequence-index order. Each fund's state is
/// computed from its vault balance and the clock at observation time, so
/// two calls straddling an unlock instant may legitimately disagree.
///
/// # Errors
///
/// Any gateway failure other than `FundNotFound` — including
/// [`LedgerError::Transient`] — is returned as-is. A partial list is never
/// returned on error: callers get the whole truth or a failure they can
/// retry, nothing in between.
pub async fn discover_funds<G: LedgerGateway>(
    gateway: &G,
    owner: &AccountId,
) -> Result<Vec<ClassifiedFund>, LedgerError> {
    let mut found = Vec::new();
    let mut index = FIRST_SEQUENCE_INDEX;

    loop {
        let id = FundId::derive(owner, index)?;
        debug!(owner = %owner, index, fund = %id, "probing fund identity");

        match gateway.fetch_fund(&id).await {
            Ok(fund) => {
                let vault_balance = gateway.fetch_balance(&fund.token_vault).await?;
                let state = FundState::classify(&fund, vault_balance, Utc::now());
                found.push(ClassifiedFund {
                    id,
                    fund,
                    vault_balance,
                    state,
                });
                index += 1;
            }
            Err(LedgerError::FundNotFound(_)) => {
                debug!(owner = %owner, count = found.len(), "enumeration complete");
                return Ok(found);
            }
            Err(other) => return Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::CreateFund;
    use crate::ledger::MemoryLedger;
    use azalea_protocol::crypto::keys::AzaleaKeypair;
    use azalea_protocol::token::TokenInfo;
    use chrono::Duration;

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
                100,
                account(9),
                Utc::now() + Duration::days(index as i64),
            );
            ledger.submit_create(op).await.unwrap();
        }
        ledger
    }

    #[tokio::test]
    async fn empty_owner_yields_empty_list() {
        let ledger = MemoryLedger::new();
        let funds = discover_funds(&ledger, &account(1)).await.unwrap();
        assert!(funds.is_empty());
    }

    #[tokio::test]
    async fn finds_all_funds_in_index_order() {
        let ledger = ledger_with_funds(1, 5).await;
        let funds = discover_funds(&ledger, &account(1)).await.unwrap();

        assert_eq!(funds.len(), 5);
        for (i, row) in funds.iter().enumerate() {
            assert_eq!(row.fund.sequence_index, (i + 1) as u64);
            assert_eq!(row.id, FundId::derive(&account(1), (i + 1) as u64).unwrap());
        }
    }

    #[tokio::test]
    async fn enumeration_is_per_owner() {
        let ledger = ledger_with_funds(1, 3).await;
        // A different owner with no funds sees nothing, even though the
        // ledger holds three records.
        let funds = discover_funds(&ledger, &account(2)).await.unwrap();
        assert!(funds.is_empty());
    }

    #[tokio::test]
    async fn classification_reflects_live_state() {
        let ledger = ledger_with_funds(1, 2).await;
        let funds = discover_funds(&ledger, &account(1)).await.unwrap();

        // All unlocks are in the future and nothing has been redeemed.
        assert!(funds.iter().all(|f| f.state == FundState::Locked));
        assert!(funds.iter().all(|f| f.vault_balance == 100));
    }
}
