//! # Azalea Escrow Contracts
//!
//! The escrow core of Azalea: lock tokens in a vault that exactly one
//! designated redeemer can drain, in full, once an unlock instant has
//! passed. A fund's whole lifecycle is:
//!
//! 1. **Create** — the owner deposits tokens; a fund record and its vault
//!    come into existence atomically with the deposit.
//! 2. **Locked** — the unlock instant is still in the future. Nobody can
//!    touch the vault, not even the owner.
//! 3. **Open** — the unlock instant has passed; the redeemer may collect.
//! 4. **Redeemed** — the vault has been drained, exactly once, in full.
//!
//! There is no cancel, no top-up, no partial withdrawal. A fund is
//! immutable except for the single balance-draining transition, which is
//! what makes the state machine this small.
//!
//! ## Design Principles
//!
//! 1. **Identities are derived, never indexed.** A fund's identity is a
//!    hash of `(owner, sequence index)`; its vault's identity is a hash of
//!    the fund's. Discovery re-derives candidate identities and probes the
//!    ledger — there is no registry to maintain or desynchronize.
//! 2. **Redemption status is the vault balance.** No `redeemed` flag
//!    exists anywhere. A second source of truth is a second thing that can
//!    lie.
//! 3. **Authorization is structural.** Operations carry a public key and a
//!    signature; the executing ledger checks that the key hashes to the
//!    claimed account and that the signature verifies. Nobody asserts an
//!    identity — they prove it.
//! 4. All monetary operations use checked arithmetic, because wrapping
//!    math and money do not mix.

pub mod client;
pub mod discovery;
pub mod fund;
pub mod gateway;
pub mod ledger;

pub use client::{CreateFundParams, EscrowClient, FundBoard};
pub use discovery::discover_funds;
pub use fund::{vault_authority_id, ClassifiedFund, Fund, FundId, FundState, VaultAuthorityId, VaultId};
pub use gateway::{CreateFund, LedgerError, LedgerGateway, Redeem};
pub use ledger::MemoryLedger;
