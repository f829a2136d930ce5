//! # Protocol Configuration & Constants
//!
//! Every magic number in Azalea lives here. If you're hardcoding a constant
//! somewhere else, you're doing it wrong and you owe the team coffee.
//!
//! The seed tags below are part of the address-derivation scheme. Changing
//! them after launch silently orphans every fund ever created, so treat
//! them as frozen.

// ---------------------------------------------------------------------------
// Derivation Seed Tags
// ---------------------------------------------------------------------------

/// Namespace tag for fund identities.
///
/// A fund identity is derived from `FUND_SEED || owner || index`, so two
/// owners (or two indices) can never produce the same fund.
pub const FUND_SEED: &[u8] = b"fund";

/// Namespace tag for the global vault authority.
///
/// There is exactly one vault authority per deployment. It has no keypair —
/// it exists only as a derived identity, and the executing ledger is the
/// sole party that may act as it.
pub const TOKEN_VAULT_AUTHORITY_SEED: &[u8] = b"token-vault-authority";

// ---------------------------------------------------------------------------
// Addressing
// ---------------------------------------------------------------------------

/// Human-readable prefix for account addresses.
/// Bech32 HRP — short enough to type, long enough to be unambiguous.
pub const ACCOUNT_HRP: &str = "azl";

// ---------------------------------------------------------------------------
// Enumeration
// ---------------------------------------------------------------------------

/// Sequence indices are 1-based and dense: the first fund an owner creates
/// sits at index 1, the next at 2, with no gaps. Discovery depends on this —
/// a linear probe stops at the first unused index.
pub const FIRST_SEQUENCE_INDEX: u64 = 1;

// ---------------------------------------------------------------------------
// Token Limits
// ---------------------------------------------------------------------------

/// Upper bound on token decimal places.
///
/// 10^19 overflows u64, so 19+ decimals could never represent even a single
/// whole token. 18 matches the most granular mainstream convention (wei).
pub const MAX_TOKEN_DECIMALS: u8 = 18;
