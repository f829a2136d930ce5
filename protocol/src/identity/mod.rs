//! # Identity Module
//!
//! Account identities for the Azalea protocol. Every principal — the owner
//! who locks tokens and the redeemer who eventually collects them — is
//! identified by an Ed25519 keypair, from which we derive a Bech32-encoded
//! account address (human-readable, checksummed, hard to fat-finger).
//!
//! The identity stack is two layers:
//!
//! 1. **Keypair** — Raw Ed25519 key material (see [`crate::crypto::keys`]).
//!    Signs operations, proves ownership.
//! 2. **AccountId** — BLAKE3 hash of the public key, Bech32-encoded with
//!    the `azl` HRP. This is what users see, share, and paste into the
//!    "redeemer" field when creating a fund.
//!
//! ## Design Decisions
//!
//! - Hashing the public key (rather than encoding it raw) gives a layer of
//!   indirection and a consistent 32-byte identity regardless of future key
//!   scheme changes.
//! - Bech32 (not Bech32m) — we're encoding raw hashes, not witness
//!   programs, and Bech32's error detection (up to 4 character errors) is
//!   what matters when addresses travel through chat apps and clipboards.

pub mod account;

pub use account::{AccountId, AccountIdError};
