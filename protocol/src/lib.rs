// Copyright (c) 2026 Azalea Labs. MIT License.
// See LICENSE for details.

//! # Azalea Protocol — Core Library
//!
//! The substrate for Azalea, a time-locked token fund system: anyone can
//! lock tokens in a vault that exactly one designated recipient can drain,
//! in full, once an agreed unlock instant has passed.
//!
//! This crate owns the primitives every other layer builds on. The escrow
//! lifecycle itself (fund records, discovery, redemption) lives in
//! `azalea-contracts`; what you find here is deliberately boring:
//!
//! - **crypto** — BLAKE3 hashing and Ed25519 keys. Don't roll your own.
//! - **identity** — Bech32 account addresses derived from public keys.
//! - **token** — Token metadata: mints, decimals, and the one place in the
//!   codebase allowed to convert human amounts into base units.
//! - **config** — Protocol constants. Seed tags live here and nowhere else.
//!
//! ## Design Philosophy
//!
//! 1. Identities are derived, never assigned. Same inputs, same identity,
//!    on every machine, forever.
//! 2. All monetary arithmetic is checked. Wrapping math and money do not mix.
//! 3. Every public type serializes (serde) for wire transport and storage.
//! 4. If it touches money, it has tests. Plural.

pub mod config;
pub mod crypto;
pub mod identity;
pub mod token;
