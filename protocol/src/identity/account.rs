//! # Account Identities
//!
//! An Azalea account address is derived from the participant's Ed25519
//! public key via BLAKE3 hashing and Bech32 encoding:
//!
//! ```text
//! public_key (32 bytes)
//!     -> BLAKE3(public_key) -> 32 bytes
//!     -> Bech32("azl", hash) -> azl1qw508d6qe...
//! ```
//!
//! The address is the *identity*; the public key is auxiliary material
//! needed only when a signature has to be checked. An [`AccountId`] parsed
//! from an address string therefore carries no key — the executing ledger
//! requires operations to ship the key alongside the signature and checks
//! that it hashes back to the claimed address. That check is what makes
//! authorization structural: you cannot claim an account you don't hold
//! the key for, and the ledger never has to trust a bare assertion.

use bech32::{Bech32, Hrp};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::ACCOUNT_HRP;
use crate::crypto::keys::{AzaleaPublicKey, AzaleaSignature};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during account identity operations.
#[derive(Debug, Error)]
pub enum AccountIdError {
    /// The Bech32 string could not be decoded.
    #[error("bech32 decode error: {0}")]
    Bech32Decode(String),

    /// The decoded address has an unexpected human-readable prefix.
    #[error("invalid HRP: expected '{expected}', got '{got}'")]
    InvalidHrp {
        /// The expected HRP.
        expected: String,
        /// The HRP that was actually found.
        got: String,
    },

    /// The decoded data has an unexpected length.
    #[error("invalid address data length: expected {expected} bytes, got {got}")]
    InvalidDataLength {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes.
        got: usize,
    },

    /// Signature verification failed.
    #[error("signature verification failed")]
    SignatureVerificationFailed,

    /// The operation requires an attached public key but none is present.
    #[error("no public key attached to this AccountId (address-only mode)")]
    NoPublicKey,

    /// The provided public key does not hash to this account's address.
    #[error("public key hash does not match the stored address hash")]
    PublicKeyMismatch,
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// An Azalea account identity — the primary address format of the protocol.
///
/// Internally stores the BLAKE3 hash of the originating public key
/// (32 bytes) and optionally the public key itself for signature
/// verification. The Bech32 address is computed on the fly from the hash.
///
/// # Examples
///
/// ```
/// use azalea_protocol::crypto::keys::AzaleaKeypair;
/// use azalea_protocol::identity::AccountId;
///
/// let kp = AzaleaKeypair::generate();
/// let id = AccountId::from_public_key(&kp.public_key());
/// let address = id.to_address();
/// assert!(address.starts_with("azl1"));
///
/// let recovered = AccountId::from_address(&address).unwrap();
/// assert_eq!(id, recovered);
/// ```
#[derive(Clone, Eq)]
pub struct AccountId {
    /// BLAKE3 hash of the public key (32 bytes). This is what gets
    /// Bech32-encoded into the address string.
    key_hash: [u8; 32],

    /// The original public key, retained for signature verification
    /// without a separate lookup. `None` when the ID was parsed from an
    /// address string.
    public_key: Option<AzaleaPublicKey>,
}

impl AccountId {
    /// Create an account identity from a public key.
    ///
    /// Hashes the key bytes with BLAKE3 and stores both the hash (for
    /// address derivation) and the key (for verification).
    pub fn from_public_key(pk: &AzaleaPublicKey) -> Self {
        let key_hash = blake3::hash(pk.as_bytes());
        Self {
            key_hash: *key_hash.as_bytes(),
            public_key: Some(pk.clone()),
        }
    }

    /// Encode this identity as a Bech32 address string.
    ///
    /// The output has the form `azl1<bech32-encoded-hash>` and includes a
    /// checksum for error detection.
    pub fn to_address(&self) -> String {
        let hrp = Hrp::parse(ACCOUNT_HRP).expect("static HRP is valid");
        bech32::encode::<Bech32>(hrp, &self.key_hash)
            .expect("encoding a 32-byte payload should never fail")
    }

    /// Parse a Bech32-encoded Azalea address back into an [`AccountId`].
    ///
    /// Validates the HRP, checksum, and data length. The resulting
    /// `AccountId` will **not** have a public key attached — only the hash
    /// is recoverable from the address. Signature verification requires
    /// calling [`attach_public_key`](Self::attach_public_key).
    pub fn from_address(addr: &str) -> Result<Self, AccountIdError> {
        let (hrp, data) =
            bech32::decode(addr).map_err(|e| AccountIdError::Bech32Decode(e.to_string()))?;

        let expected_hrp = Hrp::parse(ACCOUNT_HRP).expect("static HRP is valid");
        if hrp != expected_hrp {
            return Err(AccountIdError::InvalidHrp {
                expected: ACCOUNT_HRP.to_string(),
                got: hrp.to_string(),
            });
        }

        if data.len() != 32 {
            return Err(AccountIdError::InvalidDataLength {
                expected: 32,
                got: data.len(),
            });
        }

        let mut key_hash = [0u8; 32];
        key_hash.copy_from_slice(&data);

        Ok(Self {
            key_hash,
            public_key: None,
        })
    }

    /// Verify a signature against this identity.
    ///
    /// Requires that this `AccountId` was created via
    /// [`from_public_key`](Self::from_public_key) or has had a key attached
    /// via [`attach_public_key`](Self::attach_public_key).
    pub fn verify_signature(
        &self,
        message: &[u8],
        signature: &AzaleaSignature,
    ) -> Result<(), AccountIdError> {
        let pk = self.public_key.as_ref().ok_or(AccountIdError::NoPublicKey)?;
        if pk.verify(message, signature) {
            Ok(())
        } else {
            Err(AccountIdError::SignatureVerificationFailed)
        }
    }

    /// Attach a public key to an `AccountId` recovered from an address.
    ///
    /// Validates that the key's BLAKE3 hash matches the stored hash. This
    /// is the structural-authorization check: supplying a key that does not
    /// hash to the address is rejected, so possession of the matching key
    /// is the only way to act as this account.
    pub fn attach_public_key(&mut self, pk: &AzaleaPublicKey) -> Result<(), AccountIdError> {
        let expected_hash = blake3::hash(pk.as_bytes());
        if expected_hash.as_bytes() != &self.key_hash {
            return Err(AccountIdError::PublicKeyMismatch);
        }
        self.public_key = Some(pk.clone());
        Ok(())
    }

    /// Return the raw 32-byte BLAKE3 hash underlying this address.
    ///
    /// These bytes feed into fund-identity derivation.
    pub fn key_hash(&self) -> &[u8; 32] {
        &self.key_hash
    }

    /// Return the attached public key, if any.
    pub fn public_key(&self) -> Option<&AzaleaPublicKey> {
        self.public_key.as_ref()
    }

    /// Strip the attached public key, keeping only the address hash.
    ///
    /// Useful when storing an account reference in a record where the key
    /// would be dead weight (e.g., the `redeemer` field of a fund).
    pub fn address_only(&self) -> Self {
        Self {
            key_hash: self.key_hash,
            public_key: None,
        }
    }
}

impl PartialEq for AccountId {
    fn eq(&self, other: &Self) -> bool {
        // Two AccountIds are equal if they represent the same address,
        // regardless of whether a public key is attached. The key_hash is
        // the canonical identity; the optional key is auxiliary metadata.
        self.key_hash == other.key_hash
    }
}

impl std::hash::Hash for AccountId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Must be consistent with PartialEq: only hash the key_hash field.
        self.key_hash.hash(state);
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_address())
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.to_address())
    }
}

impl Serialize for AccountId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_address())
        } else {
            serializer.serialize_bytes(&self.key_hash)
        }
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_address(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes: Vec<u8> = Vec::deserialize(deserializer)?;
            if bytes.len() != 32 {
                return Err(serde::de::Error::custom("expected 32 bytes"));
            }
            let mut key_hash = [0u8; 32];
            key_hash.copy_from_slice(&bytes);
            Ok(Self {
                key_hash,
                public_key: None,
            })
        }
    }
}
