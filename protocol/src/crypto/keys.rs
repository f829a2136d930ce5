//! # Key Management
//!
//! Ed25519 keypair generation and signing for Azalea identities.
//!
//! Every principal in Azalea — fund owners and redeemers alike — is
//! ultimately an Ed25519 keypair. Creating a fund and redeeming one are the
//! only two state-changing operations in the protocol, and both are
//! authorized by a signature checked against the account the caller claims
//! to be.
//!
//! ## Why Ed25519?
//!
//! - Deterministic signatures (no k-value footguns like ECDSA).
//! - 128-bit security level in 32+32 bytes. Compact and sufficient.
//! - Constant-time implementations exist and are well-audited.
//!
//! ## Security considerations
//!
//! - Private keys are zeroized on drop (thanks, ed25519-dalek).
//! - We use OS-level RNG (`OsRng`) for key generation.
//! - Key bytes are never logged. If you add logging to this module,
//!   you will be asked to leave.

use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey, SECRET_KEY_LENGTH,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during key operations.
///
/// Intentionally vague about *why* something failed — leaking details
/// about key material through error messages is a classic footgun.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,
}

/// An Azalea identity keypair wrapping an Ed25519 signing key.
///
/// This is the atomic unit of identity in the protocol. Every account
/// address and every operation signature traces back to one of these.
///
/// ## Serialization
///
/// `AzaleaKeypair` intentionally does NOT implement `Serialize`/`Deserialize`.
/// Serializing private keys should be a deliberate, conscious act, not
/// something that happens because someone shoved a keypair into a JSON
/// response. Use `to_bytes()` / `from_seed()` explicitly.
///
/// # Examples
///
/// ```
/// use azalea_protocol::crypto::keys::AzaleaKeypair;
///
/// let kp = AzaleaKeypair::generate();
/// let msg = b"redeem fund 7";
/// let sig = kp.sign(msg);
/// assert!(kp.public_key().verify(msg, &sig));
/// ```
pub struct AzaleaKeypair {
    /// The Ed25519 signing (private) key. 32 bytes of pure responsibility.
    signing_key: SigningKey,
}

/// The public half of an Azalea identity, safe to share with the world.
///
/// This is what you hand out so others can verify your signatures and lock
/// funds for you. Losing it is inconvenient but not catastrophic — it can
/// be re-derived from the signing key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzaleaPublicKey {
    bytes: [u8; 32],
}

/// An Ed25519 signature over a message.
///
/// 64 bytes, deterministic for a given (key, message) pair. Stored as
/// `Vec<u8>` for serde compatibility, but always exactly 64 bytes. If
/// someone hands you an `AzaleaSignature` that isn't 64 bytes, verification
/// simply returns `false` — no panics, no undefined behavior.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AzaleaSignature {
    bytes: Vec<u8>,
}

impl AzaleaKeypair {
    /// Generate a fresh keypair using the OS cryptographic RNG.
    ///
    /// This is the preferred way to create a new identity. `OsRng` pulls
    /// from `/dev/urandom` on Unix; if that is compromised, Azalea keys are
    /// the least of your worries.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Construct a keypair deterministically from a 32-byte seed.
    ///
    /// The seed is used directly as the Ed25519 secret scalar. Useful for
    /// stable test identities and KDF-derived keys.
    ///
    /// **Warning**: a weak seed makes a weak key. Use a proper CSPRNG or
    /// KDF to produce the seed bytes.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Reconstruct a keypair from a hex-encoded secret key.
    ///
    /// Convenience for loading dev keys. Please don't put raw hex keys in
    /// config files in production.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(hex_str).map_err(|_| KeyError::InvalidSecretKey)?;
        if bytes.len() != SECRET_KEY_LENGTH {
            return Err(KeyError::InvalidSecretKey);
        }
        let mut arr = [0u8; SECRET_KEY_LENGTH];
        arr.copy_from_slice(&bytes);
        Ok(Self::from_seed(&arr))
    }

    /// Returns the public key associated with this keypair.
    pub fn public_key(&self) -> AzaleaPublicKey {
        AzaleaPublicKey {
            bytes: self.signing_key.verifying_key().to_bytes(),
        }
    }

    /// Get the raw public key bytes (32 bytes). Safe to share, log,
    /// tattoo on your arm, etc.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign a message and return an `AzaleaSignature`.
    ///
    /// Ed25519 signatures are deterministic — the same (key, message) pair
    /// always produces the same signature. No nonce games, no randomness
    /// needed at signing time.
    pub fn sign(&self, message: &[u8]) -> AzaleaSignature {
        let sig = self.signing_key.sign(message);
        AzaleaSignature {
            bytes: sig.to_bytes().to_vec(),
        }
    }

    /// Verify a signature against this keypair's public key.
    ///
    /// Convenience method — equivalent to `self.public_key().verify()`.
    pub fn verify(&self, message: &[u8], signature: &AzaleaSignature) -> bool {
        self.public_key().verify(message, signature)
    }

    /// Export the raw 32-byte secret key material.
    ///
    /// **Handle with extreme care.** This is the only secret standing
    /// between an attacker and full control of the associated identity.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    /// Get the public key as a hex string. Useful for display and logging.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key_bytes())
    }
}

impl Clone for AzaleaKeypair {
    /// Cloning a keypair is allowed but should make you uncomfortable.
    /// Every copy of a private key is another thing to protect.
    fn clone(&self) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&self.signing_key.to_bytes()),
        }
    }
}

impl fmt::Debug for AzaleaKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material in debug output. Not even
        // "partially." A partial leak is still a leak.
        write!(f, "AzaleaKeypair(pub={})", self.public_key_hex())
    }
}

impl PartialEq for AzaleaKeypair {
    /// Two keypairs are equal if their public keys match. Comparing secret
    /// material in a non-constant-time way is a bad habit, and for identity
    /// purposes the public key is what matters.
    fn eq(&self, other: &Self) -> bool {
        self.public_key_bytes() == other.public_key_bytes()
    }
}

impl Eq for AzaleaKeypair {}

// ---------------------------------------------------------------------------
// AzaleaPublicKey
// ---------------------------------------------------------------------------

impl AzaleaPublicKey {
    /// Create an `AzaleaPublicKey` from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Try to create an `AzaleaPublicKey` from a byte slice.
    ///
    /// Validates the length and that the bytes represent a valid Ed25519
    /// point. We don't just accept any 32 bytes — some values aren't valid
    /// points on the curve.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self, KeyError> {
        if slice.len() != 32 {
            return Err(KeyError::InvalidPublicKey);
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(slice);

        VerifyingKey::from_bytes(&bytes).map_err(|_| KeyError::InvalidPublicKey)?;

        Ok(Self { bytes })
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Verify a signature against this public key.
    ///
    /// Returns `true` if the signature is valid, `false` otherwise. A
    /// boolean (rather than `Result`) because the vast majority of callers
    /// just want a yes/no answer.
    pub fn verify(&self, message: &[u8], signature: &AzaleaSignature) -> bool {
        let Ok(verifying_key) = VerifyingKey::from_bytes(&self.bytes) else {
            return false;
        };
        let sig_bytes: [u8; 64] = match signature.bytes.as_slice().try_into() {
            Ok(b) => b,
            Err(_) => return false,
        };
        let dalek_sig = DalekSignature::from_bytes(&sig_bytes);
        verifying_key.verify(message, &dalek_sig).is_ok()
    }

    /// Hex-encode the key for display.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Debug for AzaleaPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AzaleaPublicKey({}...)", &self.to_hex()[..12])
    }
}

// ---------------------------------------------------------------------------
// AzaleaSignature
// ---------------------------------------------------------------------------

impl AzaleaSignature {
    /// Create a signature from raw bytes (no validation beyond storage).
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Get the raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for AzaleaSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Malformed (short) signatures must still Debug-print cleanly —
        // this type promises to degrade, not panic, on bad lengths.
        let hex_str = hex::encode(&self.bytes);
        if hex_str.len() >= 12 {
            write!(f, "AzaleaSignature({}...)", &hex_str[..12])
        } else {
            write!(f, "AzaleaSignature({hex_str})")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_sign_verify_roundtrip() {
        let kp = AzaleaKeypair::generate();
        let msg = b"lock 100 tokens until friday";
        let sig = kp.sign(msg);
        assert!(kp.verify(msg, &sig));
    }

    #[test]
    fn wrong_message_fails_verification() {
        let kp = AzaleaKeypair::generate();
        let sig = kp.sign(b"original message");
        assert!(!kp.verify(b"tampered message", &sig));
    }

    #[test]
    fn wrong_key_fails_verification() {
        let kp1 = AzaleaKeypair::generate();
        let kp2 = AzaleaKeypair::generate();
        let sig = kp1.sign(b"message");
        assert!(!kp2.verify(b"message", &sig));
    }

    #[test]
    fn seed_derivation_is_deterministic() {
        let seed = [42u8; 32];
        let kp1 = AzaleaKeypair::from_seed(&seed);
        let kp2 = AzaleaKeypair::from_seed(&seed);
        assert_eq!(kp1.public_key_bytes(), kp2.public_key_bytes());
    }

    #[test]
    fn signatures_are_deterministic() {
        let kp = AzaleaKeypair::from_seed(&[7u8; 32]);
        let sig1 = kp.sign(b"same message");
        let sig2 = kp.sign(b"same message");
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn truncated_signature_fails_cleanly() {
        let kp = AzaleaKeypair::generate();
        let sig = AzaleaSignature::from_bytes(vec![0u8; 10]);
        assert!(!kp.verify(b"message", &sig));
    }

    #[test]
    fn short_signature_debug_does_not_panic() {
        // Debug must degrade on malformed lengths, same as verify does.
        for len in [0usize, 1, 2, 5, 6, 64] {
            let sig = AzaleaSignature::from_bytes(vec![0u8; len]);
            let rendered = format!("{sig:?}");
            assert!(rendered.starts_with("AzaleaSignature("));
        }
    }

    #[test]
    fn public_key_slice_validation() {
        assert!(AzaleaPublicKey::try_from_slice(&[0u8; 16]).is_err());

        let kp = AzaleaKeypair::generate();
        let ok = AzaleaPublicKey::try_from_slice(&kp.public_key_bytes());
        assert!(ok.is_ok());
    }

    #[test]
    fn from_hex_roundtrip() {
        let kp = AzaleaKeypair::from_seed(&[9u8; 32]);
        let hex_key = hex::encode(kp.to_bytes());
        let recovered = AzaleaKeypair::from_hex(&hex_key).unwrap();
        assert_eq!(kp, recovered);
    }
}
