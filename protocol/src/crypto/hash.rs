//! # Hashing Utilities
//!
//! BLAKE3 is the only hash function in Azalea, and we intend to keep it
//! that way. Every identity in the system — accounts, tokens, funds,
//! vaults, the vault authority — is a BLAKE3 digest of canonical inputs.
//!
//! That makes the hash function the collision-resistance backbone of the
//! whole addressing scheme: two distinct `(owner, index)` pairs map to
//! distinct fund identities precisely because BLAKE3 is collision-resistant
//! over the preimage encoding. There is no registry to disagree with; the
//! hash *is* the registry.
//!
//! BLAKE3 is ~5x faster than SHA-256 on x86-64 and ~3x faster on ARM, with
//! the same 128-bit collision resistance. Since we never need to talk to
//! SHA-256-era chains, there is no compatibility shim here.

/// Compute the BLAKE3 hash of the input data.
///
/// Returns a 32-byte digest as a fixed-size array. This is the workhorse
/// hash function of Azalea. The `blake3` crate automatically takes
/// advantage of SIMD instructions on supported platforms.
///
/// # Example
///
/// ```
/// use azalea_protocol::crypto::blake3_hash;
///
/// let hash = blake3_hash(b"azalea");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

/// Hash multiple byte slices together without concatenation overhead.
///
/// Instead of allocating a buffer to concatenate inputs, we feed them
/// sequentially into the hasher. Same result, less allocation. Useful for
/// hashing composite preimages like `(seed || owner || index)` without a
/// temporary buffer.
///
/// Note that this is plain concatenation under the hood: callers that need
/// unambiguous field boundaries must insert their own separators.
pub fn blake3_hash_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    for part in parts {
        hasher.update(part);
    }
    *hasher.finalize().as_bytes()
}

/// Compute a domain-separated hash using BLAKE3 with a context string.
///
/// Domain separation prevents collisions across protocol contexts: a
/// signing digest for a create operation can never collide with one for a
/// redeem operation, even over identical payload bytes.
///
/// This uses BLAKE3's built-in `derive_key` mode, which is the proper way
/// to do domain separation with BLAKE3. Don't prepend a tag manually —
/// `derive_key` uses a different internal IV per context string, making
/// cross-context collisions impossible by construction.
pub fn domain_separated_hash(context: &str, data: &[u8]) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(data);
    *hasher.finalize().as_bytes()
}
