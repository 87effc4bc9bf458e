//! Solana addresses (`PubKey`) and program-derived address (PDA)
//! derivation.
//!
//! An address is 32 raw bytes. There is no hashing step for an ordinary
//! account address — the Base58 encoding of the bytes IS the address
//! string. A program-derived address is instead a SHA-256 digest of
//! seeds, a program id, and a domain-separating marker, retried with a
//! decrementing bump seed until the digest lands off the Ed25519 curve.

use std::fmt;

use num_bigint::BigUint;
use serde::{de::Error as DeError, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::base58;
use crate::ed25519;
use crate::error::SolError;

/// Number of bytes in an address.
pub const PUBKEY_BYTES: usize = 32;
/// Maximum length, in bytes, of a single PDA seed.
pub const MAX_SEED_LEN: usize = 32;
/// Maximum number of seeds accepted by PDA derivation.
pub const MAX_SEEDS: usize = 16;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// The Solana System Program address: 32 zero bytes.
pub const SYSTEM_PROGRAM_ID: PubKey = PubKey([0u8; 32]);

/// A 32-byte Solana address.
///
/// Identity is the raw bytes; Base58 and hex strings are derived views.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PubKey([u8; 32]);

impl PubKey {
    /// Construct from a raw 32-byte array. Always succeeds.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Decode a Base58 string. Fails unless it decodes to exactly 32 bytes.
    pub fn from_base58(s: &str) -> Result<Self, SolError> {
        let bytes = base58::decode(s)?;
        let array: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            SolError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
        })?;
        Ok(Self(array))
    }

    /// Construct from a non-negative integer, taking its big-endian
    /// 32-byte representation. Fails if the integer is `>= 2^256`.
    pub fn from_integer(n: &BigUint) -> Result<Self, SolError> {
        let be_bytes = n.to_bytes_be();
        if be_bytes.len() > PUBKEY_BYTES {
            return Err(SolError::InvalidAddress(format!(
                "integer does not fit in {PUBKEY_BYTES} bytes"
            )));
        }
        let mut array = [0u8; PUBKEY_BYTES];
        array[PUBKEY_BYTES - be_bytes.len()..].copy_from_slice(&be_bytes);
        Ok(Self(array))
    }

    /// The raw 32 bytes.
    pub fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Canonical Base58 string form.
    pub fn to_base58(&self) -> String {
        base58::encode(&self.0)
    }

    /// Lowercase hex string, 64 characters, no `0x` prefix. An ergonomic
    /// extra view — not used anywhere in the wire format.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Alias for [`PubKey::to_base58`].
    pub fn to_json(&self) -> String {
        self.to_base58()
    }

    /// Byte-wise equality (also available via `PartialEq`).
    pub fn equals(&self, other: &PubKey) -> bool {
        self == other
    }

    /// Whether these bytes decompress to a valid Ed25519 curve point.
    pub fn is_on_curve(&self) -> bool {
        ed25519::is_on_curve(&self.0)
    }

    /// Whether a Base58 address string decodes to an on-curve point.
    pub fn is_on_curve_str(address: &str) -> Result<bool, SolError> {
        Ok(Self::from_base58(address)?.is_on_curve())
    }

    /// Derive a program-derived address from `seeds` and `program_id`.
    ///
    /// Fails with [`SolError::InvalidSeeds`] if any seed exceeds
    /// [`MAX_SEED_LEN`], if there are more than [`MAX_SEEDS`] seeds, or if
    /// the resulting digest happens to be a valid curve point (in which
    /// case it could collide with a real keypair and is rejected).
    pub fn create_program_address(seeds: &[&[u8]], program_id: &PubKey) -> Result<PubKey, SolError> {
        if seeds.len() > MAX_SEEDS {
            return Err(SolError::InvalidSeeds(format!(
                "too many seeds: {} (max {MAX_SEEDS})",
                seeds.len()
            )));
        }
        for seed in seeds {
            if seed.len() > MAX_SEED_LEN {
                return Err(SolError::InvalidSeeds(format!(
                    "seed of {} bytes exceeds max length of {MAX_SEED_LEN}",
                    seed.len()
                )));
            }
        }

        let mut hasher = Sha256::new();
        for seed in seeds {
            hasher.update(seed);
        }
        hasher.update(program_id.0);
        hasher.update(PDA_MARKER);
        let digest: [u8; 32] = hasher.finalize().into();

        if ed25519::is_on_curve(&digest) {
            return Err(SolError::InvalidSeeds(
                "derived address is on the Ed25519 curve".into(),
            ));
        }

        Ok(PubKey(digest))
    }

    /// Search for a bump seed (255 down to 0) that makes
    /// [`PubKey::create_program_address`] succeed, returning the address
    /// and the bump that produced it.
    pub fn find_program_address(
        seeds: &[&[u8]],
        program_id: &PubKey,
    ) -> Result<(PubKey, u8), SolError> {
        for bump in (0u8..=255).rev() {
            let mut seeds_with_bump: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 1);
            seeds_with_bump.extend_from_slice(seeds);
            let bump_bytes = [bump];
            seeds_with_bump.push(&bump_bytes);

            match Self::create_program_address(&seeds_with_bump, program_id) {
                Ok(address) => return Ok((address, bump)),
                Err(SolError::InvalidSeeds(_)) => continue,
                Err(other) => return Err(other),
            }
        }
        Err(SolError::NoBumpFound)
    }
}

impl AsRef<[u8]> for PubKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for PubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Display for PubKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl Serialize for PubKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for PubKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        PubKey::from_base58(&s).map_err(DeError::custom)
    }
}
