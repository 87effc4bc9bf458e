//! Base58 codec used for every human-facing address and signature string.
//!
//! Big-endian base-change into the Bitcoin/Solana alphabet. Each leading
//! zero byte of the input maps to a leading `1` character and vice versa,
//! so the round trip is exact even for all-zero inputs. This is a thin,
//! documented wrapper over the `bs58` crate rather than a hand-rolled
//! base-change routine — the same approach the rest of this workspace
//! takes for Base58 (see `chain-sol`, `chain-zec`).

use crate::error::SolError;

/// The canonical Base58 alphabet: digits and letters with `0`, `O`, `I`,
/// and `l` removed to avoid visual ambiguity.
pub const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Encode raw bytes as a Base58 string.
pub fn encode(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

/// Decode a Base58 string into raw bytes.
///
/// Fails if any character falls outside [`ALPHABET`].
pub fn decode(s: &str) -> Result<Vec<u8>, SolError> {
    bs58::decode(s)
        .into_vec()
        .map_err(|e| SolError::InvalidAddress(format!("base58 decode failed: {e}")))
}
