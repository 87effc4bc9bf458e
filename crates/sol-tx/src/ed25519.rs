//! Ed25519 primitive: keypair handling, detached sign/verify, and the
//! curve membership test PDA derivation rejects on.
//!
//! Secret keys use the standard 64-byte "expanded" form: a 32-byte seed
//! followed by the 32-byte public key it derives. Any local copy of the
//! seed is zeroized as soon as the signing key is constructed from it,
//! matching the pattern already used in this workspace's Solana signing
//! path.

use curve25519_dalek::edwards::CompressedEdwardsY;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use zeroize::Zeroize;

use crate::error::SolError;

/// An Ed25519 keypair in Solana's 64-byte expanded secret-key form.
#[derive(Clone)]
pub struct Keypair {
    pub public: [u8; 32],
    pub secret: [u8; 64],
}

/// Build a [`Keypair`] from its 64-byte expanded secret key, validating
/// that the embedded public half actually matches the seed half.
pub fn keypair_from_secret(secret: &[u8; 64]) -> Result<Keypair, SolError> {
    let mut seed: [u8; 32] = secret[..32].try_into().expect("slice is 32 bytes");
    let signing_key = SigningKey::from_bytes(&seed);
    seed.zeroize();

    let derived_public = signing_key.verifying_key().to_bytes();
    let embedded_public: [u8; 32] = secret[32..].try_into().expect("slice is 32 bytes");

    if derived_public != embedded_public {
        return Err(SolError::InvalidAddress(
            "secret key's embedded public half does not match its seed".into(),
        ));
    }

    Ok(Keypair {
        public: derived_public,
        secret: *secret,
    })
}

/// Generate a fresh keypair from the operating system CSPRNG.
///
/// Not required by any wire-format path — a convenience for callers that
/// need a brand new signer.
pub fn generate_keypair() -> Keypair {
    let mut csprng = rand::rngs::OsRng;
    let signing_key = SigningKey::generate(&mut csprng);
    let public = signing_key.verifying_key().to_bytes();

    let mut secret = [0u8; 64];
    secret[..32].copy_from_slice(&signing_key.to_bytes());
    secret[32..].copy_from_slice(&public);

    Keypair { public, secret }
}

/// Sign `message` with the 64-byte expanded secret key, returning the
/// detached 64-byte signature.
pub fn sign_detached(message: &[u8], secret: &[u8; 64]) -> Result<[u8; 64], SolError> {
    let mut seed: [u8; 32] = secret[..32].try_into().expect("slice is 32 bytes");
    let signing_key = SigningKey::from_bytes(&seed);
    seed.zeroize();
    Ok(signing_key.sign(message).to_bytes())
}

/// Verify a detached signature against `message` and a 32-byte public key.
///
/// Returns `false` (never errors) on any malformed input — an invalid
/// public key or signature is simply not a valid signature.
pub fn verify_detached(message: &[u8], signature: &[u8; 64], public: &[u8; 32]) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public) else {
        return false;
    };
    let signature = Signature::from_bytes(signature);
    verifying_key.verify_strict(message, &signature).is_ok()
}

/// Test whether 32 bytes decompress to a valid Edwards curve point
/// (RFC 8032 §5.1.3: sign-bit extraction, recovery of `x` from the curve
/// equation over GF(2^255 - 19)).
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    CompressedEdwardsY(*bytes).decompress().is_some()
}
