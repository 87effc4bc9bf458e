use thiserror::Error;

/// Errors raised while constructing addresses, deriving program-derived
/// addresses, or compiling, serializing, signing, and verifying
/// transactions.
#[derive(Debug, Error)]
pub enum SolError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid seeds: {0}")]
    InvalidSeeds(String),

    #[error("no bump seed in 0..=255 produced an off-curve address")]
    NoBumpFound,

    #[error("malformed message: {0}")]
    MalformedMessage(String),

    #[error("unknown signer: {0}")]
    UnknownSigner(String),

    #[error("missing signature for {0}")]
    MissingSignature(String),

    #[error("invalid signature for {0}")]
    InvalidSignature(String),
}
