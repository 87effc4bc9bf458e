//! Solana transaction compilation, the wire codec, and Ed25519 signing.
//!
//! This crate is the transport layer for a Solana-compatible chain
//! client: turning a list of instructions into a fully compiled,
//! signable transaction, serializing and parsing the wire format a
//! validator actually accepts, and signing/verifying it with Ed25519.
//! It does not talk to an RPC endpoint and does not know about any
//! specific on-chain program's instruction layout — those belong one
//! layer up.
//!
//! ```text
//! PubKey / PDA derivation  (pubkey.rs)
//!         |
//! Instruction, AccountMeta (transaction.rs)
//!         |
//! fold + rank + compile    (builder.rs)
//!         |
//! Message                  (message.rs)
//!         |
//! Transaction (sign/verify/parse/to_buffer)  (transaction.rs)
//! ```

mod base58;
mod compact_u16;
mod ed25519;
mod error;
mod message;

pub mod builder;
pub mod pubkey;
pub mod transaction;
pub mod update;

pub use base58::{decode as base58_decode, encode as base58_encode};
pub use builder::{create as build_transaction, BuildOptions};
pub use ed25519::{generate_keypair, keypair_from_secret, sign_detached, verify_detached, Keypair};
pub use error::SolError;
pub use message::{CompiledInstruction, Header, Message};
pub use pubkey::{PubKey, MAX_SEEDS, MAX_SEED_LEN, PUBKEY_BYTES, SYSTEM_PROGRAM_ID};
pub use transaction::{AccountMeta, Instruction, Transaction};
pub use update::{update_blockhash, update_fee_payer};
