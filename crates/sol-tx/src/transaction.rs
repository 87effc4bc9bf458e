//! The transaction container: signatures plus an ordered account list,
//! wrapping the canonical message bytes produced by [`crate::message`].
//!
//! A `Transaction` is observably immutable. Every operation that would
//! "mutate" one — binding a signature, swapping the blockhash, swapping
//! the fee payer — instead returns a brand new value built from fresh
//! message bytes; the old value is left untouched.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::base58;
use crate::compact_u16;
use crate::error::SolError;
use crate::message::{CompiledInstruction, Header, Message};
use crate::pubkey::PubKey;

/// An account reference, either as an instruction's input (the caller's
/// intent) or as an entry in a compiled transaction's ordered account
/// list (the builder's output). Both shapes carry the same three fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountMeta {
    pub address: PubKey,
    pub signer: bool,
    pub writable: bool,
}

impl AccountMeta {
    pub fn new(address: PubKey, signer: bool, writable: bool) -> Self {
        Self {
            address,
            signer,
            writable,
        }
    }
}

/// An instruction in its pre-compile, factory-input shape: accounts are
/// addresses, not yet indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program: PubKey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

impl Instruction {
    /// The instruction data, Base64-encoded — the wire-adjacent view used
    /// at the API boundary (the internal representation is always raw
    /// bytes).
    pub fn data_base64(&self) -> String {
        BASE64.encode(&self.data)
    }
}

/// A transaction: signature slots, an ordered account list, and the
/// canonical message bytes those signatures cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    signatures: Vec<Option<[u8; 64]>>,
    accounts: Vec<AccountMeta>,
    latest_blockhash: [u8; 32],
    compiled_instructions: Vec<CompiledInstruction>,
    message_bytes: Vec<u8>,
}

impl Transaction {
    /// Construct directly from already-compiled parts. Used by the
    /// builder and by blockhash/fee-payer re-emission; callers outside
    /// this crate go through [`crate::builder::create`] or
    /// [`Transaction::parse`] instead.
    pub(crate) fn from_parts(
        signatures: Vec<Option<[u8; 64]>>,
        accounts: Vec<AccountMeta>,
        latest_blockhash: [u8; 32],
        compiled_instructions: Vec<CompiledInstruction>,
        message_bytes: Vec<u8>,
    ) -> Self {
        Self {
            signatures,
            accounts,
            latest_blockhash,
            compiled_instructions,
            message_bytes,
        }
    }

    /// Number of required signatures — the signer prefix length of
    /// [`Transaction::accounts`].
    pub fn num_required_sigs(&self) -> u8 {
        self.accounts.iter().filter(|a| a.signer).count() as u8
    }

    /// Exactly-ordered account list this transaction's message was
    /// compiled against.
    pub fn accounts(&self) -> &[AccountMeta] {
        &self.accounts
    }

    /// The canonical message bytes — the single source of truth this
    /// value's other views are derived from.
    pub fn message_bytes(&self) -> &[u8] {
        &self.message_bytes
    }

    /// Base64 view of [`Transaction::message_bytes`].
    pub fn message_bytes_base64(&self) -> String {
        BASE64.encode(&self.message_bytes)
    }

    /// The blockhash this transaction's message commits to, Base58-encoded.
    pub fn latest_blockhash(&self) -> String {
        base58::encode(&self.latest_blockhash)
    }

    /// Signature slots paired with the address each one belongs to.
    pub fn signatures(&self) -> Vec<(PubKey, Option<String>)> {
        let num_required = self.num_required_sigs() as usize;
        self.accounts[..num_required]
            .iter()
            .zip(self.signatures.iter())
            .map(|(account, sig)| (account.address, sig.map(|s| base58::encode(&s))))
            .collect()
    }

    /// The first signature slot, mirroring `signatures()[0]` — the
    /// conventional transaction id once present.
    pub fn signature(&self) -> Option<String> {
        self.signatures.first().and_then(|s| s.map(|b| base58::encode(&b)))
    }

    /// The raw signature slots in account order, zero-copy. Used by
    /// [`crate::update`] to carry signatures across re-emission that
    /// leaves the account order unchanged.
    pub(crate) fn signature_slots(&self) -> &[Option<[u8; 64]>] {
        &self.signatures
    }

    /// Raw signature slots paired with the address each one belongs to.
    /// Unlike [`Transaction::signatures`] this exposes the raw 64 bytes
    /// rather than their Base58 rendering — used by [`crate::update`] to
    /// carry signatures across re-emission when the account order itself
    /// changes.
    pub(crate) fn raw_signature_slots(&self) -> Vec<(PubKey, Option<[u8; 64]>)> {
        let num_required = self.num_required_sigs() as usize;
        self.accounts[..num_required]
            .iter()
            .zip(self.signatures.iter())
            .map(|(account, sig)| (account.address, *sig))
            .collect()
    }

    /// Reconstruct the factory-input instruction shape from the compiled
    /// indices and the ordered account list. A derived view, not stored
    /// state, so it can never drift from [`Transaction::message_bytes`].
    pub fn instructions(&self) -> Vec<Instruction> {
        self.compiled_instructions
            .iter()
            .map(|ix| Instruction {
                program: self.accounts[ix.program_idx as usize].address,
                accounts: ix
                    .account_idxs
                    .iter()
                    .map(|&idx| self.accounts[idx as usize])
                    .collect(),
                data: ix.data.clone(),
            })
            .collect()
    }

    /// Serialize to the wire format: compact-u16 signature count, then
    /// each 64-byte slot (zero-filled if empty), then the message bytes.
    pub fn to_buffer(&self) -> Result<Vec<u8>, SolError> {
        let num_required = self.num_required_sigs() as usize;
        if self.signatures.len() != num_required {
            return Err(SolError::MalformedMessage(format!(
                "expected {num_required} signature slots, found {}",
                self.signatures.len()
            )));
        }

        let mut buf = Vec::with_capacity(
            3 + self.signatures.len() * 64 + self.message_bytes.len(),
        );
        buf.extend_from_slice(&compact_u16::encode(self.signatures.len() as u16));
        for sig in &self.signatures {
            buf.extend_from_slice(&sig.unwrap_or([0u8; 64]));
        }
        buf.extend_from_slice(&self.message_bytes);
        Ok(buf)
    }

    /// Parse a wire-format transaction buffer.
    pub fn parse(buffer: &[u8]) -> Result<Self, SolError> {
        let (num_sigs, consumed) = compact_u16::decode(buffer)?;
        let num_sigs = num_sigs as usize;
        let sigs_start = consumed;
        let sigs_end = sigs_start
            .checked_add(num_sigs * 64)
            .ok_or_else(|| SolError::MalformedMessage("signature section length overflow".into()))?;
        if sigs_end > buffer.len() {
            return Err(SolError::MalformedMessage(
                "signature section runs past end of buffer".into(),
            ));
        }

        let mut signatures = Vec::with_capacity(num_sigs);
        for i in 0..num_sigs {
            let start = sigs_start + i * 64;
            let slot: [u8; 64] = buffer[start..start + 64]
                .try_into()
                .expect("slice is exactly 64 bytes");
            signatures.push(if slot == [0u8; 64] { None } else { Some(slot) });
        }

        let message_bytes = &buffer[sigs_end..];
        let message = Message::parse(message_bytes)?;

        let accounts = reconstruct_account_roles(&message.header, &message.addresses);

        if signatures.len() != message.header.num_required_sigs as usize {
            return Err(SolError::MalformedMessage(format!(
                "signature count {} does not match num_required_sigs {}",
                signatures.len(),
                message.header.num_required_sigs
            )));
        }

        Ok(Self {
            signatures,
            accounts,
            latest_blockhash: message.recent_blockhash,
            compiled_instructions: message.instructions,
            message_bytes: message_bytes.to_vec(),
        })
    }

    /// Bind a 64-byte signature to the slot belonging to `address`,
    /// returning a fresh transaction. Fails with
    /// [`SolError::UnknownSigner`] if `address` is not in the signer
    /// prefix of [`Transaction::accounts`].
    pub fn add_signature(&self, address: &PubKey, signature: [u8; 64]) -> Result<Self, SolError> {
        let num_required = self.num_required_sigs() as usize;
        let slot = self.accounts[..num_required]
            .iter()
            .position(|a| a.address == *address)
            .ok_or_else(|| SolError::UnknownSigner(address.to_base58()))?;

        let mut signatures = self.signatures.clone();
        signatures[slot] = Some(signature);

        Ok(Self {
            signatures,
            ..self.clone()
        })
    }

    /// Verify every signature slot against [`Transaction::message_bytes`].
    ///
    /// An empty slot fails with [`SolError::MissingSignature`] unless
    /// `allow_missing` is set. A present but invalid signature always
    /// fails with [`SolError::InvalidSignature`], regardless of
    /// `allow_missing`.
    pub fn verify_signatures(&self, allow_missing: bool) -> Result<(), SolError> {
        let num_required = self.num_required_sigs() as usize;
        for (account, sig) in self.accounts[..num_required].iter().zip(self.signatures.iter()) {
            match sig {
                None => {
                    if !allow_missing {
                        return Err(SolError::MissingSignature(account.address.to_base58()));
                    }
                }
                Some(sig) => {
                    if !crate::ed25519::verify_detached(
                        &self.message_bytes,
                        sig,
                        &account.address.to_bytes(),
                    ) {
                        return Err(SolError::InvalidSignature(account.address.to_base58()));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Reconstruct per-account `signer`/`writable` flags from the message
/// header, per the ordering invariant in the data model: the first
/// `num_required_sigs` accounts are signers, the last
/// `num_readonly_signed` of those are read-only, and of the remaining
/// non-signers the last `num_readonly_unsigned` are read-only.
pub(crate) fn reconstruct_account_roles(header: &Header, addresses: &[PubKey]) -> Vec<AccountMeta> {
    let num_required = header.num_required_sigs as usize;
    let num_readonly_signed = header.num_readonly_signed as usize;
    let num_readonly_unsigned = header.num_readonly_unsigned as usize;
    let num_writable_signed = num_required.saturating_sub(num_readonly_signed);
    let num_nonsigners = addresses.len().saturating_sub(num_required);
    let num_writable_unsigned = num_nonsigners.saturating_sub(num_readonly_unsigned);

    addresses
        .iter()
        .enumerate()
        .map(|(i, address)| {
            let signer = i < num_required;
            let writable = if signer {
                i < num_writable_signed
            } else {
                (i - num_required) < num_writable_unsigned
            };
            AccountMeta::new(*address, signer, writable)
        })
        .collect()
}
