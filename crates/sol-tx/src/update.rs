//! Re-emitting a transaction with a changed blockhash or fee payer.
//!
//! Both operations return a fresh [`Transaction`] built from newly
//! compiled message bytes; neither mutates the value they are called on.

use crate::builder::{self};
use crate::message::Message;
use crate::pubkey::PubKey;
use crate::transaction::Transaction;

/// Replace `latest_blockhash`. The account order, instructions, and
/// header are untouched — only the blockhash field changes. Existing
/// signatures are carried over unchanged rather than cleared: they now
/// cover stale message bytes, so `verify_signatures` will reject them
/// with `InvalidSignature` until the caller re-signs.
pub fn update_blockhash(tx: &Transaction, latest_blockhash: [u8; 32]) -> Transaction {
    let message = Message::parse(tx.message_bytes()).expect("transaction carries a valid message");
    let updated = Message {
        recent_blockhash: latest_blockhash,
        ..message
    };
    let message_bytes = updated.serialize();

    Transaction::from_parts(
        tx.signature_slots().to_vec(),
        tx.accounts().to_vec(),
        latest_blockhash,
        updated.instructions,
        message_bytes,
    )
}

/// Recompile the transaction's instructions with a new fee payer. The
/// account list is folded and ranked from scratch, so the new fee payer
/// moves to the front and every other account keeps its folded
/// signer/writable role. Every signature the original transaction held
/// is re-attached by address to the recompiled signer prefix — an
/// address that is no longer a signer slot (this can only be the old fee
/// payer, if it has no other signing role in the instructions) simply
/// has nowhere to go and its signature is dropped. Every re-attached
/// signature now covers stale message bytes (the account order shifted),
/// so it will fail `verify_signatures` until the caller re-signs — the
/// same staleness contract as [`update_blockhash`].
pub fn update_fee_payer(tx: &Transaction, fee_payer: PubKey) -> Transaction {
    let instructions = tx.instructions();
    let latest_blockhash = {
        let message = Message::parse(tx.message_bytes()).expect("transaction carries a valid message");
        message.recent_blockhash
    };
    let old_signatures = tx.raw_signature_slots();

    let (message, accounts) = builder::compile(&instructions, latest_blockhash, Some(fee_payer))
        .expect("recompiling an already-valid instruction set cannot fail");
    let message_bytes = message.serialize();
    let num_required = message.header.num_required_sigs as usize;

    let signatures = accounts[..num_required]
        .iter()
        .map(|account| {
            old_signatures
                .iter()
                .find(|(address, _)| *address == account.address)
                .and_then(|(_, sig)| *sig)
        })
        .collect();

    Transaction::from_parts(
        signatures,
        accounts,
        latest_blockhash,
        message.instructions,
        message_bytes,
    )
}
