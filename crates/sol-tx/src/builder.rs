//! Transaction construction: folding an instruction list's account
//! references into one ordered, deduplicated list, compiling instructions
//! against it, and signing the result.

use std::collections::HashMap;

use crate::base58;
use crate::ed25519;
use crate::error::SolError;
use crate::message::{CompiledInstruction, Header, Message};
use crate::pubkey::PubKey;
use crate::transaction::{AccountMeta, Instruction, Transaction};

/// Inputs to [`create`].
pub struct BuildOptions<'a> {
    pub instructions: &'a [Instruction],
    pub latest_blockhash: [u8; 32],
    /// Explicit fee payer. Defaults to the first signer account
    /// encountered across `instructions` when `None`.
    pub fee_payer: Option<PubKey>,
    /// 64-byte expanded secret keys to sign the compiled message with.
    pub signers: &'a [[u8; 64]],
    /// If a signer in `signers` does not correspond to any required
    /// signer slot, skip it instead of failing with
    /// [`SolError::UnknownSigner`].
    pub suppress_invalid_signer: bool,
}

#[derive(Clone, Copy)]
struct Folded {
    signer: bool,
    writable: bool,
    order: usize,
}

/// Fold every account reference across `instructions` (plus the fee
/// payer) into a single deduplicated map from address to its merged
/// signer/writable flags and first-seen order.
///
/// An address referenced more than once keeps the union of its flags:
/// if any reference marks it a signer, it is a signer; if any marks it
/// writable, it is writable.
fn fold_accounts(instructions: &[Instruction], fee_payer: PubKey) -> HashMap<PubKey, Folded> {
    let mut folded: HashMap<PubKey, Folded> = HashMap::new();
    let mut next_order = 0usize;

    let mut touch = |address: PubKey, signer: bool, writable: bool, folded: &mut HashMap<PubKey, Folded>, next_order: &mut usize| {
        folded
            .entry(address)
            .and_modify(|entry| {
                entry.signer |= signer;
                entry.writable |= writable;
            })
            .or_insert_with(|| {
                let order = *next_order;
                *next_order += 1;
                Folded {
                    signer,
                    writable,
                    order,
                }
            });
    };

    touch(fee_payer, true, true, &mut folded, &mut next_order);

    for ix in instructions {
        for account in &ix.accounts {
            touch(account.address, account.signer, account.writable, &mut folded, &mut next_order);
        }
        touch(ix.program, false, false, &mut folded, &mut next_order);
    }

    folded
}

/// Rank used to order the compiled account list: fee payer first, then
/// signer-writable, signer-readonly, non-signer-writable,
/// non-signer-readonly. Ties within a rank break on Base58 string order.
fn rank(address: &PubKey, folded: &Folded, fee_payer: &PubKey) -> (u8, String) {
    let tier = if address == fee_payer {
        0
    } else {
        match (folded.signer, folded.writable) {
            (true, true) => 2,
            (true, false) => 3,
            (false, true) => 4,
            (false, false) => 5,
        }
    };
    (tier, address.to_base58())
}

/// Fold, sort, and compile `instructions` into an unsigned [`Message`],
/// returning it alongside the ordered account list it was compiled
/// against.
pub fn compile(
    instructions: &[Instruction],
    latest_blockhash: [u8; 32],
    fee_payer: Option<PubKey>,
) -> Result<(Message, Vec<AccountMeta>), SolError> {
    let fee_payer = fee_payer.unwrap_or_else(|| {
        instructions
            .iter()
            .flat_map(|ix| ix.accounts.iter())
            .find(|a| a.signer)
            .map(|a| a.address)
            .unwrap_or(crate::pubkey::SYSTEM_PROGRAM_ID)
    });

    let folded = fold_accounts(instructions, fee_payer);

    let mut ordered: Vec<(PubKey, Folded)> = folded.into_iter().collect();
    ordered.sort_by(|(addr_a, folded_a), (addr_b, folded_b)| {
        let rank_a = rank(addr_a, folded_a, &fee_payer);
        let rank_b = rank(addr_b, folded_b, &fee_payer);
        rank_a.cmp(&rank_b).then_with(|| folded_a.order.cmp(&folded_b.order))
    });

    let accounts: Vec<AccountMeta> = ordered
        .iter()
        .map(|(address, folded)| AccountMeta::new(*address, folded.signer, folded.writable))
        .collect();

    let index_of: HashMap<PubKey, u8> = accounts
        .iter()
        .enumerate()
        .map(|(i, a)| (a.address, i as u8))
        .collect();

    let num_required_sigs = accounts.iter().filter(|a| a.signer).count() as u8;
    let num_readonly_signed = accounts.iter().filter(|a| a.signer && !a.writable).count() as u8;
    let num_readonly_unsigned = accounts.iter().filter(|a| !a.signer && !a.writable).count() as u8;

    let compiled_instructions = instructions
        .iter()
        .map(|ix| {
            let program_idx = *index_of
                .get(&ix.program)
                .expect("program address was folded into the account list");
            let account_idxs = ix
                .accounts
                .iter()
                .map(|a| {
                    *index_of
                        .get(&a.address)
                        .expect("account address was folded into the account list")
                })
                .collect();
            CompiledInstruction {
                program_idx,
                account_idxs,
                data: ix.data.clone(),
            }
        })
        .collect();

    let message = Message {
        header: Header {
            num_required_sigs,
            num_readonly_signed,
            num_readonly_unsigned,
        },
        addresses: accounts.iter().map(|a| a.address).collect(),
        recent_blockhash: latest_blockhash,
        instructions: compiled_instructions,
    };

    Ok((message, accounts))
}

/// Compile `instructions` and sign the result with every secret key in
/// `signers`, returning a fully assembled [`Transaction`].
///
/// Any key in `signers` with no matching required-signer slot fails with
/// [`SolError::UnknownSigner`] unless `suppress_invalid_signer` is set,
/// in which case it is silently skipped. This never fills a slot that
/// has no matching secret key — the resulting transaction may still be
/// partially signed.
pub fn create(options: BuildOptions<'_>) -> Result<Transaction, SolError> {
    let (message, accounts) = compile(options.instructions, options.latest_blockhash, options.fee_payer)?;
    let message_bytes = message.serialize();

    let num_required = message.header.num_required_sigs as usize;
    let mut signatures: Vec<Option<[u8; 64]>> = vec![None; num_required];

    for secret in options.signers {
        let keypair = ed25519::keypair_from_secret(secret)?;
        let public = PubKey::from_bytes(keypair.public);
        let slot = accounts[..num_required].iter().position(|a| a.address == public);

        match slot {
            Some(slot) => {
                signatures[slot] = Some(ed25519::sign_detached(&message_bytes, secret)?);
            }
            None => {
                if !options.suppress_invalid_signer {
                    return Err(SolError::UnknownSigner(base58::encode(&keypair.public)));
                }
            }
        }
    }

    Ok(Transaction::from_parts(
        signatures,
        accounts,
        options.latest_blockhash,
        message.instructions,
        message_bytes,
    ))
}
