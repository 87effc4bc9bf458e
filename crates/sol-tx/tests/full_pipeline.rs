//! Cross-module integration tests exercising the full pipeline:
//! derive a PDA -> build a transaction -> sign -> serialize -> parse ->
//! verify.
//!
//! These tests go through the public API of `sol_tx` only, to catch
//! regressions at module boundaries.

use ed25519_dalek::SigningKey;
use sol_tx::*;

fn keypair_from_seed(seed_byte: u8) -> ([u8; 64], PubKey) {
    let signing_key = SigningKey::from_bytes(&[seed_byte; 32]);
    let public = signing_key.verifying_key().to_bytes();
    let mut secret = [0u8; 64];
    secret[..32].copy_from_slice(&[seed_byte; 32]);
    secret[32..].copy_from_slice(&public);
    (secret, PubKey::from_bytes(public))
}

// ─── native transfer: build -> sign -> serialize -> parse -> verify ──

#[test]
fn native_transfer_full_pipeline() {
    // 1. Set up a fee payer and a recipient.
    let (payer_secret, payer) = keypair_from_seed(0x01);
    let recipient = PubKey::from_bytes([0x22u8; 32]);
    let system_program = SYSTEM_PROGRAM_ID;

    // 2. Build an instruction moving lamports (System Program transfer
    //    layout: u32 tag 2, little-endian u64 amount).
    let mut data = vec![2, 0, 0, 0];
    data.extend_from_slice(&1_000_000_000u64.to_le_bytes());
    let transfer_ix = Instruction {
        program: system_program,
        accounts: vec![
            AccountMeta::new(payer, true, true),
            AccountMeta::new(recipient, false, true),
        ],
        data,
    };

    // 3. Compile and sign.
    let tx = build_transaction(BuildOptions {
        instructions: &[transfer_ix],
        latest_blockhash: [0xAAu8; 32],
        fee_payer: None,
        signers: &[payer_secret],
        suppress_invalid_signer: false,
    })
    .unwrap();

    // 4. Fee payer must be first, signer, writable.
    assert_eq!(tx.accounts()[0].address, payer);
    assert_eq!(tx.num_required_sigs(), 1);

    // 5. Serialize, then parse back.
    let buffer = tx.to_buffer().unwrap();
    assert_eq!(buffer[0], 0x01); // compact-u16(1) signature count
    let parsed = Transaction::parse(&buffer).unwrap();

    // 6. Verify the round-tripped transaction's signature.
    assert!(parsed.verify_signatures(false).is_ok());
    assert_eq!(parsed.message_bytes(), tx.message_bytes());
}

// ─── PDA-derived account referenced as an instruction input ─────────

#[test]
fn transaction_referencing_a_program_derived_address() {
    // 1. Derive a PDA owned by some on-chain program.
    let program = PubKey::from_base58("BPFLoader1111111111111111111111111111111111").unwrap();
    let (pda, _bump) = PubKey::find_program_address(&[b"vault", b"alpha"], &program).unwrap();
    assert!(!pda.is_on_curve());

    // 2. Build a transaction whose only non-signer writable account is
    //    that PDA.
    let (payer_secret, payer) = keypair_from_seed(0x02);
    let ix = Instruction {
        program,
        accounts: vec![
            AccountMeta::new(payer, true, true),
            AccountMeta::new(pda, false, true),
        ],
        data: vec![9, 9, 9],
    };

    let tx = build_transaction(BuildOptions {
        instructions: &[ix],
        latest_blockhash: [0xBBu8; 32],
        fee_payer: None,
        signers: &[payer_secret],
        suppress_invalid_signer: false,
    })
    .unwrap();

    // 3. The PDA should round-trip through compiled instructions intact.
    let reconstructed = tx.instructions();
    assert_eq!(reconstructed[0].accounts[1].address, pda);
    assert!(tx.verify_signatures(false).is_ok());
}

// ─── multisig: partial signing, then completing the signature set ───

#[test]
fn multisig_transaction_signed_in_two_passes() {
    // 1. Two signers share an instruction; nobody signs at build time.
    let (alice_secret, alice) = keypair_from_seed(0x03);
    let (bob_secret, bob) = keypair_from_seed(0x04);
    let program = PubKey::from_bytes([0x55u8; 32]);

    let ix = Instruction {
        program,
        accounts: vec![
            AccountMeta::new(alice, true, true),
            AccountMeta::new(bob, true, false),
        ],
        data: vec![],
    };

    let unsigned = build_transaction(BuildOptions {
        instructions: &[ix],
        latest_blockhash: [0xCCu8; 32],
        fee_payer: Some(alice),
        signers: &[],
        suppress_invalid_signer: false,
    })
    .unwrap();
    assert_eq!(unsigned.num_required_sigs(), 2);
    assert!(unsigned.verify_signatures(true).is_ok());
    assert!(unsigned.verify_signatures(false).is_err());

    // 2. Alice signs first.
    let alice_sig = sign_detached(unsigned.message_bytes(), &alice_secret).unwrap();
    let half_signed = unsigned.add_signature(&alice, alice_sig).unwrap();
    assert!(half_signed.verify_signatures(true).is_ok());
    assert!(half_signed.verify_signatures(false).is_err());

    // 3. Bob signs second, completing the transaction.
    let bob_sig = sign_detached(half_signed.message_bytes(), &bob_secret).unwrap();
    let fully_signed = half_signed.add_signature(&bob, bob_sig).unwrap();
    assert!(fully_signed.verify_signatures(false).is_ok());

    // 4. The fully signed transaction still round-trips through the wire format.
    let buffer = fully_signed.to_buffer().unwrap();
    let parsed = Transaction::parse(&buffer).unwrap();
    assert!(parsed.verify_signatures(false).is_ok());
}

// ─── re-signing after updating the blockhash or the fee payer ───────

#[test]
fn resign_after_blockhash_update() {
    let (payer_secret, payer) = keypair_from_seed(0x05);
    let ix = Instruction {
        program: SYSTEM_PROGRAM_ID,
        accounts: vec![AccountMeta::new(payer, true, true)],
        data: vec![],
    };
    let original = build_transaction(BuildOptions {
        instructions: &[ix],
        latest_blockhash: [0x11u8; 32],
        fee_payer: None,
        signers: &[payer_secret],
        suppress_invalid_signer: false,
    })
    .unwrap();
    assert!(original.verify_signatures(false).is_ok());

    let refreshed = update_blockhash(&original, [0x22u8; 32]);
    // The old signature is carried forward, not cleared, so it now
    // covers stale bytes and fails regardless of `allow_missing`.
    assert!(matches!(
        refreshed.verify_signatures(true),
        Err(SolError::InvalidSignature(_))
    ));
    assert!(refreshed.verify_signatures(false).is_err());

    let sig = sign_detached(refreshed.message_bytes(), &payer_secret).unwrap();
    let resigned = refreshed.add_signature(&payer, sig).unwrap();
    assert!(resigned.verify_signatures(false).is_ok());
}

#[test]
fn resign_after_fee_payer_update() {
    let (old_secret, old_payer) = keypair_from_seed(0x06);
    let (new_secret, new_payer) = keypair_from_seed(0x07);
    let ix = Instruction {
        program: SYSTEM_PROGRAM_ID,
        accounts: vec![AccountMeta::new(old_payer, true, true)],
        data: vec![],
    };
    let original = build_transaction(BuildOptions {
        instructions: &[ix],
        latest_blockhash: [0x33u8; 32],
        fee_payer: None,
        signers: &[old_secret],
        suppress_invalid_signer: false,
    })
    .unwrap();

    let repointed = update_fee_payer(&original, new_payer);
    assert_eq!(repointed.accounts()[0].address, new_payer);

    // The old payer is still a signer per the instruction itself, so its
    // stale signature was carried forward onto the recompiled account
    // order and needs to be refreshed too, alongside the new fee payer's.
    let new_sig = sign_detached(repointed.message_bytes(), &new_secret).unwrap();
    let old_sig = sign_detached(repointed.message_bytes(), &old_secret).unwrap();
    let resigned = repointed
        .add_signature(&new_payer, new_sig)
        .unwrap()
        .add_signature(&old_payer, old_sig)
        .unwrap();
    assert!(resigned.verify_signatures(false).is_ok());
}
