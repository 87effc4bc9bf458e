//! The transaction message codec: the portion of a transaction that is
//! actually covered by each signature.
//!
//! ```text
//! Message:
//!   num_required_sigs     u8
//!   num_readonly_signed   u8
//!   num_readonly_unsigned u8
//!   num_accounts          compact-u16
//!   account_keys          32 bytes * num_accounts
//!   recent_blockhash      32 bytes
//!   num_instructions      compact-u16
//!   instructions[]        (see below)
//!
//! Instruction:
//!   program_id_index      u8
//!   num_accounts          compact-u16
//!   account_indices       u8 * num_accounts
//!   data_len              compact-u16
//!   data                  u8 * data_len
//! ```
//!
//! This is the pre-v0 legacy layout. A first header byte with its top bit
//! set would indicate a versioned message (address-lookup-table
//! extension); this codec does not support that and reports it as
//! [`SolError::MalformedMessage`].

use crate::compact_u16;
use crate::error::SolError;
use crate::pubkey::PubKey;

/// The three-byte signer/read-only accounting header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub num_required_sigs: u8,
    pub num_readonly_signed: u8,
    pub num_readonly_unsigned: u8,
}

/// One instruction with its account references already replaced by
/// indices into the message's address list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_idx: u8,
    pub account_idxs: Vec<u8>,
    pub data: Vec<u8>,
}

/// A fully compiled, wire-ready message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: Header,
    pub addresses: Vec<PubKey>,
    pub recent_blockhash: [u8; 32],
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Serialize the message to its canonical wire bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(
            3 + 3 + 32 * self.addresses.len() + 32 + 3 + self.instructions.len() * 8,
        );

        buf.push(self.header.num_required_sigs);
        buf.push(self.header.num_readonly_signed);
        buf.push(self.header.num_readonly_unsigned);

        buf.extend_from_slice(&compact_u16::encode(self.addresses.len() as u16));
        for addr in &self.addresses {
            buf.extend_from_slice(&addr.to_bytes());
        }

        buf.extend_from_slice(&self.recent_blockhash);

        buf.extend_from_slice(&compact_u16::encode(self.instructions.len() as u16));
        for ix in &self.instructions {
            buf.push(ix.program_idx);
            buf.extend_from_slice(&compact_u16::encode(ix.account_idxs.len() as u16));
            buf.extend_from_slice(&ix.account_idxs);
            buf.extend_from_slice(&compact_u16::encode(ix.data.len() as u16));
            buf.extend_from_slice(&ix.data);
        }

        buf
    }

    /// Parse a message from its canonical wire bytes.
    ///
    /// Validates every length and index against the rest of the buffer
    /// and fails with [`SolError::MalformedMessage`] if any bytes remain
    /// unconsumed.
    pub fn parse(bytes: &[u8]) -> Result<Self, SolError> {
        if bytes.len() < 3 {
            return Err(SolError::MalformedMessage(
                "message shorter than the 3-byte header".into(),
            ));
        }

        if bytes[0] & 0x80 != 0 {
            return Err(SolError::MalformedMessage(
                "versioned messages are not supported".into(),
            ));
        }

        let header = Header {
            num_required_sigs: bytes[0],
            num_readonly_signed: bytes[1],
            num_readonly_unsigned: bytes[2],
        };
        let mut cursor = 3usize;

        let (num_addresses, consumed) = compact_u16::decode(&bytes[cursor..])?;
        cursor += consumed;
        let num_addresses = num_addresses as usize;

        let addresses_end = cursor
            .checked_add(num_addresses * 32)
            .ok_or_else(|| SolError::MalformedMessage("address section length overflow".into()))?;
        if addresses_end > bytes.len() {
            return Err(SolError::MalformedMessage(
                "address section runs past end of message".into(),
            ));
        }
        let mut addresses = Vec::with_capacity(num_addresses);
        for i in 0..num_addresses {
            let start = cursor + i * 32;
            let array: [u8; 32] = bytes[start..start + 32]
                .try_into()
                .expect("slice is exactly 32 bytes");
            addresses.push(PubKey::from_bytes(array));
        }
        cursor = addresses_end;

        if cursor + 32 > bytes.len() {
            return Err(SolError::MalformedMessage(
                "message truncated before recent blockhash".into(),
            ));
        }
        let recent_blockhash: [u8; 32] = bytes[cursor..cursor + 32]
            .try_into()
            .expect("slice is exactly 32 bytes");
        cursor += 32;

        let (num_instructions, consumed) = compact_u16::decode(&bytes[cursor..])?;
        cursor += consumed;

        let mut instructions = Vec::with_capacity(num_instructions as usize);
        for _ in 0..num_instructions {
            let program_idx = *bytes.get(cursor).ok_or_else(|| {
                SolError::MalformedMessage("truncated instruction program index".into())
            })?;
            cursor += 1;
            if program_idx as usize >= num_addresses {
                return Err(SolError::MalformedMessage(format!(
                    "instruction program index {program_idx} out of range"
                )));
            }

            let (num_accounts, consumed) = compact_u16::decode(&bytes[cursor..])?;
            cursor += consumed;
            let num_accounts = num_accounts as usize;
            let accounts_end = cursor.checked_add(num_accounts).ok_or_else(|| {
                SolError::MalformedMessage("instruction account list length overflow".into())
            })?;
            if accounts_end > bytes.len() {
                return Err(SolError::MalformedMessage(
                    "instruction account indices run past end of message".into(),
                ));
            }
            let account_idxs = bytes[cursor..accounts_end].to_vec();
            for &idx in &account_idxs {
                if idx as usize >= num_addresses {
                    return Err(SolError::MalformedMessage(format!(
                        "instruction account index {idx} out of range"
                    )));
                }
            }
            cursor = accounts_end;

            let (data_len, consumed) = compact_u16::decode(&bytes[cursor..])?;
            cursor += consumed;
            let data_len = data_len as usize;
            let data_end = cursor
                .checked_add(data_len)
                .ok_or_else(|| SolError::MalformedMessage("instruction data length overflow".into()))?;
            if data_end > bytes.len() {
                return Err(SolError::MalformedMessage(
                    "instruction data runs past end of message".into(),
                ));
            }
            let data = bytes[cursor..data_end].to_vec();
            cursor = data_end;

            instructions.push(CompiledInstruction {
                program_idx,
                account_idxs,
                data,
            });
        }

        if cursor != bytes.len() {
            return Err(SolError::MalformedMessage(
                "trailing bytes after the last instruction".into(),
            ));
        }

        let num_required = header.num_required_sigs as usize;
        if num_required > num_addresses {
            return Err(SolError::MalformedMessage(
                "num_required_sigs exceeds the number of addresses".into(),
            ));
        }
        if header.num_readonly_signed as usize > num_required {
            return Err(SolError::MalformedMessage(
                "num_readonly_signed exceeds num_required_sigs".into(),
            ));
        }
        if header.num_readonly_unsigned as usize > num_addresses - num_required {
            return Err(SolError::MalformedMessage(
                "num_readonly_unsigned exceeds the number of non-signer accounts".into(),
            ));
        }

        Ok(Message {
            header,
            addresses,
            recent_blockhash,
            instructions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_message() -> Message {
        Message {
            header: Header {
                num_required_sigs: 1,
                num_readonly_signed: 0,
                num_readonly_unsigned: 1,
            },
            addresses: vec![
                PubKey::from_bytes([1u8; 32]),
                PubKey::from_bytes([2u8; 32]),
                PubKey::from_bytes([0u8; 32]),
            ],
            recent_blockhash: [0xAAu8; 32],
            instructions: vec![CompiledInstruction {
                program_idx: 2,
                account_idxs: vec![0, 1],
                data: vec![2, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0],
            }],
        }
    }

    #[test]
    fn serialize_starts_with_header_bytes() {
        let msg = sample_message();
        let bytes = msg.serialize();
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[1], 0);
        assert_eq!(bytes[2], 1);
    }

    #[test]
    fn serialize_then_parse_roundtrips() {
        let msg = sample_message();
        let bytes = msg.serialize();
        let parsed = Message::parse(&bytes).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn parse_rejects_short_header() {
        assert!(Message::parse(&[0, 0]).is_err());
    }

    #[test]
    fn parse_rejects_versioned_message_marker() {
        let mut bytes = sample_message().serialize();
        bytes[0] |= 0x80;
        let result = Message::parse(&bytes);
        assert!(result.is_err());
    }

    #[test]
    fn parse_rejects_trailing_bytes() {
        let mut bytes = sample_message().serialize();
        bytes.push(0xFF);
        assert!(Message::parse(&bytes).is_err());
    }

    #[test]
    fn parse_rejects_truncated_addresses() {
        let mut bytes = sample_message().serialize();
        bytes.truncate(10);
        assert!(Message::parse(&bytes).is_err());
    }

    #[test]
    fn parse_rejects_out_of_range_program_index() {
        let mut msg = sample_message();
        msg.instructions[0].program_idx = 99;
        let bytes = msg.serialize();
        assert!(Message::parse(&bytes).is_err());
    }

    #[test]
    fn parse_rejects_out_of_range_account_index() {
        let mut msg = sample_message();
        msg.instructions[0].account_idxs = vec![99];
        let bytes = msg.serialize();
        assert!(Message::parse(&bytes).is_err());
    }

    #[test]
    fn parse_rejects_inconsistent_header_counts() {
        let mut msg = sample_message();
        msg.header.num_required_sigs = 200;
        let bytes = msg.serialize();
        assert!(Message::parse(&bytes).is_err());
    }

    #[test]
    fn empty_message_with_no_accounts_or_instructions_roundtrips() {
        let msg = Message {
            header: Header {
                num_required_sigs: 0,
                num_readonly_signed: 0,
                num_readonly_unsigned: 0,
            },
            addresses: vec![],
            recent_blockhash: [0u8; 32],
            instructions: vec![],
        };
        let bytes = msg.serialize();
        let parsed = Message::parse(&bytes).unwrap();
        assert_eq!(parsed, msg);
    }
}
