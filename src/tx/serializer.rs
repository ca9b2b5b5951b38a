//! Canonical transaction serialization
//!
//! Produces the exact byte sequence a network validator will hash and
//! verify: message header, deduplicated account table, recent blockhash,
//! then compiled instructions with table-index account references.

use std::collections::BTreeMap;

use crate::codec::{base58, write_compact_u16};
use crate::error::{WalletError, WalletResult};

use super::{PublicKey, Transaction};

/// Instruction account references are single u8 table indices.
const MAX_ACCOUNTS: usize = u8::MAX as usize + 1;

/// One entry of the canonical account table.
#[derive(Debug, Clone, Copy)]
struct TableEntry {
    pubkey: PublicKey,
    is_signer: bool,
    is_writable: bool,
}

/// Message header: the three leading count bytes.
struct MessageHeader {
    num_required_signatures: u8,
    num_readonly_signed: u8,
    num_readonly_unsigned: u8,
}

/// Build the canonical account table for a transaction.
///
/// Each public key appears exactly once. Role flags merge by OR when a key
/// recurs: signer anywhere is signer in the table, writable anywhere is
/// writable. Order is strict and total: signers before non-signers, then
/// writable before read-only, then lexicographic on the raw key bytes.
fn compile_accounts(tx: &Transaction) -> Vec<TableEntry> {
    // (is_signer, is_writable) per key; BTreeMap dedups and keeps the
    // merge independent of input iteration order.
    let mut roles: BTreeMap<PublicKey, (bool, bool)> = BTreeMap::new();

    // Fee payer is always a writable signer.
    roles.insert(tx.fee_payer, (true, true));

    for ix in &tx.instructions {
        // Program ids add no privileges; keep whatever the key already has.
        roles.entry(ix.program_id).or_insert((false, false));

        for meta in &ix.accounts {
            let entry = roles.entry(meta.pubkey).or_insert((false, false));
            entry.0 |= meta.is_signer;
            entry.1 |= meta.is_writable;
        }
    }

    let mut table: Vec<TableEntry> = roles
        .into_iter()
        .map(|(pubkey, (is_signer, is_writable))| TableEntry {
            pubkey,
            is_signer,
            is_writable,
        })
        .collect();

    table.sort_by_key(|e| (!e.is_signer, !e.is_writable, e.pubkey));
    table
}

fn header_count(field: &'static str, value: usize) -> WalletResult<u8> {
    u8::try_from(value).map_err(|_| WalletError::CountOverflow { field, value })
}

/// Check a length against the compact-u16 domain before encoding it.
fn compact_count(field: &'static str, value: usize) -> WalletResult<u16> {
    u16::try_from(value).map_err(|_| WalletError::CountOverflow { field, value })
}

fn header_for(table: &[TableEntry]) -> WalletResult<MessageHeader> {
    let num_signers = table.iter().filter(|e| e.is_signer).count();
    let num_readonly_signed = table
        .iter()
        .filter(|e| e.is_signer && !e.is_writable)
        .count();
    let num_readonly_unsigned = table
        .iter()
        .filter(|e| !e.is_signer && !e.is_writable)
        .count();

    Ok(MessageHeader {
        num_required_signatures: header_count("required signature", num_signers)?,
        num_readonly_signed: header_count("read-only signed", num_readonly_signed)?,
        num_readonly_unsigned: header_count("read-only unsigned", num_readonly_unsigned)?,
    })
}

fn table_index(table: &[TableEntry], key: &PublicKey) -> WalletResult<u8> {
    let position = table.iter().position(|e| e.pubkey == *key).ok_or_else(|| {
        WalletError::Internal(format!("account {} missing from table", key.to_base58()))
    })?;
    u8::try_from(position).map_err(|_| WalletError::TooManyAccounts(table.len()))
}

/// Serialize the unsigned message portion of a transaction.
pub fn serialize_message(tx: &Transaction) -> WalletResult<Vec<u8>> {
    let table = compile_accounts(tx);
    if table.len() > MAX_ACCOUNTS {
        return Err(WalletError::TooManyAccounts(table.len()));
    }
    let header = header_for(&table)?;

    let mut message = Vec::new();

    // Header (3 bytes)
    message.push(header.num_required_signatures);
    message.push(header.num_readonly_signed);
    message.push(header.num_readonly_unsigned);

    // Account addresses, 32 raw bytes each in table order
    for entry in &table {
        message.extend_from_slice(entry.pubkey.as_bytes());
    }

    // Recent blockhash: base58-decoded, exactly 32 bytes
    let blockhash = base58::decode(&tx.recent_blockhash)
        .map_err(|_| WalletError::InvalidBlockhash)?;
    if blockhash.len() != 32 {
        return Err(WalletError::InvalidBlockhash);
    }
    message.extend_from_slice(&blockhash);

    // Instructions, in original order
    write_compact_u16(
        compact_count("instruction", tx.instructions.len())?,
        &mut message,
    );
    for ix in &tx.instructions {
        message.push(table_index(&table, &ix.program_id)?);

        write_compact_u16(
            compact_count("account reference", ix.accounts.len())?,
            &mut message,
        );
        for meta in &ix.accounts {
            message.push(table_index(&table, &meta.pubkey)?);
        }

        write_compact_u16(compact_count("instruction data", ix.data.len())?, &mut message);
        message.extend_from_slice(&ix.data);
    }

    Ok(message)
}

/// Serialize a full transaction: compact signature count, raw 64-byte
/// signatures in signer-table order, then the message bytes.
///
/// When signatures are present their count must equal the number of
/// required signatures derived from the account table.
pub fn serialize_transaction(tx: &Transaction) -> WalletResult<Vec<u8>> {
    let message = serialize_message(tx)?;

    let mut out = Vec::new();
    match &tx.signatures {
        Some(signatures) => {
            let required = message[0] as usize;
            if signatures.len() != required {
                return Err(WalletError::SignatureCountMismatch {
                    got: signatures.len(),
                    required,
                });
            }
            write_compact_u16(signatures.len() as u16, &mut out);
            for sig in signatures {
                out.extend_from_slice(&sig.signature);
            }
        }
        None => write_compact_u16(0, &mut out),
    }
    out.extend_from_slice(&message);
    Ok(out)
}
