//! SPL Token and Associated Token Account instructions.
//!
//! Covers what the wrapped-SOL payment flows need: associated token account
//! (ATA) derivation, ATA creation and `SyncNative`. Built by hand without the
//! `spl-token` crates, like the rest of the wire layer.

use crate::address::{Pubkey, SYSVAR_RENT_ID};
use crate::error::SolError;
use crate::pda::find_program_address;
use crate::transaction::{SolAccountMeta, SolInstruction, SYSTEM_PROGRAM_ID};

// ---------------------------------------------------------------------------
// Well-known program IDs
// ---------------------------------------------------------------------------

/// SPL Token Program ID: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: Pubkey = [
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb, 0x79,
    0xac, 0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85, 0x7e, 0xff,
    0x00, 0xa9,
];

/// Associated Token Account Program ID: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey = [
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e, 0x0d,
    0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8, 0xdb, 0xe9,
    0xf8, 0x59,
];

/// SPL Token `SyncNative` instruction index.
const SYNC_NATIVE_IX_INDEX: u8 = 17;

// ---------------------------------------------------------------------------
// Associated Token Account
// ---------------------------------------------------------------------------

/// Derive the associated token account address for a wallet + mint pair.
///
/// Seeds: `[wallet_address, token_program_id, mint_address]` under the
/// Associated Token Account program.
pub fn derive_associated_token_address(wallet: &Pubkey, mint: &Pubkey) -> Result<Pubkey, SolError> {
    find_program_address(
        &[wallet.as_ref(), &TOKEN_PROGRAM_ID, mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

/// Build the Associated Token Account program `Create` instruction.
///
/// `payer` funds the rent, `wallet` becomes the token account owner. The
/// instruction data is empty (legacy `Create`), so the transaction fails if
/// the account already exists; callers check existence first.
pub fn build_create_associated_token_account(
    payer: &Pubkey,
    wallet: &Pubkey,
    mint: &Pubkey,
) -> Result<SolInstruction, SolError> {
    let ata = derive_associated_token_address(wallet, mint)?;

    Ok(SolInstruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            SolAccountMeta::signer(*payer),
            SolAccountMeta::writable(ata),
            SolAccountMeta::readonly(*wallet),
            SolAccountMeta::readonly(*mint),
            SolAccountMeta::readonly(SYSTEM_PROGRAM_ID),
            SolAccountMeta::readonly(TOKEN_PROGRAM_ID),
            SolAccountMeta::readonly(SYSVAR_RENT_ID),
        ],
        data: Vec::new(),
    })
}

// ---------------------------------------------------------------------------
// SPL Token SyncNative
// ---------------------------------------------------------------------------

/// Build an SPL Token `SyncNative` instruction.
///
/// After lamports are transferred into a wrapped-SOL token account, this
/// updates the token amount to match the account's lamport balance.
pub fn build_sync_native(native_account: &Pubkey) -> SolInstruction {
    SolInstruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![SolAccountMeta::writable(*native_account)],
        data: vec![SYNC_NATIVE_IX_INDEX],
    }
}
