//! Solana wire support for the Lulo client.
//!
//! This crate handles address encoding, program derived addresses, manual
//! transaction wire format serialization, and the handful of System, SPL
//! Token and Associated Token Account instructions the invoice flows need.
//! Like the rest of the workspace it avoids `solana-sdk` and implements the
//! compact binary format by hand on top of `ed25519-dalek` and `bs58`.

pub mod address;
pub mod error;
pub mod pda;
pub mod spl_token;
pub mod transaction;

pub use address::{
    address_to_bytes, bytes_to_address, short_address, validate_address, Pubkey,
    NATIVE_MINT, SYSVAR_RENT_ID,
};
pub use error::SolError;
pub use pda::{create_program_address, find_program_address, is_on_curve};
pub use spl_token::{
    build_create_associated_token_account, build_sync_native, derive_associated_token_address,
    ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
pub use transaction::{
    build_system_transfer, compile_transaction, decode_compact_u16, encode_compact_u16,
    serialize_message, sign_transaction, signature_to_string, CompiledInstruction,
    SolAccountMeta, SolInstruction, SolTransaction, SYSTEM_PROGRAM_ID,
};
