//! Network RPC boundary.
//!
//! The client never talks HTTP itself; the host supplies a [`Connection`]
//! (JSON-RPC over fetch, a native HTTP client, or an in-memory fake) and the
//! client only sequences calls against it.

use lulo_sol::Pubkey;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Confirmation level requested from the cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    #[default]
    Processed,
    Confirmed,
    Finalized,
}

/// Raw account snapshot as returned by `getAccountInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub owner: Pubkey,
    pub lamports: u64,
    pub data: Vec<u8>,
}

/// An account together with its address, as returned by `getProgramAccounts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedAccount {
    pub pubkey: Pubkey,
    pub account: AccountInfo,
}

/// Parsed SPL token account, as returned by `getTokenAccountsByOwner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAccount {
    pub address: Pubkey,
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
}

pub trait Connection {
    /// `Ok(None)` when the account does not exist.
    fn get_account(&self, address: &Pubkey) -> Result<Option<AccountInfo>, ClientError>;

    /// Every account owned by `program_id`.
    fn get_program_accounts(&self, program_id: &Pubkey) -> Result<Vec<KeyedAccount>, ClientError>;

    /// Token accounts of `owner` for a single `mint`.
    fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Vec<TokenAccount>, ClientError>;

    /// Lamport balance of `address`.
    fn get_balance(&self, address: &Pubkey) -> Result<u64, ClientError>;

    fn get_latest_blockhash(&self) -> Result<[u8; 32], ClientError>;

    /// Submit a signed wire-format transaction; returns its signature.
    fn send_raw_transaction(&self, wire: &[u8]) -> Result<String, ClientError>;

    fn confirm_transaction(&self, signature: &str, commitment: Commitment) -> Result<(), ClientError>;

    /// Ask the cluster faucet for `lamports`; returns the airdrop signature.
    /// Only devnet and testnet run a faucet, so the default refuses.
    fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<String, ClientError> {
        let _ = (address, lamports);
        Err(ClientError::Rpc("airdrop not supported by this connection".into()))
    }
}
