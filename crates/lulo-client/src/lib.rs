pub mod accounts;
pub mod actions;
pub mod anchor;
pub mod config;
pub mod connection;
pub mod error;
pub mod idl;
pub mod notify;
pub mod pda;
pub mod program;
pub mod routes;
pub mod session;
pub mod stores;
pub mod views;
pub mod wallet;

pub use accounts::{Approver, Contract, ContractStatus, Listing, ProgramAccount};
pub use actions::{plan, Action, ActionKind, ActionPlan, PlanContext, ProgramKind};
pub use config::ClusterConfig;
pub use connection::{AccountInfo, Commitment, Connection, KeyedAccount, TokenAccount};
pub use error::ClientError;
pub use notify::{Notification, NotificationKind};
pub use program::{AccountMap, ProgramClient};
pub use routes::Route;
pub use session::Session;
pub use stores::{StoreKind, Stores};
pub use views::{CreateForm, View};
pub use wallet::{KeypairWallet, WalletAdapter};

use lulo_sol::{address_to_bytes, bytes_to_address};

// ─── Address helpers ─────────────────────────────────────────────────
// String in, string out, for hosts that only hold base58.

/// Address of the contract `creator` would open against `recipient` for
/// `due_date` (unix seconds).
pub fn contract_address(
    config: &ClusterConfig,
    creator: &str,
    recipient: &str,
    due_date: i64,
) -> Result<String, ClientError> {
    let lulo = config.lulo_program_id()?;
    let creator = address_to_bytes(creator)?;
    let recipient = address_to_bytes(recipient)?;
    let contract = pda::contract(&creator, &recipient, due_date, &lulo)?;
    Ok(bytes_to_address(&contract))
}

/// Invoice NFT mint of a contract.
pub fn contract_mint_address(config: &ClusterConfig, contract: &str) -> Result<String, ClientError> {
    let lulo = config.lulo_program_id()?;
    let contract = address_to_bytes(contract)?;
    Ok(bytes_to_address(&pda::contract_mint(&contract, &lulo)?))
}

/// Marketplace listing for `nft_mint` offered by `seller`.
pub fn listing_address(config: &ClusterConfig, nft_mint: &str, seller: &str) -> Result<String, ClientError> {
    let dex = config.dex_program_id()?;
    let nft_mint = address_to_bytes(nft_mint)?;
    let seller = address_to_bytes(seller)?;
    Ok(bytes_to_address(&pda::listing(&nft_mint, &seller, &dex)?))
}
