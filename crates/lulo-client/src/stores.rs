//! View stores.
//!
//! Each store is rebuilt from a full program-account scan and replaced
//! wholesale. A refresh that fails leaves the previous contents in place.

use lulo_sol::{address_to_bytes, bytes_to_address, Pubkey};
use tracing::{debug, info, warn};

use crate::accounts::{Approver, Contract, Listing};
use crate::connection::Connection;
use crate::error::ClientError;
use crate::program::ProgramClient;

/// Which store to rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// Contracts where the wallet is creator or recipient.
    Contracts,
    /// Contracts whose NFT the wallet holds.
    Owned,
    /// Active marketplace listings.
    Listings,
    Approvers,
    /// A single contract, by base58 address.
    ContractInfo(String),
    Balance,
}

impl StoreKind {
    /// Stores that are meaningless without a connected wallet.
    pub fn needs_wallet(&self) -> bool {
        matches!(self, StoreKind::Contracts | StoreKind::Owned | StoreKind::Balance)
    }
}

#[derive(Debug, Clone)]
pub struct Store<T> {
    items: Vec<T>,
    generation: u64,
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            generation: 0,
        }
    }
}

impl<T> Store<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Number of completed refreshes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.generation += 1;
    }

    /// Drop the contents without counting a refresh.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractEntry {
    pub address: Pubkey,
    pub contract: Contract,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub address: Pubkey,
    pub listing: Listing,
    /// The invoice the listed NFT represents.
    pub contract: Contract,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproverEntry {
    pub address: Pubkey,
    pub approver: Approver,
}

/// What a scan may consult.
pub struct ScanContext<'a> {
    pub connection: &'a dyn Connection,
    pub lulo: &'a ProgramClient,
    pub dex: &'a ProgramClient,
    pub wallet: Option<Pubkey>,
}

#[derive(Debug, Default)]
pub struct Stores {
    pub contracts: Store<ContractEntry>,
    pub owned: Store<ContractEntry>,
    pub listings: Store<ListingEntry>,
    pub approvers: Store<ApproverEntry>,
    /// Zero or one entry.
    pub contract_info: Store<ContractEntry>,
    /// Zero or one entry: the wallet's lamports.
    pub balance: Store<u64>,
}

impl Stores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild one store. When the store needs a wallet and none is
    /// connected, its contents are dropped and `false` is returned without
    /// touching the network.
    pub fn refresh(&mut self, kind: &StoreKind, ctx: &ScanContext<'_>) -> Result<bool, ClientError> {
        if kind.needs_wallet() && ctx.wallet.is_none() {
            debug!(?kind, "no wallet, clearing store");
            self.clear(kind);
            return Ok(false);
        }

        let result = match (kind, ctx.wallet) {
            (StoreKind::Contracts, Some(w)) => {
                scan_contracts(ctx, &w).map(|items| self.contracts.replace(items))
            }
            (StoreKind::Owned, Some(w)) => scan_owned(ctx, &w).map(|items| self.owned.replace(items)),
            (StoreKind::Balance, Some(w)) => ctx
                .connection
                .get_balance(&w)
                .map(|lamports| self.balance.replace(vec![lamports])),
            (StoreKind::Listings, _) => scan_listings(ctx).map(|items| self.listings.replace(items)),
            (StoreKind::Approvers, _) => {
                scan_approvers(ctx).map(|items| self.approvers.replace(items))
            }
            (StoreKind::ContractInfo(id), _) => {
                lookup_contract(ctx, id).map(|items| self.contract_info.replace(items))
            }
            (StoreKind::Contracts | StoreKind::Owned | StoreKind::Balance, None) => {
                return Ok(false)
            }
        };

        match result {
            Ok(()) => {
                info!(?kind, "store updated");
                Ok(true)
            }
            Err(e) => {
                warn!(?kind, error = %e, "refresh failed, keeping previous contents");
                Err(e)
            }
        }
    }

    pub fn balance(&self) -> Option<u64> {
        self.balance.items().first().copied()
    }

    fn clear(&mut self, kind: &StoreKind) {
        match kind {
            StoreKind::Contracts => self.contracts.clear(),
            StoreKind::Owned => self.owned.clear(),
            StoreKind::Balance => self.balance.clear(),
            StoreKind::Listings => self.listings.clear(),
            StoreKind::Approvers => self.approvers.clear(),
            StoreKind::ContractInfo(_) => self.contract_info.clear(),
        }
    }
}

fn scan_contracts(ctx: &ScanContext<'_>, wallet: &Pubkey) -> Result<Vec<ContractEntry>, ClientError> {
    Ok(ctx
        .lulo
        .all::<Contract>(ctx.connection)?
        .into_iter()
        .filter(|(_, c)| c.involves(wallet))
        .map(|(address, contract)| ContractEntry { address, contract })
        .collect())
}

fn scan_owned(ctx: &ScanContext<'_>, wallet: &Pubkey) -> Result<Vec<ContractEntry>, ClientError> {
    let mut owned = Vec::new();
    for (address, contract) in ctx.lulo.all::<Contract>(ctx.connection)? {
        let holds = ctx
            .connection
            .get_token_accounts_by_owner(wallet, &contract.mint)?
            .iter()
            .any(|t| t.amount > 0);
        if holds {
            owned.push(ContractEntry { address, contract });
        }
    }
    Ok(owned)
}

fn scan_listings(ctx: &ScanContext<'_>) -> Result<Vec<ListingEntry>, ClientError> {
    let mut listings = Vec::new();
    for (address, listing) in ctx.dex.all::<Listing>(ctx.connection)? {
        if !listing.active {
            continue;
        }
        let contract = match ctx.lulo.fetch::<Contract>(ctx.connection, &listing.contract) {
            Ok(Some(contract)) => contract,
            Ok(None) => {
                debug!(listing = %bytes_to_address(&address), "listed contract not found, skipping");
                continue;
            }
            Err(e) if e.is_not_account() => {
                debug!(listing = %bytes_to_address(&address), error = %e, "listed contract unreadable, skipping");
                continue;
            }
            Err(e) => return Err(e),
        };
        listings.push(ListingEntry {
            address,
            listing,
            contract,
        });
    }
    Ok(listings)
}

fn scan_approvers(ctx: &ScanContext<'_>) -> Result<Vec<ApproverEntry>, ClientError> {
    Ok(ctx
        .lulo
        .all::<Approver>(ctx.connection)?
        .into_iter()
        .map(|(address, approver)| ApproverEntry { address, approver })
        .collect())
}

/// Not found, not a contract, or not an address at all: all empty.
fn lookup_contract(ctx: &ScanContext<'_>, id: &str) -> Result<Vec<ContractEntry>, ClientError> {
    let Ok(address) = address_to_bytes(id) else {
        debug!(id, "contract id is not an address");
        return Ok(Vec::new());
    };
    match ctx.lulo.fetch::<Contract>(ctx.connection, &address) {
        Ok(Some(contract)) => Ok(vec![ContractEntry { address, contract }]),
        Ok(None) => Ok(Vec::new()),
        Err(e) if e.is_not_account() => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}
