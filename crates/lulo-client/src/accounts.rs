//! Read-only snapshots of the programs' accounts.
//!
//! Field order follows the account definitions in the bundled interface
//! documents. Nothing here is enforced client-side; a decoded value is only
//! what the chain reported at scan time.

use lulo_sol::Pubkey;
use serde::Serialize;

use crate::anchor::{AccountReader, AccountWriter};
use crate::error::ClientError;

/// An Anchor account type with a fixed Borsh layout.
pub trait ProgramAccount: Sized {
    /// Account type name as declared in the IDL.
    const NAME: &'static str;

    fn read(reader: &mut AccountReader<'_>) -> Result<Self, ClientError>;

    fn write(&self, writer: AccountWriter) -> AccountWriter;

    fn decode(data: &[u8]) -> Result<Self, ClientError> {
        let mut reader = AccountReader::new(data, Self::NAME)?;
        Self::read(&mut reader)
    }

    /// Discriminator-prefixed account data, as stored on chain.
    fn to_account_data(&self) -> Vec<u8> {
        self.write(AccountWriter::new(Self::NAME)).finish()
    }
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContractStatus {
    Pending,
    Approved,
    Paid,
    Unknown(u8),
}

impl ContractStatus {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => ContractStatus::Pending,
            1 => ContractStatus::Approved,
            2 => ContractStatus::Paid,
            other => ContractStatus::Unknown(other),
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            ContractStatus::Pending => 0,
            ContractStatus::Approved => 1,
            ContractStatus::Paid => 2,
            ContractStatus::Unknown(v) => *v,
        }
    }

    /// Badge text; unknown statuses get no badge.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            ContractStatus::Pending => Some("Pending"),
            ContractStatus::Approved => Some("Approved"),
            ContractStatus::Paid => Some("Paid"),
            ContractStatus::Unknown(_) => None,
        }
    }
}

/// One invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub creator: Pubkey,
    /// The party the invoice is addressed to (shown as "Payer").
    pub recipient: Pubkey,
    pub amount_due: u64,
    pub due_date: i64,
    pub create_ts: i64,
    pub approver: Pubkey,
    pub approve_ts: i64,
    pub payer: Pubkey,
    pub pay_ts: i64,
    /// Mint of the invoice NFT; whoever holds it may redeem or sell.
    pub mint: Pubkey,
    pub pay_mint: Pubkey,
    pub status: ContractStatus,
}

impl ProgramAccount for Contract {
    const NAME: &'static str = "Contract";

    fn read(r: &mut AccountReader<'_>) -> Result<Self, ClientError> {
        Ok(Self {
            creator: r.read_pubkey()?,
            recipient: r.read_pubkey()?,
            amount_due: r.read_u64()?,
            due_date: r.read_i64()?,
            create_ts: r.read_i64()?,
            approver: r.read_pubkey()?,
            approve_ts: r.read_i64()?,
            payer: r.read_pubkey()?,
            pay_ts: r.read_i64()?,
            mint: r.read_pubkey()?,
            pay_mint: r.read_pubkey()?,
            status: ContractStatus::from_u8(r.read_u8()?),
        })
    }

    fn write(&self, w: AccountWriter) -> AccountWriter {
        w.pubkey(&self.creator)
            .pubkey(&self.recipient)
            .u64(self.amount_due)
            .i64(self.due_date)
            .i64(self.create_ts)
            .pubkey(&self.approver)
            .i64(self.approve_ts)
            .pubkey(&self.payer)
            .i64(self.pay_ts)
            .pubkey(&self.mint)
            .pubkey(&self.pay_mint)
            .u8(self.status.as_u8())
    }
}

impl Contract {
    pub fn involves(&self, key: &Pubkey) -> bool {
        self.creator == *key || self.recipient == *key
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// A contract NFT offered for sale on the marketplace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub seller: Pubkey,
    pub contract: Pubkey,
    pub mint: Pubkey,
    pub ask_mint: Pubkey,
    pub ask: u64,
    pub active: bool,
}

impl ProgramAccount for Listing {
    const NAME: &'static str = "Listing";

    fn read(r: &mut AccountReader<'_>) -> Result<Self, ClientError> {
        Ok(Self {
            seller: r.read_pubkey()?,
            contract: r.read_pubkey()?,
            mint: r.read_pubkey()?,
            ask_mint: r.read_pubkey()?,
            ask: r.read_u64()?,
            active: r.read_bool()?,
        })
    }

    fn write(&self, w: AccountWriter) -> AccountWriter {
        w.pubkey(&self.seller)
            .pubkey(&self.contract)
            .pubkey(&self.mint)
            .pubkey(&self.ask_mint)
            .u64(self.ask)
            .bool(self.active)
    }
}

// ---------------------------------------------------------------------------
// Approver
// ---------------------------------------------------------------------------

/// Delegation of invoice-approval authority from `creator` to `approver`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approver {
    pub creator: Pubkey,
    pub approver: Pubkey,
}

impl ProgramAccount for Approver {
    const NAME: &'static str = "Approver";

    fn read(r: &mut AccountReader<'_>) -> Result<Self, ClientError> {
        Ok(Self {
            creator: r.read_pubkey()?,
            approver: r.read_pubkey()?,
        })
    }

    fn write(&self, w: AccountWriter) -> AccountWriter {
        w.pubkey(&self.creator).pubkey(&self.approver)
    }
}
