//! Action registry.
//!
//! Every user action maps to one program instruction through [`ACTIONS`];
//! [`plan`] derives the account map and resolves the prelude instructions
//! for it. Nothing is submitted here.

use lulo_sol::{
    build_create_associated_token_account, build_sync_native, build_system_transfer, Pubkey,
    SolInstruction, ASSOCIATED_TOKEN_PROGRAM_ID, NATIVE_MINT, SYSTEM_PROGRAM_ID, SYSVAR_RENT_ID,
    TOKEN_PROGRAM_ID,
};
use serde::Serialize;
use tracing::debug;

use crate::accounts::{Contract, Listing};
use crate::connection::Connection;
use crate::error::ClientError;
use crate::idl::ArgValue;
use crate::pda;
use crate::program::AccountMap;
use crate::stores::StoreKind;

/// Protocol fee numerator used when initializing the invoice program.
pub const DEFAULT_FEE: u64 = 2;
/// Protocol fee denominator.
pub const DEFAULT_FEE_SCALAR: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramKind {
    Lulo,
    Dex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    Initialize,
    Create,
    Approve,
    Pay,
    Redeem,
    SetApprover,
    List,
    Buy,
}

/// Instructions that must run ahead of the program instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreludePolicy {
    None,
    /// Fund the signer's token account for the mint with native SOL: create
    /// the account if missing, transfer lamports, sync the wrapped balance.
    /// For any other mint the account must already exist.
    WrapNative,
    /// Create the signer's token account for the mint if missing.
    CreateAtaIfMissing,
}

#[derive(Debug, Clone)]
pub struct ActionSpec {
    pub kind: ActionKind,
    pub program: ProgramKind,
    /// Instruction name in the program's IDL.
    pub instruction: &'static str,
    pub prelude: PreludePolicy,
    /// Store rescanned after success when the caller names none.
    pub refresh: StoreKind,
    pub label: &'static str,
}

pub static ACTIONS: [ActionSpec; 8] = [
    ActionSpec {
        kind: ActionKind::Initialize,
        program: ProgramKind::Lulo,
        instruction: "initialize",
        prelude: PreludePolicy::None,
        refresh: StoreKind::Balance,
        label: "Initialize",
    },
    ActionSpec {
        kind: ActionKind::Create,
        program: ProgramKind::Lulo,
        instruction: "create",
        prelude: PreludePolicy::None,
        refresh: StoreKind::Contracts,
        label: "Send contract",
    },
    ActionSpec {
        kind: ActionKind::Approve,
        program: ProgramKind::Lulo,
        instruction: "approve",
        prelude: PreludePolicy::None,
        refresh: StoreKind::Contracts,
        label: "Approve",
    },
    ActionSpec {
        kind: ActionKind::Pay,
        program: ProgramKind::Lulo,
        instruction: "pay",
        prelude: PreludePolicy::WrapNative,
        refresh: StoreKind::Contracts,
        label: "Pay",
    },
    ActionSpec {
        kind: ActionKind::Redeem,
        program: ProgramKind::Lulo,
        instruction: "redeem",
        prelude: PreludePolicy::CreateAtaIfMissing,
        refresh: StoreKind::Owned,
        label: "Redeem",
    },
    ActionSpec {
        kind: ActionKind::SetApprover,
        program: ProgramKind::Lulo,
        instruction: "setApprover",
        prelude: PreludePolicy::None,
        refresh: StoreKind::Approvers,
        label: "Set approver",
    },
    ActionSpec {
        kind: ActionKind::List,
        program: ProgramKind::Dex,
        instruction: "list",
        prelude: PreludePolicy::None,
        refresh: StoreKind::Contracts,
        label: "Sell",
    },
    ActionSpec {
        kind: ActionKind::Buy,
        program: ProgramKind::Dex,
        instruction: "buy",
        prelude: PreludePolicy::WrapNative,
        refresh: StoreKind::Listings,
        label: "Buy",
    },
];

impl ActionKind {
    pub fn spec(self) -> &'static ActionSpec {
        // The table holds one row per variant, in declaration order.
        &ACTIONS[self as usize]
    }
}

/// A user action with the on-chain data it operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Initialize { fee: u64, fee_scalar: u64 },
    Create { recipient: Pubkey, amount_due: u64, due_date: i64 },
    Approve { contract: Pubkey },
    Pay { contract: Pubkey, data: Contract },
    Redeem { contract: Pubkey, data: Contract },
    /// Delegate approval authority from the signer to `delegate`.
    SetApprover { delegate: Pubkey },
    List { contract: Pubkey, data: Contract, ask: u64 },
    Buy { listing: Listing },
}

impl Action {
    pub fn initialize_default() -> Self {
        Action::Initialize {
            fee: DEFAULT_FEE,
            fee_scalar: DEFAULT_FEE_SCALAR,
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Initialize { .. } => ActionKind::Initialize,
            Action::Create { .. } => ActionKind::Create,
            Action::Approve { .. } => ActionKind::Approve,
            Action::Pay { .. } => ActionKind::Pay,
            Action::Redeem { .. } => ActionKind::Redeem,
            Action::SetApprover { .. } => ActionKind::SetApprover,
            Action::List { .. } => ActionKind::List,
            Action::Buy { .. } => ActionKind::Buy,
        }
    }

    pub fn spec(&self) -> &'static ActionSpec {
        self.kind().spec()
    }
}

/// Everything a planner may consult.
pub struct PlanContext<'a> {
    pub signer: Pubkey,
    pub lulo: Pubkey,
    pub dex: Pubkey,
    pub connection: &'a dyn Connection,
}

/// A fully resolved instruction invocation, ready for the program client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPlan {
    pub kind: ActionKind,
    pub program: ProgramKind,
    pub instruction: &'static str,
    pub args: Vec<ArgValue>,
    pub accounts: AccountMap,
    pub prelude: Vec<SolInstruction>,
}

pub fn plan(action: &Action, ctx: &PlanContext<'_>) -> Result<ActionPlan, ClientError> {
    let spec = action.spec();
    let signer = ctx.signer;

    let (args, accounts, prelude) = match action {
        Action::Initialize { fee, fee_scalar } => {
            let accounts = AccountMap::new()
                .with("signer", signer)
                .with("state", pda::state(&ctx.lulo)?)
                .with("systemProgram", SYSTEM_PROGRAM_ID)
                .with("tokenProgram", TOKEN_PROGRAM_ID)
                .with("rent", SYSVAR_RENT_ID);
            (
                vec![ArgValue::U64(*fee), ArgValue::U64(*fee_scalar)],
                accounts,
                Vec::new(),
            )
        }

        Action::Create {
            recipient,
            amount_due,
            due_date,
        } => {
            if *amount_due == 0 {
                return Err(ClientError::InvalidInput("amount due must be positive".into()));
            }
            let contract = pda::contract(&signer, recipient, *due_date, &ctx.lulo)?;
            let mint = pda::contract_mint(&contract, &ctx.lulo)?;
            let accounts = AccountMap::new()
                .with("signer", signer)
                .with("recipient", *recipient)
                .with("contract", contract)
                .with("mint", mint)
                .with("creatorNft", pda::associated_token(&signer, &mint)?)
                .with("state", pda::state(&ctx.lulo)?)
                .with("payMint", NATIVE_MINT)
                .with("associatedTokenProgram", ASSOCIATED_TOKEN_PROGRAM_ID)
                .with("systemProgram", SYSTEM_PROGRAM_ID)
                .with("tokenProgram", TOKEN_PROGRAM_ID)
                .with("rent", SYSVAR_RENT_ID);
            (
                vec![ArgValue::U64(*amount_due), ArgValue::I64(*due_date)],
                accounts,
                Vec::new(),
            )
        }

        Action::Approve { contract } => {
            let accounts = AccountMap::new()
                .with("signer", signer)
                .with("contract", *contract)
                .with("approver", pda::approver(&signer, &ctx.lulo)?);
            (Vec::new(), accounts, Vec::new())
        }

        Action::Pay { contract, data } => {
            let source = pda::associated_token(&signer, &data.pay_mint)?;
            let prelude = resolve_prelude(spec.prelude, ctx, &data.pay_mint, data.amount_due)?;
            let accounts = AccountMap::new()
                .with("signer", signer)
                .with("source", source)
                .with("contract", *contract)
                .with("vault", pda::pay_vault(&data.pay_mint, &ctx.lulo)?)
                .with("payMint", data.pay_mint)
                .with("systemProgram", SYSTEM_PROGRAM_ID)
                .with("tokenProgram", TOKEN_PROGRAM_ID);
            (Vec::new(), accounts, prelude)
        }

        Action::Redeem { contract, data } => {
            let nft_account = ctx
                .connection
                .get_token_accounts_by_owner(&signer, &data.mint)?
                .into_iter()
                .find(|t| t.amount > 0)
                .ok_or(ClientError::InvalidOwner)?;

            let prelude = resolve_prelude(spec.prelude, ctx, &data.pay_mint, 0)?;
            let accounts = AccountMap::new()
                .with("signer", signer)
                .with("creator", data.creator)
                .with("contract", *contract)
                .with("nftAccount", nft_account.address)
                .with("recipient", pda::associated_token(&signer, &data.pay_mint)?)
                .with("vault", pda::pay_vault(&data.pay_mint, &ctx.lulo)?)
                .with("payMint", data.pay_mint)
                .with("systemProgram", SYSTEM_PROGRAM_ID)
                .with("tokenProgram", TOKEN_PROGRAM_ID)
                .with("rent", SYSVAR_RENT_ID);
            (Vec::new(), accounts, prelude)
        }

        Action::SetApprover { delegate } => {
            let accounts = AccountMap::new()
                .with("signer", signer)
                .with("approver", pda::approver(delegate, &ctx.lulo)?)
                .with("delegate", *delegate)
                .with("systemProgram", SYSTEM_PROGRAM_ID);
            (Vec::new(), accounts, Vec::new())
        }

        Action::List {
            contract,
            data,
            ask,
        } => {
            if *ask == 0 {
                return Err(ClientError::InvalidInput("ask must be positive".into()));
            }
            let nft_mint = data.mint;
            let accounts = AccountMap::new()
                .with("signer", signer)
                .with("listing", pda::listing(&nft_mint, &signer, &ctx.dex)?)
                .with("sellerNft", pda::associated_token(&signer, &nft_mint)?)
                .with("nftVault", pda::nft_vault(&nft_mint, &ctx.dex)?)
                .with("nftMint", nft_mint)
                .with("sellerEscrow", pda::seller_escrow(&signer, &NATIVE_MINT, &ctx.dex)?)
                .with("contract", *contract)
                .with("askMint", NATIVE_MINT)
                .with("systemProgram", SYSTEM_PROGRAM_ID)
                .with("tokenProgram", TOKEN_PROGRAM_ID)
                .with("rent", SYSVAR_RENT_ID);
            (vec![ArgValue::U64(*ask)], accounts, Vec::new())
        }

        Action::Buy { listing } => {
            let nft_mint = listing.mint;
            let prelude = resolve_prelude(spec.prelude, ctx, &listing.ask_mint, listing.ask)?;
            let accounts = AccountMap::new()
                .with("signer", signer)
                .with("seller", listing.seller)
                .with("source", pda::associated_token(&signer, &listing.ask_mint)?)
                .with("listing", pda::listing(&nft_mint, &listing.seller, &ctx.dex)?)
                .with(
                    "sellerEscrow",
                    pda::seller_escrow(&listing.seller, &listing.ask_mint, &ctx.dex)?,
                )
                .with("destination", pda::associated_token(&signer, &nft_mint)?)
                .with("nftVault", pda::nft_vault(&nft_mint, &ctx.dex)?)
                .with("nftMint", nft_mint)
                .with("associatedTokenProgram", ASSOCIATED_TOKEN_PROGRAM_ID)
                .with("systemProgram", SYSTEM_PROGRAM_ID)
                .with("tokenProgram", TOKEN_PROGRAM_ID)
                .with("rent", SYSVAR_RENT_ID);
            (Vec::new(), accounts, prelude)
        }
    };

    debug!(
        action = spec.label,
        instruction = spec.instruction,
        accounts = accounts.len(),
        prelude = prelude.len(),
        "planned action"
    );

    Ok(ActionPlan {
        kind: spec.kind,
        program: spec.program,
        instruction: spec.instruction,
        args,
        accounts,
        prelude,
    })
}

/// Prelude instructions for the signer's token account of `mint`.
/// `lamports` is the amount to wrap under [`PreludePolicy::WrapNative`].
fn resolve_prelude(
    policy: PreludePolicy,
    ctx: &PlanContext<'_>,
    mint: &Pubkey,
    lamports: u64,
) -> Result<Vec<SolInstruction>, ClientError> {
    if policy == PreludePolicy::None {
        return Ok(Vec::new());
    }

    let ata = pda::associated_token(&ctx.signer, mint)?;
    let exists = ctx.connection.get_account(&ata)?.is_some();

    let mut prelude = Vec::with_capacity(3);
    match policy {
        PreludePolicy::None => {}
        PreludePolicy::CreateAtaIfMissing => {
            if !exists {
                prelude.push(build_create_associated_token_account(
                    &ctx.signer,
                    &ctx.signer,
                    mint,
                )?);
            }
        }
        PreludePolicy::WrapNative if *mint == NATIVE_MINT => {
            if !exists {
                prelude.push(build_create_associated_token_account(
                    &ctx.signer,
                    &ctx.signer,
                    mint,
                )?);
            }
            prelude.push(build_system_transfer(&ctx.signer, &ata, lamports));
            prelude.push(build_sync_native(&ata));
        }
        PreludePolicy::WrapNative => {
            if !exists {
                return Err(ClientError::MissingAccount(format!(
                    "no source token account for mint {}",
                    lulo_sol::bytes_to_address(mint)
                )));
            }
        }
    }
    Ok(prelude)
}
