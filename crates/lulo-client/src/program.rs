//! Program client: typed account reads and instruction invocation for one
//! on-chain program, driven by its interface description.

use std::collections::BTreeMap;

use lulo_sol::{bytes_to_address, compile_transaction, Pubkey, SolAccountMeta, SolInstruction};
use tracing::{debug, info, warn};

use crate::accounts::ProgramAccount;
use crate::connection::Connection;
use crate::error::ClientError;
use crate::idl::{ArgValue, Idl};
use crate::wallet::WalletAdapter;

/// Named accounts for one instruction, keyed by IDL account name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountMap(BTreeMap<String, Pubkey>);

impl AccountMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, key: Pubkey) -> Self {
        self.0.insert(name.to_string(), key);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Pubkey> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct ProgramClient {
    idl: Idl,
    program_id: Pubkey,
}

impl ProgramClient {
    /// Client for the program at the IDL's `metadata.address`.
    pub fn new(idl: Idl) -> Result<Self, ClientError> {
        let program_id = idl.address()?;
        Ok(Self { idl, program_id })
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn idl(&self) -> &Idl {
        &self.idl
    }

    // ─── Reads ──────────────────────────────────────────────────────

    /// Fetch and decode one account. `Ok(None)` if it does not exist.
    pub fn fetch<A: ProgramAccount>(
        &self,
        connection: &dyn Connection,
        address: &Pubkey,
    ) -> Result<Option<A>, ClientError> {
        self.check_account_type::<A>()?;

        let Some(info) = connection.get_account(address)? else {
            return Ok(None);
        };
        if info.owner != self.program_id {
            return Err(ClientError::WrongOwner {
                address: bytes_to_address(address),
                program: bytes_to_address(&self.program_id),
            });
        }
        A::decode(&info.data).map(Some)
    }

    /// Scan every account the program owns and keep those of type `A`.
    ///
    /// Accounts of other types are skipped silently; accounts that carry
    /// `A`'s discriminator but fail to decode are skipped with a warning.
    pub fn all<A: ProgramAccount>(
        &self,
        connection: &dyn Connection,
    ) -> Result<Vec<(Pubkey, A)>, ClientError> {
        self.check_account_type::<A>()?;

        let scanned = connection.get_program_accounts(&self.program_id)?;
        let discriminator = crate::anchor::account_discriminator(A::NAME);
        let total = scanned.len();

        let mut out = Vec::new();
        for keyed in scanned {
            if !keyed.account.data.starts_with(&discriminator) {
                continue;
            }
            match A::decode(&keyed.account.data) {
                Ok(account) => out.push((keyed.pubkey, account)),
                Err(e) => warn!(
                    account = %bytes_to_address(&keyed.pubkey),
                    kind = A::NAME,
                    error = %e,
                    "skipping undecodable account"
                ),
            }
        }

        debug!(program = %self.idl.name, kind = A::NAME, total, matched = out.len(), "program scan");
        Ok(out)
    }

    fn check_account_type<A: ProgramAccount>(&self) -> Result<(), ClientError> {
        if self.idl.has_account_type(A::NAME) {
            Ok(())
        } else {
            Err(ClientError::Idl(format!(
                "{} declares no account type {}",
                self.idl.name,
                A::NAME
            )))
        }
    }

    // ─── Instructions ───────────────────────────────────────────────

    /// Build one instruction, ordering `accounts` the way the IDL declares.
    ///
    /// Every declared account must be present in the map and the map may not
    /// name accounts the instruction does not declare.
    pub fn instruction(
        &self,
        name: &str,
        args: &[ArgValue],
        accounts: &AccountMap,
    ) -> Result<SolInstruction, ClientError> {
        let ix = self.idl.instruction(name)?;

        let mut metas = Vec::with_capacity(ix.accounts.len());
        for item in &ix.accounts {
            let key = accounts.get(&item.name).ok_or_else(|| {
                ClientError::MissingAccount(format!("{name} requires account {}", item.name))
            })?;
            metas.push(SolAccountMeta::new(*key, item.is_signer, item.is_mut));
        }

        if let Some(extra) = accounts
            .names()
            .find(|n| !ix.accounts.iter().any(|item| item.name == *n))
        {
            return Err(ClientError::Idl(format!(
                "{name} declares no account {extra}"
            )));
        }

        Ok(SolInstruction {
            program_id: self.program_id,
            accounts: metas,
            data: ix.encode_args(args)?,
        })
    }

    /// Invoke `name` with `accounts`, preceded by `prelude` instructions in
    /// order, signed and sent through `wallet`. Returns the signature.
    pub fn invoke(
        &self,
        connection: &dyn Connection,
        wallet: &dyn WalletAdapter,
        name: &str,
        args: &[ArgValue],
        accounts: &AccountMap,
        prelude: &[SolInstruction],
    ) -> Result<String, ClientError> {
        let fee_payer = wallet.public_key().ok_or(ClientError::WalletNotConnected)?;

        let ix = self.instruction(name, args, accounts)?;
        debug!(
            program = %self.idl.name,
            instruction = name,
            data = %hex::encode(&ix.data),
            prelude = prelude.len(),
            "assembled instruction"
        );

        let mut instructions = prelude.to_vec();
        instructions.push(ix);

        let blockhash = connection.get_latest_blockhash()?;
        let tx = compile_transaction(&instructions, &fee_payer, &blockhash)?;
        let signature = wallet.send_transaction(&tx, connection)?;

        info!(program = %self.idl.name, instruction = name, %signature, "transaction sent");
        Ok(signature)
    }
}
