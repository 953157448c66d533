//! Session: the connection, wallet, program clients and stores for one
//! user, plus the standard boundary every action goes through.

use lulo_sol::Pubkey;
use tracing::{info, warn};

use crate::actions::{self, Action, PlanContext, ProgramKind};
use crate::config::ClusterConfig;
use crate::connection::Connection;
use crate::error::ClientError;
use crate::notify::{Notification, Notifications};
use crate::program::ProgramClient;
use crate::routes::Route;
use crate::stores::{ScanContext, StoreKind, Stores};
use crate::views::{self, RenderContext, View};
use crate::wallet::WalletAdapter;

pub struct Session<C: Connection, W: WalletAdapter> {
    config: ClusterConfig,
    connection: C,
    wallet: W,
    lulo: ProgramClient,
    dex: ProgramClient,
    stores: Stores,
    notifications: Notifications,
}

impl<C: Connection, W: WalletAdapter> Session<C, W> {
    pub fn new(config: ClusterConfig, connection: C, wallet: W) -> Result<Self, ClientError> {
        config.validate()?;
        let lulo = ProgramClient::new(config.lulo.clone())?;
        let dex = ProgramClient::new(config.dex.clone())?;
        info!(cluster = %config.cluster, rpc = %config.rpc_url, "session opened");
        Ok(Self {
            config,
            connection,
            wallet,
            lulo,
            dex,
            stores: Stores::new(),
            notifications: Notifications::default(),
        })
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn wallet_mut(&mut self) -> &mut W {
        &mut self.wallet
    }

    pub fn public_key(&self) -> Option<Pubkey> {
        self.wallet.public_key()
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifications.drain()
    }

    pub fn lulo(&self) -> &ProgramClient {
        &self.lulo
    }

    pub fn dex(&self) -> &ProgramClient {
        &self.dex
    }

    // ─── Stores and views ───────────────────────────────────────────

    /// Rebuild one store; see [`Stores::refresh`].
    pub fn refresh(&mut self, kind: &StoreKind) -> Result<bool, ClientError> {
        let ctx = ScanContext {
            connection: &self.connection,
            lulo: &self.lulo,
            dex: &self.dex,
            wallet: self.wallet.public_key(),
        };
        self.stores.refresh(kind, &ctx)
    }

    /// Refresh the store the route reads, then render it. A failed refresh
    /// renders the previous contents.
    pub fn open(&mut self, route: &Route) -> View {
        if let Some(kind) = route.store() {
            if let Err(e) = self.refresh(&kind) {
                warn!(route = %route.path(), error = %e, "showing stale view");
            }
        }
        self.render(route)
    }

    pub fn render(&self, route: &Route) -> View {
        views::render(
            route,
            &RenderContext {
                stores: &self.stores,
                wallet: self.wallet.public_key(),
                config: &self.config,
            },
        )
    }

    // ─── Actions ────────────────────────────────────────────────────

    /// Run `action` and rescan the store its table row names.
    pub fn execute(&mut self, action: &Action) -> Result<String, ClientError> {
        let refresh = action.spec().refresh.clone();
        self.run(action, &refresh)
    }

    /// Run `action` offered on `route` and rescan the store that route
    /// reads. Routes without a store fall back to the table row's target.
    pub fn execute_on(&mut self, route: &Route, action: &Action) -> Result<String, ClientError> {
        let refresh = route
            .store()
            .unwrap_or_else(|| action.spec().refresh.clone());
        self.run(action, &refresh)
    }

    /// Run `action`: plan, submit, confirm, then rescan `refresh` once.
    ///
    /// Without a wallet nothing touches the network. Every outcome is
    /// reported as a notification; a failure leaves every store as it was.
    pub fn run(&mut self, action: &Action, refresh: &StoreKind) -> Result<String, ClientError> {
        let signer = self.require_wallet(action.spec().label)?;
        let result = self.submit(action, signer);
        self.settle(result, refresh, "Transaction successful!", "Transaction failed!")
    }

    /// Request `lamports` from the cluster faucet for the connected wallet,
    /// then rescan the balance.
    pub fn request_airdrop(&mut self, lamports: u64) -> Result<String, ClientError> {
        let to = self.require_wallet("airdrop")?;
        let result = self.airdrop(to, lamports);
        self.settle(result, &StoreKind::Balance, "Airdrop successful!", "Airdrop failed!")
    }

    fn require_wallet(&mut self, what: &str) -> Result<Pubkey, ClientError> {
        let Some(key) = self.wallet.public_key() else {
            warn!(action = what, "wallet not connected");
            self.notifications
                .push(Notification::error(&ClientError::WalletNotConnected.to_string()));
            return Err(ClientError::WalletNotConnected);
        };
        Ok(key)
    }

    fn settle(
        &mut self,
        result: Result<String, ClientError>,
        refresh: &StoreKind,
        succeeded: &str,
        failed: &str,
    ) -> Result<String, ClientError> {
        match result {
            Ok(signature) => {
                if let Err(e) = self.refresh(refresh) {
                    warn!(%signature, error = %e, "post-transaction refresh failed");
                }
                self.notifications.push(Notification::success(succeeded, &signature));
                Ok(signature)
            }
            Err(e) => {
                self.notifications.push(
                    Notification::error(failed)
                        .with_description(e.to_string())
                        .with_txid(e.signature()),
                );
                Err(e)
            }
        }
    }

    fn submit(&self, action: &Action, signer: Pubkey) -> Result<String, ClientError> {
        let plan = actions::plan(
            action,
            &PlanContext {
                signer,
                lulo: *self.lulo.program_id(),
                dex: *self.dex.program_id(),
                connection: &self.connection,
            },
        )?;

        let program = match plan.program {
            ProgramKind::Lulo => &self.lulo,
            ProgramKind::Dex => &self.dex,
        };
        let signature = program.invoke(
            &self.connection,
            &self.wallet,
            plan.instruction,
            &plan.args,
            &plan.accounts,
            &plan.prelude,
        )?;
        self.confirm(&signature)?;

        info!(action = action.spec().label, %signature, "transaction confirmed");
        Ok(signature)
    }

    fn airdrop(&self, to: Pubkey, lamports: u64) -> Result<String, ClientError> {
        if lamports == 0 {
            return Err(ClientError::InvalidInput("airdrop amount must be positive".into()));
        }
        let signature = self.connection.request_airdrop(&to, lamports)?;
        self.confirm(&signature)?;

        info!(%signature, lamports, "airdrop confirmed");
        Ok(signature)
    }

    fn confirm(&self, signature: &str) -> Result<(), ClientError> {
        self.connection
            .confirm_transaction(signature, self.config.commitment)
            .map_err(|e| ClientError::Confirmation {
                signature: signature.to_string(),
                reason: e.to_string(),
            })
    }
}
