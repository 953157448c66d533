//! Cluster configuration.
//!
//! Program addresses and instruction layouts come from the interface
//! description documents bundled at build time; the endpoint and explorer
//! are fixed per cluster.

use lulo_sol::{bytes_to_address, Pubkey};
use serde::{Deserialize, Serialize};

use crate::connection::Commitment;
use crate::error::ClientError;
use crate::idl::Idl;

const LULO_IDL: &str = include_str!("../idl/lulo.json");
const DEX_IDL: &str = include_str!("../idl/dex.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Cluster name as used in explorer links ("devnet", "mainnet-beta").
    pub cluster: String,
    pub rpc_url: String,
    pub explorer_url: String,
    pub commitment: Commitment,
    /// Invoice program interface.
    pub lulo: Idl,
    /// Marketplace program interface.
    pub dex: Idl,
}

impl ClusterConfig {
    /// Devnet with the bundled program interfaces.
    pub fn devnet() -> Result<Self, ClientError> {
        Self::from_idl_json(
            "devnet",
            "https://api.devnet.solana.com",
            LULO_IDL,
            DEX_IDL,
        )
    }

    pub fn from_idl_json(
        cluster: &str,
        rpc_url: &str,
        lulo_idl: &str,
        dex_idl: &str,
    ) -> Result<Self, ClientError> {
        let config = Self {
            cluster: cluster.to_string(),
            rpc_url: rpc_url.to_string(),
            explorer_url: "https://explorer.solana.com".to_string(),
            commitment: Commitment::Processed,
            lulo: Idl::from_json(lulo_idl)?,
            dex: Idl::from_json(dex_idl)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Both programs must carry an address, and they must differ.
    pub fn validate(&self) -> Result<(), ClientError> {
        let lulo = self.lulo_program_id()?;
        let dex = self.dex_program_id()?;
        if lulo == dex {
            return Err(ClientError::Config(
                "invoice and marketplace programs share an address".into(),
            ));
        }
        if self.rpc_url.is_empty() {
            return Err(ClientError::Config("rpc_url is empty".into()));
        }
        Ok(())
    }

    pub fn lulo_program_id(&self) -> Result<Pubkey, ClientError> {
        self.lulo.address()
    }

    pub fn dex_program_id(&self) -> Result<Pubkey, ClientError> {
        self.dex.address()
    }

    /// Explorer page for an account on this cluster.
    pub fn explorer_address_url(&self, address: &Pubkey) -> String {
        format!(
            "{}/address/{}?cluster={}",
            self.explorer_url,
            bytes_to_address(address),
            self.cluster
        )
    }

    /// Whether the cluster runs a faucet; mainnet does not.
    pub fn has_faucet(&self) -> bool {
        self.cluster != "mainnet-beta"
    }

    /// Explorer page for a transaction on this cluster.
    pub fn explorer_tx_url(&self, signature: &str) -> String {
        format!("{}/tx/{signature}?cluster={}", self.explorer_url, self.cluster)
    }
}
