//! Wallet adapter boundary.
//!
//! A wallet supplies the connected public key and the ability to sign and
//! send a pre-built transaction. Browser and hardware wallets live on the
//! host side; [`KeypairWallet`] signs locally with an Ed25519 seed.

use ed25519_dalek::SigningKey;
use lulo_sol::{sign_transaction, signature_to_string, Pubkey, SolTransaction};
use tracing::debug;
use zeroize::Zeroize;

use crate::connection::Connection;
use crate::error::ClientError;

pub trait WalletAdapter {
    /// `None` while disconnected.
    fn public_key(&self) -> Option<Pubkey>;

    fn is_connected(&self) -> bool {
        self.public_key().is_some()
    }

    /// Sign `tx` and submit it through `connection`; returns the signature.
    fn send_transaction(
        &self,
        tx: &SolTransaction,
        connection: &dyn Connection,
    ) -> Result<String, ClientError>;
}

/// Wallet backed by an in-process Ed25519 key.
///
/// The signing key is wiped on drop by `ed25519-dalek`.
#[derive(Default)]
pub struct KeypairWallet {
    signing_key: Option<SigningKey>,
}

impl KeypairWallet {
    /// Connect with a 32-byte Ed25519 seed. The caller's copy is zeroized.
    pub fn from_seed(seed: &mut [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        seed.zeroize();
        Self {
            signing_key: Some(signing_key),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, seed: &mut [u8; 32]) {
        *self = Self::from_seed(seed);
    }

    pub fn disconnect(&mut self) {
        self.signing_key = None;
    }
}

impl WalletAdapter for KeypairWallet {
    fn public_key(&self) -> Option<Pubkey> {
        self.signing_key
            .as_ref()
            .map(|k| k.verifying_key().to_bytes())
    }

    fn send_transaction(
        &self,
        tx: &SolTransaction,
        connection: &dyn Connection,
    ) -> Result<String, ClientError> {
        let key = self
            .signing_key
            .as_ref()
            .ok_or(ClientError::WalletNotConnected)?;

        let mut secret = key.to_bytes();
        let signed = sign_transaction(tx, &secret);
        secret.zeroize();
        let wire = signed?;

        let local = signature_to_string(&wire)?;
        debug!(signature = %local, bytes = wire.len(), "submitting signed transaction");

        let remote = connection.send_raw_transaction(&wire)?;
        if remote != local {
            return Err(ClientError::Rpc(format!(
                "node returned signature {remote}, expected {local}"
            )));
        }
        Ok(remote)
    }
}
