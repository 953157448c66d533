use lulo_sol::SolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Wallet not connected!")]
    WalletNotConnected,

    #[error("Invalid owner")]
    InvalidOwner,

    #[error("Missing account: {0}")]
    MissingAccount(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Account decode failed: {0}")]
    AccountDecode(String),

    #[error("Account {address} is not owned by program {program}")]
    WrongOwner { address: String, program: String },

    #[error("Interface description error: {0}")]
    Idl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Transaction {signature} failed to confirm: {reason}")]
    Confirmation { signature: String, reason: String },

    #[error("Transaction build failed: {0}")]
    TransactionFailed(String),
}

impl ClientError {
    /// Transaction id attached to the failure, when one was already issued.
    pub fn signature(&self) -> Option<&str> {
        match self {
            ClientError::Confirmation { signature, .. } => Some(signature),
            _ => None,
        }
    }

    /// Failures that only mean "this is not the account you asked for".
    pub fn is_not_account(&self) -> bool {
        matches!(
            self,
            ClientError::AccountDecode(_) | ClientError::WrongOwner { .. }
        )
    }
}

impl From<SolError> for ClientError {
    fn from(e: SolError) -> Self {
        match e {
            SolError::InvalidAddress(msg) => ClientError::InvalidAddress(msg),
            other => ClientError::TransactionFailed(format!("SOL: {other}")),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Idl(e.to_string())
    }
}
