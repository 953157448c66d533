//! Interface description documents (Anchor IDL JSON).
//!
//! The IDL is the single source for program addresses, instruction names,
//! the ordered account list each instruction expects, and argument types.

use lulo_sol::{address_to_bytes, Pubkey};
use serde::{Deserialize, Serialize};

use crate::anchor::instruction_discriminator;
use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idl {
    pub version: String,
    pub name: String,
    pub instructions: Vec<IdlInstruction>,
    #[serde(default)]
    pub accounts: Vec<IdlTypeDef>,
    #[serde(default)]
    pub metadata: Option<IdlMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlMetadata {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlInstruction {
    pub name: String,
    pub accounts: Vec<IdlAccountItem>,
    pub args: Vec<IdlField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdlAccountItem {
    pub name: String,
    pub is_mut: bool,
    pub is_signer: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: IdlType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlTypeDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: IdlTypeDefTy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdlTypeDefTy {
    pub kind: String,
    #[serde(default)]
    pub fields: Vec<IdlField>,
}

/// Primitive field types used by the invoice and marketplace programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdlType {
    Bool,
    U8,
    U64,
    I64,
    PublicKey,
}

impl Idl {
    pub fn from_json(json: &str) -> Result<Self, ClientError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Program address recorded in the document's metadata.
    pub fn address(&self) -> Result<Pubkey, ClientError> {
        let metadata = self.metadata.as_ref().ok_or_else(|| {
            ClientError::Idl(format!("{} has no metadata.address", self.name))
        })?;
        Ok(address_to_bytes(&metadata.address)?)
    }

    pub fn instruction(&self, name: &str) -> Result<&IdlInstruction, ClientError> {
        self.instructions
            .iter()
            .find(|ix| ix.name == name)
            .ok_or_else(|| {
                ClientError::Idl(format!("{} declares no instruction {name}", self.name))
            })
    }

    pub fn has_account_type(&self, type_name: &str) -> bool {
        self.accounts.iter().any(|a| a.name == type_name)
    }
}

impl IdlInstruction {
    /// Check `args` against the declared argument types and encode the
    /// instruction data (discriminator + Borsh args).
    pub fn encode_args(&self, args: &[ArgValue]) -> Result<Vec<u8>, ClientError> {
        if args.len() != self.args.len() {
            return Err(ClientError::Idl(format!(
                "{} expects {} args, got {}",
                self.name,
                self.args.len(),
                args.len()
            )));
        }

        let mut data = instruction_discriminator(&self.name).to_vec();
        for (field, arg) in self.args.iter().zip(args) {
            if field.ty != arg.ty() {
                return Err(ClientError::Idl(format!(
                    "{}: arg {} is {:?}, got {:?}",
                    self.name,
                    field.name,
                    field.ty,
                    arg.ty()
                )));
            }
            arg.encode_into(&mut data);
        }
        Ok(data)
    }
}

/// An instruction argument value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgValue {
    Bool(bool),
    U8(u8),
    U64(u64),
    I64(i64),
    PublicKey(Pubkey),
}

impl ArgValue {
    pub fn ty(&self) -> IdlType {
        match self {
            ArgValue::Bool(_) => IdlType::Bool,
            ArgValue::U8(_) => IdlType::U8,
            ArgValue::U64(_) => IdlType::U64,
            ArgValue::I64(_) => IdlType::I64,
            ArgValue::PublicKey(_) => IdlType::PublicKey,
        }
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            ArgValue::Bool(v) => out.push(*v as u8),
            ArgValue::U8(v) => out.push(*v),
            ArgValue::U64(v) => out.extend_from_slice(&v.to_le_bytes()),
            ArgValue::I64(v) => out.extend_from_slice(&v.to_le_bytes()),
            ArgValue::PublicKey(k) => out.extend_from_slice(k),
        }
    }
}
