//! Anchor encoding conventions.
//!
//! Anchor programs prefix instruction data with
//! `sha256("global:<snake_case_name>")[..8]` and account data with
//! `sha256("account:<TypeName>")[..8]`; the payload after the prefix is
//! Borsh (little-endian, fixed-width integers, `bool` as one byte).

use lulo_sol::Pubkey;
use sha2::{Digest, Sha256};

use crate::error::ClientError;

pub const DISCRIMINATOR_LEN: usize = 8;

/// Instruction discriminator for an IDL instruction name (camelCase or snake_case).
pub fn instruction_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    sighash("global", &to_snake_case(name))
}

/// Account discriminator for an IDL account type name.
pub fn account_discriminator(type_name: &str) -> [u8; DISCRIMINATOR_LEN] {
    sighash("account", type_name)
}

fn sighash(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(format!("{namespace}:{name}"));
    let hash = hasher.finalize();
    let mut disc = [0u8; DISCRIMINATOR_LEN];
    disc.copy_from_slice(&hash[..DISCRIMINATOR_LEN]);
    disc
}

/// `setApprover` -> `set_approver`.
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Account data cursor
// ---------------------------------------------------------------------------

/// Sequential reader over Borsh account data.
pub struct AccountReader<'a> {
    data: &'a [u8],
    cursor: usize,
}

impl<'a> AccountReader<'a> {
    /// Start reading after checking the 8-byte discriminator for `type_name`.
    pub fn new(data: &'a [u8], type_name: &str) -> Result<Self, ClientError> {
        let expected = account_discriminator(type_name);
        match data.get(..DISCRIMINATOR_LEN) {
            Some(prefix) if prefix == expected => Ok(Self {
                data,
                cursor: DISCRIMINATOR_LEN,
            }),
            Some(_) => Err(ClientError::AccountDecode(format!(
                "discriminator mismatch for {type_name}"
            ))),
            None => Err(ClientError::AccountDecode(format!(
                "{type_name} data shorter than discriminator"
            ))),
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], ClientError> {
        let bytes = self
            .data
            .get(self.cursor..self.cursor + len)
            .ok_or_else(|| {
                ClientError::AccountDecode(format!(
                    "unexpected end of account data at offset {}",
                    self.cursor
                ))
            })?;
        self.cursor += len;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], ClientError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_pubkey(&mut self) -> Result<Pubkey, ClientError> {
        self.take_array::<32>()
    }

    pub fn read_u64(&mut self) -> Result<u64, ClientError> {
        self.take_array::<8>().map(u64::from_le_bytes)
    }

    pub fn read_i64(&mut self) -> Result<i64, ClientError> {
        self.take_array::<8>().map(i64::from_le_bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, ClientError> {
        self.take_array::<1>().map(|b| b[0])
    }

    pub fn read_bool(&mut self) -> Result<bool, ClientError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(ClientError::AccountDecode(format!(
                "invalid bool byte {other}"
            ))),
        }
    }
}

/// Sequential writer producing Borsh account data, discriminator first.
pub struct AccountWriter {
    buf: Vec<u8>,
}

impl AccountWriter {
    pub fn new(type_name: &str) -> Self {
        let mut buf = Vec::with_capacity(256);
        buf.extend_from_slice(&account_discriminator(type_name));
        Self { buf }
    }

    pub fn pubkey(mut self, key: &Pubkey) -> Self {
        self.buf.extend_from_slice(key);
        self
    }

    pub fn u64(mut self, value: u64) -> Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn i64(mut self, value: i64) -> Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u8(mut self, value: u8) -> Self {
        self.buf.push(value);
        self
    }

    pub fn bool(self, value: bool) -> Self {
        self.u8(value as u8)
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_conversion() {
        assert_eq!(to_snake_case("setApprover"), "set_approver");
        assert_eq!(to_snake_case("feeScalar"), "fee_scalar");
        assert_eq!(to_snake_case("pay"), "pay");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
    }

    #[test]
    fn instruction_discriminator_uses_snake_case_name() {
        assert_eq!(
            instruction_discriminator("setApprover"),
            instruction_discriminator("set_approver")
        );
        assert_ne!(
            instruction_discriminator("pay"),
            instruction_discriminator("redeem")
        );
    }

    #[test]
    fn instruction_discriminator_is_sha256_prefix() {
        let full = Sha256::digest(b"global:initialize");
        assert_eq!(instruction_discriminator("initialize"), full[..8]);
    }

    #[test]
    fn account_and_instruction_namespaces_differ() {
        assert_ne!(account_discriminator("pay"), instruction_discriminator("pay"));
    }

    #[test]
    fn reader_checks_discriminator() {
        let data = AccountWriter::new("Listing").u64(5).finish();
        assert!(AccountReader::new(&data, "Listing").is_ok());
        assert!(matches!(
            AccountReader::new(&data, "Contract"),
            Err(ClientError::AccountDecode(_))
        ));
        assert!(AccountReader::new(&data[..4], "Listing").is_err());
    }

    #[test]
    fn reader_reads_what_writer_wrote() {
        let key = [7u8; 32];
        let data = AccountWriter::new("Thing")
            .pubkey(&key)
            .u64(42)
            .i64(-3)
            .bool(true)
            .finish();

        let mut reader = AccountReader::new(&data, "Thing").unwrap();
        assert_eq!(reader.read_pubkey().unwrap(), key);
        assert_eq!(reader.read_u64().unwrap(), 42);
        assert_eq!(reader.read_i64().unwrap(), -3);
        assert!(reader.read_bool().unwrap());
        assert!(reader.read_u8().is_err());
    }

    #[test]
    fn reader_rejects_non_canonical_bool() {
        let data = AccountWriter::new("Flag").u8(2).finish();
        let mut reader = AccountReader::new(&data, "Flag").unwrap();
        assert!(reader.read_bool().is_err());
    }
}
