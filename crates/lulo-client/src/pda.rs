//! Program derived addresses used by the invoice and marketplace programs.
//!
//! Seed strings are fixed by the on-chain programs; every call site derives
//! through these helpers instead of spelling seeds out again.

use lulo_sol::{derive_associated_token_address, find_program_address, Pubkey};

use crate::error::ClientError;

pub const STATE_SEED: &[u8] = b"state";
pub const CONTRACT_SEED: &[u8] = b"contract";
pub const MINT_SEED: &[u8] = b"mint";
pub const VAULT_SEED: &[u8] = b"vault";
pub const APPROVER_SEED: &[u8] = b"approver";
pub const LISTING_SEED: &[u8] = b"listing";
pub const ESCROW_SEED: &[u8] = b"escrow";

fn derive(seeds: &[&[u8]], program_id: &Pubkey) -> Result<Pubkey, ClientError> {
    Ok(find_program_address(seeds, program_id)?.0)
}

// ─── Invoice program ────────────────────────────────────────────────

/// Global fee state: `["state"]`.
pub fn state(lulo: &Pubkey) -> Result<Pubkey, ClientError> {
    derive(&[STATE_SEED], lulo)
}

/// Invoice account: `["contract", creator, recipient, due_date]`.
pub fn contract(
    creator: &Pubkey,
    recipient: &Pubkey,
    due_date: i64,
    lulo: &Pubkey,
) -> Result<Pubkey, ClientError> {
    derive(
        &[CONTRACT_SEED, creator, recipient, &due_date.to_le_bytes()],
        lulo,
    )
}

/// Invoice NFT mint: `["mint", contract]`.
pub fn contract_mint(contract: &Pubkey, lulo: &Pubkey) -> Result<Pubkey, ClientError> {
    derive(&[MINT_SEED, contract], lulo)
}

/// Payment vault per pay mint: `["vault", pay_mint]`.
pub fn pay_vault(pay_mint: &Pubkey, lulo: &Pubkey) -> Result<Pubkey, ClientError> {
    derive(&[VAULT_SEED, pay_mint], lulo)
}

/// Approval delegation record for `approver`: `["approver", approver]`.
pub fn approver(approver: &Pubkey, lulo: &Pubkey) -> Result<Pubkey, ClientError> {
    derive(&[APPROVER_SEED, approver], lulo)
}

// ─── Marketplace program ────────────────────────────────────────────

/// Listing: `["listing", nft_mint, seller]`.
pub fn listing(nft_mint: &Pubkey, seller: &Pubkey, dex: &Pubkey) -> Result<Pubkey, ClientError> {
    derive(&[LISTING_SEED, nft_mint, seller], dex)
}

/// NFT custody while listed: `["vault", nft_mint]`.
pub fn nft_vault(nft_mint: &Pubkey, dex: &Pubkey) -> Result<Pubkey, ClientError> {
    derive(&[VAULT_SEED, nft_mint], dex)
}

/// Seller proceeds escrow: `["escrow", seller, ask_mint]`.
pub fn seller_escrow(seller: &Pubkey, ask_mint: &Pubkey, dex: &Pubkey) -> Result<Pubkey, ClientError> {
    derive(&[ESCROW_SEED, seller, ask_mint], dex)
}

// ─── Token accounts ─────────────────────────────────────────────────

pub fn associated_token(wallet: &Pubkey, mint: &Pubkey) -> Result<Pubkey, ClientError> {
    Ok(derive_associated_token_address(wallet, mint)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LULO: Pubkey = [0x11; 32];
    const DEX: Pubkey = [0x22; 32];

    #[test]
    fn vault_seed_is_shared_but_programs_differ() {
        let mint = [0x33u8; 32];
        assert_ne!(pay_vault(&mint, &LULO).unwrap(), nft_vault(&mint, &DEX).unwrap());
        // Same seeds under the same program collide, as on chain.
        assert_eq!(pay_vault(&mint, &DEX).unwrap(), nft_vault(&mint, &DEX).unwrap());
    }

    #[test]
    fn listing_depends_on_seller() {
        let mint = [0x44u8; 32];
        let a = listing(&mint, &[1; 32], &DEX).unwrap();
        let b = listing(&mint, &[2; 32], &DEX).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn contract_depends_on_due_date() {
        let a = contract(&[1; 32], &[2; 32], 1_700_000_000, &LULO).unwrap();
        let b = contract(&[1; 32], &[2; 32], 1_700_000_001, &LULO).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn escrow_matches_manual_derivation() {
        let seller = [5u8; 32];
        let expected =
            find_program_address(&[b"escrow", &seller, &lulo_sol::NATIVE_MINT], &DEX)
                .unwrap()
                .0;
        assert_eq!(seller_escrow(&seller, &lulo_sol::NATIVE_MINT, &DEX).unwrap(), expected);
    }

    #[test]
    fn state_is_stable() {
        assert_eq!(state(&LULO).unwrap(), state(&LULO).unwrap());
    }
}
