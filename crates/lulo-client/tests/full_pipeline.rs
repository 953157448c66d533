//! Cross-crate integration tests exercising the full pipeline:
//! route -> store refresh -> view -> action -> signed wire transaction.
//!
//! The chain is an in-memory fake behind the `Connection` trait, so these
//! tests see exactly which RPC calls the client makes and which
//! instructions it submits.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use lulo_client::*;
use lulo_client::stores::ContractEntry;
use lulo_client::views::{contract_action, listing_action};
use lulo_sol::{
    bytes_to_address, decode_compact_u16, signature_to_string, Pubkey,
    ASSOCIATED_TOKEN_PROGRAM_ID, NATIVE_MINT, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID,
};

// ─── Fake chain ─────────────────────────────────────────────────────

#[derive(Default)]
struct FakeChain {
    accounts: RefCell<BTreeMap<Pubkey, AccountInfo>>,
    tokens: RefCell<Vec<TokenAccount>>,
    sent: RefCell<Vec<Vec<u8>>>,
    calls: Cell<usize>,
    scans: Cell<usize>,
    fail_confirm: Cell<bool>,
    airdrops: RefCell<Vec<(Pubkey, u64)>>,
}

impl FakeChain {
    fn put<A: ProgramAccount>(&self, address: Pubkey, owner: Pubkey, account: &A) {
        self.accounts.borrow_mut().insert(
            address,
            AccountInfo {
                owner,
                lamports: 1_000_000,
                data: account.to_account_data(),
            },
        );
    }

    fn remove(&self, address: &Pubkey) {
        self.accounts.borrow_mut().remove(address);
    }

    fn tick(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

impl Connection for FakeChain {
    fn get_account(&self, address: &Pubkey) -> Result<Option<AccountInfo>, ClientError> {
        self.tick();
        Ok(self.accounts.borrow().get(address).cloned())
    }

    fn get_program_accounts(&self, program_id: &Pubkey) -> Result<Vec<KeyedAccount>, ClientError> {
        self.tick();
        self.scans.set(self.scans.get() + 1);
        Ok(self
            .accounts
            .borrow()
            .iter()
            .filter(|(_, info)| info.owner == *program_id)
            .map(|(pubkey, info)| KeyedAccount {
                pubkey: *pubkey,
                account: info.clone(),
            })
            .collect())
    }

    fn get_token_accounts_by_owner(
        &self,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<Vec<TokenAccount>, ClientError> {
        self.tick();
        Ok(self
            .tokens
            .borrow()
            .iter()
            .filter(|t| t.owner == *owner && t.mint == *mint)
            .copied()
            .collect())
    }

    fn get_balance(&self, _address: &Pubkey) -> Result<u64, ClientError> {
        self.tick();
        Ok(3_250_000_000)
    }

    fn get_latest_blockhash(&self) -> Result<[u8; 32], ClientError> {
        self.tick();
        Ok([0xBB; 32])
    }

    fn send_raw_transaction(&self, wire: &[u8]) -> Result<String, ClientError> {
        self.tick();
        self.sent.borrow_mut().push(wire.to_vec());
        Ok(signature_to_string(wire)?)
    }

    fn confirm_transaction(&self, _signature: &str, commitment: Commitment) -> Result<(), ClientError> {
        self.tick();
        assert_eq!(commitment, Commitment::Processed);
        if self.fail_confirm.get() {
            Err(ClientError::Rpc("blockhash not found".into()))
        } else {
            Ok(())
        }
    }

    fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<String, ClientError> {
        self.tick();
        self.airdrops.borrow_mut().push((*address, lamports));
        Ok(bytes_to_address(&[0xA1; 32]))
    }
}

/// Program invoked by each instruction of a signed wire transaction.
fn submitted_programs(wire: &[u8]) -> Vec<Pubkey> {
    let (num_sigs, mut off) = decode_compact_u16(wire).unwrap();
    off += 64 * num_sigs as usize + 3;

    let (num_keys, n) = decode_compact_u16(&wire[off..]).unwrap();
    off += n;
    let keys: Vec<Pubkey> = (0..num_keys as usize)
        .map(|i| wire[off + 32 * i..off + 32 * (i + 1)].try_into().unwrap())
        .collect();
    off += 32 * num_keys as usize + 32;

    let (num_ix, n) = decode_compact_u16(&wire[off..]).unwrap();
    off += n;
    let mut programs = Vec::new();
    for _ in 0..num_ix {
        programs.push(keys[wire[off] as usize]);
        off += 1;
        let (accounts, n) = decode_compact_u16(&wire[off..]).unwrap();
        off += n + accounts as usize;
        let (data, n) = decode_compact_u16(&wire[off..]).unwrap();
        off += n + data as usize;
    }
    programs
}

// ─── Fixtures ───────────────────────────────────────────────────────

fn wallet() -> KeypairWallet {
    let mut seed: [u8; 32] = rand::random();
    KeypairWallet::from_seed(&mut seed)
}

fn session(wallet: KeypairWallet) -> Session<FakeChain, KeypairWallet> {
    Session::new(ClusterConfig::devnet().unwrap(), FakeChain::default(), wallet).unwrap()
}

fn contract(creator: Pubkey, recipient: Pubkey, mint: Pubkey, status: ContractStatus) -> Contract {
    Contract {
        creator,
        recipient,
        amount_due: 2_000_000_000,
        due_date: 1_700_000_000,
        create_ts: 1_690_000_000,
        approver: [0; 32],
        approve_ts: 0,
        payer: [0; 32],
        pay_ts: 0,
        mint,
        pay_mint: NATIVE_MINT,
        status,
    }
}

fn account_cards(view: View) -> Vec<views::ContractCard> {
    match view {
        View::Account(list) => list.cards,
        other => panic!("expected account view, got {other:?}"),
    }
}

// ─── Wallet gating ──────────────────────────────────────────────────

#[test]
fn no_wallet_action_is_noop_with_notice() {
    let mut s = session(KeypairWallet::disconnected());

    let result = s.execute(&Action::Approve { contract: [1; 32] });
    assert!(matches!(result, Err(ClientError::WalletNotConnected)));
    assert_eq!(s.connection().calls.get(), 0);
    assert!(s.connection().sent.borrow().is_empty());

    let notes = s.drain_notifications();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].kind, NotificationKind::Error);
    assert_eq!(notes[0].message, "Wallet not connected!");
}

#[test]
fn no_wallet_views_disable_actions() {
    let mut s = session(KeypairWallet::disconnected());
    let lulo = *s.lulo().program_id();
    let dex = *s.dex().program_id();

    let c = contract([1; 32], [2; 32], [3; 32], ContractStatus::Approved);
    s.connection().put([10; 32], lulo, &c);
    s.connection().put(
        [20; 32],
        dex,
        &Listing {
            seller: [1; 32],
            contract: [10; 32],
            mint: [3; 32],
            ask_mint: NATIVE_MINT,
            ask: 1_800_000_000,
            active: true,
        },
    );

    // Wallet-scoped stores stay untouched; the market is public.
    assert!(account_cards(s.open(&Route::Account)).is_empty());
    match s.open(&Route::parse("/trade")) {
        View::Market(market) => {
            assert_eq!(market.cards.len(), 1);
            assert!(!market.cards[0].buy.enabled);
            assert_eq!(market.cards[0].discount_percent, Some(10));
        }
        other => panic!("expected market view, got {other:?}"),
    }
}

// ─── Store refresh ──────────────────────────────────────────────────

#[test]
fn zero_contracts_on_account_is_empty_not_error() {
    let mut s = session(wallet());
    assert!(account_cards(s.open(&Route::Account)).is_empty());
    assert!(s.notifications().is_empty());
    assert_eq!(s.stores().contracts.generation(), 1);
}

#[test]
fn refresh_reflects_latest_scan() {
    let w = wallet();
    let me = w.public_key().unwrap();
    let mut s = session(w);
    let lulo = *s.lulo().program_id();

    s.connection().put([10; 32], lulo, &contract(me, [2; 32], [30; 32], ContractStatus::Pending));
    s.connection().put([11; 32], lulo, &contract([2; 32], me, [31; 32], ContractStatus::Pending));
    s.connection().put([12; 32], lulo, &contract([2; 32], [3; 32], [32; 32], ContractStatus::Pending));
    assert_eq!(account_cards(s.open(&Route::Account)).len(), 2);

    s.connection().remove(&[10; 32]);
    s.connection().put([13; 32], lulo, &contract(me, [4; 32], [33; 32], ContractStatus::Paid));
    let cards = account_cards(s.open(&Route::Account));
    let addrs: Vec<String> = cards.into_iter().map(|c| c.address).collect();
    assert_eq!(addrs, vec![bytes_to_address(&[11; 32]), bytes_to_address(&[13; 32])]);
}

#[test]
fn home_shows_balance() {
    let mut s = session(wallet());
    match s.open(&Route::Home) {
        View::Home(home) => assert_eq!(home.balance.as_deref(), Some("3.25 SOL")),
        other => panic!("expected home view, got {other:?}"),
    }
}

#[test]
fn contract_route_with_bad_id_is_invalid() {
    let mut s = session(wallet());
    match s.open(&Route::parse("/contract/nonsense")) {
        View::Contract(view) => assert_eq!(view.message, Some("Invalid contract!")),
        other => panic!("expected contract view, got {other:?}"),
    }
}

// ─── Actions ────────────────────────────────────────────────────────

#[test]
fn pay_with_missing_ata_creates_it_before_transfer() {
    let w = wallet();
    let me = w.public_key().unwrap();
    let mut s = session(w);
    let lulo = *s.lulo().program_id();

    let c = contract([1; 32], me, [30; 32], ContractStatus::Approved);
    s.connection().put([10; 32], lulo, &c);
    s.open(&Route::Account);

    let entry = s.stores().contracts.items()[0].clone();
    let action = contract_action(&entry, ActionKind::Pay, None).unwrap();
    let signature = s.execute(&action).unwrap();

    let sent = s.connection().sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(signature_to_string(&sent[0]).unwrap(), signature);
    assert_eq!(
        submitted_programs(&sent[0]),
        vec![ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID, lulo]
    );
}

#[test]
fn pay_with_existing_ata_skips_creation() {
    let w = wallet();
    let me = w.public_key().unwrap();
    let mut s = session(w);
    let lulo = *s.lulo().program_id();

    let ata = pda::associated_token(&me, &NATIVE_MINT).unwrap();
    s.connection().accounts.borrow_mut().insert(
        ata,
        AccountInfo { owner: TOKEN_PROGRAM_ID, lamports: 2_039_280, data: vec![0; 165] },
    );

    let c = contract([1; 32], me, [30; 32], ContractStatus::Approved);
    s.execute(&Action::Pay { contract: [10; 32], data: c }).unwrap();

    let sent = s.connection().sent.borrow();
    assert_eq!(
        submitted_programs(&sent[0]),
        vec![SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID, lulo]
    );
}

#[test]
fn redeem_without_units_is_invalid_owner_and_submits_nothing() {
    let w = wallet();
    let me = w.public_key().unwrap();
    let mut s = session(w);

    s.connection().tokens.borrow_mut().push(TokenAccount {
        address: [40; 32],
        mint: [30; 32],
        owner: me,
        amount: 0,
    });
    let c = contract([1; 32], me, [30; 32], ContractStatus::Paid);
    let entry = ContractEntry { address: [10; 32], contract: c };

    let result = s.execute(&contract_action(&entry, ActionKind::Redeem, None).unwrap());
    assert!(matches!(result, Err(ClientError::InvalidOwner)));
    assert!(s.connection().sent.borrow().is_empty());

    let note = s.notifications().last().unwrap().clone();
    assert_eq!(note.message, "Transaction failed!");
    assert_eq!(note.description.as_deref(), Some("Invalid owner"));
    assert_eq!(note.txid, None);
}

#[test]
fn successful_action_rescans_relevant_store_once() {
    let w = wallet();
    let me = w.public_key().unwrap();
    let mut s = session(w);
    let lulo = *s.lulo().program_id();

    s.connection().put([10; 32], lulo, &contract([1; 32], me, [30; 32], ContractStatus::Pending));
    s.open(&Route::Account);
    let scans_before = s.connection().scans.get();
    let generation_before = s.stores().contracts.generation();

    let signature = s.execute(&Action::Approve { contract: [10; 32] }).unwrap();

    assert_eq!(s.connection().scans.get(), scans_before + 1);
    assert_eq!(s.stores().contracts.generation(), generation_before + 1);
    let note = s.notifications().last().unwrap();
    assert_eq!(note.kind, NotificationKind::Success);
    assert_eq!(note.message, "Transaction successful!");
    assert_eq!(note.txid.as_deref(), Some(signature.as_str()));
}

#[test]
fn failed_confirmation_reports_txid_and_keeps_stores() {
    let w = wallet();
    let me = w.public_key().unwrap();
    let mut s = session(w);
    let lulo = *s.lulo().program_id();

    s.connection().put([10; 32], lulo, &contract([1; 32], me, [30; 32], ContractStatus::Pending));
    s.open(&Route::Account);
    let generation = s.stores().contracts.generation();
    s.connection().fail_confirm.set(true);

    let err = s.execute(&Action::Approve { contract: [10; 32] }).unwrap_err();
    let txid = err.signature().map(str::to_string);
    assert!(txid.is_some());
    assert_eq!(s.stores().contracts.generation(), generation);
    assert_eq!(s.stores().contracts.len(), 1);

    let note = s.notifications().last().unwrap();
    assert_eq!(note.kind, NotificationKind::Error);
    assert_eq!(note.txid, txid);
}

#[test]
fn buy_goes_to_marketplace_and_refreshes_listings() {
    let w = wallet();
    let mut s = session(w);
    let lulo = *s.lulo().program_id();
    let dex = *s.dex().program_id();

    s.connection().put([10; 32], lulo, &contract([1; 32], [2; 32], [30; 32], ContractStatus::Approved));
    s.connection().put(
        [20; 32],
        dex,
        &Listing {
            seller: [1; 32],
            contract: [10; 32],
            mint: [30; 32],
            ask_mint: NATIVE_MINT,
            ask: 1_500_000_000,
            active: true,
        },
    );
    s.open(&Route::Market);
    let generation = s.stores().listings.generation();

    let action = listing_action(&s.stores().listings.items()[0]);
    s.execute(&action).unwrap();

    let programs = submitted_programs(&s.connection().sent.borrow()[0]);
    assert_eq!(programs.last(), Some(&dex));
    assert_eq!(programs.len(), 4);
    assert_eq!(s.stores().listings.generation(), generation + 1);
}

#[test]
fn create_form_submits_to_derived_contract() {
    let w = wallet();
    let me = w.public_key().unwrap();
    let mut s = session(w);
    let lulo = *s.lulo().program_id();

    let form = CreateForm {
        recipient: bytes_to_address(&[7; 32]),
        amount: "1.25".into(),
        due_date: "1700000000".into(),
    };
    s.execute(&form.to_action().unwrap()).unwrap();

    let sent = s.connection().sent.borrow();
    assert_eq!(submitted_programs(&sent[0]), vec![lulo]);

    let expected = contract_address(
        s.config(),
        &bytes_to_address(&me),
        &bytes_to_address(&[7; 32]),
        1_700_000_000,
    )
    .unwrap();
    let expected = lulo_sol::address_to_bytes(&expected).unwrap();
    assert!(sent[0].windows(32).any(|w| w == expected));
}

#[test]
fn disconnecting_wallet_stops_actions() {
    let mut s = session(wallet());
    assert!(s.wallet().is_connected());
    s.wallet_mut().disconnect();
    assert!(matches!(
        s.execute(&Action::SetApprover { delegate: [5; 32] }),
        Err(ClientError::WalletNotConnected)
    ));
    assert_eq!(s.connection().calls.get(), 0);
}

// ─── Refresh follows the triggering view ────────────────────────────

#[test]
fn redeem_from_account_rescans_account_store() {
    let w = wallet();
    let me = w.public_key().unwrap();
    let mut s = session(w);
    let lulo = *s.lulo().program_id();

    s.connection().put([10; 32], lulo, &contract([1; 32], me, [30; 32], ContractStatus::Paid));
    s.connection().tokens.borrow_mut().push(TokenAccount {
        address: [40; 32],
        mint: [30; 32],
        owner: me,
        amount: 1,
    });

    let cards = account_cards(s.open(&Route::Account));
    assert_eq!(cards[0].actions[0].kind, ActionKind::Redeem);
    let contracts_before = s.stores().contracts.generation();
    let owned_before = s.stores().owned.generation();

    let entry = s.stores().contracts.items()[0].clone();
    let action = contract_action(&entry, ActionKind::Redeem, None).unwrap();
    s.execute_on(&Route::Account, &action).unwrap();

    assert_eq!(s.stores().contracts.generation(), contracts_before + 1);
    assert_eq!(s.stores().owned.generation(), owned_before);
}

#[test]
fn sell_from_owned_rescans_owned_store() {
    let w = wallet();
    let me = w.public_key().unwrap();
    let mut s = session(w);
    let lulo = *s.lulo().program_id();
    let dex = *s.dex().program_id();

    s.connection().put([10; 32], lulo, &contract([1; 32], [2; 32], [30; 32], ContractStatus::Approved));
    s.connection().tokens.borrow_mut().push(TokenAccount {
        address: [40; 32],
        mint: [30; 32],
        owner: me,
        amount: 1,
    });

    match s.open(&Route::parse("/owned")) {
        View::Owned(list) => assert_eq!(list.cards.len(), 1),
        other => panic!("expected owned view, got {other:?}"),
    }
    let owned_before = s.stores().owned.generation();
    let contracts_before = s.stores().contracts.generation();
    let entry = s.stores().owned.items()[0].clone();

    // Listing moves the NFT into the marketplace vault.
    s.connection().tokens.borrow_mut()[0].amount = 0;
    let ask = views::parse_sol("1.5").unwrap();
    let action = contract_action(&entry, ActionKind::List, Some(ask)).unwrap();
    s.execute_on(&Route::Owned, &action).unwrap();

    assert_eq!(submitted_programs(&s.connection().sent.borrow()[0]), vec![dex]);
    assert_eq!(s.stores().owned.generation(), owned_before + 1);
    assert!(s.stores().owned.is_empty());
    assert_eq!(s.stores().contracts.generation(), contracts_before);
}

#[test]
fn action_from_storeless_route_uses_table_target() {
    let mut s = session(wallet());
    let form = CreateForm {
        recipient: bytes_to_address(&[7; 32]),
        amount: "1".into(),
        due_date: "1700000000".into(),
    };
    s.execute_on(&Route::Create, &form.to_action().unwrap()).unwrap();
    assert_eq!(s.stores().contracts.generation(), 1);
}

// ─── Airdrop ────────────────────────────────────────────────────────

#[test]
fn airdrop_funds_wallet_and_refreshes_balance() {
    let w = wallet();
    let me = w.public_key().unwrap();
    let mut s = session(w);

    let View::Home(home) = s.open(&Route::Home) else {
        panic!("expected home view");
    };
    let airdrop = home.airdrop.unwrap();
    assert!(airdrop.enabled);
    let generation = s.stores().balance.generation();

    let signature = s.request_airdrop(airdrop.lamports).unwrap();

    assert_eq!(*s.connection().airdrops.borrow(), vec![(me, 1_000_000_000)]);
    assert_eq!(s.stores().balance.generation(), generation + 1);
    let note = s.notifications().last().unwrap();
    assert_eq!(note.message, "Airdrop successful!");
    assert_eq!(note.txid.as_deref(), Some(signature.as_str()));
}

#[test]
fn airdrop_without_wallet_is_noop() {
    let mut s = session(KeypairWallet::disconnected());
    let View::Home(home) = s.open(&Route::Home) else {
        panic!("expected home view");
    };
    assert!(!home.airdrop.unwrap().enabled);

    assert!(matches!(s.request_airdrop(1_000_000_000), Err(ClientError::WalletNotConnected)));
    assert!(s.connection().airdrops.borrow().is_empty());
    assert_eq!(s.connection().calls.get(), 0);
    assert_eq!(s.notifications().last().unwrap().message, "Wallet not connected!");
}

#[test]
fn failed_airdrop_confirmation_keeps_balance() {
    let mut s = session(wallet());
    s.open(&Route::Home);
    let generation = s.stores().balance.generation();
    s.connection().fail_confirm.set(true);

    let err = s.request_airdrop(1_000_000_000).unwrap_err();
    assert!(err.signature().is_some());
    assert_eq!(s.stores().balance.generation(), generation);
    let note = s.notifications().last().unwrap();
    assert_eq!(note.message, "Airdrop failed!");
    assert_eq!(note.kind, NotificationKind::Error);
}

#[test]
fn disconnect_clears_previous_wallet_data() {
    let w = wallet();
    let me = w.public_key().unwrap();
    let mut s = session(w);
    let lulo = *s.lulo().program_id();

    s.connection().put([10; 32], lulo, &contract(me, [2; 32], [30; 32], ContractStatus::Pending));
    assert_eq!(account_cards(s.open(&Route::Account)).len(), 1);

    s.wallet_mut().disconnect();
    assert!(account_cards(s.open(&Route::Account)).is_empty());
}
