//! View models, one per route.
//!
//! A view is a plain serializable snapshot of what the route shows: cards,
//! rows, and the actions available on each. Rendering is left to the host.
//! Every action a view offers is disabled while no wallet is connected.

use lulo_sol::{address_to_bytes, bytes_to_address, short_address, Pubkey};
use serde::Serialize;

use crate::accounts::ContractStatus;
use crate::actions::{Action, ActionKind};
use crate::config::ClusterConfig;
use crate::error::ClientError;
use crate::routes::Route;
use crate::stores::{ContractEntry, ListingEntry, Stores};

pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Ask used by the Sell button on the account view, which has no input.
pub const DEFAULT_ASK: u64 = 100_000_000;

/// Faucet request made by the home view's airdrop button.
pub const AIRDROP_LAMPORTS: u64 = LAMPORTS_PER_SOL;

// ─── Formatting ─────────────────────────────────────────────────────

/// Lamports as a decimal SOL amount without trailing zeros.
pub fn lamports_to_sol(lamports: u64) -> String {
    let whole = lamports / LAMPORTS_PER_SOL;
    let frac = lamports % LAMPORTS_PER_SOL;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:09}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Parse a decimal SOL amount (up to 9 fractional digits) into lamports.
pub fn parse_sol(input: &str) -> Result<u64, ClientError> {
    let invalid = || ClientError::InvalidInput(format!("not a SOL amount: {input:?}"));

    let s = input.trim();
    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !digits(whole) || !digits(frac) || frac.len() > 9 {
        return Err(invalid());
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let frac: u64 = if frac.is_empty() {
        0
    } else {
        format!("{frac:0<9}").parse().map_err(|_| invalid())?
    };

    whole
        .checked_mul(LAMPORTS_PER_SOL)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(invalid)
}

/// Discount of `ask` against `amount_due` in whole percent, rounded half up.
/// Negative when the ask is above the amount due.
pub fn discount_percent(ask: u64, amount_due: u64) -> Option<i64> {
    if amount_due == 0 {
        return None;
    }
    let ratio = (ask as f64 - amount_due as f64) / amount_due as f64 * -100.0;
    Some((ratio + 0.5).floor() as i64)
}

/// Days since 1970-01-01 to a proleptic Gregorian (year, month, day).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Unix seconds as a UTC calendar date.
pub fn format_date(unix: i64) -> String {
    let (y, m, d) = civil_from_days(unix.div_euclid(86_400));
    format!("{y:04}-{m:02}-{d:02}")
}

/// Unix seconds as a UTC date and time.
pub fn format_timestamp(unix: i64) -> String {
    let secs = unix.rem_euclid(86_400);
    format!(
        "{} {:02}:{:02}:{:02} UTC",
        format_date(unix),
        secs / 3600,
        secs % 3600 / 60,
        secs % 60
    )
}

// ─── Shared pieces ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardAction {
    pub kind: ActionKind,
    pub label: &'static str,
    pub enabled: bool,
    /// Name of the extra input the action takes, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<&'static str>,
}

impl CardAction {
    fn new(kind: ActionKind, connected: bool) -> Self {
        Self {
            kind,
            label: kind.spec().label,
            enabled: connected,
            input: None,
        }
    }

    fn with_input(mut self, input: &'static str) -> Self {
        self.input = Some(input);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractCard {
    pub address: String,
    pub title: String,
    pub link: String,
    pub sender: String,
    pub amount_due: String,
    pub due_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    pub actions: Vec<CardAction>,
}

impl ContractCard {
    fn new(entry: &ContractEntry, actions: Vec<CardAction>) -> Self {
        let c = &entry.contract;
        let address = bytes_to_address(&entry.address);
        Self {
            link: format!("/contract/{address}"),
            title: short_address(&entry.address),
            address,
            sender: short_address(&c.creator),
            amount_due: format!("{} SOL", lamports_to_sol(c.amount_due)),
            due_date: format_date(c.due_date),
            status: c.status.label(),
            actions,
        }
    }
}

/// The action a recipient can take next, by status.
fn recipient_action(status: ContractStatus) -> Option<ActionKind> {
    match status {
        ContractStatus::Pending => Some(ActionKind::Approve),
        ContractStatus::Approved => Some(ActionKind::Pay),
        ContractStatus::Paid => Some(ActionKind::Redeem),
        ContractStatus::Unknown(_) => None,
    }
}

/// Turn a card button on a contract into an action. `ask` is only read for
/// Sell; the account view passes `None` and lists at [`DEFAULT_ASK`].
pub fn contract_action(
    entry: &ContractEntry,
    kind: ActionKind,
    ask: Option<u64>,
) -> Result<Action, ClientError> {
    let contract = entry.address;
    let data = entry.contract.clone();
    match kind {
        ActionKind::Approve => Ok(Action::Approve { contract }),
        ActionKind::Pay => Ok(Action::Pay { contract, data }),
        ActionKind::Redeem => Ok(Action::Redeem { contract, data }),
        ActionKind::List => Ok(Action::List {
            contract,
            data,
            ask: ask.unwrap_or(DEFAULT_ASK),
        }),
        other => Err(ClientError::InvalidInput(format!(
            "{} is not a contract action",
            other.spec().label
        ))),
    }
}

pub fn listing_action(entry: &ListingEntry) -> Action {
    Action::Buy {
        listing: entry.listing.clone(),
    }
}

// ─── Views ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HomeView {
    pub heading: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<String>,
    /// Absent on clusters without a faucet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airdrop: Option<AirdropAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AirdropAction {
    pub label: &'static str,
    pub lamports: u64,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateView {
    pub heading: &'static str,
    pub fields: [&'static str; 3],
    pub submit: CardAction,
}

/// Raw input of the create form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateForm {
    /// Base58 address of the party that will pay.
    pub recipient: String,
    /// Amount due in SOL.
    pub amount: String,
    /// Due date in unix seconds.
    pub due_date: String,
}

impl CreateForm {
    pub fn to_action(&self) -> Result<Action, ClientError> {
        let recipient = address_to_bytes(&self.recipient)?;
        let amount_due = parse_sol(&self.amount)?;
        let due_date: i64 = self
            .due_date
            .trim()
            .parse()
            .map_err(|_| ClientError::InvalidInput(format!("not a unix time: {:?}", self.due_date)))?;
        if due_date <= 0 {
            return Err(ClientError::InvalidInput("due date must be after 1970".into()));
        }
        Ok(Action::Create {
            recipient,
            amount_due,
            due_date,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractListView {
    pub heading: &'static str,
    pub cards: Vec<ContractCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingCard {
    pub address: String,
    pub title: String,
    pub link: String,
    pub seller: String,
    pub amount_due: String,
    pub due_date: String,
    pub payer: String,
    pub ask: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<i64>,
    pub buy: CardAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketView {
    pub heading: &'static str,
    pub cards: Vec<ListingCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApproverRow {
    pub address: String,
    pub creator: String,
    pub approver: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApproversView {
    pub heading: &'static str,
    pub rows: Vec<ApproverRow>,
    pub set_approver: CardAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEvent {
    pub label: &'static str,
    pub at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractDetail {
    pub address: String,
    pub explorer_url: String,
    pub amount_due: String,
    pub due_date: String,
    /// The invoiced party.
    pub payer: String,
    pub creator: String,
    pub created: String,
    pub approver: String,
    pub approved: String,
    /// Whoever actually paid, once paid.
    pub paid_by: String,
    pub paid: String,
    pub mint: String,
    pub pay_mint: String,
    pub status: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_label: Option<&'static str>,
    pub timeline: Vec<TimelineEvent>,
}

impl ContractDetail {
    fn new(entry: &ContractEntry, config: &ClusterConfig) -> Self {
        let c = &entry.contract;
        let mut timeline = vec![TimelineEvent {
            label: "Created",
            at: format_timestamp(c.create_ts),
        }];
        if c.approve_ts > 0 {
            timeline.push(TimelineEvent {
                label: "Approved",
                at: format_timestamp(c.approve_ts),
            });
        }
        if c.pay_ts > 0 {
            timeline.push(TimelineEvent {
                label: "Paid",
                at: format_timestamp(c.pay_ts),
            });
        }

        Self {
            address: bytes_to_address(&entry.address),
            explorer_url: config.explorer_address_url(&entry.address),
            amount_due: format!("{} SOL", lamports_to_sol(c.amount_due)),
            due_date: format_timestamp(c.due_date),
            payer: bytes_to_address(&c.recipient),
            creator: bytes_to_address(&c.creator),
            created: format_timestamp(c.create_ts),
            approver: bytes_to_address(&c.approver),
            approved: format_timestamp(c.approve_ts),
            paid_by: bytes_to_address(&c.payer),
            paid: format_timestamp(c.pay_ts),
            mint: bytes_to_address(&c.mint),
            pay_mint: bytes_to_address(&c.pay_mint),
            status: c.status.as_u8(),
            status_label: c.status.label(),
            timeline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractView {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ContractDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Home(HomeView),
    Create(CreateView),
    Account(ContractListView),
    Owned(ContractListView),
    Market(MarketView),
    Approvers(ApproversView),
    Contract(ContractView),
    NotFound { path: String },
}

/// What a view may read.
pub struct RenderContext<'a> {
    pub stores: &'a Stores,
    pub wallet: Option<Pubkey>,
    pub config: &'a ClusterConfig,
}

pub fn render(route: &Route, ctx: &RenderContext<'_>) -> View {
    let connected = ctx.wallet.is_some();
    match route {
        Route::Home => View::Home(HomeView {
            heading: "Lulo",
            balance: ctx
                .stores
                .balance()
                .map(|l| format!("{} SOL", lamports_to_sol(l))),
            airdrop: ctx.config.has_faucet().then_some(AirdropAction {
                label: "Airdrop 1",
                lamports: AIRDROP_LAMPORTS,
                enabled: connected,
            }),
        }),

        Route::Create => View::Create(CreateView {
            heading: route.title(),
            fields: ["Payer", "Amount Due", "Due Date"],
            submit: CardAction::new(ActionKind::Create, connected),
        }),

        Route::Account => View::Account(ContractListView {
            heading: "Account Overview",
            cards: ctx
                .stores
                .contracts
                .items()
                .iter()
                .map(|entry| {
                    let is_recipient = ctx.wallet == Some(entry.contract.recipient);
                    let actions = if is_recipient {
                        recipient_action(entry.contract.status)
                            .map(|kind| vec![CardAction::new(kind, connected)])
                            .unwrap_or_default()
                    } else {
                        vec![CardAction::new(ActionKind::List, connected)]
                    };
                    ContractCard::new(entry, actions)
                })
                .collect(),
        }),

        Route::Owned => View::Owned(ContractListView {
            heading: route.title(),
            cards: ctx
                .stores
                .owned
                .items()
                .iter()
                .map(|entry| {
                    let mut actions =
                        vec![CardAction::new(ActionKind::List, connected).with_input("ask")];
                    if entry.contract.status == ContractStatus::Paid {
                        actions.push(CardAction::new(ActionKind::Redeem, connected));
                    }
                    ContractCard::new(entry, actions)
                })
                .collect(),
        }),

        Route::Market => View::Market(MarketView {
            heading: "Lulo DEX",
            cards: ctx
                .stores
                .listings
                .items()
                .iter()
                .map(|entry| {
                    let l = &entry.listing;
                    let c = &entry.contract;
                    ListingCard {
                        address: bytes_to_address(&entry.address),
                        title: short_address(&l.contract),
                        link: format!("/contract/{}", bytes_to_address(&l.contract)),
                        seller: short_address(&l.seller),
                        amount_due: format!("{} SOL", lamports_to_sol(c.amount_due)),
                        due_date: format_date(c.due_date),
                        payer: short_address(&c.recipient),
                        ask: format!("{} SOL", lamports_to_sol(l.ask)),
                        discount_percent: discount_percent(l.ask, c.amount_due),
                        buy: CardAction::new(ActionKind::Buy, connected),
                    }
                })
                .collect(),
        }),

        Route::Approvers => View::Approvers(ApproversView {
            heading: route.title(),
            rows: ctx
                .stores
                .approvers
                .items()
                .iter()
                .map(|entry| ApproverRow {
                    address: bytes_to_address(&entry.address),
                    creator: bytes_to_address(&entry.approver.creator),
                    approver: bytes_to_address(&entry.approver.approver),
                })
                .collect(),
            set_approver: CardAction::new(ActionKind::SetApprover, connected).with_input("delegate"),
        }),

        Route::Contract(id) => {
            let detail = ctx
                .stores
                .contract_info
                .items()
                .first()
                .filter(|entry| bytes_to_address(&entry.address) == *id)
                .map(|entry| ContractDetail::new(entry, ctx.config));
            View::Contract(ContractView {
                id: id.clone(),
                message: detail.is_none().then_some("Invalid contract!"),
                detail,
            })
        }

        Route::NotFound(path) => View::NotFound { path: path.clone() },
    }
}
