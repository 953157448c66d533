//! URL path to view resolution.

use crate::stores::StoreKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Create,
    Account,
    Owned,
    Market,
    Approvers,
    /// Contract detail by base58 address; the id is not validated here.
    Contract(String),
    NotFound(String),
}

impl Route {
    /// Resolve a path. Query strings and a trailing slash are ignored;
    /// `/trade` and `/owned` are aliases.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');

        match trimmed {
            "" => Route::Home,
            "/create" => Route::Create,
            "/account" => Route::Account,
            "/account/owned" | "/owned" => Route::Owned,
            "/market" | "/trade" => Route::Market,
            "/approvers" => Route::Approvers,
            other => match other.strip_prefix("/contract/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Route::Contract(id.to_string()),
                _ => Route::NotFound(path.to_string()),
            },
        }
    }

    /// Canonical path.
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".into(),
            Route::Create => "/create".into(),
            Route::Account => "/account".into(),
            Route::Owned => "/account/owned".into(),
            Route::Market => "/market".into(),
            Route::Approvers => "/approvers".into(),
            Route::Contract(id) => format!("/contract/{id}"),
            Route::NotFound(path) => path.clone(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Lulo",
            Route::Create => "Create new contract",
            Route::Account => "Account",
            Route::Owned => "Owned contracts",
            Route::Market => "Market",
            Route::Approvers => "Approvers",
            Route::Contract(_) => "Contract",
            Route::NotFound(_) => "Not found",
        }
    }

    /// The store the route's view reads, if any.
    pub fn store(&self) -> Option<StoreKind> {
        match self {
            Route::Home => Some(StoreKind::Balance),
            Route::Account => Some(StoreKind::Contracts),
            Route::Owned => Some(StoreKind::Owned),
            Route::Market => Some(StoreKind::Listings),
            Route::Approvers => Some(StoreKind::Approvers),
            Route::Contract(id) => Some(StoreKind::ContractInfo(id.clone())),
            Route::Create | Route::NotFound(_) => None,
        }
    }
}
