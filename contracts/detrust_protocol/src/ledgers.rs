//! Cross-contract interfaces of the collaborators the protocol drives.
//!
//! Only the calls the engine makes are declared; each trait generates a typed
//! client (`DeTrustTokenClient`, `TrustScoreClient`, `ContractTypeClient`)
//! with fallible `try_*` variants used during settlement.
//!
//! The payment asset is a regular Stellar Asset Contract and goes through
//! `soroban_sdk::token::Client` instead.

use soroban_sdk::{contractclient, Address, Env};

use crate::types::Tier;

/// DeTrust reward token. The protocol must be an authorised minter / burner.
#[allow(dead_code)]
#[contractclient(name = "DeTrustTokenClient")]
pub trait DeTrustToken {
    fn mint(env: Env, to: Address, amount: i128);
    fn burn(env: Env, from: Address, amount: i128);
}

/// Reputation ledger.
#[allow(dead_code)]
#[contractclient(name = "TrustScoreClient")]
pub trait TrustScoreLedger {
    fn get_tier(env: Env, account: Address) -> Tier;
    fn increase(env: Env, account: Address, amount: u32);
    fn decrease(env: Env, account: Address, amount: u32);
}

/// Contract-type instance (`CommonContract` and siblings) that knows its own
/// payer / payee.
#[allow(dead_code)]
#[contractclient(name = "ContractTypeClient")]
pub trait ContractTypeInstance {
    fn is_payer(env: Env, account: Address) -> bool;
    fn is_payee(env: Env, account: Address) -> bool;
}
