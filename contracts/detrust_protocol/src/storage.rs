//! # Storage
//!
//! Typed helpers over Soroban's two storage tiers used by DeTrust.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key             | Type             | Description                        |
//! |-----------------|------------------|------------------------------------|
//! | `ContractCount` | `u64`            | Auto-increment contract ID counter |
//! | `Config`        | `ProtocolConfig` | Ledger addresses, windows, tiers   |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                  | Type                | Description                          |
//! |----------------------|---------------------|--------------------------------------|
//! | `Terms(id)`          | `ContractTerms`     | Immutable contract terms             |
//! | `Progress(id)`       | `ContractProgress`  | Signatures, votes, states            |
//! | `LegitVoters(id)`    | `Vec<Address>`      | Voters that judged it legitimate     |
//! | `FraudVoters(id)`    | `Vec<Address>`      | Voters that judged it fraudulent     |
//! | `Voted(id, addr)`    | `bool`              | Duplicate-vote guard                 |
//! | `Messages(id)`       | `Vec<MessageEntry>` | Append-only message log              |
//! | `Wallet(addr)`       | `Address`           | Payout wallet of a participant       |
//! | `OriginOf(addr)`     | `u64`               | Last contract created by an address  |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::types::{
    ContractProgress, ContractRecord, ContractTerms, MessageEntry, ProtocolConfig,
};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Global auto-increment counter for contract IDs (Instance).
    ContractCount,
    /// Protocol configuration (Instance).
    Config,
    /// Immutable terms keyed by ID (Persistent).
    Terms(u64),
    /// Mutable progress keyed by ID (Persistent).
    Progress(u64),
    LegitVoters(u64),
    FraudVoters(u64),
    Voted(u64, Address),
    Messages(u64),
    Wallet(Address),
    OriginOf(Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

/// Extend instance storage TTL if it falls below the threshold.
pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

/// Reads, increments, and stores the contract counter.
/// Returns the ID to use for the *current* contract (pre-increment value).
pub fn get_and_increment_contract_id(env: &Env) -> u64 {
    bump_instance(env);
    let current: u64 = env
        .storage()
        .instance()
        .get(&DataKey::ContractCount)
        .unwrap_or(0);
    env.storage()
        .instance()
        .set(&DataKey::ContractCount, &(current + 1));
    current
}

/// Number of contracts created so far.
pub fn contract_count(env: &Env) -> u64 {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::ContractCount)
        .unwrap_or(0)
}

pub fn has_config(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn save_config(env: &Env, config: &ProtocolConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    bump_instance(env);
}

pub fn load_config(env: &Env) -> Result<ProtocolConfig, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

// ── Persistent Storage Helpers ───────────────────────────────────────

/// Extend the TTL for a persistent storage key.
fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

fn set_persistent<V>(env: &Env, key: &DataKey, value: &V)
where
    V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(key, value);
    bump_persistent(env, key);
}

/// Save the immutable terms and initial progress for a new contract.
pub fn save_new_contract(env: &Env, terms: &ContractTerms, progress: &ContractProgress) {
    set_persistent(env, &DataKey::Terms(terms.id), terms);
    set_persistent(env, &DataKey::Progress(terms.id), progress);
}

pub fn load_terms(env: &Env, id: u64) -> Result<ContractTerms, Error> {
    let key = DataKey::Terms(id);
    let terms: ContractTerms = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::ContractNotFound)?;
    bump_persistent(env, &key);
    Ok(terms)
}

pub fn load_progress(env: &Env, id: u64) -> Result<ContractProgress, Error> {
    let key = DataKey::Progress(id);
    let progress: ContractProgress = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(Error::ContractNotFound)?;
    bump_persistent(env, &key);
    Ok(progress)
}

pub fn save_progress(env: &Env, id: u64, progress: &ContractProgress) {
    set_persistent(env, &DataKey::Progress(id), progress);
}

/// Load the full record by combining terms, progress and voter lists.
pub fn load_record(env: &Env, id: u64) -> Result<ContractRecord, Error> {
    let terms = load_terms(env, id)?;
    let progress = load_progress(env, id)?;
    Ok(ContractRecord {
        id: terms.id,
        origin: terms.origin,
        state: progress.state,
        creation_time: terms.creation_time,
        contract_type: terms.contract_type,
        dispute_type: terms.dispute_type,
        payer: terms.payer,
        payee: terms.payee,
        price: terms.price,
        payer_signature: progress.payer_signature,
        payee_signature: progress.payee_signature,
        signed_count: progress.signed_count,
        verification: progress.verification,
        verifier_needed: terms.verifier_needed,
        minimum_time_frame: terms.minimum_time_frame,
        verification_cut_off_time: terms.verification_cut_off_time,
        legit_votes: progress.legit_votes,
        fraud_votes: progress.fraud_votes,
        legit_voters: load_voters(env, id, true),
        fraud_voters: load_voters(env, id, false),
    })
}

// ── Votes ────────────────────────────────────────────────────────────

fn voters_key(id: u64, legitimate: bool) -> DataKey {
    if legitimate {
        DataKey::LegitVoters(id)
    } else {
        DataKey::FraudVoters(id)
    }
}

pub fn load_voters(env: &Env, id: u64, legitimate: bool) -> Vec<Address> {
    env.storage()
        .persistent()
        .get(&voters_key(id, legitimate))
        .unwrap_or(Vec::new(env))
}

/// Append `voter` to the matching list and set its duplicate-vote flag.
pub fn record_vote(env: &Env, id: u64, voter: &Address, legitimate: bool) {
    let key = voters_key(id, legitimate);
    let mut voters = load_voters(env, id, legitimate);
    voters.push_back(voter.clone());
    set_persistent(env, &key, &voters);
    set_persistent(env, &DataKey::Voted(id, voter.clone()), &true);
}

pub fn has_voted(env: &Env, id: u64, voter: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Voted(id, voter.clone()))
}

// ── Identity & wallets ───────────────────────────────────────────────

pub fn set_wallet(env: &Env, account: &Address, wallet: &Address) {
    set_persistent(env, &DataKey::Wallet(account.clone()), wallet);
}

pub fn wallet_of(env: &Env, account: &Address) -> Option<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::Wallet(account.clone()))
}

/// Payout wallet for `account`, falling back to the account itself.
pub fn payout_wallet(env: &Env, account: &Address) -> Address {
    wallet_of(env, account).unwrap_or_else(|| account.clone())
}

pub fn set_origin_of(env: &Env, origin: &Address, id: u64) {
    set_persistent(env, &DataKey::OriginOf(origin.clone()), &id);
}

pub fn origin_of(env: &Env, origin: &Address) -> Option<u64> {
    env.storage()
        .persistent()
        .get(&DataKey::OriginOf(origin.clone()))
}

// ── Messages ─────────────────────────────────────────────────────────

pub fn load_messages(env: &Env, id: u64) -> Vec<MessageEntry> {
    env.storage()
        .persistent()
        .get(&DataKey::Messages(id))
        .unwrap_or(Vec::new(env))
}

pub fn append_message(env: &Env, id: u64, entry: MessageEntry) {
    let mut log = load_messages(env, id);
    log.push_back(entry);
    set_persistent(env, &DataKey::Messages(id), &log);
}
