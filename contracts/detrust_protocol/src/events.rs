//! # Events
//!
//! Typed payloads for every event the protocol publishes. Topics are
//! `(symbol, key)` pairs so indexers can filter by contract id (or by the
//! target address for role events).
//!
//! | Topic      | Key       | Payload                  |
//! |------------|-----------|--------------------------|
//! | `logged`   | id        | [`ContractLogged`]       |
//! | `signed`   | id        | [`ContractSigned`]       |
//! | `verified` | id        | [`ContractVerified`]     |
//! | `resolved` | id        | [`VerificationResolved`] |
//! | `msg_sent` | id        | [`MessageSent`]          |
//! | `state`    | id        | [`StateChanged`]         |
//! | `role_set` | target    | [`RoleSet`]              |
//! | `role_del` | target    | caller `Address`         |
//!
//! Settlement publishes `state` before `resolved`, with the protocol
//! contract as caller.

use soroban_sdk::{contracttype, symbol_short, Address, Env};

use crate::rbac::Role;
use crate::types::{ContractState, VerificationState};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContractLogged {
    /// Address that created the record.
    pub contract_address: Address,
    pub contract_id: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContractSigned {
    pub contract_id: u64,
    pub signer: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContractVerified {
    pub contract_id: u64,
    pub voter: Address,
    pub legitimate: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VerificationResolved {
    pub contract_id: u64,
    pub final_state: VerificationState,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MessageSent {
    pub contract_id: u64,
    pub sender: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StateChanged {
    pub contract_id: u64,
    /// The party that moved the contract, or the protocol on settlement.
    pub caller: Address,
    pub state: ContractState,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleSet {
    pub caller: Address,
    pub role: Role,
}

pub fn emit_contract_logged(env: &Env, contract_address: Address, contract_id: u64) {
    env.events().publish(
        (symbol_short!("logged"), contract_id),
        ContractLogged {
            contract_address,
            contract_id,
        },
    );
}

pub fn emit_contract_signed(env: &Env, contract_id: u64, signer: Address) {
    env.events().publish(
        (symbol_short!("signed"), contract_id),
        ContractSigned {
            contract_id,
            signer,
        },
    );
}

pub fn emit_contract_verified(env: &Env, contract_id: u64, voter: Address, legitimate: bool) {
    env.events().publish(
        (symbol_short!("verified"), contract_id),
        ContractVerified {
            contract_id,
            voter,
            legitimate,
        },
    );
}

pub fn emit_verification_resolved(env: &Env, contract_id: u64, final_state: VerificationState) {
    env.events().publish(
        (symbol_short!("resolved"), contract_id),
        VerificationResolved {
            contract_id,
            final_state,
        },
    );
}

pub fn emit_message_sent(env: &Env, contract_id: u64, sender: Address) {
    env.events().publish(
        (symbol_short!("msg_sent"), contract_id),
        MessageSent {
            contract_id,
            sender,
        },
    );
}

pub fn emit_state_changed(env: &Env, contract_id: u64, caller: Address, state: ContractState) {
    env.events().publish(
        (symbol_short!("state"), contract_id),
        StateChanged {
            contract_id,
            caller,
            state,
        },
    );
}

pub fn emit_role_set(env: &Env, caller: Address, target: Address, role: Role) {
    env.events()
        .publish((symbol_short!("role_set"), target), RoleSet { caller, role });
}

pub fn emit_role_del(env: &Env, caller: Address, target: Address) {
    env.events().publish((symbol_short!("role_del"), target), caller);
}
