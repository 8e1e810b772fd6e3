//! # DeTrust Protocol Contract
//!
//! Root crate of the **DeTrust** contract-lifecycle and trust-reputation
//! protocol. It exposes the single Soroban contract `DeTrustProtocol` whose
//! entry points cover the full life of a bilateral contract:
//!
//! | Phase        | Entry Point(s)                                              |
//! |--------------|-------------------------------------------------------------|
//! | Bootstrap    | [`DeTrustProtocol::init`], `update_config`                  |
//! | Role admin   | `grant_role`, `revoke_role`, `transfer_super_admin`         |
//! | Creation     | [`DeTrustProtocol::create_contract`]                        |
//! | Signing      | [`DeTrustProtocol::sign`], `verify_signature`, `fingerprint` |
//! | Verification | [`DeTrustProtocol::verify_contract`], `resolve_verification` |
//! | Lifecycle    | `proceed`, `complete`, `void`, `dispute`, `is_ready`        |
//! | Messaging    | `send_message`, `retrieve_message`                          |
//! | Queries      | `get_contract`, `get_voters`, `wallet_of`, `contract_of`, … |
//!
//! ## Architecture
//!
//! Authorization lives in [`rbac`], storage access in `storage`, and each
//! protocol concern in its own module (`registry`, `signing`,
//! `verification`, `settlement`, `messages`). This file holds only the
//! public entry points.
//!
//! Every fallible entry point returns `Result<_, Error>`. An `Err` aborts the
//! invocation and the host discards all of its storage writes, token
//! movements and events, so no operation is ever partially applied.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, Address, Bytes, BytesN, Env, Vec};

mod events;
mod ledgers;
mod messages;
pub mod rbac;
mod registry;
mod settlement;
mod signing;
mod storage;
mod types;
mod verification;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod mocks;
#[cfg(test)]
mod test_settlement;

pub use events::{
    ContractLogged, ContractSigned, ContractVerified, MessageSent, RoleSet, StateChanged,
    VerificationResolved,
};
pub use ledgers::{ContractTypeClient, DeTrustTokenClient, TrustScoreClient};
pub use rbac::Role;
use registry::NewContract;
pub use types::{
    ContractRecord, ContractState, ContractType, DisputeType, PartyRole, ProtocolConfig, Tier,
    TierTerms, VerificationState,
};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized           = 1,
    NotInitialized               = 2,
    ContractNotFound             = 3,
    Unauthorized                 = 4,
    PaymentMismatch              = 5,
    AlreadySigned                = 6,
    NotFullySigned               = 7,
    VerificationWindowClosed     = 8,
    VerificationNotYetResolvable = 9,
    AlreadyVerified              = 10,
    InvolvedPartyCannotVerify    = 11,
    AlreadyVoted                 = 12,
    InvalidParties               = 13,
    TierNotConfigured            = 14,
    InvalidConfig                = 15,
    InvalidMessage               = 16,
    RoleNotFound                 = 17,
    SettlementFailed             = 18,
    ContractTypeUnavailable      = 19,
}

/// Upper bound on a tier's verifier count.
pub const MAX_TIER_VERIFIERS: u32 = 1_000;

fn validate_config(config: &ProtocolConfig) -> Result<(), Error> {
    let windows_ok = config.minimum_time_frame > 0
        && config.minimum_time_frame < config.verification_cut_off_time;
    let tiers_ok = !config.tiers.is_empty()
        && config
            .tiers
            .iter()
            .all(|t| t.cost >= 0 && t.verifiers <= MAX_TIER_VERIFIERS);
    if windows_ok && tiers_ok {
        Ok(())
    } else {
        Err(Error::InvalidConfig)
    }
}

#[contract]
pub struct DeTrustProtocol;

#[contractimpl]
impl DeTrustProtocol {
    // ─────────────────────────────────────────────────────────
    // Initialisation & configuration
    // ─────────────────────────────────────────────────────────

    /// Initialise the contract, store `config` and set the first SuperAdmin.
    ///
    /// Must be called exactly once immediately after deployment.
    /// Subsequent calls fail with `Error::AlreadyInitialized`.
    pub fn init(env: Env, super_admin: Address, config: ProtocolConfig) -> Result<(), Error> {
        super_admin.require_auth();
        if storage::has_config(&env) {
            return Err(Error::AlreadyInitialized);
        }
        validate_config(&config)?;
        rbac::init_super_admin(&env, &super_admin)?;
        storage::save_config(&env, &config);
        Ok(())
    }

    /// Replace the protocol configuration. Contracts already created keep
    /// their price, quorum target and verification windows.
    ///
    /// - `caller` must hold `Admin` or `SuperAdmin`.
    pub fn update_config(env: Env, caller: Address, config: ProtocolConfig) -> Result<(), Error> {
        caller.require_auth();
        storage::load_config(&env)?;
        rbac::require_admin_or_above(&env, &caller)?;
        validate_config(&config)?;
        storage::save_config(&env, &config);
        Ok(())
    }

    pub fn get_config(env: Env) -> Result<ProtocolConfig, Error> {
        storage::load_config(&env)
    }

    // ─────────────────────────────────────────────────────────
    // Role management
    // ─────────────────────────────────────────────────────────

    /// Grant `Admin` to `target`. `caller` must hold `SuperAdmin` or `Admin`.
    pub fn grant_role(env: Env, caller: Address, target: Address, role: Role) -> Result<(), Error> {
        rbac::grant_role(&env, &caller, &target, role)
    }

    /// Revoke `target`'s role. The SuperAdmin cannot be revoked; use
    /// `transfer_super_admin`.
    pub fn revoke_role(env: Env, caller: Address, target: Address) -> Result<(), Error> {
        rbac::revoke_role(&env, &caller, &target)
    }

    pub fn transfer_super_admin(
        env: Env,
        current_super_admin: Address,
        new_super_admin: Address,
    ) -> Result<(), Error> {
        rbac::transfer_super_admin(&env, &current_super_admin, &new_super_admin)
    }

    pub fn role_of(env: Env, address: Address) -> Option<Role> {
        rbac::role_of(&env, address)
    }

    pub fn has_role(env: Env, address: Address, role: Role) -> bool {
        rbac::has_role(&env, address, role)
    }

    // ─────────────────────────────────────────────────────────
    // Contract registry
    // ─────────────────────────────────────────────────────────

    /// Create a Draft contract between `payer` and `payee` and return its id.
    ///
    /// `creator` (a party, or the contract-type instance acting for them)
    /// must pay exactly half of the price derived from the payee's tier.
    #[allow(clippy::too_many_arguments)]
    pub fn create_contract(
        env: Env,
        creator: Address,
        payer: Address,
        payee: Address,
        wallet_payer: Address,
        wallet_payee: Address,
        contract_type: ContractType,
        dispute_type: DisputeType,
        payment: i128,
    ) -> Result<u64, Error> {
        registry::create_contract(
            &env,
            &creator,
            NewContract {
                payer,
                payee,
                wallet_payer,
                wallet_payee,
                contract_type,
                dispute_type,
            },
            payment,
        )
    }

    pub fn get_contract(env: Env, contract_id: u64) -> Result<ContractRecord, Error> {
        storage::load_record(&env, contract_id)
    }

    pub fn contract_count(env: Env) -> u64 {
        storage::contract_count(&env)
    }

    /// Last contract id created by `origin`, if any.
    pub fn contract_of(env: Env, origin: Address) -> Option<u64> {
        storage::origin_of(&env, &origin)
    }

    /// Payout wallet registered for `account`, if any.
    pub fn wallet_of(env: Env, account: Address) -> Option<Address> {
        storage::wallet_of(&env, &account)
    }

    pub fn proceed(env: Env, contract_id: u64, caller: Address) -> Result<(), Error> {
        registry::transition(&env, contract_id, &caller, ContractState::InProgress)
    }

    pub fn complete(env: Env, contract_id: u64, caller: Address) -> Result<(), Error> {
        registry::transition(&env, contract_id, &caller, ContractState::Completed)
    }

    pub fn void(env: Env, contract_id: u64, caller: Address) -> Result<(), Error> {
        registry::transition(&env, contract_id, &caller, ContractState::Voided)
    }

    pub fn dispute(env: Env, contract_id: u64, caller: Address) -> Result<(), Error> {
        registry::transition(&env, contract_id, &caller, ContractState::Disputed)
    }

    /// `true` iff the contract is `InProgress`.
    pub fn is_ready(env: Env, contract_id: u64) -> Result<bool, Error> {
        registry::is_ready(&env, contract_id)
    }

    // ─────────────────────────────────────────────────────────
    // Signing
    // ─────────────────────────────────────────────────────────

    /// Pure fingerprint of a party's signature material.
    pub fn fingerprint(
        env: Env,
        signer: Address,
        contract_id: u64,
        nonce: u64,
        v: u32,
        r: BytesN<32>,
        s: BytesN<32>,
    ) -> BytesN<32> {
        signing::fingerprint(&env, &signer, contract_id, nonce, v, &r, &s)
    }

    /// Commit `signer` (payer or payee) to the contract.
    ///
    /// The payee pays half the price, the payer the full price.
    #[allow(clippy::too_many_arguments)]
    pub fn sign(
        env: Env,
        signer: Address,
        contract_id: u64,
        nonce: u64,
        v: u32,
        r: BytesN<32>,
        s: BytesN<32>,
        payment: i128,
    ) -> Result<(), Error> {
        signing::sign(&env, &signer, contract_id, nonce, v, &r, &s, payment)
    }

    pub fn verify_signature(
        env: Env,
        signer: Address,
        contract_id: u64,
        nonce: u64,
        v: u32,
        r: BytesN<32>,
        s: BytesN<32>,
    ) -> Result<bool, Error> {
        signing::verify_signature(&env, &signer, contract_id, nonce, v, &r, &s)
    }

    // ─────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────

    /// Vote on a fully signed contract. Returns the outcome after the vote;
    /// a decisive vote settles immediately.
    pub fn verify_contract(
        env: Env,
        voter: Address,
        contract_id: u64,
        legitimate: bool,
        wallet: Address,
    ) -> Result<VerificationState, Error> {
        verification::verify_contract(&env, &voter, contract_id, legitimate, &wallet)
    }

    /// Close a pending verification by majority once its windows allow it.
    pub fn resolve_verification(env: Env, contract_id: u64) -> Result<VerificationState, Error> {
        verification::resolve_verification(&env, contract_id)
    }

    /// `(legit_voters, fraud_voters)` in vote order.
    pub fn get_voters(env: Env, contract_id: u64) -> Result<(Vec<Address>, Vec<Address>), Error> {
        storage::load_terms(&env, contract_id)?;
        Ok((
            storage::load_voters(&env, contract_id, true),
            storage::load_voters(&env, contract_id, false),
        ))
    }

    // ─────────────────────────────────────────────────────────
    // Messaging
    // ─────────────────────────────────────────────────────────

    pub fn send_message(env: Env, contract_id: u64, sender: Address, text: Bytes) -> Result<(), Error> {
        messages::send_message(&env, contract_id, &sender, text)
    }

    pub fn retrieve_message(env: Env, contract_id: u64, caller: Address) -> Result<Bytes, Error> {
        messages::retrieve_message(&env, contract_id, &caller)
    }
}
