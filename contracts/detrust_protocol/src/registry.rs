//! Contract creation and caller-driven lifecycle transitions.

use soroban_sdk::{token, Address, Env};

use crate::events;
use crate::ledgers::{ContractTypeClient, TrustScoreClient};
use crate::storage::{
    get_and_increment_contract_id, load_config, load_progress, load_terms, save_new_contract,
    save_progress, set_origin_of, set_wallet,
};
use crate::types::{
    ContractProgress, ContractState, ContractTerms, ContractType, DisputeType, ProtocolConfig,
};
use crate::Error;

/// Parties, wallets and tags of a contract about to be created.
pub struct NewContract {
    pub payer: Address,
    pub payee: Address,
    pub wallet_payer: Address,
    pub wallet_payee: Address,
    pub contract_type: ContractType,
    pub dispute_type: DisputeType,
}

/// Price and quorum target derived from both parties' tiers.
fn price_and_quorum(
    env: &Env,
    config: &ProtocolConfig,
    payer: &Address,
    payee: &Address,
) -> Result<(i128, u32), Error> {
    let trust = TrustScoreClient::new(env, &config.trust_score);
    let payer_terms = config
        .terms_for(trust.get_tier(payer))
        .ok_or(Error::TierNotConfigured)?;
    let payee_terms = config
        .terms_for(trust.get_tier(payee))
        .ok_or(Error::TierNotConfigured)?;
    let verifier_needed = payer_terms
        .verifiers
        .checked_add(payee_terms.verifiers)
        .ok_or(Error::InvalidConfig)?;
    Ok((payee_terms.cost, verifier_needed))
}

/// A delegating contract type must be created by its own instance, and the
/// instance must answer for the payer it names.
fn check_origin(env: &Env, creator: &Address, new: &NewContract) -> Result<(), Error> {
    if !new.contract_type.delegates_roles() {
        return Ok(());
    }
    if *creator == new.payer || *creator == new.payee {
        return Err(Error::InvalidParties);
    }
    match ContractTypeClient::new(env, creator).try_is_payer(&new.payer) {
        Ok(Ok(true)) => Ok(()),
        _ => Err(Error::ContractTypeUnavailable),
    }
}

/// Create a Draft contract. `creator` pays half the payee-tier price now; the
/// rest is collected when the parties sign.
pub fn create_contract(
    env: &Env,
    creator: &Address,
    new: NewContract,
    payment: i128,
) -> Result<u64, Error> {
    creator.require_auth();
    let config = load_config(env)?;
    if new.payer == new.payee {
        return Err(Error::InvalidParties);
    }
    check_origin(env, creator, &new)?;

    let (price, verifier_needed) = price_and_quorum(env, &config, &new.payer, &new.payee)?;
    if payment != price / 2 {
        return Err(Error::PaymentMismatch);
    }
    if payment > 0 {
        token::Client::new(env, &config.payment_token).transfer(
            creator,
            &env.current_contract_address(),
            &payment,
        );
    }

    let id = get_and_increment_contract_id(env);
    let terms = ContractTerms {
        id,
        origin: creator.clone(),
        payer: new.payer,
        payee: new.payee,
        contract_type: new.contract_type,
        dispute_type: new.dispute_type,
        creation_time: env.ledger().timestamp(),
        price,
        verifier_needed,
        minimum_time_frame: config.minimum_time_frame,
        verification_cut_off_time: config.verification_cut_off_time,
    };
    save_new_contract(env, &terms, &ContractProgress::new());
    set_wallet(env, &terms.payer, &new.wallet_payer);
    set_wallet(env, &terms.payee, &new.wallet_payee);
    set_origin_of(env, creator, id);

    events::emit_contract_logged(env, creator.clone(), id);
    Ok(id)
}

/// Move `contract_id` to `target`. Any involved party may do so from any
/// state; no legality check is made on the target.
pub fn transition(
    env: &Env,
    contract_id: u64,
    caller: &Address,
    target: ContractState,
) -> Result<(), Error> {
    caller.require_auth();
    load_config(env)?;
    let terms = load_terms(env, contract_id)?;
    if terms.role_of(caller).is_none() {
        return Err(Error::Unauthorized);
    }
    let mut progress = load_progress(env, contract_id)?;
    progress.state = target;
    save_progress(env, contract_id, &progress);
    events::emit_state_changed(env, contract_id, caller.clone(), target);
    Ok(())
}

pub fn is_ready(env: &Env, contract_id: u64) -> Result<bool, Error> {
    Ok(load_progress(env, contract_id)?.state == ContractState::InProgress)
}
