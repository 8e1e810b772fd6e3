//! # Settlement
//!
//! Applies the economic consequences of a decided verification. Called only
//! by the verification engine, right after `verification` leaves `Pending`,
//! so it runs at most once per contract.
//!
//! | Outcome      | Contract   | Winning voters | Losing voters        | Parties              |
//! |--------------|------------|----------------|----------------------|----------------------|
//! | `Legitimate` | InProgress | mint 10        | burn 5, trust −1     | –                    |
//! | `Fraudulent` | Voided     | mint 10        | burn 5, trust −1     | burn 500, trust −2   |
//!
//! The new contract state is published as a `state` event with the protocol
//! itself as caller.
//!
//! Tokens move to / from each account's payout wallet; trust changes apply
//! to the account itself. Every ledger call goes through the fallible client;
//! the first failure aborts with `SettlementFailed`, which rolls back the
//! whole invocation including the vote or resolution that triggered it.

use soroban_sdk::{log, Address, Env, Vec};

use crate::events;
use crate::ledgers::{DeTrustTokenClient, TrustScoreClient};
use crate::storage::{load_voters, payout_wallet};
use crate::types::{ContractProgress, ContractState, ContractTerms, ProtocolConfig, VerificationState};
use crate::Error;

pub const VOTER_REWARD: i128 = 10;
pub const VOTER_PENALTY: i128 = 5;
pub const VOTER_TRUST_PENALTY: u32 = 1;
pub const PARTY_PENALTY: i128 = 500;
pub const PARTY_TRUST_PENALTY: u32 = 2;

struct Ledgers<'a> {
    env: &'a Env,
    token: DeTrustTokenClient<'a>,
    trust: TrustScoreClient<'a>,
}

fn checked<T, E, F>(result: Result<Result<T, E>, F>) -> Result<(), Error> {
    match result {
        Ok(Ok(_)) => Ok(()),
        _ => Err(Error::SettlementFailed),
    }
}

impl<'a> Ledgers<'a> {
    fn new(env: &'a Env, config: &ProtocolConfig) -> Self {
        Ledgers {
            env,
            token: DeTrustTokenClient::new(env, &config.det_token),
            trust: TrustScoreClient::new(env, &config.trust_score),
        }
    }

    fn reward(&self, account: &Address) -> Result<(), Error> {
        let wallet = payout_wallet(self.env, account);
        checked(self.token.try_mint(&wallet, &VOTER_REWARD))
    }

    fn penalize(&self, account: &Address, amount: i128, trust: u32) -> Result<(), Error> {
        let wallet = payout_wallet(self.env, account);
        checked(self.token.try_burn(&wallet, &amount))?;
        checked(self.trust.try_decrease(account, &trust))
    }

    fn reward_all(&self, voters: &Vec<Address>) -> Result<(), Error> {
        for voter in voters.iter() {
            self.reward(&voter)?;
        }
        Ok(())
    }

    fn penalize_all(&self, voters: &Vec<Address>) -> Result<(), Error> {
        for voter in voters.iter() {
            self.penalize(&voter, VOTER_PENALTY, VOTER_TRUST_PENALTY)?;
        }
        Ok(())
    }
}

/// Settle `progress.verification` and move the contract to its next state.
pub fn settle(
    env: &Env,
    config: &ProtocolConfig,
    terms: &ContractTerms,
    progress: &mut ContractProgress,
) -> Result<(), Error> {
    let ledgers = Ledgers::new(env, config);
    let legit_voters = load_voters(env, terms.id, true);
    let fraud_voters = load_voters(env, terms.id, false);

    match progress.verification {
        VerificationState::Pending => return Err(Error::SettlementFailed),
        VerificationState::Legitimate => {
            progress.state = ContractState::InProgress;
            ledgers.reward_all(&legit_voters)?;
            ledgers.penalize_all(&fraud_voters)?;
        }
        VerificationState::Fraudulent => {
            progress.state = ContractState::Voided;
            ledgers.penalize(&terms.payer, PARTY_PENALTY, PARTY_TRUST_PENALTY)?;
            ledgers.penalize(&terms.payee, PARTY_PENALTY, PARTY_TRUST_PENALTY)?;
            ledgers.reward_all(&fraud_voters)?;
            ledgers.penalize_all(&legit_voters)?;
        }
    }
    events::emit_state_changed(env, terms.id, env.current_contract_address(), progress.state);

    log!(
        env,
        "settled contract",
        terms.id,
        progress.verification,
        legit_voters.len(),
        fraud_voters.len()
    );
    Ok(())
}
