//! # Crowd verification
//!
//! Once both parties have signed, anyone not involved in the contract may vote
//! on whether it is legitimate. Two windows, both measured from the
//! contract's creation time and copied into its terms when it was created,
//! bound the process:
//!
//! ```text
//! creation        minimum_time_frame        verification_cut_off_time
//!    |------------------|----------------------------|--------------->
//!     votes always open  votes open while             closed; resolution
//!                        votes_cast < verifier_needed  always allowed
//! ```
//!
//! * A vote that brings either side to `max(verifier_needed / 2, 1)` decides
//!   the outcome on the spot and settles in the same call.
//! * Otherwise `resolve_verification` closes the process: after the cutoff,
//!   or after the minimum window once the quorum target has been met. The
//!   outcome is then a simple majority and ties go to `Legitimate`.

use soroban_sdk::{Address, Env};

use crate::events;
use crate::ledgers::ContractTypeClient;
use crate::settlement;
use crate::storage::{
    has_voted, load_config, load_progress, load_terms, record_vote, save_progress, set_wallet,
};
use crate::types::{ContractProgress, ContractTerms, VerificationState};
use crate::Error;

/// Time bounds of one contract's verification, in ledger seconds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VerificationWindow {
    pub creation_time: u64,
    pub minimum_time_frame: u64,
    pub cut_off_time: u64,
}

impl VerificationWindow {
    pub fn new(terms: &ContractTerms) -> Self {
        VerificationWindow {
            creation_time: terms.creation_time,
            minimum_time_frame: terms.minimum_time_frame,
            cut_off_time: terms.verification_cut_off_time,
        }
    }

    pub fn elapsed(&self, now: u64) -> u64 {
        now.saturating_sub(self.creation_time)
    }

    /// Whether a new vote is still admissible.
    pub fn admits_vote(&self, now: u64, votes_cast: u32, verifier_needed: u32) -> bool {
        let elapsed = self.elapsed(now);
        elapsed <= self.cut_off_time
            && (elapsed <= self.minimum_time_frame || votes_cast < verifier_needed)
    }

    /// Whether `resolve_verification` may close the process.
    pub fn is_resolvable(&self, now: u64, votes_cast: u32, verifier_needed: u32) -> bool {
        let elapsed = self.elapsed(now);
        elapsed > self.cut_off_time
            || (elapsed > self.minimum_time_frame && votes_cast >= verifier_needed)
    }
}

/// Votes either side needs to decide the outcome before resolution.
pub fn quorum_threshold(verifier_needed: u32) -> u32 {
    (verifier_needed / 2).max(1)
}

/// Outcome right after a vote: decided once one side reaches the threshold.
pub fn quorum_outcome(legit_votes: u32, fraud_votes: u32, verifier_needed: u32) -> VerificationState {
    let threshold = quorum_threshold(verifier_needed);
    if legit_votes >= threshold {
        VerificationState::Legitimate
    } else if fraud_votes >= threshold {
        VerificationState::Fraudulent
    } else {
        VerificationState::Pending
    }
}

/// Outcome at forced resolution. Ties favour `Legitimate`.
pub fn majority_outcome(legit_votes: u32, fraud_votes: u32) -> VerificationState {
    if legit_votes >= fraud_votes {
        VerificationState::Legitimate
    } else {
        VerificationState::Fraudulent
    }
}

fn require_open(progress: &ContractProgress) -> Result<(), Error> {
    if !progress.fully_signed() {
        return Err(Error::NotFullySigned);
    }
    if progress.verification != VerificationState::Pending {
        return Err(Error::AlreadyVerified);
    }
    Ok(())
}

/// Whether `voter` is a party to the contract, directly or through the
/// contract-type instance that created it. An instance call that fails
/// vouches for nobody.
fn is_involved(env: &Env, terms: &ContractTerms, voter: &Address) -> bool {
    if *voter == terms.payer || *voter == terms.payee {
        return true;
    }
    if terms.contract_type.delegates_roles() {
        let instance = ContractTypeClient::new(env, &terms.origin);
        return matches!(instance.try_is_payer(voter), Ok(Ok(true)))
            || matches!(instance.try_is_payee(voter), Ok(Ok(true)));
    }
    false
}

/// Cast `voter`'s vote on `contract_id` and return the (possibly still
/// pending) outcome. `wallet` becomes the voter's payout wallet.
pub fn verify_contract(
    env: &Env,
    voter: &Address,
    contract_id: u64,
    legitimate: bool,
    wallet: &Address,
) -> Result<VerificationState, Error> {
    voter.require_auth();
    let config = load_config(env)?;
    let terms = load_terms(env, contract_id)?;
    let mut progress = load_progress(env, contract_id)?;

    require_open(&progress)?;
    let window = VerificationWindow::new(&terms);
    if !window.admits_vote(
        env.ledger().timestamp(),
        progress.votes_cast(),
        terms.verifier_needed,
    ) {
        return Err(Error::VerificationWindowClosed);
    }
    if is_involved(env, &terms, voter) {
        return Err(Error::InvolvedPartyCannotVerify);
    }
    if has_voted(env, contract_id, voter) {
        return Err(Error::AlreadyVoted);
    }

    set_wallet(env, voter, wallet);
    record_vote(env, contract_id, voter, legitimate);
    if legitimate {
        progress.legit_votes += 1;
    } else {
        progress.fraud_votes += 1;
    }
    events::emit_contract_verified(env, contract_id, voter.clone(), legitimate);

    progress.verification = quorum_outcome(
        progress.legit_votes,
        progress.fraud_votes,
        terms.verifier_needed,
    );
    if progress.verification != VerificationState::Pending {
        settlement::settle(env, &config, &terms, &mut progress)?;
    }
    save_progress(env, contract_id, &progress);

    if progress.verification != VerificationState::Pending {
        events::emit_verification_resolved(env, contract_id, progress.verification);
    }
    Ok(progress.verification)
}

/// Close a pending verification by majority once the windows allow it.
pub fn resolve_verification(env: &Env, contract_id: u64) -> Result<VerificationState, Error> {
    let config = load_config(env)?;
    let terms = load_terms(env, contract_id)?;
    let mut progress = load_progress(env, contract_id)?;

    require_open(&progress)?;
    let window = VerificationWindow::new(&terms);
    if !window.is_resolvable(
        env.ledger().timestamp(),
        progress.votes_cast(),
        terms.verifier_needed,
    ) {
        return Err(Error::VerificationNotYetResolvable);
    }

    progress.verification = majority_outcome(progress.legit_votes, progress.fraud_votes);
    settlement::settle(env, &config, &terms, &mut progress)?;
    save_progress(env, contract_id, &progress);

    events::emit_verification_resolved(env, contract_id, progress.verification);
    Ok(progress.verification)
}
