extern crate std;

use soroban_sdk::{testutils::Address as _, Address};

use crate::invariants::{assert_all_record_invariants, assert_settled_state};
use crate::mocks::{Fixture, DAY, PARTY_FUNDS, VERIFIER_FUNDS};
use crate::settlement::{
    PARTY_PENALTY, PARTY_TRUST_PENALTY, VOTER_PENALTY, VOTER_REWARD, VOTER_TRUST_PENALTY,
};
use crate::{ContractState, Error, VerificationState};

fn cast(f: &Fixture, id: u64, legitimate: bool) -> (Address, Address) {
    let (voter, wallet) = f.verifier();
    f.client.verify_contract(&voter, &id, &legitimate, &wallet);
    (voter, wallet)
}

#[test]
fn test_legitimate_quorum_rewards_voters() {
    let f = Fixture::new();
    let id = f.signed_contract();

    let voters: std::vec::Vec<_> = (0..4).map(|_| cast(&f, id, true)).collect();

    let record = f.client.get_contract(&id);
    assert_eq!(record.verification, VerificationState::Legitimate);
    assert_eq!(record.state, ContractState::InProgress);
    assert_settled_state(&record);
    assert_all_record_invariants(&record);

    for (voter, wallet) in &voters {
        assert_eq!(f.det.balance(wallet), VERIFIER_FUNDS + VOTER_REWARD);
        assert_eq!(f.trust.score(voter), 0);
    }

    // A fifth legitimate voter arrives after settlement.
    let (late, late_wallet) = f.verifier();
    assert_eq!(
        f.client.try_verify_contract(&late, &id, &true, &late_wallet),
        Err(Ok(Error::AlreadyVerified))
    );
    assert_eq!(f.det.balance(&late_wallet), VERIFIER_FUNDS);

    // Parties are untouched by a legitimate outcome.
    assert_eq!(f.det.balance(&f.wallet_payer), PARTY_FUNDS);
    assert_eq!(f.det.balance(&f.wallet_payee), PARTY_FUNDS);
}

#[test]
fn test_fraudulent_quorum_penalizes_parties() {
    let f = Fixture::new();
    let id = f.signed_contract();

    let voters: std::vec::Vec<_> = (0..4).map(|_| cast(&f, id, false)).collect();

    let record = f.client.get_contract(&id);
    assert_eq!(record.verification, VerificationState::Fraudulent);
    assert_eq!(record.state, ContractState::Voided);
    assert_settled_state(&record);

    assert_eq!(f.det.balance(&f.wallet_payer), PARTY_FUNDS - PARTY_PENALTY);
    assert_eq!(f.det.balance(&f.wallet_payee), PARTY_FUNDS - PARTY_PENALTY);
    assert_eq!(f.trust.score(&f.payer), -(PARTY_TRUST_PENALTY as i64));
    assert_eq!(f.trust.score(&f.payee), -(PARTY_TRUST_PENALTY as i64));

    for (_, wallet) in &voters {
        assert_eq!(f.det.balance(wallet), VERIFIER_FUNDS + VOTER_REWARD);
    }
}

#[test]
fn test_losing_voters_are_penalized() {
    let f = Fixture::new();
    let id = f.signed_contract();

    let (dissenter, dissenter_wallet) = cast(&f, id, false);
    let winners: std::vec::Vec<_> = (0..4).map(|_| cast(&f, id, true)).collect();

    assert_eq!(
        f.client.get_contract(&id).verification,
        VerificationState::Legitimate
    );
    assert_eq!(
        f.det.balance(&dissenter_wallet),
        VERIFIER_FUNDS - VOTER_PENALTY
    );
    assert_eq!(f.trust.score(&dissenter), -(VOTER_TRUST_PENALTY as i64));
    for (_, wallet) in &winners {
        assert_eq!(f.det.balance(wallet), VERIFIER_FUNDS + VOTER_REWARD);
    }
}

#[test]
fn test_fraudulent_outcome_penalizes_legit_voters() {
    let f = Fixture::new();
    let id = f.signed_contract();

    let (backer, backer_wallet) = cast(&f, id, true);
    cast(&f, id, false);
    cast(&f, id, false);
    f.advance(3 * DAY);

    assert_eq!(
        f.client.resolve_verification(&id),
        VerificationState::Fraudulent
    );
    assert_eq!(f.det.balance(&backer_wallet), VERIFIER_FUNDS - VOTER_PENALTY);
    assert_eq!(f.trust.score(&backer), -(VOTER_TRUST_PENALTY as i64));
}

#[test]
fn test_settlement_failure_rolls_back_deciding_vote() {
    let f = Fixture::new();
    let id = f.signed_contract();

    // A dissenter whose wallet cannot cover the penalty.
    let dissenter = Address::generate(&f.env);
    let empty_wallet = Address::generate(&f.env);
    f.client
        .verify_contract(&dissenter, &id, &false, &empty_wallet);

    for _ in 0..3 {
        cast(&f, id, true);
    }
    let before = f.client.get_contract(&id);

    let (voter, wallet) = f.verifier();
    assert_eq!(
        f.client.try_verify_contract(&voter, &id, &true, &wallet),
        Err(Ok(Error::SettlementFailed))
    );

    // Nothing from the failed call persisted.
    let after = f.client.get_contract(&id);
    assert_eq!(after, before);
    assert_eq!(after.verification, VerificationState::Pending);
    assert_eq!(after.legit_votes, 3);
    assert_eq!(f.client.wallet_of(&voter), None);
    assert_eq!(f.det.balance(&empty_wallet), 0);
}

#[test]
fn test_party_wallet_shortfall_blocks_fraud_settlement() {
    let f = Fixture::new();
    let id = f.signed_contract();
    // Drain the payee wallet below the party penalty.
    f.det.burn(&f.wallet_payee, &(PARTY_FUNDS - 1));

    cast(&f, id, false);
    f.advance(3 * DAY);

    assert_eq!(
        f.client.try_resolve_verification(&id),
        Err(Ok(Error::SettlementFailed))
    );
    let record = f.client.get_contract(&id);
    assert_eq!(record.verification, VerificationState::Pending);
    assert_eq!(record.state, ContractState::Draft);
    assert_eq!(f.det.balance(&f.wallet_payer), PARTY_FUNDS);
}

#[test]
fn test_rewards_follow_latest_registered_wallet() {
    let f = Fixture::new();
    let first = f.signed_contract();
    let second = f.signed_contract();

    let voter = Address::generate(&f.env);
    let old_wallet = Address::generate(&f.env);
    let new_wallet = Address::generate(&f.env);

    f.client.verify_contract(&voter, &first, &true, &old_wallet);
    f.client.verify_contract(&voter, &second, &true, &new_wallet);
    assert_eq!(f.client.wallet_of(&voter), Some(new_wallet.clone()));

    f.advance(3 * DAY);
    f.client.resolve_verification(&first);

    assert_eq!(f.det.balance(&old_wallet), 0);
    assert_eq!(f.det.balance(&new_wallet), VOTER_REWARD);
}
