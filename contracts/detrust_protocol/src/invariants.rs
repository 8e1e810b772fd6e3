#![allow(dead_code)]

extern crate std;

use crate::types::{ContractRecord, ContractState, VerificationState};

/// INV-1: `signed_count` equals the number of filled signature slots.
pub fn assert_signed_count_matches_slots(record: &ContractRecord) {
    let filled = record.payer_signature.is_some() as u32 + record.payee_signature.is_some() as u32;
    assert_eq!(
        record.signed_count, filled,
        "INV-1 violated: contract {} has signed_count {} but {} filled slots",
        record.id, record.signed_count, filled
    );
}

/// INV-2: Vote counters match the voter lists.
pub fn assert_votes_match_lists(record: &ContractRecord) {
    assert_eq!(
        record.legit_votes,
        record.legit_voters.len(),
        "INV-2 violated: contract {} legit counter out of sync",
        record.id
    );
    assert_eq!(
        record.fraud_votes,
        record.fraud_voters.len(),
        "INV-2 violated: contract {} fraud counter out of sync",
        record.id
    );
}

/// INV-3: No address appears in both voter lists, nor twice in one.
pub fn assert_voters_distinct(record: &ContractRecord) {
    let mut seen = std::vec::Vec::new();
    for voter in record.legit_voters.iter().chain(record.fraud_voters.iter()) {
        assert!(
            !seen.contains(&voter),
            "INV-3 violated: contract {} has a repeated voter",
            record.id
        );
        seen.push(voter);
    }
}

/// INV-4: Fields fixed at creation never change.
pub fn assert_terms_immutable(original: &ContractRecord, current: &ContractRecord) {
    assert_eq!(original.id, current.id, "INV-4 violated: id changed");
    assert_eq!(original.payer, current.payer, "INV-4 violated: payer changed");
    assert_eq!(original.payee, current.payee, "INV-4 violated: payee changed");
    assert_eq!(
        original.creation_time, current.creation_time,
        "INV-4 violated: creation_time changed"
    );
    assert_eq!(
        original.verifier_needed, current.verifier_needed,
        "INV-4 violated: verifier_needed changed"
    );
    assert_eq!(
        (original.minimum_time_frame, original.verification_cut_off_time),
        (current.minimum_time_frame, current.verification_cut_off_time),
        "INV-4 violated: verification windows changed"
    );
    assert_eq!(original.price, current.price, "INV-4 violated: price changed");
}

/// INV-5: Once set, a signature slot keeps its value.
pub fn assert_signatures_stable(before: &ContractRecord, after: &ContractRecord) {
    if before.payer_signature.is_some() {
        assert_eq!(
            before.payer_signature, after.payer_signature,
            "INV-5 violated: payer signature rewritten"
        );
    }
    if before.payee_signature.is_some() {
        assert_eq!(
            before.payee_signature, after.payee_signature,
            "INV-5 violated: payee signature rewritten"
        );
    }
}

/// INV-6: A decided verification never changes again.
pub fn assert_verification_transition(from: VerificationState, to: VerificationState) {
    let valid = from == VerificationState::Pending || from == to;
    assert!(
        valid,
        "INV-6 violated: verification moved from {:?} to {:?}",
        from, to
    );
}

/// INV-7: Settlement leaves the contract in the state its outcome implies.
pub fn assert_settled_state(record: &ContractRecord) {
    match record.verification {
        VerificationState::Pending => {}
        VerificationState::Legitimate => assert_eq!(
            record.state,
            ContractState::InProgress,
            "INV-7 violated: legitimate contract {} not in progress",
            record.id
        ),
        VerificationState::Fraudulent => assert_eq!(
            record.state,
            ContractState::Voided,
            "INV-7 violated: fraudulent contract {} not voided",
            record.id
        ),
    }
}

/// INV-8: Contract IDs are sequential starting from 0.
pub fn assert_sequential_ids(records: &[ContractRecord]) {
    for (i, record) in records.iter().enumerate() {
        assert_eq!(
            record.id, i as u64,
            "INV-8 violated: expected id {}, got {}",
            i, record.id
        );
    }
}

/// Run all stateless record invariants.
pub fn assert_all_record_invariants(record: &ContractRecord) {
    assert_signed_count_matches_slots(record);
    assert_votes_match_lists(record);
    assert_voters_distinct(record);
}
