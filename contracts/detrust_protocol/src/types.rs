//! # Types
//!
//! Shared data structures used across all modules of the DeTrust protocol.
//!
//! ## Design decisions
//!
//! ### Terms / Progress split
//!
//! A contract record is internally stored as separate ledger entries:
//!
//! - [`ContractTerms`]: written once at creation; never mutated.
//! - [`ContractProgress`]: written on every signature, vote and transition.
//! - The two voter lists, each under its own key (see `storage`).
//!
//! The public API exposes the reconstructed [`ContractRecord`] for convenience.
//!
//! ### Lifecycle
//!
//! ```text
//! Draft ──► InProgress ──► Completed
//!                     ├──► Voided
//!                     └──► Disputed
//! ```
//!
//! Transitions are requested by any involved party and are not checked for
//! legality; callers that need "only after verification" must read
//! [`VerificationState`] themselves.

use soroban_sdk::{contracttype, Address, Bytes, BytesN, Vec};

/// Lifecycle state of a bilateral contract.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContractState {
    Draft,
    InProgress,
    Completed,
    Voided,
    Disputed,
}

/// Outcome of the crowd verification. Leaves `Pending` at most once.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VerificationState {
    Pending,
    Legitimate,
    Fraudulent,
}

/// Classification of the contract's origin.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContractType {
    /// Created through a delegated contract-type instance that answers
    /// `is_payer` / `is_payee`.
    Common,
    /// Created directly by one of the parties.
    Direct,
}

impl ContractType {
    /// Whether the origin address implements the contract-type interface.
    pub fn delegates_roles(&self) -> bool {
        matches!(self, ContractType::Common)
    }
}

/// How disputes on this contract are meant to be settled. Tag only.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DisputeType {
    Judges,
    Votes,
}

/// Trust classification reported by the trust-score ledger.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Tier {
    Bronze = 0,
    Silver = 1,
    Gold = 2,
    Platinum = 3,
}

/// Economic terms attached to one [`Tier`].
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TierTerms {
    pub tier: Tier,
    /// Full contract price, in units of the payment asset.
    pub cost: i128,
    /// Verifiers this party contributes to the quorum target.
    pub verifiers: u32,
}

/// Protocol-wide configuration, set at `init` and updatable by admins.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProtocolConfig {
    /// Asset used to pay contract fees (a Stellar Asset Contract).
    pub payment_token: Address,
    /// DeTrust reward token ledger (mint / burn).
    pub det_token: Address,
    /// Trust-score ledger (tiers, increase / decrease).
    pub trust_score: Address,
    /// Seconds after creation before a quorum may close verification.
    pub minimum_time_frame: u64,
    /// Seconds after creation at which verification is forced to close.
    pub verification_cut_off_time: u64,
    pub tiers: Vec<TierTerms>,
}

impl ProtocolConfig {
    pub fn terms_for(&self, tier: Tier) -> Option<TierTerms> {
        self.tiers.iter().find(|t| t.tier == tier)
    }
}

/// Role a participant plays inside one contract.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PartyRole {
    Payer,
    Payee,
    Origin,
}

/// Immutable contract terms, written once at creation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContractTerms {
    pub id: u64,
    pub origin: Address,
    pub payer: Address,
    pub payee: Address,
    pub contract_type: ContractType,
    pub dispute_type: DisputeType,
    pub creation_time: u64,
    pub price: i128,
    pub verifier_needed: u32,
    /// Verification windows copied from the config at creation.
    pub minimum_time_frame: u64,
    pub verification_cut_off_time: u64,
}

impl ContractTerms {
    /// Role `account` plays in this contract. Payer wins over origin when a
    /// party created the contract itself.
    pub fn role_of(&self, account: &Address) -> Option<PartyRole> {
        if *account == self.payer {
            Some(PartyRole::Payer)
        } else if *account == self.payee {
            Some(PartyRole::Payee)
        } else if *account == self.origin {
            Some(PartyRole::Origin)
        } else {
            None
        }
    }
}

/// Mutable contract progress.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContractProgress {
    pub state: ContractState,
    pub payer_signature: Option<BytesN<32>>,
    pub payee_signature: Option<BytesN<32>>,
    pub signed_count: u32,
    pub verification: VerificationState,
    pub legit_votes: u32,
    pub fraud_votes: u32,
}

impl ContractProgress {
    pub fn new() -> Self {
        ContractProgress {
            state: ContractState::Draft,
            payer_signature: None,
            payee_signature: None,
            signed_count: 0,
            verification: VerificationState::Pending,
            legit_votes: 0,
            fraud_votes: 0,
        }
    }

    pub fn fully_signed(&self) -> bool {
        self.signed_count == 2
    }

    pub fn votes_cast(&self) -> u32 {
        self.legit_votes + self.fraud_votes
    }
}

/// Full on-chain representation of a contract.
///
/// Used as the public API return type; reconstructed from the split storage
/// entries.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContractRecord {
    /// Sequential identifier (auto-incremented from 0).
    pub id: u64,
    /// Address that created the record.
    pub origin: Address,
    pub state: ContractState,
    /// Ledger timestamp at creation.
    pub creation_time: u64,
    pub contract_type: ContractType,
    pub dispute_type: DisputeType,
    pub payer: Address,
    pub payee: Address,
    /// Tier-derived price, fixed at creation.
    pub price: i128,
    pub payer_signature: Option<BytesN<32>>,
    pub payee_signature: Option<BytesN<32>>,
    pub signed_count: u32,
    pub verification: VerificationState,
    /// Quorum target, fixed at creation.
    pub verifier_needed: u32,
    /// Verification windows, fixed at creation.
    pub minimum_time_frame: u64,
    pub verification_cut_off_time: u64,
    pub legit_votes: u32,
    pub fraud_votes: u32,
    pub legit_voters: Vec<Address>,
    pub fraud_voters: Vec<Address>,
}

/// One entry of a contract's message log.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MessageEntry {
    pub role: PartyRole,
    pub text: Bytes,
}
