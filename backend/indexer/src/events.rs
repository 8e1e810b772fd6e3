//! Event kinds published by the `DeTrustProtocol` contract and their
//! database representation.
//!
//! Topics are `(symbol, key)` pairs; the key is the contract id for
//! lifecycle events and the target address for role events.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// `logged`: a Draft contract was created.
    ContractLogged,
    /// `signed`: a party signed and paid.
    ContractSigned,
    /// `verified`: a crowd verifier voted.
    ContractVerified,
    /// `resolved`: verification left `Pending`.
    VerificationResolved,
    /// `msg_sent`: a party appended a message.
    MessageSent,
    /// `state`: a lifecycle transition.
    StateChanged,
    /// `role_set`: a role was granted or moved.
    RoleSet,
    /// `role_del`: a role was revoked.
    RoleDel,
    Unknown,
}

impl EventKind {
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "logged" => Self::ContractLogged,
            "signed" => Self::ContractSigned,
            "verified" => Self::ContractVerified,
            "resolved" => Self::VerificationResolved,
            "msg_sent" => Self::MessageSent,
            "state" => Self::StateChanged,
            "role_set" => Self::RoleSet,
            "role_del" => Self::RoleDel,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContractLogged => "contract_logged",
            Self::ContractSigned => "contract_signed",
            Self::ContractVerified => "contract_verified",
            Self::VerificationResolved => "verification_resolved",
            Self::MessageSent => "message_sent",
            Self::StateChanged => "state_changed",
            Self::RoleSet => "role_set",
            Self::RoleDel => "role_del",
            Self::Unknown => "unknown",
        }
    }
}

/// A decoded protocol event, ready to be stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetrustEvent {
    pub event_type: String,
    /// DeTrust contract id for lifecycle events, target address for role events.
    pub contract_id: Option<String>,
    pub actor: Option<String>,
    /// Kind-specific detail: vote side, final state, new lifecycle state or role.
    pub detail: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    /// Address of the protocol contract that emitted the event.
    pub protocol_id: String,
    pub tx_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_type: String,
    pub contract_id: Option<String>,
    pub actor: Option<String>,
    pub detail: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub protocol_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

/// Indexed votes and resolution for one DeTrust contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    pub legitimate: i64,
    pub fraudulent: i64,
    /// Final verification state once a `resolved` event has been indexed.
    pub resolution: Option<String>,
}
