//! # Signing protocol
//!
//! Each party commits to the contract by storing a fingerprint of its
//! off-chain signature material. The fingerprint is a nested keccak-256 so
//! that no two field layouts can produce the same preimage:
//!
//! ```text
//! L1 = H(xdr(signer))
//! L2 = H(L1 ‖ be64(contract_id) ‖ SIGNING_DOMAIN)
//! L3 = H(L2 ‖ be32(v) ‖ r ‖ s)
//! FP = H(L3 ‖ be64(nonce))
//! ```
//!
//! Only the signer's identity and the call arguments feed the hash; ledger
//! state never does, so [`fingerprint`] is pure.

use soroban_sdk::{token, xdr::ToXdr, Address, Bytes, BytesN, Env};

use crate::events;
use crate::storage::{load_config, load_progress, load_terms, save_progress};
use crate::types::PartyRole;
use crate::Error;

/// Domain separation tag mixed into the second layer.
const SIGNING_DOMAIN: &[u8] = b"\x19DeTrust Signed Contract:\n";

fn keccak(env: &Env, data: &Bytes) -> BytesN<32> {
    env.crypto().keccak256(data).to_bytes()
}

pub fn fingerprint(
    env: &Env,
    signer: &Address,
    contract_id: u64,
    nonce: u64,
    v: u32,
    r: &BytesN<32>,
    s: &BytesN<32>,
) -> BytesN<32> {
    let l1 = keccak(env, &signer.clone().to_xdr(env));

    let mut buf = Bytes::from_array(env, &l1.to_array());
    buf.extend_from_array(&contract_id.to_be_bytes());
    buf.extend_from_slice(SIGNING_DOMAIN);
    let l2 = keccak(env, &buf);

    let mut buf = Bytes::from_array(env, &l2.to_array());
    buf.extend_from_array(&v.to_be_bytes());
    buf.extend_from_array(&r.to_array());
    buf.extend_from_array(&s.to_array());
    let l3 = keccak(env, &buf);

    let mut buf = Bytes::from_array(env, &l3.to_array());
    buf.extend_from_array(&nonce.to_be_bytes());
    keccak(env, &buf)
}

/// Record `signer`'s commitment on `contract_id` and collect its fee.
///
/// The payee already paid half the price at creation, so it pays the other
/// half here; the payer pays the full price.
#[allow(clippy::too_many_arguments)]
pub fn sign(
    env: &Env,
    signer: &Address,
    contract_id: u64,
    nonce: u64,
    v: u32,
    r: &BytesN<32>,
    s: &BytesN<32>,
    payment: i128,
) -> Result<(), Error> {
    signer.require_auth();
    let config = load_config(env)?;
    let terms = load_terms(env, contract_id)?;
    let mut progress = load_progress(env, contract_id)?;

    let (role, required) = match terms.role_of(signer) {
        Some(PartyRole::Payer) => (PartyRole::Payer, terms.price),
        Some(PartyRole::Payee) => (PartyRole::Payee, terms.price / 2),
        _ => return Err(Error::Unauthorized),
    };
    if payment != required {
        return Err(Error::PaymentMismatch);
    }

    let slot = match role {
        PartyRole::Payer => &mut progress.payer_signature,
        _ => &mut progress.payee_signature,
    };
    if slot.is_some() {
        return Err(Error::AlreadySigned);
    }
    *slot = Some(fingerprint(env, signer, contract_id, nonce, v, r, s));
    progress.signed_count += 1;

    if payment > 0 {
        token::Client::new(env, &config.payment_token).transfer(
            signer,
            &env.current_contract_address(),
            &payment,
        );
    }

    save_progress(env, contract_id, &progress);
    events::emit_contract_signed(env, contract_id, signer.clone());
    Ok(())
}

/// Recompute `signer`'s fingerprint and compare it with the stored slot.
/// Non-parties and empty slots never match.
pub fn verify_signature(
    env: &Env,
    signer: &Address,
    contract_id: u64,
    nonce: u64,
    v: u32,
    r: &BytesN<32>,
    s: &BytesN<32>,
) -> Result<bool, Error> {
    let terms = load_terms(env, contract_id)?;
    let progress = load_progress(env, contract_id)?;
    let stored = match terms.role_of(signer) {
        Some(PartyRole::Payer) => progress.payer_signature,
        Some(PartyRole::Payee) => progress.payee_signature,
        _ => None,
    };
    Ok(match stored {
        Some(committed) => committed == fingerprint(env, signer, contract_id, nonce, v, r, s),
        None => false,
    })
}
