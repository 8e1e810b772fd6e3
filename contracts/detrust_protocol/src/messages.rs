//! Append-only message log between the parties of a contract.

use soroban_sdk::{Address, Bytes, Env};

use crate::events;
use crate::storage::{append_message, load_config, load_messages, load_terms};
use crate::types::{MessageEntry, PartyRole};
use crate::Error;

pub const MAX_MESSAGE_LEN: u32 = 1024;

fn role_prefix(role: PartyRole) -> &'static [u8] {
    match role {
        PartyRole::Payer => b"payer: ",
        PartyRole::Payee => b"payee: ",
        PartyRole::Origin => b"origin: ",
    }
}

pub fn send_message(
    env: &Env,
    contract_id: u64,
    sender: &Address,
    text: Bytes,
) -> Result<(), Error> {
    sender.require_auth();
    load_config(env)?;
    let terms = load_terms(env, contract_id)?;
    let role = terms.role_of(sender).ok_or(Error::Unauthorized)?;
    if text.is_empty() || text.len() > MAX_MESSAGE_LEN {
        return Err(Error::InvalidMessage);
    }
    append_message(env, contract_id, MessageEntry { role, text });
    events::emit_message_sent(env, contract_id, sender.clone());
    Ok(())
}

/// Every message in append order, one `"<role>: <text>\n"` line each.
pub fn retrieve_message(env: &Env, contract_id: u64, caller: &Address) -> Result<Bytes, Error> {
    caller.require_auth();
    let terms = load_terms(env, contract_id)?;
    if terms.role_of(caller).is_none() {
        return Err(Error::Unauthorized);
    }
    let mut out = Bytes::new(env);
    for entry in load_messages(env, contract_id).iter() {
        out.extend_from_slice(role_prefix(entry.role));
        out.append(&entry.text);
        out.push_back(b'\n');
    }
    Ok(out)
}
