//! Soroban RPC client: polls `getEvents` for the protocol contract and
//! decodes DeTrust events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.
//!
//! Events are requested with `xdrFormat: "json"`, so topics and values arrive
//! as ScVal JSON (`{"symbol":"signed"}`, `{"map":[...]}`). Older RPC nodes
//! answer with `{"type":…,"value":…}` objects or flat maps; both are accepted.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{DetrustEvent, EventKind};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    #[serde(alias = "topicJson")]
    pub topic: Vec<Value>,
    #[serde(alias = "valueJson")]
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events from the RPC.
///
/// * `start_ledger`: the ledger sequence to scan from (inclusive).
/// * `cursor`: optional opaque pagination cursor from a previous response.
/// * `limit`: maximum number of events to return.
///
/// Returns `(events, next_cursor, latest_ledger)`.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    protocol_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<(Vec<RawEvent>, Option<String>, Option<u64>)> {
    let mut backoff = INITIAL_BACKOFF_SECS;

    loop {
        let params = build_params(protocol_id, start_ledger, cursor, limit);

        let response = client
            .post(rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "getEvents",
                "params": params,
            }))
            .send()
            .await;

        let resp = match response {
            Ok(resp) => resp,
            Err(e) => {
                warn!("RPC request failed (will retry in {backoff}s): {e}");
                backoff = sleep_backoff(backoff).await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate-limited by RPC (will retry in {backoff}s)");
            backoff = sleep_backoff(backoff).await;
            continue;
        }

        let body: RpcResponse = resp.json().await?;

        if let Some(err) = body.error {
            if is_hard_error(err.code) {
                return Err(IndexerError::Rpc {
                    code: err.code,
                    message: err.message,
                });
            }
            warn!(
                "RPC soft error (will retry in {backoff}s): {} {}",
                err.code, err.message
            );
            backoff = sleep_backoff(backoff).await;
            continue;
        }

        let result = body
            .result
            .ok_or_else(|| IndexerError::EventParse("Empty result from getEvents".to_string()))?;

        debug!(
            "Fetched {} events (latest_ledger={:?})",
            result.events.len(),
            result.latest_ledger
        );

        return Ok((result.events, result.cursor, result.latest_ledger));
    }
}

/// Sleep for `backoff` seconds and return the next delay.
async fn sleep_backoff(backoff: u64) -> u64 {
    tokio::time::sleep(Duration::from_secs(backoff)).await;
    next_backoff(backoff)
}

fn next_backoff(backoff: u64) -> u64 {
    (backoff * 2).min(MAX_BACKOFF_SECS)
}

/// Malformed request / unknown method: retrying cannot help.
fn is_hard_error(code: i64) -> bool {
    code == -32600 || code == -32601
}

fn build_params(protocol_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [protocol_id]
            }
        ],
        "pagination": {
            "limit": limit
        },
        "xdrFormat": "json"
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode raw RPC events. Events from failed invocations are dropped.
pub fn decode_events(raw: &[RawEvent], protocol_id: &str) -> Vec<DetrustEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call.unwrap_or(true))
        .filter_map(|e| decode_single(e, protocol_id))
        .collect()
}

fn decode_single(raw: &RawEvent, protocol_id: &str) -> Option<DetrustEvent> {
    let kind = EventKind::from_topic(&scalar(raw.topic.first()?)?);

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let contract_id = raw.topic.get(1).and_then(scalar);
    let (actor, detail) = decode_data(&raw.value, kind);

    Some(DetrustEvent {
        event_type: kind.as_str().to_string(),
        contract_id,
        actor,
        detail,
        ledger,
        timestamp,
        protocol_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| protocol_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

/// `(actor, detail)` for each event payload.
fn decode_data(value: &Value, kind: EventKind) -> (Option<String>, Option<String>) {
    match kind {
        EventKind::ContractLogged => (field(value, "contract_address"), None),
        EventKind::ContractSigned => (field(value, "signer"), None),
        EventKind::ContractVerified => {
            let side = field(value, "legitimate").map(|v| {
                if v == "true" {
                    "legitimate".to_string()
                } else {
                    "fraudulent".to_string()
                }
            });
            (field(value, "voter"), side)
        }
        EventKind::VerificationResolved => (None, field(value, "final_state")),
        EventKind::MessageSent => (field(value, "sender"), None),
        EventKind::StateChanged => (field(value, "caller"), field(value, "state")),
        EventKind::RoleSet => (field(value, "caller"), field(value, "role")),
        // The payload is the revoking caller itself.
        EventKind::RoleDel => (scalar(value), None),
        EventKind::Unknown => (None, None),
    }
}

/// Look up `key` in a flat JSON object or an ScVal `{"map":[{key,val}]}`.
fn field(value: &Value, key: &str) -> Option<String> {
    if let Some(v) = value.get(key) {
        return scalar(v);
    }
    let entries = value
        .get("map")
        .or_else(|| value.get("value"))
        .and_then(Value::as_array)?;
    entries
        .iter()
        .find(|entry| entry.get("key").and_then(scalar).as_deref() == Some(key))
        .and_then(|entry| entry.get("val"))
        .and_then(scalar)
}

/// Flatten an ScVal JSON node to its display string.
///
/// `{"symbol":"x"}`, `{"type":"u64","value":"7"}` and `{"vec":[{"symbol":"Legitimate"}]}`
/// (a unit enum variant) all reduce to their inner scalar. A string that is
/// itself JSON is parsed first.
fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(inner @ (Value::Object(_) | Value::Array(_))) => scalar(&inner),
            _ => Some(s.clone()),
        },
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => items.first().and_then(scalar),
        Value::Object(map) => match map.get("value") {
            Some(inner) => scalar(inner),
            None if map.len() == 1 => map.values().next().and_then(scalar),
            None => None,
        },
        Value::Null => None,
    }
}

fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
