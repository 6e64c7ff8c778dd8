//! JSON-RPC transport for the remote ledger fullnode.
//!
//! This is the single network boundary of the toolkit. The method set is
//! fixed: object read, dynamic-field enumeration and read, event query, epoch
//! and flag reads, dry run, and transaction execution. No retries and no
//! additional timeout layer; transport failures surface verbatim.

use crate::error::{LedgerError, LedgerResult};
use crate::receipt::{EventRecord, ObjectOwner, TransactionReceipt};
use crate::signer::Signer;
use crate::types::{Address, EpochSelector, ObjectId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// One contract entry-point invocation inside a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveCall {
    pub package: String,
    pub module: String,
    pub function: String,
    pub type_args: Vec<String>,
    pub args: Vec<CallArg>,
}

/// A positional call argument: an object reference or a primitive value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CallArg {
    Object { object_id: ObjectId },
    Pure { value: Value },
}

impl CallArg {
    pub fn object(id: &ObjectId) -> Self {
        CallArg::Object {
            object_id: id.clone(),
        }
    }

    pub fn pure(value: impl Serialize) -> Self {
        CallArg::Pure {
            value: serde_json::to_value(value).expect("pure call arg must serialize"),
        }
    }
}

/// What the transaction does: a short fixed sequence of entry-point calls
/// (atomic as one unit), or a package publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransactionKind {
    Calls { calls: Vec<MoveCall> },
    Publish {
        modules: Vec<String>,
        dependencies: Vec<ObjectId>,
    },
}

/// Unsigned transaction payload. Field order is the canonical signing order;
/// the serialized JSON bytes are what the credential signs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionData {
    pub sender: Address,
    pub kind: TransactionKind,
    pub gas_budget: u64,
}

impl TransactionData {
    pub fn signing_bytes(&self) -> LedgerResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// A remote object as returned by the read endpoint: identity, printed type,
/// owner, and the raw nested field content left undecoded for `decode`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawObject {
    pub object_id: ObjectId,
    pub version: u64,
    pub object_type: String,
    pub owner: ObjectOwner,
    pub content: Value,
}

/// One entry of a remote key-value collection: the key and the id of the
/// field object holding the value.
#[derive(Debug, Clone, Deserialize)]
pub struct DynamicFieldInfo {
    pub name: Value,
    pub object_id: ObjectId,
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// JSON-RPC client for one fullnode endpoint.
pub struct LedgerRpc {
    http: reqwest::Client,
    url: String,
}

impl LedgerRpc {
    pub fn new(url: impl Into<String>) -> Self {
        LedgerRpc {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call(&self, method: &str, params: Value) -> LedgerResult<Value> {
        debug!(method, %params, "ledger rpc call");
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };
        let response = self.http.post(&self.url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::RpcFailed {
                method: method.to_string(),
                reason: format!("HTTP {}", status),
            });
        }
        let body: RpcResponse = response.json().await?;
        if let Some(err) = body.error {
            return Err(LedgerError::RpcFailed {
                method: method.to_string(),
                reason: format!("{} (code {})", err.message, err.code),
            });
        }
        body.result.ok_or_else(|| LedgerError::RpcFailed {
            method: method.to_string(),
            reason: "response carried neither result nor error".to_string(),
        })
    }

    /// Read one object. A missing object is an error; reads here are always
    /// of records the caller believes exist.
    pub async fn get_object(&self, id: &ObjectId) -> LedgerResult<RawObject> {
        let result = self.call("ledger_getObject", json!([id])).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Enumerate every entry of a remote key-value collection. The endpoint
    /// returns the full set in one response; no pagination is attempted.
    pub async fn get_dynamic_fields(
        &self,
        parent: &ObjectId,
    ) -> LedgerResult<Vec<DynamicFieldInfo>> {
        let result = self.call("ledger_getDynamicFields", json!([parent])).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Read one collection entry by key. Returns `None` when the key is not
    /// present, as distinct from transport or shape errors.
    pub async fn get_dynamic_field_object(
        &self,
        parent: &ObjectId,
        name: &Value,
    ) -> LedgerResult<Option<RawObject>> {
        let result = self
            .call("ledger_getDynamicFieldObject", json!([parent, name]))
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(result)?))
    }

    /// Query the full event history for one event type, oldest first.
    ///
    /// The endpoint is assumed to return the complete, ordered log in one
    /// response. If it ever paginates or truncates, replay-based state
    /// reconstruction will silently under-count; see the validator.
    pub async fn query_events(&self, event_type: &str) -> LedgerResult<Vec<EventRecord>> {
        let result = self.call("ledger_queryEvents", json!([event_type])).await?;
        Ok(serde_json::from_value(result)?)
    }

    pub async fn latest_epoch(&self) -> LedgerResult<u64> {
        let result = self.call("ledger_getLatestEpoch", json!([])).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Read the epoch-dual pause flag for one coin type.
    pub async fn is_paused(&self, coin_type: &str, epoch: EpochSelector) -> LedgerResult<bool> {
        let result = self
            .call("ledger_isPaused", json!([coin_type, epoch.as_str()]))
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Read the epoch-dual blocklist membership of one address.
    pub async fn is_blocklisted(
        &self,
        coin_type: &str,
        address: &Address,
        epoch: EpochSelector,
    ) -> LedgerResult<bool> {
        let result = self
            .call(
                "ledger_isBlocklisted",
                json!([coin_type, address, epoch.as_str()]),
            )
            .await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Simulate a transaction without committing it. The receipt shape is
    /// identical to execution so callers get a materially identical effects
    /// preview.
    pub async fn dry_run(&self, tx: &TransactionData) -> LedgerResult<TransactionReceipt> {
        let result = self.call("ledger_dryRunTransaction", json!([tx])).await?;
        Ok(serde_json::from_value(result)?)
    }

    /// Sign and submit a transaction, waiting for confirmation. The receipt
    /// is returned whether execution succeeded or failed; callers decide
    /// whether a failed status is an error.
    pub async fn execute(
        &self,
        tx: &TransactionData,
        signer: &Signer,
    ) -> LedgerResult<TransactionReceipt> {
        let bytes = tx.signing_bytes()?;
        let signature = signer.sign_base64(&bytes);
        let public_key = signer.public_key_base64();
        let result = self
            .call(
                "ledger_executeTransaction",
                json!([tx, signature, public_key]),
            )
            .await?;
        Ok(serde_json::from_value(result)?)
    }
}
