//! Scriptable in-memory node for tests.
//!
//! Responses are registered per method; every call is recorded so tests can
//! assert on the exact sequence of methods and parameters the harness sent.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::rpc::types::{NodeRpc, RpcError, RpcResult, RPC_METHOD_NOT_FOUND};

type Responder = Box<dyn Fn(&[Value]) -> RpcResult<Value> + Send + Sync>;

/// One call observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub params: Vec<Value>,
}

/// In-memory [`NodeRpc`] with canned responses.
///
/// Lookup order for a method: queued one-shot results first, then the
/// persistent responder, otherwise a "method not found" protocol error.
#[derive(Default)]
pub struct MockNode {
    once: Mutex<HashMap<String, VecDeque<RpcResult<Value>>>>,
    responders: Mutex<HashMap<String, Responder>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `method` with `value`.
    pub fn respond(&self, method: &str, value: Value) -> &Self {
        self.respond_with(method, move |_| Ok(value.clone()))
    }

    /// Answer `method` by computing a result from the call's params.
    pub fn respond_with<F>(&self, method: &str, responder: F) -> &Self
    where
        F: Fn(&[Value]) -> RpcResult<Value> + Send + Sync + 'static,
    {
        lock(&self.responders).insert(method.to_string(), Box::new(responder));
        self
    }

    /// Answer the next call to `method` with `result`, ahead of any responder.
    pub fn push_result(&self, method: &str, result: RpcResult<Value>) -> &Self {
        lock(&self.once)
            .entry(method.to_string())
            .or_default()
            .push_back(result);
        self
    }

    /// Always fail `method` with `error`.
    pub fn fail(&self, method: &str, error: RpcError) -> &Self {
        self.respond_with(method, move |_| Err(error.clone()))
    }

    /// Every call seen so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Method names of every call seen so far, in order.
    pub fn methods(&self) -> Vec<String> {
        lock(&self.calls).iter().map(|c| c.method.clone()).collect()
    }

    /// Calls made to a single method.
    pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
        lock(&self.calls)
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }
}

#[async_trait]
impl NodeRpc for MockNode {
    async fn call(&self, method: &str, params: Vec<Value>) -> RpcResult<Value> {
        lock(&self.calls).push(RecordedCall {
            method: method.to_string(),
            params: params.clone(),
        });

        if let Some(result) = lock(&self.once).get_mut(method).and_then(VecDeque::pop_front) {
            return result;
        }

        match lock(&self.responders).get(method) {
            Some(responder) => responder(&params),
            None => Err(RpcError::protocol(method, RPC_METHOD_NOT_FOUND, "Method not found")),
        }
    }
}

impl std::fmt::Debug for MockNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockNode")
            .field("calls", &lock(&self.calls).len())
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    // A panicking test thread must not hide the calls recorded before it.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_records_calls_in_order() {
        let node = MockNode::new();
        node.respond("getbestblockhash", json!("aa"))
            .respond("getblockheader", json!({"hash": "aa", "height": 1}));

        node.call("getbestblockhash", vec![]).await.unwrap();
        node.call("getblockheader", vec![json!("aa")]).await.unwrap();

        assert_eq!(node.methods(), vec!["getbestblockhash", "getblockheader"]);
        assert_eq!(node.calls_to("getblockheader")[0].params, vec![json!("aa")]);
    }

    #[tokio::test]
    async fn test_one_shot_results_take_priority() {
        let node = MockNode::new();
        node.respond("getrawmempool", json!([]))
            .push_result("getrawmempool", Err(RpcError::transport("getrawmempool", "reset")));

        assert!(node.call("getrawmempool", vec![]).await.is_err());
        assert_eq!(node.call("getrawmempool", vec![]).await.unwrap(), json!([]));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let node = MockNode::new();
        let err = node.call("getblock", vec![]).await.unwrap_err();
        assert_eq!(err.code(), Some(RPC_METHOD_NOT_FOUND));
    }
}
