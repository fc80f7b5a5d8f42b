//! Block and chain primitives on top of [`NodeRpc`].
//!
//! # Responsibilities
//! - Produce blocks (`mine`, `fund`) and fetch chain data
//! - Roll the active chain back (`invalidate_block`, `fork`)
//! - Poll for the best header, with a fixed delay or bounded backoff
//!
//! # Consistency
//! The node is the source of truth and changes independently of the
//! harness. Compound operations (`fund`, `get_latest_header`, `fork`) are a
//! sequence of separate calls, each committed on the node as soon as it
//! returns; nothing is rolled back if a later call fails, and the chain may
//! move between two reads. After `invalidate_block` the best height can go
//! down, so callers must not assume heights only grow.
//!
//! Two controllers mining or invalidating against the same node interleave
//! arbitrarily; run one simulation per node.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::chain::types::{
    BlockHeader, ChainError, ChainResult, ChainTarget, HeaderChange, MempoolInfo, RandomBlock,
};
use crate::config::Configuration;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::retries::retry_idempotent;
use crate::rpc::types::NodeRpc;

/// `getblock` verbosity that includes decoded transactions with raw hex.
const VERBOSE_BLOCK: u64 = 2;

#[derive(Debug, Deserialize)]
struct VerboseBlock {
    hash: String,
    #[serde(default)]
    tx: Vec<VerboseTx>,
}

#[derive(Debug, Deserialize)]
struct VerboseTx {
    #[serde(default)]
    txid: Option<String>,
    #[serde(default)]
    hex: Option<String>,
}

/// Chain-level operations against one node.
#[derive(Clone)]
pub struct ChainController {
    rpc: Arc<dyn NodeRpc>,
    config: Arc<Configuration>,
}

impl ChainController {
    pub fn new(rpc: Arc<dyn NodeRpc>, config: Arc<Configuration>) -> Self {
        Self { rpc, config }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn rpc(&self) -> &Arc<dyn NodeRpc> {
        &self.rpc
    }

    /// Mine `count` blocks (default from config) to `address` (default zero address).
    ///
    /// Issues a single `generatetoaddress`; never retried.
    pub async fn mine(&self, count: Option<u64>, address: Option<&str>) -> ChainResult<Vec<String>> {
        let count = count.unwrap_or_else(|| self.config.mine_count());
        let address = address.unwrap_or_else(|| self.config.zero_address());

        let hashes: Vec<String> = self
            .write("generatetoaddress", vec![json!(count), json!(address)])
            .await?;

        metrics::record_blocks_mined(hashes.len());
        tracing::info!(
            count,
            address,
            tip = hashes.last().map(String::as_str).unwrap_or("-"),
            "Mined blocks"
        );
        Ok(hashes)
    }

    /// Mine one block to `address` and return its coinbase transaction as raw hex.
    pub async fn fund(&self, address: Option<&str>) -> ChainResult<String> {
        let hashes = self.mine(Some(1), address).await?;
        let hash = hashes
            .first()
            .ok_or_else(|| ChainError::invariant("generatetoaddress", "no block hash returned"))?;

        let block: VerboseBlock = self
            .read("getblock", vec![json!(hash), json!(VERBOSE_BLOCK)])
            .await
            .map_err(|e| e.lookup(|| format!("block {}", hash)))?;

        let coinbase = block.tx.into_iter().next().ok_or_else(|| {
            ChainError::invariant("getblock", format!("block {} has no transactions", block.hash))
        })?;
        let hex = coinbase.hex.ok_or_else(|| {
            ChainError::invariant("getblock", format!("coinbase of block {} has no hex", block.hash))
        })?;

        tracing::info!(
            block = %block.hash,
            txid = coinbase.txid.as_deref().unwrap_or("-"),
            "Funding transaction mined"
        );
        Ok(hex)
    }

    pub async fn get_block_hash(&self, height: u64) -> ChainResult<String> {
        self.read("getblockhash", vec![json!(height)])
            .await
            .map_err(|e| e.lookup(|| format!("height {}", height)))
    }

    pub async fn get_block_header(&self, hash: &str) -> ChainResult<BlockHeader> {
        self.read("getblockheader", vec![json!(hash)])
            .await
            .map_err(|e| e.lookup(|| format!("block {}", hash)))
    }

    /// Header of the node's current best block.
    ///
    /// Two reads; if a block arrives in between, the header returned is the
    /// one the first read pointed at.
    pub async fn get_latest_header(&self) -> ChainResult<BlockHeader> {
        let best: String = self.read("getbestblockhash", Vec::new()).await?;
        self.get_block_header(&best).await
    }

    pub async fn get_mempool_info(&self) -> ChainResult<MempoolInfo> {
        self.read("getmempoolinfo", Vec::new()).await
    }

    /// Txids currently in the node's mempool.
    pub async fn get_raw_mempool(&self) -> ChainResult<Vec<String>> {
        self.read("getrawmempool", Vec::new()).await
    }

    /// Sleep for `delay` (default from config), then read the best header.
    ///
    /// A fixed-delay poll: it does not wait for a block. Compare the result
    /// with an earlier header to find out whether the chain moved.
    pub async fn wait_for_next_header(&self, delay: Option<Duration>) -> ChainResult<BlockHeader> {
        let delay = delay.unwrap_or_else(|| self.config.delay());
        tokio::time::sleep(delay).await;
        self.get_latest_header().await
    }

    /// Poll with backoff until the best block is no longer `previous`.
    ///
    /// Gives up after the configured number of reads and returns
    /// [`HeaderChange::Unchanged`] with the last header seen.
    pub async fn wait_for_header_change(&self, previous: &BlockHeader) -> ChainResult<HeaderChange> {
        let poll = self.config.poll();
        let attempts = poll.max_attempts.max(1);
        let mut last = None;

        for attempt in 1..=attempts {
            tokio::time::sleep(calculate_backoff(attempt, poll.base_delay_ms, poll.max_delay_ms)).await;
            let header = self.get_latest_header().await?;
            if header.hash != previous.hash {
                tracing::debug!(
                    attempt,
                    from = previous.height,
                    to = header.height,
                    "Best header changed"
                );
                return Ok(HeaderChange::Changed(header));
            }
            last = Some(header);
        }

        tracing::debug!(attempts, height = previous.height, "Best header unchanged");
        // attempts >= 1, so at least one header was read
        Ok(HeaderChange::Unchanged(last.unwrap_or_else(|| previous.clone())))
    }

    /// Pick a height uniformly from `[0, max_height)` and resolve its hash.
    pub async fn get_random_block(&self, max_height: u64) -> ChainResult<RandomBlock> {
        if max_height == 0 {
            return Err(ChainError::InvalidArgument(
                "max height must be greater than 0".to_string(),
            ));
        }
        let height = rand::thread_rng().gen_range(0..max_height);
        let hash = self.get_block_hash(height).await?;
        Ok(RandomBlock { height, hash })
    }

    /// Roll the active chain back to just after `target`.
    ///
    /// Invalidates the block at `target`'s height + 1. At the current tip
    /// that block does not exist yet, and the node's answer to the lookup is
    /// returned as-is.
    pub async fn fork(&self, target: impl Into<ChainTarget>) -> ChainResult<String> {
        let target = target.into();
        let height = match &target {
            ChainTarget::Height(height) => *height,
            ChainTarget::Hash(hash) => self.get_block_header(hash).await?.height,
        };
        let first_invalid = height.checked_add(1).ok_or_else(|| {
            ChainError::InvalidArgument(format!("cannot fork after height {}", height))
        })?;

        tracing::info!(%target, first_invalid, "Forking chain");
        self.invalidate_block(first_invalid).await
    }

    /// Mark a block invalid on the node, returning the invalidated hash.
    pub async fn invalidate_block(&self, target: impl Into<ChainTarget>) -> ChainResult<String> {
        let hash = match target.into() {
            ChainTarget::Height(height) => self.get_block_hash(height).await?,
            ChainTarget::Hash(hash) => hash,
        };

        let _: Value = self
            .write("invalidateblock", vec![json!(hash)])
            .await
            .map_err(|e| e.lookup(|| format!("block {}", hash)))?;

        tracing::info!(block = %hash, "Block invalidated");
        Ok(hash)
    }

    /// Idempotent call: retried on transport failures.
    async fn read<T: DeserializeOwned>(&self, method: &'static str, params: Vec<Value>) -> ChainResult<T> {
        let rpc = self.rpc.as_ref();
        let value = retry_idempotent(self.config.retries(), method, move || {
            rpc.call(method, params.clone())
        })
        .await?;
        decode(method, value)
    }

    /// State-changing call: sent exactly once.
    async fn write<T: DeserializeOwned>(&self, method: &'static str, params: Vec<Value>) -> ChainResult<T> {
        let value = self.rpc.call(method, params).await?;
        decode(method, value)
    }
}

impl std::fmt::Debug for ChainController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainController")
            .field("zero_address", &self.config.zero_address())
            .field("mine", &self.config.mine_count())
            .finish()
    }
}

fn decode<T: DeserializeOwned>(method: &str, value: Value) -> ChainResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ChainError::invariant(method, format!("unexpected result shape: {}", e)))
}
