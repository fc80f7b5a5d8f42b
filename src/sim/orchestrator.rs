//! Simulation sequencing.
//!
//! # Responsibilities
//! - Bootstrap a simulation: fund, seed the graph, confirm, push, seal
//! - Inject batches of transaction-graph entries
//! - Expose mining and mempool inspection with configured defaults
//!
//! # Usage constraint
//! One [`Simulator`] per node. Operations run strictly one after another;
//! a failed step aborts the operation and leaves the node exactly as the
//! last successful call left it. Nothing is undone.

use std::sync::Arc;

use serde::Serialize;

use crate::chain::ChainController;
use crate::config::Configuration;
use crate::error::{SimError, SimResult, Step};
use crate::graph::{FlushReport, SimulationGraph, TxTemplate};
use crate::observability::metrics;
use crate::rpc::{HttpRpcClient, NodeRpc};

/// Blocks mined on top of the funding block so its coinbase matures.
pub const COINBASE_MATURITY: u64 = 100;

/// Entries appended to the graph during `init`.
pub const INIT_ENTRIES: usize = 25;

/// Entries appended by `add` when no count is given.
pub const DEFAULT_ADD_COUNT: usize = 50;

/// What `init` did on the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitReport {
    /// Raw hex of the funding coinbase.
    pub funding_tx: String,
    /// Hashes of the maturity blocks.
    pub confirmations: Vec<String>,
    /// Result of pushing the bootstrap entries.
    pub pushed: FlushReport,
    /// Hash of the block mined after the push.
    pub sealed_block: Option<String>,
}

/// Top-level driver composing the chain controller and graph collaborator.
pub struct Simulator<G> {
    config: Arc<Configuration>,
    chain: ChainController,
    graph: G,
}

impl<G: SimulationGraph> Simulator<G> {
    pub fn new(config: Configuration, rpc: Arc<dyn NodeRpc>, graph: G) -> Self {
        let config = Arc::new(config);
        let chain = ChainController::new(rpc, config.clone());
        Self {
            config,
            chain,
            graph,
        }
    }

    /// Build a simulator talking HTTP to the configured endpoint.
    pub fn connect(config: Configuration, graph: G) -> SimResult<Self> {
        let client = HttpRpcClient::new(config.rpc_url(), config.rpc_timeout())?;
        Ok(Self::new(config, Arc::new(client), graph))
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn chain(&self) -> &ChainController {
        &self.chain
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    /// Bootstrap the simulation.
    ///
    /// Funds the zero address, seeds the graph with that coinbase, mines
    /// [`COINBASE_MATURITY`] blocks, pushes [`INIT_ENTRIES`] default entries
    /// and mines one block to confirm them.
    pub async fn init(&mut self) -> SimResult<InitReport> {
        const OP: &str = "init";
        tracing::info!(zero_address = %self.config.zero_address(), "Initializing simulation");

        let funding_tx = self
            .chain
            .fund(None)
            .await
            .map_err(|e| SimError::at_step(OP, Step::Fund, e))?;
        self.step_done(Step::Fund);

        self.graph
            .seed(&funding_tx)
            .map_err(|e| SimError::at_step(OP, Step::Seed, e))?;
        self.step_done(Step::Seed);

        let confirmations = self
            .chain
            .mine(Some(COINBASE_MATURITY), None)
            .await
            .map_err(|e| SimError::at_step(OP, Step::Confirm, e))?;
        self.step_done(Step::Confirm);

        for _ in 0..INIT_ENTRIES {
            self.graph
                .append(TxTemplate::default_prototype())
                .map_err(|e| SimError::at_step(OP, Step::Append, e))?;
        }
        self.step_done(Step::Append);

        let pushed = self
            .graph
            .flush(self.chain.rpc().as_ref())
            .await
            .map_err(|e| SimError::at_step(OP, Step::Push, e))?;
        self.step_done(Step::Push);

        let sealed = self
            .chain
            .mine(Some(1), None)
            .await
            .map_err(|e| SimError::at_step(OP, Step::Seal, e))?;
        self.step_done(Step::Seal);

        tracing::info!(
            pushed = pushed.submitted,
            confirmations = confirmations.len(),
            "Simulation initialized"
        );
        Ok(InitReport {
            funding_tx,
            confirmations,
            pushed,
            sealed_block: sealed.into_iter().next(),
        })
    }

    /// Append `count` entries (default [`DEFAULT_ADD_COUNT`]) built from
    /// `template` (default prototype) and push them in one flush.
    pub async fn add(&mut self, count: Option<usize>, template: Option<TxTemplate>) -> SimResult<FlushReport> {
        const OP: &str = "add";
        let count = count.unwrap_or(DEFAULT_ADD_COUNT);
        let template = template.unwrap_or_default();

        for _ in 0..count {
            self.graph
                .append(template.clone())
                .map_err(|e| SimError::at_step(OP, Step::Append, e))?;
        }
        let report = self
            .graph
            .flush(self.chain.rpc().as_ref())
            .await
            .map_err(|e| SimError::at_step(OP, Step::Push, e))?;
        metrics::record_step(Step::Push.as_str());

        tracing::info!(count, submitted = report.submitted, "Entries added");
        Ok(report)
    }

    /// Txids currently in the node's mempool.
    pub async fn get_mempool(&self) -> SimResult<Vec<String>> {
        Ok(self.chain.get_raw_mempool().await?)
    }

    /// Mine with configured defaults for anything left out.
    pub async fn mine(&self, count: Option<u64>, address: Option<&str>) -> SimResult<Vec<String>> {
        Ok(self.chain.mine(count, address).await?)
    }

    fn step_done(&self, step: Step) {
        metrics::record_step(step.as_str());
        tracing::info!(step = step.as_str(), "Init step complete");
    }
}

impl<G: std::fmt::Debug> std::fmt::Debug for Simulator<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("chain", &self.chain)
            .field("graph", &self.graph)
            .finish()
    }
}
