//! In-memory graph collaborator.
//!
//! [`MemoryGraph`] validates the funding root and templates and keeps every
//! flushed batch, but does not build or sign transactions, so a flush sends
//! nothing to the node. It stands in for a real graph engine in tests and in
//! dry runs of the simulation sequence.

use async_trait::async_trait;
use bitcoin::{Transaction, Txid};

use crate::graph::{FlushReport, GraphError, SimulationGraph, TxTemplate};
use crate::observability::metrics;
use crate::rpc::types::NodeRpc;

#[derive(Debug, Default)]
pub struct MemoryGraph {
    root: Option<Transaction>,
    pending: Vec<TxTemplate>,
    flushed: Vec<Vec<TxTemplate>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Txid of the seeded funding transaction.
    pub fn root_txid(&self) -> Option<Txid> {
        self.root.as_ref().map(Transaction::compute_txid)
    }

    /// Entries queued since the last flush.
    pub fn pending_entries(&self) -> &[TxTemplate] {
        &self.pending
    }

    /// Every batch flushed so far, oldest first.
    pub fn flushed(&self) -> &[Vec<TxTemplate>] {
        &self.flushed
    }
}

#[async_trait]
impl SimulationGraph for MemoryGraph {
    fn seed(&mut self, root_raw_tx: &str) -> Result<(), GraphError> {
        let bytes = hex::decode(root_raw_tx.trim())
            .map_err(|e| GraphError::InvalidRoot(format!("not hex: {}", e)))?;
        let tx: Transaction = bitcoin::consensus::deserialize(&bytes)
            .map_err(|e| GraphError::InvalidRoot(format!("not a transaction: {}", e)))?;
        if !tx.is_coinbase() {
            return Err(GraphError::InvalidRoot(format!(
                "{} is not a coinbase transaction",
                tx.compute_txid()
            )));
        }

        tracing::debug!(txid = %tx.compute_txid(), outputs = tx.output.len(), "Graph seeded");
        self.root = Some(tx);
        Ok(())
    }

    fn append(&mut self, entry: TxTemplate) -> Result<(), GraphError> {
        entry.validate()?;
        self.pending.push(entry);
        Ok(())
    }

    async fn flush(&mut self, _rpc: &dyn NodeRpc) -> Result<FlushReport, GraphError> {
        if self.pending.is_empty() {
            return Ok(FlushReport::default());
        }
        if self.root.is_none() {
            return Err(GraphError::NotSeeded);
        }

        let batch = std::mem::take(&mut self.pending);
        let submitted = batch.len();
        self.flushed.push(batch);
        metrics::record_entries_pushed(submitted);

        tracing::debug!(submitted, batches = self.flushed.len(), "Graph batch recorded");
        Ok(FlushReport {
            submitted,
            txids: Vec::new(),
        })
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::MockNode;
    use bitcoin::absolute::LockTime;
    use bitcoin::transaction::Version;
    use bitcoin::{Amount, OutPoint, ScriptBuf, Sequence, TxIn, TxOut, Witness};

    fn raw_tx(previous_output: OutPoint) -> String {
        let tx = Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output,
                script_sig: ScriptBuf::from_bytes(vec![0x01, 0x65]),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            }],
            output: vec![TxOut {
                value: Amount::from_sat(5_000_000_000),
                script_pubkey: ScriptBuf::new(),
            }],
        };
        bitcoin::consensus::encode::serialize_hex(&tx)
    }

    #[tokio::test]
    async fn test_seed_append_flush() {
        let node = MockNode::new();
        let mut graph = MemoryGraph::new();
        graph.seed(&raw_tx(OutPoint::null())).unwrap();
        assert!(graph.root_txid().is_some());

        for _ in 0..3 {
            graph.append(TxTemplate::default_prototype()).unwrap();
        }
        assert_eq!(graph.pending(), 3);

        let report = graph.flush(&node).await.unwrap();

        assert_eq!(report.submitted, 3);
        assert_eq!(graph.pending(), 0);
        assert_eq!(graph.flushed().len(), 1);
        assert!(node.calls().is_empty());
    }

    #[tokio::test]
    async fn test_flush_requires_root() {
        let node = MockNode::new();
        let mut graph = MemoryGraph::new();
        graph.append(TxTemplate::default_prototype()).unwrap();

        assert_eq!(graph.flush(&node).await.unwrap_err(), GraphError::NotSeeded);
    }

    #[tokio::test]
    async fn test_empty_flush_is_noop() {
        let node = MockNode::new();
        let mut graph = MemoryGraph::new();
        assert_eq!(graph.flush(&node).await.unwrap(), FlushReport::default());
        assert!(graph.flushed().is_empty());
    }

    #[test]
    fn test_seed_rejects_non_coinbase() {
        let spend = OutPoint {
            txid: "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b"
                .parse()
                .unwrap(),
            vout: 0,
        };
        let err = MemoryGraph::new().seed(&raw_tx(spend)).unwrap_err();
        assert!(err.to_string().contains("not a coinbase"));
    }

    #[test]
    fn test_seed_rejects_garbage() {
        let mut graph = MemoryGraph::new();
        assert!(matches!(graph.seed("zz"), Err(GraphError::InvalidRoot(_))));
        assert!(matches!(graph.seed("0100"), Err(GraphError::InvalidRoot(_))));
    }
}
