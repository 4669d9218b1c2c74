use super::model::Transaction;

/// Transactions waiting for the next sealed block, in submission order.
#[derive(Debug, Default)]
pub struct PendingPool {
    txs: Vec<Transaction>,
}

impl PendingPool {
    pub fn new() -> Self {
        Self { txs: Vec::new() }
    }

    pub fn push(&mut self, tx: Transaction) {
        self.txs.push(tx);
    }

    /// Swap the pool for an empty one and hand back everything it held.
    /// Whatever is pending at the moment of the call ends up in exactly one
    /// returned batch.
    pub fn take(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.txs)
    }

    /// Put a batch back at the front, ahead of anything submitted since.
    pub fn restore(&mut self, mut batch: Vec<Transaction>) {
        batch.append(&mut self.txs);
        self.txs = batch;
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.txs.iter()
    }
}
